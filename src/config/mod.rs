//! Persistent CLI configuration stored as JSON in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_DIR_ENV: &str = "STACKIT_CONFIG_DIR";
const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A configurable key as users name it on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ProjectId,
    Region,
    OutputFormat,
    Verbosity,
    SessionTimeLimit,
    PostgresFlexCustomEndpoint,
    LoadBalancerCustomEndpoint,
    LogMeCustomEndpoint,
    ResourceManagerCustomEndpoint,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::ProjectId,
        ConfigKey::Region,
        ConfigKey::OutputFormat,
        ConfigKey::Verbosity,
        ConfigKey::SessionTimeLimit,
        ConfigKey::PostgresFlexCustomEndpoint,
        ConfigKey::LoadBalancerCustomEndpoint,
        ConfigKey::LogMeCustomEndpoint,
        ConfigKey::ResourceManagerCustomEndpoint,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ProjectId => "project-id",
            ConfigKey::Region => "region",
            ConfigKey::OutputFormat => "output-format",
            ConfigKey::Verbosity => "verbosity",
            ConfigKey::SessionTimeLimit => "session-time-limit",
            ConfigKey::PostgresFlexCustomEndpoint => "postgresflex-custom-endpoint",
            ConfigKey::LoadBalancerCustomEndpoint => "load-balancer-custom-endpoint",
            ConfigKey::LogMeCustomEndpoint => "logme-custom-endpoint",
            ConfigKey::ResourceManagerCustomEndpoint => "resource-manager-custom-endpoint",
        }
    }

    /// `STACKIT_` followed by the upper-cased key, e.g. `STACKIT_PROJECT_ID`.
    pub fn env_var(&self) -> String {
        format!("STACKIT_{}", self.name().to_uppercase().replace('-', "_"))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_custom_endpoint(&self) -> bool {
        self.name().ends_with("-custom-endpoint")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Cached display name of `project_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_time_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_flex_custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_me_custom_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_manager_custom_endpoint: Option<String>,
}

impl Config {
    /// `$STACKIT_CONFIG_DIR/cli-config.json`, or `~/.config/stackit/cli-config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir).join(CONFIG_FILE_NAME));
            }
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".config").join("stackit").join(CONFIG_FILE_NAME))
    }

    /// A missing file yields the empty configuration.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn set(&mut self, key: ConfigKey, value: Option<String>) {
        *self.slot_mut(key) = value;
    }

    /// Environment variable first, then the file value.
    pub fn resolve(&self, key: ConfigKey) -> Option<String> {
        self.resolve_with(key, |name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(&self, key: ConfigKey, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&key.env_var())
            .filter(|v| !v.is_empty())
            .or_else(|| self.get(key).map(str::to_string))
    }

    /// All keys that hold a value, in declaration order.
    pub fn entries(&self) -> Vec<(ConfigKey, String)> {
        ConfigKey::ALL
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| (k, v.to_string())))
            .collect()
    }

    fn slot(&self, key: ConfigKey) -> &Option<String> {
        match key {
            ConfigKey::ProjectId => &self.project_id,
            ConfigKey::Region => &self.region,
            ConfigKey::OutputFormat => &self.output_format,
            ConfigKey::Verbosity => &self.verbosity,
            ConfigKey::SessionTimeLimit => &self.session_time_limit,
            ConfigKey::PostgresFlexCustomEndpoint => &self.postgres_flex_custom_endpoint,
            ConfigKey::LoadBalancerCustomEndpoint => &self.load_balancer_custom_endpoint,
            ConfigKey::LogMeCustomEndpoint => &self.log_me_custom_endpoint,
            ConfigKey::ResourceManagerCustomEndpoint => &self.resource_manager_custom_endpoint,
        }
    }

    fn slot_mut(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ProjectId => &mut self.project_id,
            ConfigKey::Region => &mut self.region,
            ConfigKey::OutputFormat => &mut self.output_format,
            ConfigKey::Verbosity => &mut self.verbosity,
            ConfigKey::SessionTimeLimit => &mut self.session_time_limit,
            ConfigKey::PostgresFlexCustomEndpoint => &mut self.postgres_flex_custom_endpoint,
            ConfigKey::LoadBalancerCustomEndpoint => &mut self.load_balancer_custom_endpoint,
            ConfigKey::LogMeCustomEndpoint => &mut self.log_me_custom_endpoint,
            ConfigKey::ResourceManagerCustomEndpoint => {
                &mut self.resource_manager_custom_endpoint
            }
        }
    }
}
