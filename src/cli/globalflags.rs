//! Flags every command inherits from the root.

use super::error::CliError;
use crate::config::{Config, ConfigKey};
use crate::flags;
use crate::output::OutputFormat;
use crate::print::{Level, Printer};
use clap::{ArgMatches, Command};
use serde::Serialize;

pub const PROJECT_ID_FLAG: &str = "project-id";
pub const REGION_FLAG: &str = "region";
pub const OUTPUT_FORMAT_FLAG: &str = "output-format";
pub const VERBOSITY_FLAG: &str = "verbosity";
pub const ASSUME_YES_FLAG: &str = "assume-yes";
pub const ASYNC_FLAG: &str = "async";

pub const DEFAULT_REGION: &str = "eu01";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalFlagModel {
    pub project_id: String,
    pub region: String,
    pub output_format: OutputFormat,
    pub verbosity: Level,
    pub assume_yes: bool,
    #[serde(rename = "async")]
    pub async_mode: bool,
}

impl GlobalFlagModel {
    pub fn require_project(&self) -> Result<(), CliError> {
        if self.project_id.is_empty() {
            return Err(CliError::ProjectId);
        }
        Ok(())
    }
}

/// Registers the global flags on the root command.
pub fn configure(cmd: Command) -> Command {
    cmd.arg(
        flags::uuid(PROJECT_ID_FLAG, "Project ID")
            .env(ConfigKey::ProjectId.env_var())
            .global(true),
    )
    .arg(
        flags::string(REGION_FLAG, "Target region for region-specific requests")
            .env(ConfigKey::Region.env_var())
            .global(true),
    )
    .arg(
        flags::enum_flag(
            OUTPUT_FORMAT_FLAG,
            format!("Output format, one of {:?}", OutputFormat::VALUES),
            true,
            &OutputFormat::VALUES,
        )
        .short('o')
        .env(ConfigKey::OutputFormat.env_var())
        .global(true),
    )
    .arg(
        flags::enum_flag(
            VERBOSITY_FLAG,
            format!("Verbosity of the CLI, one of {:?}", Level::VALUES),
            true,
            &Level::VALUES,
        )
        .env(ConfigKey::Verbosity.env_var())
        .global(true),
    )
    .arg(
        flags::bool(ASSUME_YES_FLAG, "If set, skips all confirmation prompts")
            .short('y')
            .global(true),
    )
    .arg(
        flags::bool(ASYNC_FLAG, "If set, runs the command asynchronously")
            .global(true),
    )
}

/// Reads the global flags. Values given on the command line or through the
/// environment win over the config file, which wins over built-in defaults.
pub fn parse(p: &Printer, matches: &ArgMatches, config: &Config) -> GlobalFlagModel {
    let from_flag_or_config = |name: &str, key: ConfigKey| {
        flags::flag_to_string_pointer(p, matches, name)
            .or_else(|| config.get(key).filter(|v| !v.is_empty()).map(str::to_string))
    };

    let project_id = match flags::flag_to_string_pointer(p, matches, PROJECT_ID_FLAG) {
        Some(id) => id,
        None => match config.project_id.as_deref() {
            Some(id) if !id.is_empty() => match flags::parse_uuid(id) {
                Ok(id) => id,
                Err(e) => {
                    p.debug(Level::Error, &format!("ignore configured project ID: {}", e));
                    String::new()
                }
            },
            _ => String::new(),
        },
    };

    let region = from_flag_or_config(REGION_FLAG, ConfigKey::Region)
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let output_format = from_flag_or_config(OUTPUT_FORMAT_FLAG, ConfigKey::OutputFormat)
        .map(|v| {
            v.parse::<OutputFormat>().unwrap_or_else(|e| {
                p.debug(Level::Error, &format!("ignore configured output format: {}", e));
                OutputFormat::Default
            })
        })
        .unwrap_or_default();

    let verbosity = from_flag_or_config(VERBOSITY_FLAG, ConfigKey::Verbosity)
        .map(|v| {
            v.parse::<Level>().unwrap_or_else(|e| {
                p.debug(Level::Error, &format!("ignore configured verbosity: {}", e));
                Level::Info
            })
        })
        .unwrap_or_default();

    GlobalFlagModel {
        project_id,
        region,
        output_format,
        verbosity,
        assume_yes: flags::flag_to_bool_value(p, matches, ASSUME_YES_FLAG),
        async_mode: flags::flag_to_bool_value(p, matches, ASYNC_FLAG),
    }
}
