//! Per-service API clients and the factory commands obtain them from.

pub mod loadbalancer;
pub mod logme;
pub mod postgresflex;
pub mod projectname;
pub mod resourcemanager;

use crate::cli::error::{CliError, ResultExt};
use crate::cli::params::CmdParams;
use crate::config::ConfigKey;
use crate::output::format::user_agent;
use crate::print::Level;
use crate::sdk::http::DEFAULT_TIMEOUT;
use crate::sdk::{ApiClient, ClientConfig};
use loadbalancer::{HttpLoadBalancerApi, LoadBalancerApi};
use logme::{HttpLogMeApi, LogMeApi};
use postgresflex::{HttpPostgresFlexApi, PostgresFlexApi};
use resourcemanager::{HttpResourceManagerApi, ResourceManagerApi};
use std::sync::Arc;

pub const POSTGRESFLEX_DEFAULT_URL: &str = "https://postgres-flex-service.api.stackit.cloud";
pub const LOAD_BALANCER_DEFAULT_URL: &str = "https://load-balancer.api.stackit.cloud";
pub const LOGME_DEFAULT_URL: &str = "https://logme.api.eu01.stackit.cloud";
pub const RESOURCE_MANAGER_DEFAULT_URL: &str = "https://resource-manager.api.stackit.cloud";

/// Builds authenticated service clients for a command. Tests swap in fakes.
pub trait ClientFactory: Send + Sync {
    fn postgresflex(&self, params: &CmdParams) -> Result<Arc<dyn PostgresFlexApi>, CliError>;
    fn load_balancer(&self, params: &CmdParams) -> Result<Arc<dyn LoadBalancerApi>, CliError>;
    fn logme(&self, params: &CmdParams) -> Result<Arc<dyn LogMeApi>, CliError>;
    fn resource_manager(&self, params: &CmdParams)
        -> Result<Arc<dyn ResourceManagerApi>, CliError>;
}

/// Talks to the real endpoints over HTTPS.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl HttpClientFactory {
    fn api_client(
        &self,
        params: &CmdParams,
        endpoint_key: ConfigKey,
        default_url: &str,
    ) -> Result<ApiClient, CliError> {
        let access_token = params.authenticator.access_token()?;
        let base_url = match params.config.resolve(endpoint_key) {
            Some(custom) => {
                params.printer.debug(
                    Level::Debug,
                    &format!("using custom endpoint {} for {}", custom, endpoint_key.name()),
                );
                custom
            }
            None => default_url.to_string(),
        };
        ApiClient::new(ClientConfig {
            base_url,
            user_agent: user_agent(&params.cli_version),
            access_token,
            timeout: DEFAULT_TIMEOUT,
            printer: params.printer.clone(),
            cancel: params.cancel.clone(),
        })
        .context("configure API client")
    }
}

impl ClientFactory for HttpClientFactory {
    fn postgresflex(&self, params: &CmdParams) -> Result<Arc<dyn PostgresFlexApi>, CliError> {
        let client = self.api_client(
            params,
            ConfigKey::PostgresFlexCustomEndpoint,
            POSTGRESFLEX_DEFAULT_URL,
        )?;
        Ok(Arc::new(HttpPostgresFlexApi::new(client)))
    }

    fn load_balancer(&self, params: &CmdParams) -> Result<Arc<dyn LoadBalancerApi>, CliError> {
        let client = self.api_client(
            params,
            ConfigKey::LoadBalancerCustomEndpoint,
            LOAD_BALANCER_DEFAULT_URL,
        )?;
        Ok(Arc::new(HttpLoadBalancerApi::new(client)))
    }

    fn logme(&self, params: &CmdParams) -> Result<Arc<dyn LogMeApi>, CliError> {
        let client = self.api_client(params, ConfigKey::LogMeCustomEndpoint, LOGME_DEFAULT_URL)?;
        Ok(Arc::new(HttpLogMeApi::new(client)))
    }

    fn resource_manager(
        &self,
        params: &CmdParams,
    ) -> Result<Arc<dyn ResourceManagerApi>, CliError> {
        let client = self.api_client(
            params,
            ConfigKey::ResourceManagerCustomEndpoint,
            RESOURCE_MANAGER_DEFAULT_URL,
        )?;
        Ok(Arc::new(HttpResourceManagerApi::new(client)))
    }
}
