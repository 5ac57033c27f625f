//! Human-readable labels for the active project.

use crate::cli::error::{CliError, ResultExt};
use crate::cli::globalflags::GlobalFlagModel;
use crate::cli::params::CmdParams;
use crate::print::Level;

/// Name of `project_id`, from the config cache when it refers to the same project.
pub async fn project_name(params: &CmdParams, project_id: &str) -> Result<String, CliError> {
    if params.config.project_id.as_deref() == Some(project_id) {
        if let Some(name) = params.config.project_name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(name.to_string());
        }
    }

    let api = params.clients.resource_manager(params)?;
    let project = api
        .get_project(project_id)
        .await
        .context("get project details")?;
    project
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| anyhow::anyhow!("project {} has no name", project_id).into())
}

/// Project name for display, falling back to the ID when it cannot be resolved.
pub async fn project_label(params: &CmdParams, globals: &GlobalFlagModel) -> String {
    match project_name(params, &globals.project_id).await {
        Ok(name) => name,
        Err(e) => {
            params
                .printer
                .debug(Level::Error, &format!("get project name: {}", e));
            globals.project_id.clone()
        }
    }
}
