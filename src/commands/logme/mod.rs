//! `stackit logme`.

mod instance;
mod plans;

use crate::cli::globalflags::GlobalFlagModel;
use crate::cli::params::CmdParams;
use crate::cli::tree::CommandNode;
use crate::print::Level;
use crate::services::logme::utils::get_instance_name;
use crate::services::logme::LogMeApi;
use clap::Command;

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("logme")
            .about("Provides functionality for LogMe")
            .long_about("Provides functionality for LogMe."),
    )
    .child(instance::command())
    .child(plans::command())
}

pub(crate) async fn instance_label(
    params: &CmdParams,
    api: &dyn LogMeApi,
    globals: &GlobalFlagModel,
    instance_id: &str,
) -> String {
    match get_instance_name(api, &globals.project_id, instance_id).await {
        Ok(name) => name,
        Err(e) => {
            params
                .printer
                .debug(Level::Error, &format!("get instance name: {}", e));
            instance_id.to_string()
        }
    }
}
