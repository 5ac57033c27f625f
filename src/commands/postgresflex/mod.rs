//! `stackit postgresflex`.

mod backup;
mod instance;
mod options;

use crate::cli::globalflags::GlobalFlagModel;
use crate::cli::params::CmdParams;
use crate::cli::tree::CommandNode;
use crate::print::Level;
use crate::services::postgresflex::utils::get_instance_name;
use crate::services::postgresflex::PostgresFlexApi;
use clap::Command;

pub(crate) const INSTANCE_ID_ARG: &str = "INSTANCE_ID";

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("postgresflex")
            .about("Provides functionality for PostgreSQL Flex")
            .long_about("Provides functionality for PostgreSQL Flex."),
    )
    .child(backup::command())
    .child(instance::command())
    .child(options::command())
}

/// Instance name for display, or its ID when the lookup fails.
pub(crate) async fn instance_label(
    params: &CmdParams,
    api: &dyn PostgresFlexApi,
    globals: &GlobalFlagModel,
    instance_id: &str,
) -> String {
    match get_instance_name(api, &globals.project_id, &globals.region, instance_id).await {
        Ok(name) => name,
        Err(e) => {
            params
                .printer
                .debug(Level::Error, &format!("get instance name: {}", e));
            instance_id.to_string()
        }
    }
}
