mod create;
mod delete;
mod update;

use crate::cli::tree::CommandNode;
use clap::Command;

pub(crate) const INSTANCE_ID_ARG: &str = "INSTANCE_ID";

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("instance")
            .about("Provides functionality for LogMe instances")
            .long_about("Provides functionality for LogMe instances."),
    )
    .child(create::command())
    .child(delete::command())
    .child(update::command())
}
