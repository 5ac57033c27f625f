mod create;
mod delete;
mod describe;
mod list;
mod update;

use crate::cli::tree::CommandNode;
use clap::Command;

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("instance")
            .about("Provides functionality for PostgreSQL Flex instances")
            .long_about("Provides functionality for PostgreSQL Flex instances."),
    )
    .child(create::command())
    .child(delete::command())
    .child(describe::command())
    .child(list::command())
    .child(update::command())
}
