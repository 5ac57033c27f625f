//! `stackit config`: the persistent CLI configuration.

mod list;
mod set;
mod unset;

use crate::cli::tree::CommandNode;
use clap::Command;

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("config")
            .about("Provides functionality for CLI configuration options")
            .long_about(
                "Provides functionality for CLI configuration options.\n\
                 The configuration is stored in the STACKIT config directory and every \
                 option can be overridden by its STACKIT_ environment variable.",
            ),
    )
    .child(list::command())
    .child(set::command())
    .child(unset::command())
}
