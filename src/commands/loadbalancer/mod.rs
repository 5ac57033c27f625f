//! `stackit load-balancer`.

mod observability_credentials;

use crate::cli::tree::CommandNode;
use clap::Command;

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("load-balancer")
            .visible_alias("lb")
            .about("Provides functionality for Load Balancer")
            .long_about("Provides functionality for Load Balancer."),
    )
    .child(observability_credentials::command())
}
