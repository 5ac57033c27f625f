mod add;
mod delete;
mod list;
mod update;

use crate::cli::tree::CommandNode;
use clap::Command;

/// Read before prompting when no password flag is given.
const PASSWORD_ENV: &str = "STACKIT_LOAD_BALANCER_OBSERVABILITY_CREDENTIALS_PASSWORD";

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("observability-credentials")
            .about("Provides functionality for Load Balancer observability credentials")
            .long_about(
                "Provides functionality for Load Balancer observability credentials. These \
                 are used to store credentials for the observability endpoints that logs and \
                 metrics are pushed to.",
            ),
    )
    .child(add::command())
    .child(delete::command())
    .child(list::command())
    .child(update::command())
}
