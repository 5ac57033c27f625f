mod describe;
mod list;

use crate::cli::tree::CommandNode;
use chrono::{DateTime, Duration};
use clap::Command;

pub(crate) const INSTANCE_ID_FLAG: &str = "instance-id";

/// Backups are kept for this many days after they start.
const BACKUP_RETENTION_DAYS: i64 = 30;

pub fn command() -> CommandNode {
    CommandNode::group(
        Command::new("backup")
            .about("Provides functionality for PostgreSQL Flex instance backups")
            .long_about("Provides functionality for PostgreSQL Flex instance backups."),
    )
    .child(describe::command())
    .child(list::command())
}

/// Expiration date (`YYYY-MM-DD`) of a backup started at the RFC 3339 `start_time`.
pub(crate) fn backup_expiration(start_time: &str) -> Result<String, chrono::ParseError> {
    let started = DateTime::parse_from_rfc3339(start_time)?;
    let expires = started + Duration::days(BACKUP_RETENTION_DAYS);
    Ok(expires.format("%Y-%m-%d").to_string())
}
