//! The `stackit` command tree.

pub mod config;
pub mod loadbalancer;
pub mod logme;
pub mod postgresflex;

use crate::cli::error::CliError;
use crate::cli::parser::root_command;
use crate::cli::tree::CommandNode;
use crate::flags;
use crate::print::Printer;
use clap::ArgMatches;

pub const LIMIT_FLAG: &str = "limit";

pub fn root() -> CommandNode {
    CommandNode::group(root_command())
        .child(config::command())
        .child(loadbalancer::command())
        .child(logme::command())
        .child(postgresflex::command())
}

pub(crate) fn limit_flag() -> clap::Arg {
    flags::int64(LIMIT_FLAG, "Maximum number of entries to list")
}

/// `--limit` as given, rejecting values below one.
pub(crate) fn parse_limit(p: &Printer, matches: &ArgMatches) -> Result<Option<i64>, CliError> {
    match flags::flag_to_int64_pointer(p, matches, LIMIT_FLAG) {
        Some(limit) if limit < 1 => Err(CliError::flag(LIMIT_FLAG, "must be greater than 0")),
        limit => Ok(limit),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::cli::tree::CommandNode;
    use crate::print::{buffered_printer, Printer};
    use clap::ArgMatches;

    pub const PROJECT_ID: &str = "cd1e3b1f-8a7e-4b52-9d3c-8a0fdd3e2c2b";
    pub const INSTANCE_ID: &str = "5f1f6a0e-1d0a-4c7e-9a0b-2f0f3c8f7d11";

    /// Parses `args` against the full tree and returns the matches of the deepest command.
    pub fn leaf_matches(args: &[&str]) -> Result<ArgMatches, clap::Error> {
        let root = super::root();
        let mut argv = vec!["stackit"];
        argv.extend_from_slice(args);
        let matches = root.build().try_get_matches_from(argv)?;
        let (_, _, leaf): (Vec<&str>, &CommandNode, &ArgMatches) = root.resolve(&matches);
        Ok(leaf.clone())
    }

    pub fn printer() -> Printer {
        buffered_printer("").0
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn tree_is_consistent() {
        root().build().debug_assert();
    }

    #[test]
    fn limit_must_be_positive() {
        let p = printer();
        let m = leaf_matches(&["postgresflex", "instance", "list", "--limit", "0"]).unwrap();
        let err = parse_limit(&p, &m).unwrap_err();
        assert_eq!(err.to_string(), "invalid --limit: must be greater than 0");

        let m = leaf_matches(&["postgresflex", "instance", "list", "--limit", "3"]).unwrap();
        assert_eq!(parse_limit(&p, &m).unwrap(), Some(3));

        let m = leaf_matches(&["postgresflex", "instance", "list"]).unwrap();
        assert_eq!(parse_limit(&p, &m).unwrap(), None);
    }
}
