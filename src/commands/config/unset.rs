use crate::cli::args::many_values;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::{Config, ConfigKey};
use crate::flags::enum_parser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const KEY_ARG: &str = "KEY";

#[derive(Debug, Serialize)]
struct InputModel {
    keys: Vec<String>,
}

pub fn command() -> CommandNode {
    let names: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.name()).collect();
    let cmd = Command::new("unset")
        .about("Unsets CLI configuration options")
        .long_about(format!(
            "Unsets CLI configuration options, undoing past usages of the \"stackit config set\" command.\n\
             Valid keys: {}",
            names.join(", ")
        ))
        .arg(
            Arg::new(KEY_ARG)
                .value_name(KEY_ARG)
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(enum_parser(true, &names)),
        );
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Unset the project ID stored in your configuration",
                "$ stackit config unset project-id",
            ),
            Example::new(
                "Unset the region and the PostgreSQL Flex custom endpoint",
                "$ stackit config unset region postgresflex-custom-endpoint",
            ),
        ],
    );
    CommandNode::leaf(cmd, handler)
}

fn unset(config: &mut Config, keys: &[ConfigKey]) {
    for key in keys {
        config.set(*key, None);
        if *key == ConfigKey::ProjectId {
            config.project_name = None;
        }
    }
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "config_unset", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = InputModel {
        keys: many_values(matches, KEY_ARG),
    };
    p.debug_input_model(&model);

    let keys: Vec<ConfigKey> = model
        .keys
        .iter()
        .filter_map(|k| ConfigKey::from_name(k))
        .collect();
    let mut config = Config::load_from(&params.config_path)?;
    unset(&mut config, &keys);
    config
        .save_to(&params.config_path)
        .map_err(CliError::from)
        .context("write config to file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::leaf_matches;

    #[test]
    fn keys_are_case_insensitive() {
        let m = leaf_matches(&["config", "unset", "Region", "PROJECT-ID"]).unwrap();
        assert_eq!(many_values(&m, KEY_ARG), vec!["region", "project-id"]);
        assert!(leaf_matches(&["config", "unset", "colour"]).is_err());
        assert!(leaf_matches(&["config", "unset"]).is_err());
    }

    #[test]
    fn unsetting_project_drops_cached_name() {
        let mut config = Config {
            project_id: Some("p".into()),
            project_name: Some("name".into()),
            region: Some("eu02".into()),
            ..Config::default()
        };
        unset(&mut config, &[ConfigKey::ProjectId]);
        assert_eq!(config.project_id, None);
        assert_eq!(config.project_name, None);
        assert_eq!(config.region.as_deref(), Some("eu02"));
    }
}
