use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{
    OUTPUT_FORMAT_FLAG, PROJECT_ID_FLAG, REGION_FLAG, VERBOSITY_FLAG,
};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::{Config, ConfigKey};
use crate::flags;
use crate::print::{Level, Printer};
use clap::parser::ValueSource;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;
use tracing::instrument;

const SESSION_TIME_LIMIT_FLAG: &str = "session-time-limit";
const MAX_SESSION_TIME_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

lazy_static! {
    static ref DURATION: Regex =
        Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("duration pattern");
}

/// Global flags that double as configuration keys.
const GLOBAL_KEYS: [(&str, ConfigKey); 4] = [
    (PROJECT_ID_FLAG, ConfigKey::ProjectId),
    (REGION_FLAG, ConfigKey::Region),
    (OUTPUT_FORMAT_FLAG, ConfigKey::OutputFormat),
    (VERBOSITY_FLAG, ConfigKey::Verbosity),
];

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    values: Vec<(String, String)>,
    project_id_set: bool,
}

pub fn command() -> CommandNode {
    let mut cmd = Command::new("set")
        .about("Sets CLI configuration options")
        .long_about(
            "Sets CLI configuration options.\n\
             All of the configuration options can be set using an environment variable, \
             which takes precedence over what is configured using this command.\n\
             The environment variable is the name of the flag, with underscores (\"_\") \
             instead of dashes (\"-\") and the \"STACKIT\" prefix.\n\
             Example: to set the project ID you can set the environment variable STACKIT_PROJECT_ID.",
        )
        .arg(flags::string(
            SESSION_TIME_LIMIT_FLAG,
            "Maximum time before authentication is required again. Can't be larger than 24h. Examples: 3h, 5h30m40s",
        ));
    for key in ConfigKey::ALL.into_iter().filter(|k| k.is_custom_endpoint()) {
        cmd = cmd.arg(
            flags::string(key.name(), format!("{} base URL, used in calls to this API", api_name(key)))
                .value_parser(parse_endpoint),
        );
    }
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Set a project ID in your active configuration. This project ID will be used by every command (unless overridden by the \"STACKIT_PROJECT_ID\" environment variable)",
                "$ stackit config set --project-id xxx",
            ),
            Example::new(
                "Set the session time limit to 1 hour",
                "$ stackit config set --session-time-limit 1h",
            ),
            Example::new(
                "Set the PostgreSQL Flex custom endpoint",
                "$ stackit config set --postgresflex-custom-endpoint https://postgres-flex-service.api.stackit.cloud",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn api_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::PostgresFlexCustomEndpoint => "PostgreSQL Flex API",
        ConfigKey::LoadBalancerCustomEndpoint => "Load Balancer API",
        ConfigKey::LogMeCustomEndpoint => "LogMe API",
        ConfigKey::ResourceManagerCustomEndpoint => "Resource Manager API",
        _ => "API",
    }
}

fn parse_endpoint(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|e| format!("parse {:?} as URL: {}", value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        other => Err(format!("unsupported URL scheme {:?}", other)),
    }
}

/// Go-style durations limited to hours, minutes and seconds. `1d` is accepted as `24h`.
fn parse_session_time_limit(value: &str) -> Result<String, String> {
    let value = if value == "1d" { "24h" } else { value };
    let caps = DURATION
        .captures(value)
        .filter(|_| !value.is_empty())
        .ok_or_else(|| format!("parse value {:?}: invalid duration", value))?;
    let part = |i: usize, unit: u64| -> Result<u64, String> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().map(|n| n.saturating_mul(unit)))
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(|e| format!("parse value {:?}: {}", value, e))
    };
    let secs = part(1, 3600)?
        .saturating_add(part(2, 60)?)
        .saturating_add(part(3, 1)?);
    let total = Duration::from_secs(secs);
    if total.is_zero() {
        return Err("value must be positive".to_string());
    }
    if total > MAX_SESSION_TIME_LIMIT {
        return Err("value can't be larger than 24h".to_string());
    }
    Ok(value.to_string())
}

fn given_on_command_line(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn parse_input(p: &Printer, matches: &ArgMatches) -> Result<InputModel, CliError> {
    let mut values = Vec::new();
    for (flag, key) in GLOBAL_KEYS {
        if given_on_command_line(matches, flag) {
            values.push((key.name().to_string(), flags::flag_to_string_value(p, matches, flag)));
        }
    }

    if given_on_command_line(matches, SESSION_TIME_LIMIT_FLAG) {
        let raw = flags::flag_to_string_value(p, matches, SESSION_TIME_LIMIT_FLAG);
        let limit = parse_session_time_limit(&raw)
            .map_err(|details| CliError::flag(SESSION_TIME_LIMIT_FLAG, details))?;
        values.push((ConfigKey::SessionTimeLimit.name().to_string(), limit));
    }

    for key in ConfigKey::ALL.into_iter().filter(|k| k.is_custom_endpoint()) {
        if given_on_command_line(matches, key.name()) {
            values.push((key.name().to_string(), flags::flag_to_string_value(p, matches, key.name())));
        }
    }

    if values.is_empty() {
        return Err(CliError::EmptyUpdate);
    }

    let model = InputModel {
        project_id_set: values.iter().any(|(k, _)| k == ConfigKey::ProjectId.name()),
        values,
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn apply(config: &mut Config, model: &InputModel) {
    for (name, value) in &model.values {
        if let Some(key) = ConfigKey::from_name(name) {
            config.set(key, Some(value.clone()));
        }
    }
    if model.project_id_set {
        config.project_name = None;
    }
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "config_set", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches)?;

    if model.values.iter().any(|(k, _)| k == ConfigKey::SessionTimeLimit.name()) {
        p.warn("Authenticate again to apply changes to session time limit");
    }

    let mut config = Config::load_from(&params.config_path)?;
    apply(&mut config, &model);
    config
        .save_to(&params.config_path)
        .map_err(CliError::from)
        .context("write config to file")?;
    p.debug(
        Level::Debug,
        &format!("wrote configuration to {}", params.config_path.display()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};

    #[test]
    fn session_time_limit_bounds() {
        assert_eq!(parse_session_time_limit("1h").unwrap(), "1h");
        assert_eq!(parse_session_time_limit("5h30m40s").unwrap(), "5h30m40s");
        assert_eq!(parse_session_time_limit("1d").unwrap(), "24h");
        assert!(parse_session_time_limit("25h").is_err());
        assert!(parse_session_time_limit("0s").is_err());
        assert!(parse_session_time_limit("").is_err());
        assert!(parse_session_time_limit("2 hours").is_err());
    }

    #[test]
    fn huge_session_time_limit_is_too_large() {
        let err = parse_session_time_limit("99999999999999999h99999999999999999m").unwrap_err();
        assert_eq!(err, "value can't be larger than 24h");
        let err = parse_session_time_limit("1m18446744073709551615s").unwrap_err();
        assert_eq!(err, "value can't be larger than 24h");
    }

    #[test]
    fn only_command_line_values_are_stored() {
        let p = printer();
        let m = leaf_matches(&[
            "config",
            "set",
            "--project-id",
            PROJECT_ID,
            "--postgresflex-custom-endpoint",
            "https://pg.example.com",
        ])
        .unwrap();
        let model = parse_input(&p, &m).unwrap();
        assert!(model.project_id_set);

        let mut config = Config {
            project_name: Some("cached".into()),
            ..Config::default()
        };
        apply(&mut config, &model);
        assert_eq!(config.project_id.as_deref(), Some(PROJECT_ID));
        assert_eq!(
            config.postgres_flex_custom_endpoint.as_deref(),
            Some("https://pg.example.com")
        );
        assert_eq!(config.project_name, None);
        assert_eq!(config.region, None);
    }

    #[test]
    fn nothing_to_set_is_an_empty_update() {
        let m = leaf_matches(&["config", "set"]).unwrap();
        assert!(matches!(parse_input(&printer(), &m), Err(CliError::EmptyUpdate)));
    }

    #[test]
    fn bad_values_are_rejected() {
        let m = leaf_matches(&["config", "set", "--session-time-limit", "48h"]).unwrap();
        let err = parse_input(&printer(), &m).unwrap_err();
        assert_eq!(err.to_string(), "invalid --session-time-limit: value can't be larger than 24h");

        assert!(leaf_matches(&["config", "set", "--logme-custom-endpoint", "not a url"]).is_err());
    }
}
