use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::flags;
use crate::print::{Level, Printer};
use crate::services::loadbalancer::model::{Credentials, UpdateCredentialsPayload};
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use super::PASSWORD_ENV;
use tracing::instrument;

const CREDENTIALS_REF_ARG: &str = "CREDENTIALS_REF";

const DISPLAY_NAME_FLAG: &str = "display-name";
const USERNAME_FLAG: &str = "username";
const PASSWORD_FLAG: &str = "password";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    credentials_ref: String,
    display_name: Option<String>,
    username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<String>,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("update")
        .about("Updates observability credentials for Load Balancer")
        .long_about(
            "Updates existing observability credentials (username and password) for Load Balancer. \
             The credentials can be for Observability or another monitoring tool.",
        )
        .arg(flags::string(DISPLAY_NAME_FLAG, "Credentials name"))
        .arg(flags::string(USERNAME_FLAG, "Username"))
        .arg(flags::read_from_file(
            PASSWORD_FLAG,
            "Password. Can be a string or a file path, if prefixed with \"@\" (example: @./password.txt)",
        ));
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Update the password and username of observability credentials of Load Balancer with credentials reference \"credentials-xxx\". The password is entered using the terminal",
                "$ stackit load-balancer observability-credentials update credentials-xxx --username new-username",
            ),
            Example::new(
                "Update the password of observability credentials of Load Balancer with credentials reference \"credentials-xxx\", by providing the path to a file with the new password as flag",
                "$ stackit load-balancer observability-credentials update credentials-xxx --password @./new-password.txt",
            ),
        ],
    );
    let args = ArgSpec::SingleArg {
        name: CREDENTIALS_REF_ARG,
        validator: None,
    };
    CommandNode::leaf(args.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;
    let model = InputModel {
        globals,
        credentials_ref: single_value(matches, CREDENTIALS_REF_ARG),
        display_name: flags::flag_to_string_pointer(p, matches, DISPLAY_NAME_FLAG),
        username: flags::flag_to_string_pointer(p, matches, USERNAME_FLAG),
        password: flags::flag_to_string_pointer(p, matches, PASSWORD_FLAG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

/// The upstream call replaces the whole record, so unset fields keep their current values.
fn build_payload(model: &InputModel, current: Credentials, password: String) -> UpdateCredentialsPayload {
    UpdateCredentialsPayload {
        display_name: model.display_name.clone().or(current.display_name),
        username: model.username.clone().or(current.username),
        password: Some(password),
    }
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "load_balancer_credentials_update", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.load_balancer(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let label = project_label(params, &model.globals).await;
    let current = api
        .get_credentials(project_id, region, &model.credentials_ref)
        .await
        .context("get Load Balancer observability credentials")?;
    let credentials_label = current.display_name.clone().unwrap_or_else(|| {
        p.debug(Level::Error, "observability credentials have no display name");
        model.credentials_ref.clone()
    });

    let password = match &model.password {
        Some(password) => password.clone(),
        None => p.prompt_for_password("Enter new password: ", PASSWORD_ENV)?,
    };

    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to update observability credentials {:?} for Load Balancer on project {:?}?",
            credentials_label, label
        ),
    )?;

    let payload = build_payload(&model, current, password);
    api.update_credentials(project_id, region, &model.credentials_ref, &payload)
        .await
        .context("update Load Balancer observability credentials")?;

    p.info(&format!(
        "Updated observability credentials {:?} for Load Balancer on project {:?}",
        credentials_label, label
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};

    fn parse(extra: &[&str]) -> InputModel {
        let mut args = vec![
            "load-balancer",
            "observability-credentials",
            "update",
            "credentials-abc",
            "--project-id",
            PROJECT_ID,
        ];
        args.extend_from_slice(extra);
        let m = leaf_matches(&args).expect("valid arguments");
        parse_input(&printer(), &m, &Config::default()).unwrap()
    }

    fn current() -> Credentials {
        Credentials {
            credentials_ref: Some("credentials-abc".into()),
            display_name: Some("observability".into()),
            username: Some("pusher".into()),
        }
    }

    #[test]
    fn unset_fields_keep_current_values() {
        let model = parse(&["--username", "new-user"]);
        assert_eq!(model.display_name, None);
        let payload = build_payload(&model, current(), "pw".into());
        assert_eq!(
            payload,
            UpdateCredentialsPayload {
                display_name: Some("observability".into()),
                username: Some("new-user".into()),
                password: Some("pw".into()),
            }
        );
    }

    #[test]
    fn given_fields_replace_current_values() {
        let model = parse(&["--display-name", "renamed", "--password", "hunter2"]);
        let payload = build_payload(&model, current(), model.password.clone().unwrap());
        assert_eq!(payload.display_name.as_deref(), Some("renamed"));
        assert_eq!(payload.username.as_deref(), Some("pusher"));
        assert_eq!(payload.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn password_never_reaches_debug_output() {
        let model = parse(&["--password", "hunter2"]);
        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("credentials-abc"));
    }
}
