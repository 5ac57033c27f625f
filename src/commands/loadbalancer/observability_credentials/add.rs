use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::flags;
use crate::output::format::ptr_string;
use crate::output::output_result;
use crate::print::Printer;
use crate::services::loadbalancer::model::CreateCredentialsPayload;
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use super::PASSWORD_ENV;
use tracing::instrument;

const DISPLAY_NAME_FLAG: &str = "display-name";
const USERNAME_FLAG: &str = "username";
const PASSWORD_FLAG: &str = "password";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    display_name: Option<String>,
    username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<String>,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("add")
        .about("Adds observability credentials to Load Balancer")
        .long_about(format!(
            "Adds existing observability credentials (username and password) to Load Balancer. \
             The credentials can be for Observability or another monitoring tool.\n\
             The password is read from the terminal unless given with --{} or the {} environment variable.",
            PASSWORD_FLAG, PASSWORD_ENV
        ))
        .arg(flags::string(DISPLAY_NAME_FLAG, "Credentials name"))
        .arg(flags::string(USERNAME_FLAG, "Username"))
        .arg(flags::read_from_file(
            PASSWORD_FLAG,
            "Password. Can be a string or a file path, if prefixed with \"@\" (example: @./password.txt)",
        ));
    let cmd = flags::mark_flags_required(cmd, &[DISPLAY_NAME_FLAG, USERNAME_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Add observability credentials to a load balancer with username \"xxx\" and display name \"yyy\", providing the path to a file with the password as flag",
                "$ stackit load-balancer observability-credentials add --username xxx --password @./password.txt --display-name yyy",
            ),
            Example::new(
                "Add observability credentials to a load balancer with username \"xxx\" and display name \"yyy\", reading the password from the terminal",
                "$ stackit load-balancer observability-credentials add --username xxx --display-name yyy",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;
    let model = InputModel {
        globals,
        display_name: flags::flag_to_string_pointer(p, matches, DISPLAY_NAME_FLAG),
        username: flags::flag_to_string_pointer(p, matches, USERNAME_FLAG),
        password: flags::flag_to_string_pointer(p, matches, PASSWORD_FLAG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "load_balancer_credentials_add", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.load_balancer(params)?;

    let label = project_label(params, &model.globals).await;

    let password = match &model.password {
        Some(password) => password.clone(),
        None => p.prompt_for_password("Enter user password: ", PASSWORD_ENV)?,
    };

    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to add observability credentials for Load Balancer on project {:?}?",
            label
        ),
    )?;

    let payload = CreateCredentialsPayload {
        display_name: model.display_name.clone(),
        username: model.username.clone(),
        password: Some(password),
    };
    let resp = api
        .add_credentials(&model.globals.project_id, &model.globals.region, &payload)
        .await
        .context("add Load Balancer observability credentials")?;

    output_result(p, model.globals.output_format, &resp, || {
        let reference = resp
            .credential
            .as_ref()
            .and_then(|c| c.credentials_ref.as_deref());
        p.outputln(&format!(
            "Added Load Balancer observability credentials on project {:?}. Credentials reference: {:?}",
            label,
            ptr_string(reference)
        ));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};
    use std::io::Write;

    fn base() -> Vec<&'static str> {
        vec![
            "load-balancer",
            "observability-credentials",
            "add",
            "--project-id",
            PROJECT_ID,
            "--display-name",
            "creds",
            "--username",
            "user",
        ]
    }

    #[test]
    fn password_is_optional() {
        let m = leaf_matches(&base()).unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        assert_eq!(model.username.as_deref(), Some("user"));
        assert_eq!(model.password, None);
    }

    #[test]
    fn password_can_come_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "s3cret").unwrap();
        let arg = format!("@{}", file.path().display());

        let mut args: Vec<&str> = base();
        args.push("--password");
        args.push(&arg);
        let m = leaf_matches(&args).unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        assert_eq!(model.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn password_never_reaches_debug_output() {
        let mut args = base();
        args.extend(["--password", "hunter2"]);
        let m = leaf_matches(&args).unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn display_name_and_username_are_required() {
        assert!(leaf_matches(&[
            "load-balancer",
            "observability-credentials",
            "add",
            "--username",
            "user",
        ])
        .is_err());
    }
}
