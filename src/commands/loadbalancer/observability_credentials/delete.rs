use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::print::{Level, Printer};
use crate::services::loadbalancer::utils::get_credentials_display_name;
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const CREDENTIALS_REF_ARG: &str = "CREDENTIALS_REF";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    credentials_ref: String,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("delete")
        .about("Deletes observability credentials for Load Balancer")
        .long_about("Deletes observability credentials for Load Balancer.");
    let cmd = with_examples(
        cmd,
        &[Example::new(
            "Delete observability credentials with reference \"credentials-xxx\" for Load Balancer",
            "$ stackit load-balancer observability-credentials delete credentials-xxx",
        )],
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
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "load_balancer_credentials_delete", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.load_balancer(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let label = project_label(params, &model.globals).await;
    let display_name =
        match get_credentials_display_name(api.as_ref(), project_id, region, &model.credentials_ref)
            .await
        {
            Ok(name) => name,
            Err(e) => {
                p.debug(Level::Error, &format!("get observability credentials display name: {}", e));
                model.credentials_ref.clone()
            }
        };

    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to delete observability credentials {:?} on project {:?}? (This cannot be undone)",
            display_name, label
        ),
    )?;

    api.delete_credentials(project_id, region, &model.credentials_ref)
        .await
        .context("delete Load Balancer observability credentials")?;

    p.info(&format!(
        "Deleted observability credentials {:?} on project {:?}",
        display_name, label
    ));
    Ok(())
}
