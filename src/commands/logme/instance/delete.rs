use super::INSTANCE_ID_ARG;
use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::operation::wait_unless_async;
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::logme::instance_label;
use crate::config::Config;
use crate::flags::parse_uuid;
use crate::print::Printer;
use crate::services::logme::wait::delete_instance_wait_handler;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_id: String,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("delete")
        .about("Deletes a LogMe instance")
        .long_about("Deletes a LogMe instance.");
    let cmd = with_examples(
        cmd,
        &[Example::new(
            "Delete a LogMe instance with ID \"xxx\"",
            "$ stackit logme instance delete xxx",
        )],
    );
    CommandNode::leaf(ArgSpec::single(INSTANCE_ID_ARG, parse_uuid).apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;
    let model = InputModel {
        globals,
        instance_id: single_value(matches, INSTANCE_ID_ARG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "logme_instance_delete", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.logme(params)?;
    let project_id = &model.globals.project_id;

    let label = instance_label(params, api.as_ref(), &model.globals, &model.instance_id).await;
    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to delete instance {:?}? (This cannot be undone)",
            label
        ),
    )?;

    api.delete_instance(project_id, &model.instance_id)
        .await
        .context("delete LogMe instance")?;

    wait_unless_async(
        p,
        model.globals.async_mode,
        &params.cancel,
        "Deleting instance",
        || delete_instance_wait_handler(api.clone(), project_id, &model.instance_id),
        "wait for LogMe instance deletion",
    )
    .await?;

    if model.globals.async_mode {
        p.info(&format!("Triggered deletion of instance {:?}", label));
    } else {
        p.info(&format!("Deleted instance {:?}", label));
    }
    Ok(())
}
