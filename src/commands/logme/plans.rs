use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::{limit_flag, parse_limit};
use crate::config::Config;
use crate::output::format::ptr_string;
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::logme::model::Offering;
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    limit: Option<i64>,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("plans")
        .about("Lists all LogMe service plans")
        .long_about("Lists all LogMe service plans.")
        .arg(limit_flag());
    let cmd = with_examples(
        cmd,
        &[
            Example::new("List all LogMe service plans", "$ stackit logme plans"),
            Example::new(
                "List all LogMe service plans in JSON format",
                "$ stackit logme plans --output-format json",
            ),
            Example::new(
                "List up to 10 LogMe service plans",
                "$ stackit logme plans --limit 10",
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
        limit: parse_limit(p, matches)?,
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "logme_plans", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.logme(params)?;

    let mut offerings = api
        .list_offerings(&model.globals.project_id)
        .await
        .context("get LogMe service plans")?;

    if offerings.is_empty() && !model.globals.output_format.is_machine_readable() {
        let label = project_label(params, &model.globals).await;
        p.info(&format!("No plans found for project {:?}", label));
        return Ok(());
    }

    if let Some(limit) = model.limit {
        offerings.truncate(limit as usize);
    }

    output(p, model.globals.output_format, &offerings)
}

/// One row per plan; offering name and version are printed once per offering.
fn plans_table(offerings: &[Offering]) -> Table {
    let mut table = Table::new();
    table.set_header(["OFFERING NAME", "VERSION", "ID", "NAME", "DESCRIPTION"]);
    for (i, offering) in offerings.iter().enumerate() {
        if i > 0 {
            table.add_separator();
        }
        for plan in offering.plans.iter().flatten() {
            table.add_row([
                ptr_string(offering.name.as_deref()),
                ptr_string(offering.version.as_deref()),
                ptr_string(plan.id.as_deref()),
                ptr_string(plan.name.as_deref()),
                ptr_string(plan.description.as_deref()),
            ]);
        }
    }
    table.enable_auto_merge_on_columns(&[0, 1]);
    table
}

fn output(p: &Printer, format: OutputFormat, offerings: &[Offering]) -> Result<(), CliError> {
    output_result(p, format, offerings, || {
        plans_table(offerings).display(p, format);
        Ok(())
    })
}
