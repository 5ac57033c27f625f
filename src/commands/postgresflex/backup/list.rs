use super::{backup_expiration, INSTANCE_ID_FLAG};
use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::postgresflex::instance_label;
use crate::commands::{limit_flag, parse_limit};
use crate::config::Config;
use crate::flags;
use crate::output::format::{byte_size_default, ptr_string};
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::postgresflex::model::Backup;
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
    limit: Option<i64>,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("list")
        .about("Lists all backups which are available for a PostgreSQL Flex instance")
        .long_about("Lists all backups which are available for a PostgreSQL Flex instance.")
        .arg(flags::uuid(INSTANCE_ID_FLAG, "Instance ID"))
        .arg(limit_flag());
    let cmd = flags::mark_flags_required(cmd, &[INSTANCE_ID_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "List all backups of instance with ID \"xxx\"",
                "$ stackit postgresflex backup list --instance-id xxx",
            ),
            Example::new(
                "List all backups of instance with ID \"xxx\" in JSON format",
                "$ stackit postgresflex backup list --instance-id xxx --output-format json",
            ),
            Example::new(
                "List up to 10 backups of instance with ID \"xxx\"",
                "$ stackit postgresflex backup list --instance-id xxx --limit 10",
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
        instance_id: flags::flag_to_string_value(p, matches, INSTANCE_ID_FLAG),
        limit: parse_limit(p, matches)?,
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "postgresflex_backup_list", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;

    let mut backups = api
        .list_backups(&model.globals.project_id, &model.globals.region, &model.instance_id)
        .await
        .context("get backups for PostgreSQL Flex instance")?;

    if backups.is_empty() && !model.globals.output_format.is_machine_readable() {
        let label = instance_label(params, api.as_ref(), &model.globals, &model.instance_id).await;
        p.info(&format!("No backups found for instance {:?}", label));
        return Ok(());
    }

    if let Some(limit) = model.limit {
        backups.truncate(limit as usize);
    }

    output(p, model.globals.output_format, &backups)
}

fn backups_table(backups: &[Backup]) -> Result<Table, CliError> {
    let mut table = Table::new();
    table.set_header(["ID", "CREATED AT", "EXPIRES AT", "BACKUP SIZE"]);
    for backup in backups {
        let expires_at = match backup.start_time.as_deref() {
            Some(start) => backup_expiration(start).map_err(|e| {
                anyhow::anyhow!("parse start time {:?} of backup: {}", start, e)
            })?,
            None => String::new(),
        };
        table.add_row([
            ptr_string(backup.id.as_deref()),
            ptr_string(backup.start_time.as_deref()),
            expires_at,
            byte_size_default(backup.size, "n/a"),
        ]);
    }
    Ok(table)
}

fn output(p: &Printer, format: OutputFormat, backups: &[Backup]) -> Result<(), CliError> {
    output_result(p, format, backups, || {
        backups_table(backups)?.display(p, format);
        Ok(())
    })
}
