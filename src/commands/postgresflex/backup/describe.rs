use super::{backup_expiration, INSTANCE_ID_FLAG};
use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::flags;
use crate::output::format::{byte_size_default, ptr_string};
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::postgresflex::model::Backup;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;

const BACKUP_ID_ARG: &str = "BACKUP_ID";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_id: String,
    backup_id: String,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("describe")
        .about("Shows details of a backup for a PostgreSQL Flex instance")
        .long_about("Shows details of a backup for a PostgreSQL Flex instance.")
        .arg(flags::uuid(INSTANCE_ID_FLAG, "Instance ID"));
    let cmd = flags::mark_flags_required(cmd, &[INSTANCE_ID_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Get details of a backup with ID \"xxx\" for a PostgreSQL Flex instance with ID \"yyy\"",
                "$ stackit postgresflex backup describe xxx --instance-id yyy",
            ),
            Example::new(
                "Get details of a backup with ID \"xxx\" for a PostgreSQL Flex instance with ID \"yyy\" in JSON format",
                "$ stackit postgresflex backup describe xxx --instance-id yyy --output-format json",
            ),
        ],
    );
    let args = ArgSpec::SingleArg {
        name: BACKUP_ID_ARG,
        validator: None,
    };
    CommandNode::leaf(args.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;
    let model = InputModel {
        globals,
        instance_id: flags::flag_to_string_value(p, matches, INSTANCE_ID_FLAG),
        backup_id: single_value(matches, BACKUP_ID_ARG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;

    let backup = api
        .get_backup(
            &model.globals.project_id,
            &model.globals.region,
            &model.instance_id,
            &model.backup_id,
        )
        .await
        .context("describe backup for PostgreSQL Flex instance")?;

    output(p, model.globals.output_format, &backup)
}

fn backup_table(backup: &Backup) -> Result<Table, CliError> {
    let expires_at = match backup.start_time.as_deref() {
        Some(start) => backup_expiration(start)
            .map_err(|e| anyhow::anyhow!("parse start time {:?} of backup: {}", start, e))?,
        None => String::new(),
    };
    let rows = [
        ("ID", ptr_string(backup.id.as_deref())),
        ("NAME", ptr_string(backup.name.as_deref())),
        ("CREATED AT", ptr_string(backup.start_time.as_deref())),
        ("EXPIRES AT", expires_at),
        ("BACKUP SIZE", byte_size_default(backup.size, "n/a")),
    ];

    let mut table = Table::new();
    for (i, (key, value)) in rows.iter().enumerate() {
        if i > 0 {
            table.add_separator();
        }
        table.add_row([*key, value.as_str()]);
    }
    Ok(table)
}

fn output(p: &Printer, format: OutputFormat, backup: &Backup) -> Result<(), CliError> {
    output_result(p, format, backup, || {
        backup_table(backup)?.display(p, format);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, INSTANCE_ID, PROJECT_ID};
    use crate::print::buffered_printer;

    #[test]
    fn parses_backup_and_instance() {
        let m = leaf_matches(&[
            "postgresflex",
            "backup",
            "describe",
            "backup-1",
            "--instance-id",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
        ])
        .unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        assert_eq!(model.backup_id, "backup-1");
        assert_eq!(model.instance_id, INSTANCE_ID);
    }

    #[test]
    fn json_output_is_the_backup() {
        let (p, out, _) = buffered_printer("");
        let backup = Backup {
            id: Some("backup-1".into()),
            size: Some(10),
            ..Default::default()
        };
        output(&p, OutputFormat::Json, &backup).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
        assert_eq!(value["id"], "backup-1");
        assert_eq!(value["size"], 10);
    }
}
