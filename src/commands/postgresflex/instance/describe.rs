use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::postgresflex::INSTANCE_ID_ARG;
use crate::config::Config;
use crate::flags::parse_uuid;
use crate::output::format::{join_option, ptr_string};
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::postgresflex::model::Instance;
use crate::services::postgresflex::utils::get_instance_type;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_id: String,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("describe")
        .about("Shows details of a PostgreSQL Flex instance")
        .long_about("Shows details of a PostgreSQL Flex instance.");
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Get details of a PostgreSQL Flex instance with ID \"xxx\"",
                "$ stackit postgresflex instance describe xxx",
            ),
            Example::new(
                "Get details of a PostgreSQL Flex instance with ID \"xxx\" in JSON format",
                "$ stackit postgresflex instance describe xxx --output-format json",
            ),
        ],
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

async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;

    let instance = api
        .get_instance(&model.globals.project_id, &model.globals.region, &model.instance_id)
        .await
        .context("read PostgreSQL Flex instance")?;

    output(p, model.globals.output_format, &instance)
}

fn instance_type(instance: &Instance) -> String {
    instance
        .replicas
        .and_then(|r| get_instance_type(r).ok())
        .map(str::to_string)
        .or_else(|| {
            instance
                .options
                .as_ref()
                .and_then(|o| o.get("type").cloned())
        })
        .unwrap_or_default()
}

fn instance_table(instance: &Instance) -> Table {
    let flavor = instance.flavor.clone().unwrap_or_default();
    let acl = instance.acl.as_ref().and_then(|a| a.items.as_deref());
    let rows = [
        ("ID", ptr_string(instance.id.as_deref())),
        ("NAME", ptr_string(instance.name.as_deref())),
        ("STATUS", ptr_string(instance.status.as_deref())),
        (
            "STORAGE SIZE (GB)",
            ptr_string(instance.storage.as_ref().and_then(|s| s.size)),
        ),
        ("VERSION", ptr_string(instance.version.as_deref())),
        ("ACL", join_option(acl, ",")),
        ("FLAVOR DESCRIPTION", ptr_string(flavor.description.as_deref())),
        ("CPU", ptr_string(flavor.cpu)),
        ("RAM (GB)", ptr_string(flavor.memory)),
        ("TYPE", instance_type(instance)),
        ("REPLICAS", ptr_string(instance.replicas)),
        ("BACKUP SCHEDULE", ptr_string(instance.backup_schedule.as_deref())),
    ];

    let mut table = Table::new();
    for (i, (key, value)) in rows.iter().enumerate() {
        if i > 0 {
            table.add_separator();
        }
        table.add_row([*key, value.as_str()]);
    }
    table
}

fn output(p: &Printer, format: OutputFormat, instance: &Instance) -> Result<(), CliError> {
    output_result(p, format, instance, || {
        instance_table(instance).display(p, format);
        Ok(())
    })
}
