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
use crate::sdk::collect_pages;
use crate::services::postgresflex::model::InstanceListItem;
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
    let cmd = Command::new("list")
        .about("Lists all PostgreSQL Flex instances")
        .long_about("Lists all PostgreSQL Flex instances.")
        .arg(limit_flag());
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "List all PostgreSQL Flex instances",
                "$ stackit postgresflex instance list",
            ),
            Example::new(
                "List all PostgreSQL Flex instances in JSON format",
                "$ stackit postgresflex instance list --output-format json",
            ),
            Example::new(
                "List up to 10 PostgreSQL Flex instances",
                "$ stackit postgresflex instance list --limit 10",
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

#[instrument(name = "postgresflex_instance_list", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;

    let (project_id, region) = (&model.globals.project_id, &model.globals.region);
    let api = api.as_ref();
    let instances = collect_pages(model.limit.map(|l| l as usize), |token| {
        api.list_instances(project_id, region, token)
    })
    .await
    .context("get PostgreSQL Flex instances")?;

    if instances.is_empty() && !model.globals.output_format.is_machine_readable() {
        let label = project_label(params, &model.globals).await;
        p.info(&format!("No instances found for project {:?}", label));
        return Ok(());
    }

    output(p, model.globals.output_format, &instances)
}

fn output(p: &Printer, format: OutputFormat, instances: &[InstanceListItem]) -> Result<(), CliError> {
    output_result(p, format, instances, || {
        let mut table = Table::new();
        table.set_header(["ID", "NAME", "STATUS"]);
        for instance in instances {
            table.add_row([
                ptr_string(instance.id.as_deref()),
                ptr_string(instance.name.as_deref()),
                ptr_string(instance.status.as_deref()),
            ]);
        }
        table.display(p, format);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};
    use crate::print::buffered_printer;

    #[test]
    fn parses_limit_and_project() {
        let m = leaf_matches(&[
            "postgresflex",
            "instance",
            "list",
            "--project-id",
            PROJECT_ID,
            "--limit",
            "10",
        ])
        .unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        assert_eq!(model.globals.project_id, PROJECT_ID);
        assert_eq!(model.limit, Some(10));
    }

    #[test]
    fn rejects_non_positive_limit() {
        let m = leaf_matches(&[
            "postgresflex",
            "instance",
            "list",
            "--project-id",
            PROJECT_ID,
            "--limit",
            "0",
        ])
        .unwrap();
        assert!(matches!(
            parse_input(&printer(), &m, &Config::default()),
            Err(CliError::FlagValidation { .. })
        ));
    }

    #[test]
    fn renders_table() {
        let (p, out, _) = buffered_printer("");
        let items = vec![InstanceListItem {
            id: Some("id-1".into()),
            name: Some("db".into()),
            status: Some("Ready".into()),
        }];
        output(&p, OutputFormat::Default, &items).unwrap();
        let text = out.contents();
        assert!(text.contains("STATUS"));
        assert!(text.contains("id-1") && text.contains("Ready"));
    }
}
