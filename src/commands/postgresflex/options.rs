use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::flags;
use crate::output::format::ptr_string;
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::postgresflex::model::{Flavor, ListStoragesResponse};
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;

const FLAVORS_FLAG: &str = "flavors";
const VERSIONS_FLAG: &str = "versions";
const STORAGES_FLAG: &str = "storages";
const FLAVOR_ID_FLAG: &str = "flavor-id";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    flavors: bool,
    versions: bool,
    storages: bool,
    flavor_id: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlavorStorages {
    flavor_id: String,
    storages: ListStoragesResponse,
}

/// Everything that was asked for; categories not requested are left out.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    flavors: Option<Vec<Flavor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    versions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flavor_storages: Option<FlavorStorages>,
}

pub fn command() -> CommandNode {
    let cmd = Command::new("options")
        .about("Lists PostgreSQL Flex options")
        .long_about(
            "Lists PostgreSQL Flex options (flavors, versions and storages for a given flavor).\n\
             Pass one or more flags to filter what categories are shown.",
        )
        .arg(flags::bool(FLAVORS_FLAG, "Lists supported flavors"))
        .arg(flags::bool(VERSIONS_FLAG, "Lists supported versions"))
        .arg(flags::bool(
            STORAGES_FLAG,
            "Lists supported storages for a given flavor",
        ))
        .arg(flags::string(
            FLAVOR_ID_FLAG,
            "The flavor ID to show storages for. Only relevant when \"--storages\" is passed",
        ));
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "List PostgreSQL Flex flavors options",
                "$ stackit postgresflex options --flavors",
            ),
            Example::new(
                "List PostgreSQL Flex available versions",
                "$ stackit postgresflex options --versions",
            ),
            Example::new(
                "List PostgreSQL Flex storage options for a given flavor. The flavor ID can be retrieved by running \"$ stackit postgresflex options --flavors\"",
                "$ stackit postgresflex options --storages --flavor-id <FLAVOR_ID>",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;

    let flavors = flags::flag_to_bool_value(p, matches, FLAVORS_FLAG);
    let versions = flags::flag_to_bool_value(p, matches, VERSIONS_FLAG);
    let storages = flags::flag_to_bool_value(p, matches, STORAGES_FLAG);
    let flavor_id = flags::flag_to_string_pointer(p, matches, FLAVOR_ID_FLAG);

    if !flavors && !versions && !storages {
        return Err(CliError::flag(
            "flavors",
            "please specify at least one category for which to list the available options (--flavors, --versions or --storages)",
        ));
    }
    if storages && flavor_id.is_none() {
        return Err(CliError::flag(
            FLAVOR_ID_FLAG,
            "please specify a flavor ID to show storages for by setting the flag \"--flavor-id <FLAVOR_ID>\"",
        ));
    }

    let model = InputModel {
        globals,
        flavors,
        versions,
        storages,
        flavor_id,
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
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let mut options = Options::default();
    if model.flavors {
        let flavors = api
            .list_flavors(project_id, region)
            .await
            .context("get PostgreSQL Flex flavors")?;
        options.flavors = Some(flavors);
    }
    if model.versions {
        let versions = api
            .list_versions(project_id, region)
            .await
            .context("get PostgreSQL Flex versions")?;
        options.versions = Some(versions);
    }
    if let (true, Some(flavor_id)) = (model.storages, &model.flavor_id) {
        let storages = api
            .list_storages(project_id, region, flavor_id)
            .await
            .context("get PostgreSQL Flex storages")?;
        options.flavor_storages = Some(FlavorStorages {
            flavor_id: flavor_id.clone(),
            storages,
        });
    }

    output(p, model.globals.output_format, &options)
}

fn flavors_table(flavors: &[Flavor]) -> Table {
    let mut table = Table::new();
    table.set_title("Flavors");
    table.set_header(["ID", "CPU", "MEMORY", "DESCRIPTION"]);
    for flavor in flavors {
        table.add_row([
            ptr_string(flavor.id.as_deref()),
            ptr_string(flavor.cpu),
            ptr_string(flavor.memory),
            ptr_string(flavor.description.as_deref()),
        ]);
    }
    table
}

fn versions_table(versions: &[String]) -> Table {
    let mut table = Table::new();
    table.set_title("Versions");
    table.set_header(["VERSION"]);
    for version in versions {
        table.add_row([version.as_str()]);
    }
    table
}

fn storages_table(storages: &FlavorStorages) -> Table {
    let range = storages.storages.storage_range.clone().unwrap_or_default();
    let mut table = Table::new();
    table.set_title(format!("Storages for flavor {:?}", storages.flavor_id));
    table.set_header(["MINIMUM", "MAXIMUM", "STORAGE CLASS"]);
    for class in storages.storages.storage_classes.iter().flatten() {
        table.add_row([ptr_string(range.min), ptr_string(range.max), class.clone()]);
    }
    table.enable_auto_merge_on_columns(&[0, 1]);
    table
}

fn render(options: &Options, render_table: impl Fn(Table) -> String) -> String {
    let mut sections = Vec::new();
    if let Some(flavors) = &options.flavors {
        sections.push(render_table(flavors_table(flavors)));
    }
    if let Some(versions) = &options.versions {
        sections.push(render_table(versions_table(versions)));
    }
    if let Some(storages) = &options.flavor_storages {
        sections.push(render_table(storages_table(storages)));
    }
    sections.join("\n\n")
}

fn output(p: &Printer, format: OutputFormat, options: &Options) -> Result<(), CliError> {
    output_result(p, format, options, || {
        p.outputln(&render(options, |t| t.render_for(p, format)));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};
    use crate::print::buffered_printer;
    use crate::services::postgresflex::model::StorageRange;

    fn parse(extra: &[&str]) -> Result<InputModel, CliError> {
        let mut args = vec!["postgresflex", "options", "--project-id", PROJECT_ID];
        args.extend_from_slice(extra);
        let m = leaf_matches(&args).expect("valid arguments");
        parse_input(&printer(), &m, &Config::default())
    }

    #[test]
    fn requires_a_category() {
        assert!(matches!(parse(&[]), Err(CliError::FlagValidation { .. })));
        let model = parse(&["--flavors", "--versions"]).unwrap();
        assert!(model.flavors && model.versions && !model.storages);
    }

    #[test]
    fn storages_need_a_flavor() {
        let err = parse(&["--storages"]).unwrap_err();
        assert!(err.to_string().contains("--flavor-id"));
        assert!(parse(&["--storages", "--flavor-id", "f1"]).is_ok());
    }

    #[test]
    fn json_omits_unrequested_categories() {
        let (p, out, _) = buffered_printer("");
        let options = Options {
            versions: Some(vec!["15".into(), "16".into()]),
            ..Default::default()
        };
        output(&p, OutputFormat::Json, &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
        assert_eq!(value, serde_json::json!({ "versions": ["15", "16"] }));
    }

    #[test]
    fn renders_requested_tables() {
        let options = Options {
            flavors: Some(vec![Flavor {
                id: Some("f1".into()),
                cpu: Some(2),
                memory: Some(4),
                description: Some("small".into()),
            }]),
            flavor_storages: Some(FlavorStorages {
                flavor_id: "f1".into(),
                storages: ListStoragesResponse {
                    storage_classes: Some(vec!["premium-perf2-stackit".into(), "premium-perf6-stackit".into()]),
                    storage_range: Some(StorageRange {
                        min: Some(5),
                        max: Some(100),
                    }),
                },
            }),
            ..Default::default()
        };
        let rendered = render(&options, |t| t.render());
        assert!(rendered.contains("Flavors"));
        assert!(rendered.contains("small"));
        assert!(rendered.contains("premium-perf6-stackit"));
        assert!(!rendered.contains("VERSION"));
    }
}
