use crate::cli::args::ArgSpec;
use crate::cli::error::CliError;
use crate::cli::globalflags;
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use clap::{ArgMatches, Command};
use futures::FutureExt;

pub fn command() -> CommandNode {
    let cmd = Command::new("list")
        .about("Lists the current CLI configuration values")
        .long_about(
            "Lists the current CLI configuration values, as stored in the config file.\n\
             Values set through STACKIT_ environment variables are not shown.",
        );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn config_table(config: &Config) -> Table {
    let mut table = Table::new();
    table.set_header(["NAME", "VALUE"]);
    for (key, value) in config.entries() {
        table.add_row([key.name(), value.as_str()]);
    }
    table
}

fn output(p: &Printer, format: OutputFormat, config: &Config) -> Result<(), CliError> {
    output_result(p, format, config, || {
        let table = config_table(config);
        if table.is_empty() {
            p.info("No configuration options set");
        } else {
            table.display(p, format);
        }
        Ok(())
    })
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let globals = globalflags::parse(p, matches, &params.config);
    let config = Config::load_from(&params.config_path)?;
    output(p, globals.output_format, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;

    #[test]
    fn lists_set_values_in_key_order() {
        let config = Config {
            region: Some("eu02".into()),
            project_id: Some("abc".into()),
            ..Config::default()
        };
        let rendered = config_table(&config).render();
        let project = rendered.find("project-id").unwrap();
        let region = rendered.find("region").unwrap();
        assert!(project < region);
        assert!(rendered.contains("eu02"));
    }

    #[test]
    fn empty_config() {
        let (p, out, err) = buffered_printer("");
        output(&p, OutputFormat::Default, &Config::default()).unwrap();
        assert_eq!(out.contents(), "");
        assert_eq!(err.contents(), "No configuration options set\n");

        let (p, out, _) = buffered_printer("");
        output(&p, OutputFormat::Json, &Config::default()).unwrap();
        assert_eq!(out.contents(), "{}\n");
    }
}
