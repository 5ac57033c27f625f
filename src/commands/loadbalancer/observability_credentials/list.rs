use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::{limit_flag, parse_limit};
use crate::config::Config;
use crate::flags;
use crate::output::format::ptr_string;
use crate::output::{output_result, OutputFormat, Table};
use crate::print::Printer;
use crate::services::loadbalancer::model::Credentials;
use crate::services::loadbalancer::utils::{filter_credentials, CredentialsFilter};
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const USED_FLAG: &str = "used";
const UNUSED_FLAG: &str = "unused";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    limit: Option<i64>,
    used: bool,
    unused: bool,
}

impl InputModel {
    fn filter(&self) -> CredentialsFilter {
        CredentialsFilter::from_flags(self.used, self.unused)
    }
}

pub fn command() -> CommandNode {
    let cmd = Command::new("list")
        .about("Lists observability credentials for Load Balancer")
        .long_about("Lists observability credentials for Load Balancer.")
        .arg(limit_flag())
        .arg(flags::bool(
            USED_FLAG,
            "List only credentials being used by a Load Balancer",
        ))
        .arg(flags::bool(
            UNUSED_FLAG,
            "List only credentials not being used by a Load Balancer",
        ));
    let cmd = flags::mark_flags_mutually_exclusive(cmd, &[USED_FLAG, UNUSED_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "List all Load Balancer observability credentials",
                "$ stackit load-balancer observability-credentials list",
            ),
            Example::new(
                "List all observability credentials being used by Load Balancer",
                "$ stackit load-balancer observability-credentials list --used",
            ),
            Example::new(
                "List up to 10 Load Balancer observability credentials in JSON format",
                "$ stackit load-balancer observability-credentials list --limit 10 --output-format json",
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
        used: flags::flag_to_bool_value(p, matches, USED_FLAG),
        unused: flags::flag_to_bool_value(p, matches, UNUSED_FLAG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "load_balancer_credentials_list", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.load_balancer(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let credentials = api
        .list_credentials(project_id, region)
        .await
        .context("list Load Balancer observability credentials")?;

    let load_balancers = match model.filter() {
        CredentialsFilter::All => Vec::new(),
        _ => api
            .list_load_balancers(project_id, region)
            .await
            .context("list load balancers")?,
    };
    let mut credentials = filter_credentials(credentials, &load_balancers, model.filter());

    if credentials.is_empty() && !model.globals.output_format.is_machine_readable() {
        let label = project_label(params, &model.globals).await;
        p.info(&format!(
            "No {}observability credentials found for Load Balancer on project {:?}",
            model.filter().label(),
            label
        ));
        return Ok(());
    }

    if let Some(limit) = model.limit {
        credentials.truncate(limit as usize);
    }

    output(p, model.globals.output_format, &credentials)
}

fn output(p: &Printer, format: OutputFormat, credentials: &[Credentials]) -> Result<(), CliError> {
    output_result(p, format, credentials, || {
        let mut table = Table::new();
        table.set_header(["REFERENCE", "DISPLAY NAME", "USERNAME"]);
        for c in credentials {
            table.add_row([
                ptr_string(c.credentials_ref.as_deref()),
                ptr_string(c.display_name.as_deref()),
                ptr_string(c.username.as_deref()),
            ]);
        }
        table.display(p, format);
        Ok(())
    })
}
