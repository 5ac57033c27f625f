use crate::cli::args::ArgSpec;
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::operation::wait_unless_async;
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::config::Config;
use crate::flags;
use crate::output::output_result;
use crate::print::Printer;
use crate::services::logme::model::{CreateInstancePayload, InstanceParameters};
use crate::services::logme::utils::{load_plan_id, validate_plan_id};
use crate::services::logme::wait::create_instance_wait_handler;
use crate::services::logme::SERVICE_NAME;
use crate::services::projectname::project_label;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const INSTANCE_NAME_FLAG: &str = "name";
const ENABLE_MONITORING_FLAG: &str = "enable-monitoring";
const GRAPHITE_FLAG: &str = "graphite";
const METRICS_FREQUENCY_FLAG: &str = "metrics-frequency";
const METRICS_PREFIX_FLAG: &str = "metrics-prefix";
const MONITORING_INSTANCE_ID_FLAG: &str = "monitoring-instance-id";
const ACL_FLAG: &str = "acl";
const SYSLOG_FLAG: &str = "syslog";
const PLAN_ID_FLAG: &str = "plan-id";
const PLAN_NAME_FLAG: &str = "plan-name";
const VERSION_FLAG: &str = "version";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_name: Option<String>,
    enable_monitoring: Option<bool>,
    graphite: Option<String>,
    metrics_frequency: Option<i64>,
    metrics_prefix: Option<String>,
    monitoring_instance_id: Option<String>,
    acl: Option<Vec<String>>,
    syslog: Option<Vec<String>>,
    plan_id: Option<String>,
    plan_name: String,
    version: String,
}

impl InputModel {
    fn parameters(&self) -> InstanceParameters {
        InstanceParameters {
            enable_monitoring: self.enable_monitoring,
            graphite: self.graphite.clone(),
            metrics_frequency: self.metrics_frequency,
            metrics_prefix: self.metrics_prefix.clone(),
            monitoring_instance_id: self.monitoring_instance_id.clone(),
            plugins: None,
            sgw_acl: self.acl.as_ref().map(|acl| acl.join(",")),
            syslog: self.syslog.clone(),
        }
    }
}

pub fn command() -> CommandNode {
    let cmd = Command::new("create")
        .about("Creates a LogMe instance")
        .long_about("Creates a LogMe instance.")
        .arg(flags::string(INSTANCE_NAME_FLAG, "Instance name").short('n'))
        .arg(flags::bool(ENABLE_MONITORING_FLAG, "Enable monitoring"))
        .arg(flags::string(GRAPHITE_FLAG, "Graphite host"))
        .arg(flags::int64(METRICS_FREQUENCY_FLAG, "Metrics frequency"))
        .arg(flags::string(METRICS_PREFIX_FLAG, "Metrics prefix"))
        .arg(flags::uuid(MONITORING_INSTANCE_ID_FLAG, "Monitoring instance ID"))
        .arg(flags::cidr_slice(ACL_FLAG, "List of IP networks in CIDR notation"))
        .arg(flags::string_slice(SYSLOG_FLAG, "Syslog"))
        .arg(flags::uuid(PLAN_ID_FLAG, "Plan ID"))
        .arg(flags::string(PLAN_NAME_FLAG, "Plan name"))
        .arg(flags::string(VERSION_FLAG, "Instance LogMe version"));
    let cmd = flags::mark_flags_required(cmd, &[INSTANCE_NAME_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Create a LogMe instance with name \"my-instance\" and specify plan by name and version",
                "$ stackit logme instance create --name my-instance --plan-name stackit-logme2-1.2.50-replica --version 2",
            ),
            Example::new(
                "Create a LogMe instance with name \"my-instance\" and specify plan by ID",
                "$ stackit logme instance create --name my-instance --plan-id xxx",
            ),
            Example::new(
                "Create a LogMe instance with name \"my-instance\" and specify IP range which is allowed to access it",
                "$ stackit logme instance create --name my-instance --plan-id xxx --acl 1.2.3.0/24",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;

    let plan_id = flags::flag_to_string_pointer(p, matches, PLAN_ID_FLAG);
    let plan_name = flags::flag_to_string_value(p, matches, PLAN_NAME_FLAG);
    let version = flags::flag_to_string_value(p, matches, VERSION_FLAG);

    let by_name = !plan_name.is_empty() || !version.is_empty();
    let complete_name = !plan_name.is_empty() && !version.is_empty();
    if (plan_id.is_none() && !complete_name) || (plan_id.is_some() && by_name) {
        return Err(CliError::DsaInputPlan {
            service: SERVICE_NAME.to_string(),
        });
    }

    let model = InputModel {
        globals,
        instance_name: flags::flag_to_string_pointer(p, matches, INSTANCE_NAME_FLAG),
        enable_monitoring: flags::flag_to_bool_pointer(p, matches, ENABLE_MONITORING_FLAG),
        graphite: flags::flag_to_string_pointer(p, matches, GRAPHITE_FLAG),
        metrics_frequency: flags::flag_to_int64_pointer(p, matches, METRICS_FREQUENCY_FLAG),
        metrics_prefix: flags::flag_to_string_pointer(p, matches, METRICS_PREFIX_FLAG),
        monitoring_instance_id: flags::flag_to_string_pointer(p, matches, MONITORING_INSTANCE_ID_FLAG),
        acl: flags::flag_to_string_slice_pointer(p, matches, ACL_FLAG),
        syslog: flags::flag_to_string_slice_pointer(p, matches, SYSLOG_FLAG),
        plan_id,
        plan_name,
        version,
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "logme_instance_create", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.logme(params)?;
    let project_id = &model.globals.project_id;

    let label = project_label(params, &model.globals).await;
    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to create a LogMe instance for project {:?}?",
            label
        ),
    )?;

    let offerings = api
        .list_offerings(project_id)
        .await
        .context("get LogMe offerings")?;
    let plan_id = match &model.plan_id {
        Some(id) => {
            validate_plan_id(id, &offerings)?;
            id.clone()
        }
        None => load_plan_id(&model.plan_name, &model.version, &offerings)?,
    };

    let payload = CreateInstancePayload {
        instance_name: model.instance_name.clone(),
        parameters: Some(model.parameters()),
        plan_id: Some(plan_id),
    };
    let resp = api
        .create_instance(project_id, &payload)
        .await
        .context("create LogMe instance")?;
    let instance_id = resp
        .instance_id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("create LogMe instance: response has no instance ID"))?;

    wait_unless_async(
        p,
        model.globals.async_mode,
        &params.cancel,
        "Creating instance",
        || create_instance_wait_handler(api.clone(), project_id, &instance_id),
        "wait for LogMe instance creation",
    )
    .await?;

    output_result(p, model.globals.output_format, &resp, || {
        let state = if model.globals.async_mode {
            "Triggered creation of"
        } else {
            "Created"
        };
        p.outputln(&format!(
            "{} instance for project {:?}. Instance ID: {}",
            state, label, instance_id
        ));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, PROJECT_ID};

    const PLAN_ID: &str = "0f3c1a5e-8c4b-4a8e-b7a1-2d5b6c7d8e9f";

    fn parse(extra: &[&str]) -> Result<InputModel, CliError> {
        let mut args = vec![
            "logme",
            "instance",
            "create",
            "--project-id",
            PROJECT_ID,
            "--name",
            "example-name",
        ];
        args.extend_from_slice(extra);
        let m = leaf_matches(&args).expect("valid arguments");
        parse_input(&printer(), &m, &Config::default())
    }

    #[test]
    fn plan_by_id_or_by_name_and_version() {
        assert!(parse(&["--plan-id", PLAN_ID]).is_ok());
        assert!(parse(&["--plan-name", "stackit-logme2-1.2.50-replica", "--version", "2"]).is_ok());
    }

    #[test]
    fn rejects_incomplete_or_mixed_plans() {
        for bad in [
            &[][..],
            &["--plan-name", "p"][..],
            &["--version", "2"][..],
            &["--plan-id", PLAN_ID, "--version", "2"][..],
        ] {
            assert!(
                matches!(parse(bad), Err(CliError::DsaInputPlan { .. })),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn acl_is_joined_into_parameters() {
        let model = parse(&[
            "--plan-id",
            PLAN_ID,
            "--acl",
            "1.2.3.0/24,10.0.0.0/8",
            "--syslog",
            "example-syslog",
            "--enable-monitoring",
        ])
        .unwrap();
        let params = model.parameters();
        assert_eq!(params.sgw_acl.as_deref(), Some("1.2.3.0/24,10.0.0.0/8"));
        assert_eq!(params.syslog, Some(vec!["example-syslog".to_string()]));
        assert_eq!(params.enable_monitoring, Some(true));
        assert_eq!(params.graphite, None);
    }
}
