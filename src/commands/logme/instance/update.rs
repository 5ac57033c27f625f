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
use crate::flags::{self, parse_uuid};
use crate::print::Printer;
use crate::services::logme::model::{InstanceParameters, Offering, PartialUpdateInstancePayload};
use crate::services::logme::utils::{load_plan_id, validate_plan_id};
use crate::services::logme::wait::partial_update_instance_wait_handler;
use crate::services::logme::SERVICE_NAME;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const ENABLE_MONITORING_FLAG: &str = "enable-monitoring";
const GRAPHITE_FLAG: &str = "graphite";
const METRICS_FREQUENCY_FLAG: &str = "metrics-frequency";
const METRICS_PREFIX_FLAG: &str = "metrics-prefix";
const MONITORING_INSTANCE_ID_FLAG: &str = "monitoring-instance-id";
const PLUGIN_FLAG: &str = "plugin";
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
    instance_id: String,
    enable_monitoring: Option<bool>,
    graphite: Option<String>,
    metrics_frequency: Option<i64>,
    metrics_prefix: Option<String>,
    monitoring_instance_id: Option<String>,
    plugin: Option<Vec<String>>,
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
            plugins: self.plugin.clone(),
            sgw_acl: self.acl.as_ref().map(|acl| acl.join(",")),
            syslog: self.syslog.clone(),
        }
    }

    /// The plan is optional on update; an empty result keeps the current one.
    fn resolve_plan_id(&self, offerings: &[Offering]) -> Result<Option<String>, CliError> {
        if let Some(id) = &self.plan_id {
            validate_plan_id(id, offerings)?;
            return Ok(Some(id.clone()));
        }
        if self.plan_name.is_empty() {
            return Ok(None);
        }
        load_plan_id(&self.plan_name, &self.version, offerings).map(Some)
    }
}

pub fn command() -> CommandNode {
    let cmd = Command::new("update")
        .about("Updates a LogMe instance")
        .long_about("Updates a LogMe instance.")
        .arg(flags::bool(ENABLE_MONITORING_FLAG, "Enable monitoring"))
        .arg(flags::string(GRAPHITE_FLAG, "Graphite host"))
        .arg(flags::int64(METRICS_FREQUENCY_FLAG, "Metrics frequency"))
        .arg(flags::string(METRICS_PREFIX_FLAG, "Metrics prefix"))
        .arg(flags::uuid(MONITORING_INSTANCE_ID_FLAG, "Monitoring instance ID"))
        .arg(flags::string_slice(PLUGIN_FLAG, "Plugin"))
        .arg(flags::cidr_slice(ACL_FLAG, "List of IP networks in CIDR notation"))
        .arg(flags::string_slice(SYSLOG_FLAG, "Syslog"))
        .arg(flags::uuid(PLAN_ID_FLAG, "Plan ID"))
        .arg(flags::string(PLAN_NAME_FLAG, "Plan name"))
        .arg(flags::string(VERSION_FLAG, "Instance LogMe version"));
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Update the plan of a LogMe instance with ID \"xxx\"",
                "$ stackit logme instance update xxx --plan-id yyy",
            ),
            Example::new(
                "Update the range of IPs allowed to access a LogMe instance with ID \"xxx\"",
                "$ stackit logme instance update xxx --acl 1.2.3.0/24",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::single(INSTANCE_ID_ARG, parse_uuid).apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;

    let plan_id = flags::flag_to_string_pointer(p, matches, PLAN_ID_FLAG);
    let plan_name = flags::flag_to_string_value(p, matches, PLAN_NAME_FLAG);
    let version = flags::flag_to_string_value(p, matches, VERSION_FLAG);

    let by_name = !plan_name.is_empty() || !version.is_empty();
    let partial_name = plan_name.is_empty() != version.is_empty();
    if (plan_id.is_some() && by_name) || partial_name {
        return Err(CliError::DsaInputPlan {
            service: SERVICE_NAME.to_string(),
        });
    }

    let model = InputModel {
        globals,
        instance_id: single_value(matches, INSTANCE_ID_ARG),
        enable_monitoring: flags::flag_to_bool_pointer(p, matches, ENABLE_MONITORING_FLAG),
        graphite: flags::flag_to_string_pointer(p, matches, GRAPHITE_FLAG),
        metrics_frequency: flags::flag_to_int64_pointer(p, matches, METRICS_FREQUENCY_FLAG),
        metrics_prefix: flags::flag_to_string_pointer(p, matches, METRICS_PREFIX_FLAG),
        monitoring_instance_id: flags::flag_to_string_pointer(p, matches, MONITORING_INSTANCE_ID_FLAG),
        plugin: flags::flag_to_string_slice_pointer(p, matches, PLUGIN_FLAG),
        acl: flags::flag_to_string_slice_pointer(p, matches, ACL_FLAG),
        syslog: flags::flag_to_string_slice_pointer(p, matches, SYSLOG_FLAG),
        plan_id,
        plan_name,
        version,
    };

    let parameters = model.parameters();
    if parameters == InstanceParameters::default() && model.plan_id.is_none() && !by_name {
        return Err(CliError::EmptyUpdate);
    }
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "logme_instance_update", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.logme(params)?;
    let project_id = &model.globals.project_id;

    let label = instance_label(params, api.as_ref(), &model.globals, &model.instance_id).await;
    p.confirm(
        model.globals.assume_yes,
        &format!("Are you sure you want to update instance {:?}?", label),
    )?;

    let offerings = api
        .list_offerings(project_id)
        .await
        .context("get LogMe offerings")?;
    let payload = PartialUpdateInstancePayload {
        parameters: Some(model.parameters()),
        plan_id: model.resolve_plan_id(&offerings)?,
    };
    api.partial_update_instance(project_id, &model.instance_id, &payload)
        .await
        .context("update LogMe instance")?;

    wait_unless_async(
        p,
        model.globals.async_mode,
        &params.cancel,
        "Updating instance",
        || partial_update_instance_wait_handler(api.clone(), project_id, &model.instance_id),
        "wait for LogMe instance update",
    )
    .await?;

    if model.globals.async_mode {
        p.info(&format!("Triggered update of instance {:?}", label));
    } else {
        p.info(&format!("Updated instance {:?}", label));
    }
    Ok(())
}
