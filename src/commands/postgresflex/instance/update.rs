use crate::cli::args::{single_value, ArgSpec};
use crate::cli::error::{CliError, ResultExt};
use crate::cli::examples::{with_examples, Example};
use crate::cli::globalflags::{self, GlobalFlagModel};
use crate::cli::operation::wait_unless_async;
use crate::cli::params::CmdParams;
use crate::cli::tree::{CommandNode, HandlerFuture};
use crate::commands::postgresflex::{instance_label, INSTANCE_ID_ARG};
use crate::config::Config;
use crate::flags::{self, parse_uuid};
use crate::output::output_result;
use crate::print::Printer;
use crate::services::postgresflex::model::{Acl, PartialUpdateInstancePayload, Storage};
use crate::services::postgresflex::utils::{
    available_instance_types, get_instance_replicas, load_flavor_id, validate_flavor_id,
    validate_storage,
};
use crate::services::postgresflex::wait::partial_update_instance_wait_handler;
use crate::services::postgresflex::{PostgresFlexApi, SERVICE_NAME};
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

const NAME_FLAG: &str = "name";
const ACL_FLAG: &str = "acl";
const BACKUP_SCHEDULE_FLAG: &str = "backup-schedule";
const FLAVOR_ID_FLAG: &str = "flavor-id";
const CPU_FLAG: &str = "cpu";
const RAM_FLAG: &str = "ram";
const STORAGE_CLASS_FLAG: &str = "storage-class";
const STORAGE_SIZE_FLAG: &str = "storage-size";
const VERSION_FLAG: &str = "version";
const TYPE_FLAG: &str = "type";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_id: String,
    instance_name: Option<String>,
    acl: Option<Vec<String>>,
    backup_schedule: Option<String>,
    flavor_id: Option<String>,
    cpu: Option<i64>,
    ram: Option<i64>,
    storage_class: Option<String>,
    storage_size: Option<i64>,
    version: Option<String>,
    instance_type: Option<String>,
}

impl InputModel {
    fn changes_flavor(&self) -> bool {
        self.flavor_id.is_some() || self.cpu.is_some() || self.ram.is_some()
    }

    fn changes_storage(&self) -> bool {
        self.storage_class.is_some() || self.storage_size.is_some()
    }

    fn is_empty_update(&self) -> bool {
        self.instance_name.is_none()
            && self.acl.is_none()
            && self.backup_schedule.is_none()
            && !self.changes_flavor()
            && !self.changes_storage()
            && self.version.is_none()
            && self.instance_type.is_none()
    }
}

pub fn command() -> CommandNode {
    let types = available_instance_types();
    let cmd = Command::new("update")
        .about("Updates a PostgreSQL Flex instance")
        .long_about("Updates a PostgreSQL Flex instance.")
        .arg(flags::string(NAME_FLAG, "Instance name").short('n'))
        .arg(flags::cidr_slice(ACL_FLAG, "List of IP networks in CIDR notation"))
        .arg(flags::string(BACKUP_SCHEDULE_FLAG, "Backup schedule"))
        .arg(flags::string(FLAVOR_ID_FLAG, "ID of the flavor"))
        .arg(flags::int64(CPU_FLAG, "Number of CPUs"))
        .arg(flags::int64(RAM_FLAG, "Amount of RAM (in GB)"))
        .arg(flags::string(STORAGE_CLASS_FLAG, "Storage class"))
        .arg(flags::int64(STORAGE_SIZE_FLAG, "Storage size (in GB)"))
        .arg(flags::string(VERSION_FLAG, "Version"))
        .arg(flags::enum_flag(
            TYPE_FLAG,
            format!("Instance type, one of {:?}", types),
            false,
            &types,
        ));
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Update the name of a PostgreSQL Flex instance",
                "$ stackit postgresflex instance update xxx --name my-new-name",
            ),
            Example::new(
                "Update the version of a PostgreSQL Flex instance",
                "$ stackit postgresflex instance update xxx --version 16",
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
        instance_name: flags::flag_to_string_pointer(p, matches, NAME_FLAG),
        acl: flags::flag_to_string_slice_pointer(p, matches, ACL_FLAG),
        backup_schedule: flags::flag_to_string_pointer(p, matches, BACKUP_SCHEDULE_FLAG),
        flavor_id: flags::flag_to_string_pointer(p, matches, FLAVOR_ID_FLAG),
        cpu: flags::flag_to_int64_pointer(p, matches, CPU_FLAG),
        ram: flags::flag_to_int64_pointer(p, matches, RAM_FLAG),
        storage_class: flags::flag_to_string_pointer(p, matches, STORAGE_CLASS_FLAG),
        storage_size: flags::flag_to_int64_pointer(p, matches, STORAGE_SIZE_FLAG),
        version: flags::flag_to_string_pointer(p, matches, VERSION_FLAG),
        instance_type: flags::flag_to_string_pointer(p, matches, TYPE_FLAG),
    };

    if model.flavor_id.is_some() && (model.cpu.is_some() || model.ram.is_some()) {
        return Err(CliError::DatabaseInputFlavor {
            service: SERVICE_NAME.to_string(),
        });
    }
    if model.is_empty_update() {
        return Err(CliError::EmptyUpdate);
    }

    p.debug_input_model(&model);
    Ok(model)
}

/// Builds the partial payload. Flavor and storage lookups only happen when
/// the corresponding flags were given; missing CPU or RAM values are taken
/// from the instance's current flavor.
async fn build_payload(
    api: &dyn PostgresFlexApi,
    model: &InputModel,
) -> Result<PartialUpdateInstancePayload, CliError> {
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let mut current = None;
    if (model.changes_flavor() && model.flavor_id.is_none()) || model.changes_storage() {
        let instance = api
            .get_instance(project_id, region, &model.instance_id)
            .await
            .context("get PostgreSQL Flex instance")?;
        current = Some(instance);
    }
    let current_flavor = current.as_ref().and_then(|i| i.flavor.clone()).unwrap_or_default();

    let mut flavor_id = None;
    if model.changes_flavor() {
        let flavors = api
            .list_flavors(project_id, region)
            .await
            .context("get PostgreSQL Flex flavors")?;
        let id = match &model.flavor_id {
            Some(id) => {
                validate_flavor_id(id, &flavors)?;
                id.clone()
            }
            None => {
                let cpu = model.cpu.or(current_flavor.cpu);
                let ram = model.ram.or(current_flavor.memory);
                let (Some(cpu), Some(ram)) = (cpu, ram) else {
                    return Err(anyhow::anyhow!("current instance has no flavor to update").into());
                };
                load_flavor_id(cpu, ram, &flavors)?
            }
        };
        flavor_id = Some(id);
    }

    let mut storage = None;
    if model.changes_storage() {
        let validation_flavor = flavor_id
            .clone()
            .or_else(|| current_flavor.id.clone())
            .ok_or_else(|| anyhow::anyhow!("current instance has no flavor ID"))?;
        let storages = api
            .list_storages(project_id, region, &validation_flavor)
            .await
            .context("get PostgreSQL Flex storages")?;
        validate_storage(
            model.storage_class.as_deref(),
            model.storage_size,
            Some(&storages),
            &validation_flavor,
        )?;
        storage = Some(Storage {
            class: model.storage_class.clone(),
            size: model.storage_size,
        });
    }

    let replicas = match &model.instance_type {
        Some(t) => Some(get_instance_replicas(t).context("get PostgreSQL Flex instance type")?),
        None => None,
    };

    Ok(PartialUpdateInstancePayload {
        name: model.instance_name.clone(),
        acl: model.acl.clone().map(|items| Acl { items: Some(items) }),
        backup_schedule: model.backup_schedule.clone(),
        flavor_id,
        replicas,
        storage,
        version: model.version.clone(),
        options: model
            .instance_type
            .clone()
            .map(|t| BTreeMap::from([("type".to_string(), t)])),
    })
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "postgresflex_instance_update", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let label = instance_label(params, api.as_ref(), &model.globals, &model.instance_id).await;
    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to update instance {:?}? (This may cause downtime)",
            label
        ),
    )?;

    let payload = build_payload(api.as_ref(), &model).await?;
    let resp = api
        .partial_update_instance(project_id, region, &model.instance_id, &payload)
        .await
        .context("update PostgreSQL Flex instance")?;

    wait_unless_async(
        p,
        model.globals.async_mode,
        &params.cancel,
        "Updating instance",
        || partial_update_instance_wait_handler(api.clone(), project_id, region, &model.instance_id),
        "wait for PostgreSQL Flex instance update",
    )
    .await?;

    output_result(p, model.globals.output_format, &resp, || {
        if model.globals.async_mode {
            p.info(&format!("Triggered update of instance {:?}", label));
        } else {
            p.info(&format!("Updated instance {:?}", label));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, INSTANCE_ID, PROJECT_ID};

    fn parse(extra: &[&str]) -> Result<InputModel, CliError> {
        let mut args = vec![
            "postgresflex",
            "instance",
            "update",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
        ];
        args.extend_from_slice(extra);
        let m = leaf_matches(&args).expect("valid arguments");
        parse_input(&printer(), &m, &Config::default())
    }

    #[test]
    fn requires_at_least_one_change() {
        assert!(matches!(parse(&[]), Err(CliError::EmptyUpdate)));
        let model = parse(&["--name", "renamed"]).unwrap();
        assert_eq!(model.instance_name.as_deref(), Some("renamed"));
        assert!(!model.changes_flavor());
    }

    #[test]
    fn flavor_id_excludes_cpu_and_ram() {
        assert!(matches!(
            parse(&["--flavor-id", "f1", "--cpu", "2"]),
            Err(CliError::DatabaseInputFlavor { .. })
        ));
        let model = parse(&["--cpu", "4"]).unwrap();
        assert!(model.changes_flavor());
        assert_eq!(model.ram, None);
    }

    #[test]
    fn storage_flags_count_as_changes() {
        let model = parse(&["--storage-size", "20"]).unwrap();
        assert!(model.changes_storage());
        assert_eq!(model.storage_class, None);
    }
}
