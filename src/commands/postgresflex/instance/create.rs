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
use crate::services::postgresflex::model::{Acl, CreateInstancePayload, Storage};
use crate::services::postgresflex::utils::{
    available_instance_types, get_instance_replicas, get_latest_version, load_flavor_id,
    validate_flavor_id, validate_storage,
};
use crate::services::postgresflex::wait::create_instance_wait_handler;
use crate::services::postgresflex::{PostgresFlexApi, SERVICE_NAME};
use crate::services::projectname::project_label;
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

const DEFAULT_BACKUP_SCHEDULE: &str = "0 0 * * *";
const DEFAULT_STORAGE_CLASS: &str = "premium-perf2-stackit";
const DEFAULT_STORAGE_SIZE: &str = "10";
const DEFAULT_TYPE: &str = "Replica";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_name: Option<String>,
    acl: Option<Vec<String>>,
    backup_schedule: String,
    flavor_id: Option<String>,
    cpu: Option<i64>,
    ram: Option<i64>,
    storage_class: String,
    storage_size: i64,
    version: Option<String>,
    instance_type: String,
}

pub fn command() -> CommandNode {
    let types = available_instance_types();
    let cmd = Command::new("create")
        .about("Creates a PostgreSQL Flex instance")
        .long_about("Creates a PostgreSQL Flex instance.")
        .arg(flags::string(NAME_FLAG, "Instance name").short('n'))
        .arg(flags::cidr_slice(
            ACL_FLAG,
            "The access control list (ACL). Must contain at least one valid subnet, for instance '0.0.0.0/0' for open access (discouraged), '1.2.3.0/24' for a public IP range of an organization, '1.2.3.4/32' for a single IP range, etc.",
        ))
        .arg(flags::string(BACKUP_SCHEDULE_FLAG, "Backup schedule").default_value(DEFAULT_BACKUP_SCHEDULE))
        .arg(flags::string(FLAVOR_ID_FLAG, "ID of the flavor"))
        .arg(flags::int64(CPU_FLAG, "Number of CPUs"))
        .arg(flags::int64(RAM_FLAG, "Amount of RAM (in GB)"))
        .arg(flags::string(STORAGE_CLASS_FLAG, "Storage class").default_value(DEFAULT_STORAGE_CLASS))
        .arg(flags::int64(STORAGE_SIZE_FLAG, "Storage size (in GB)").default_value(DEFAULT_STORAGE_SIZE))
        .arg(flags::string(
            VERSION_FLAG,
            "PostgreSQL version. Defaults to the latest version available",
        ))
        .arg(
            flags::enum_flag(
                TYPE_FLAG,
                format!("Instance type, one of {:?}", types),
                false,
                &types,
            )
            .default_value(DEFAULT_TYPE),
        );
    let cmd = flags::mark_flags_required(cmd, &[NAME_FLAG, ACL_FLAG]);
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Create a PostgreSQL Flex instance with name \"my-instance\", ACL 0.0.0.0/0 (open access) and specify flavor by CPU and RAM. Other parameters are set to default values",
                "$ stackit postgresflex instance create --name my-instance --cpu 2 --ram 4 --acl 0.0.0.0/0",
            ),
            Example::new(
                "Create a PostgreSQL Flex instance with name \"my-instance\", ACL 0.0.0.0/0 (open access) and specify flavor by ID. Other parameters are set to default values",
                "$ stackit postgresflex instance create --name my-instance --flavor-id xxx --acl 0.0.0.0/0",
            ),
            Example::new(
                "Create a PostgreSQL Flex instance with name \"my-instance\", allow access to a specific range of IP addresses, specify flavor by CPU and RAM and set storage size to 20 GB. Other parameters are set to default values",
                "$ stackit postgresflex instance create --name my-instance --cpu 2 --ram 4 --acl 1.2.3.0/24 --storage-size 20",
            ),
        ],
    );
    CommandNode::leaf(ArgSpec::NoArgs.apply(cmd), handler)
}

fn parse_input(p: &Printer, matches: &ArgMatches, config: &Config) -> Result<InputModel, CliError> {
    let globals = globalflags::parse(p, matches, config);
    globals.require_project()?;

    let flavor_id = flags::flag_to_string_pointer(p, matches, FLAVOR_ID_FLAG);
    let cpu = flags::flag_to_int64_pointer(p, matches, CPU_FLAG);
    let ram = flags::flag_to_int64_pointer(p, matches, RAM_FLAG);

    let by_id = flavor_id.is_some();
    let by_size = cpu.is_some() || ram.is_some();
    if by_id == by_size || (by_size && (cpu.is_none() || ram.is_none())) {
        return Err(CliError::DatabaseInputFlavor {
            service: SERVICE_NAME.to_string(),
        });
    }

    let model = InputModel {
        globals,
        instance_name: flags::flag_to_string_pointer(p, matches, NAME_FLAG),
        acl: flags::flag_to_string_slice_pointer(p, matches, ACL_FLAG),
        backup_schedule: flags::flag_with_default_to_string_value(p, matches, BACKUP_SCHEDULE_FLAG),
        flavor_id,
        cpu,
        ram,
        storage_class: flags::flag_with_default_to_string_value(p, matches, STORAGE_CLASS_FLAG),
        storage_size: flags::flag_with_default_to_int64_value(p, matches, STORAGE_SIZE_FLAG),
        version: flags::flag_to_string_pointer(p, matches, VERSION_FLAG),
        instance_type: flags::flag_with_default_to_string_value(p, matches, TYPE_FLAG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

/// Resolves the flavor, validates storage against it and assembles the request body.
async fn build_payload(
    api: &dyn PostgresFlexApi,
    model: &InputModel,
    version: String,
) -> Result<CreateInstancePayload, CliError> {
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);
    let flavors = api
        .list_flavors(project_id, region)
        .await
        .context("get PostgreSQL Flex flavors")?;

    let flavor_id = match (&model.flavor_id, model.cpu, model.ram) {
        (Some(id), _, _) => {
            validate_flavor_id(id, &flavors)?;
            id.clone()
        }
        (None, Some(cpu), Some(ram)) => load_flavor_id(cpu, ram, &flavors)?,
        _ => {
            return Err(CliError::DatabaseInputFlavor {
                service: SERVICE_NAME.to_string(),
            })
        }
    };

    let storages = api
        .list_storages(project_id, region, &flavor_id)
        .await
        .context("get PostgreSQL Flex storages")?;
    validate_storage(
        Some(&model.storage_class),
        Some(model.storage_size),
        Some(&storages),
        &flavor_id,
    )?;

    let replicas = get_instance_replicas(&model.instance_type)
        .context("get PostgreSQL Flex instance type")?;

    Ok(CreateInstancePayload {
        name: model.instance_name.clone(),
        acl: Some(Acl {
            items: model.acl.clone(),
        }),
        backup_schedule: Some(model.backup_schedule.clone()),
        flavor_id: Some(flavor_id),
        replicas: Some(replicas),
        storage: Some(Storage {
            class: Some(model.storage_class.clone()),
            size: Some(model.storage_size),
        }),
        version: Some(version),
        options: Some(BTreeMap::from([(
            "type".to_string(),
            model.instance_type.clone(),
        )])),
    })
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "postgresflex_instance_create", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let label = project_label(params, &model.globals).await;
    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to create a PostgreSQL Flex instance for project {:?}?",
            label
        ),
    )?;

    let version = match &model.version {
        Some(v) => v.clone(),
        None => {
            let versions = api
                .list_versions(project_id, region)
                .await
                .context("get PostgreSQL versions")?;
            get_latest_version(&versions).context("get latest PostgreSQL version")?
        }
    };

    let payload = build_payload(api.as_ref(), &model, version).await?;
    let resp = api
        .create_instance(project_id, region, &payload)
        .await
        .context("create PostgreSQL Flex instance")?;
    let instance_id = resp
        .id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("create PostgreSQL Flex instance: response has no instance ID"))?;

    wait_unless_async(
        p,
        model.globals.async_mode,
        &params.cancel,
        "Creating instance",
        || create_instance_wait_handler(api.clone(), project_id, region, &instance_id),
        "wait for PostgreSQL Flex instance creation",
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
