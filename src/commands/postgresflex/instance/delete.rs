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
use crate::print::Printer;
use crate::sdk::wait::OperationState;
use crate::services::postgresflex::wait::{
    delete_instance_wait_handler, force_delete_instance_wait_handler, instance_state,
};
use crate::services::postgresflex::PostgresFlexApi;
use clap::{ArgMatches, Command};
use futures::FutureExt;
use serde::Serialize;
use tracing::instrument;

const FORCE_DELETE_FLAG: &str = "force";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputModel {
    #[serde(flatten)]
    globals: GlobalFlagModel,
    instance_id: String,
    force_delete: bool,
}

/// Which delete requests an instance still needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NextOperations {
    delete: bool,
    force_delete: bool,
}

fn next_operations(status: Option<&str>, force: bool) -> Result<NextOperations, CliError> {
    if instance_state(status) == OperationState::Deleted {
        if !force {
            return Err(anyhow::anyhow!(
                "instance is already deleted, use --force to force the deletion of a delayed deleted instance"
            )
            .into());
        }
        return Ok(NextOperations {
            delete: false,
            force_delete: true,
        });
    }
    Ok(NextOperations {
        delete: true,
        force_delete: force,
    })
}

async fn plan_operations(
    api: &dyn PostgresFlexApi,
    model: &InputModel,
) -> Result<NextOperations, CliError> {
    let instance = api
        .get_instance(&model.globals.project_id, &model.globals.region, &model.instance_id)
        .await
        .context("get PostgreSQL Flex instance status")?;
    next_operations(instance.status.as_deref(), model.force_delete)
}

pub fn command() -> CommandNode {
    let cmd = Command::new("delete")
        .about("Deletes a PostgreSQL Flex instance")
        .long_about(
            "Deletes a PostgreSQL Flex instance.\n\
             By default, instances will be kept in a delayed deleted state for 7 days before being permanently deleted.\n\
             Use the --force flag to force the immediate deletion of a delayed deleted instance.",
        )
        .arg(flags::bool(FORCE_DELETE_FLAG, "Force deletion of a delayed deleted instance").short('f'));
    let cmd = with_examples(
        cmd,
        &[
            Example::new(
                "Delete a PostgreSQL Flex instance with ID \"xxx\"",
                "$ stackit postgresflex instance delete xxx",
            ),
            Example::new(
                "Force the deletion of a delayed deleted PostgreSQL Flex instance with ID \"xxx\"",
                "$ stackit postgresflex instance delete xxx --force",
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
        force_delete: flags::flag_to_bool_value(p, matches, FORCE_DELETE_FLAG),
    };
    p.debug_input_model(&model);
    Ok(model)
}

fn handler<'a>(params: &'a CmdParams, matches: &'a ArgMatches) -> HandlerFuture<'a> {
    run(params, matches).boxed_local()
}

#[instrument(name = "postgresflex_instance_delete", skip_all)]
async fn run(params: &CmdParams, matches: &ArgMatches) -> Result<(), CliError> {
    let p = params.printer.as_ref();
    let model = parse_input(p, matches, &params.config)?;
    let api = params.clients.postgresflex(params)?;
    let (project_id, region) = (&model.globals.project_id, &model.globals.region);

    let label = instance_label(params, api.as_ref(), &model.globals, &model.instance_id).await;
    p.confirm(
        model.globals.assume_yes,
        &format!(
            "Are you sure you want to delete instance {:?}? (This cannot be undone)",
            label
        ),
    )?;

    let next = plan_operations(api.as_ref(), &model).await?;

    if next.delete {
        api.delete_instance(project_id, region, &model.instance_id)
            .await
            .context("delete PostgreSQL Flex instance")?;

        wait_unless_async(
            p,
            model.globals.async_mode,
            &params.cancel,
            "Deleting instance",
            || delete_instance_wait_handler(api.clone(), project_id, region, &model.instance_id),
            "wait for PostgreSQL Flex instance deletion",
        )
        .await?;
    }

    if next.force_delete {
        api.force_delete_instance(project_id, region, &model.instance_id)
            .await
            .context("force delete PostgreSQL Flex instance")?;

        wait_unless_async(
            p,
            model.globals.async_mode,
            &params.cancel,
            "Forcing deletion of instance",
            || force_delete_instance_wait_handler(api.clone(), project_id, region, &model.instance_id),
            "wait for PostgreSQL Flex instance force deletion",
        )
        .await?;
    }

    let operation = match (model.globals.async_mode, next.force_delete) {
        (false, false) => "Deleted",
        (false, true) => "Forcefully deleted",
        (true, false) => "Triggered deletion of",
        (true, true) => "Triggered forced deletion of",
    };
    p.info(&format!("{} instance {:?}", operation, label));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{leaf_matches, printer, INSTANCE_ID, PROJECT_ID};

    #[test]
    fn parses_instance_id() {
        let m = leaf_matches(&[
            "postgresflex",
            "instance",
            "delete",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
            "--async",
        ])
        .unwrap();
        let model = parse_input(&printer(), &m, &Config::default()).unwrap();
        assert_eq!(model.instance_id, INSTANCE_ID);
        assert!(model.globals.async_mode);
        assert!(!model.force_delete);
    }

    #[test]
    fn parses_force_flag() {
        let m = leaf_matches(&[
            "postgresflex",
            "instance",
            "delete",
            INSTANCE_ID,
            "--project-id",
            PROJECT_ID,
            "-f",
        ])
        .unwrap();
        assert!(parse_input(&printer(), &m, &Config::default()).unwrap().force_delete);
    }

    #[test]
    fn deleted_instances_need_force() {
        let err = next_operations(Some("Deleted"), false).unwrap_err();
        assert!(err.to_string().contains("use --force"), "{}", err);
        assert_eq!(
            next_operations(Some("Deleted"), true).unwrap(),
            NextOperations {
                delete: false,
                force_delete: true
            }
        );
    }

    #[test]
    fn live_instances_are_deleted_first() {
        assert_eq!(
            next_operations(Some("Ready"), false).unwrap(),
            NextOperations {
                delete: true,
                force_delete: false
            }
        );
        assert_eq!(
            next_operations(Some("Ready"), true).unwrap(),
            NextOperations {
                delete: true,
                force_delete: true
            }
        );
    }

    #[test]
    fn requires_project() {
        let m = leaf_matches(&["postgresflex", "instance", "delete", INSTANCE_ID]).unwrap();
        assert!(matches!(
            parse_input(&printer(), &m, &Config::default()),
            Err(CliError::ProjectId)
        ));
    }
}
