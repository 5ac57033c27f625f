use super::model::Instance;
use super::PostgresFlexApi;
use crate::sdk::wait::{AsyncHandler, OperationState, WaitStatus};
use crate::sdk::SdkError;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

pub const INSTANCE_STATE_READY: &str = "Ready";
pub const INSTANCE_STATE_FAILED: &str = "Failure";
pub const INSTANCE_STATE_PROGRESSING: &str = "Progressing";
pub const INSTANCE_STATE_DELETED: &str = "Deleted";

/// Maps an upstream instance status onto the operation lifecycle.
pub fn instance_state(status: Option<&str>) -> OperationState {
    match status {
        Some(INSTANCE_STATE_READY) => OperationState::Succeeded,
        Some(INSTANCE_STATE_FAILED) => OperationState::Failed,
        Some(INSTANCE_STATE_DELETED) => OperationState::Deleted,
        Some(INSTANCE_STATE_PROGRESSING) => OperationState::Running,
        _ => OperationState::Pending,
    }
}

fn ready_handler(
    api: Arc<dyn PostgresFlexApi>,
    project_id: String,
    region: String,
    instance_id: String,
    operation: &'static str,
) -> AsyncHandler<Instance> {
    AsyncHandler::new(move || {
        let api = api.clone();
        let (project_id, region, instance_id) =
            (project_id.clone(), region.clone(), instance_id.clone());
        async move {
            let instance = api.get_instance(&project_id, &region, &instance_id).await?;
            let status = match instance_state(instance.status.as_deref()) {
                OperationState::Succeeded => WaitStatus::Done(instance),
                state @ (OperationState::Failed
                | OperationState::Deleted
                | OperationState::Cancelled) => WaitStatus::Failed {
                    state,
                    message: format!("{} failed for instance with id {}", operation, instance_id),
                },
                state => WaitStatus::InProgress(state),
            };
            Ok::<_, SdkError>(status)
        }
        .boxed()
    })
}

pub fn create_instance_wait_handler(
    api: Arc<dyn PostgresFlexApi>,
    project_id: &str,
    region: &str,
    instance_id: &str,
) -> AsyncHandler<Instance> {
    ready_handler(
        api,
        project_id.to_string(),
        region.to_string(),
        instance_id.to_string(),
        "create",
    )
    .with_timeout(Duration::from_secs(45 * 60))
}

pub fn partial_update_instance_wait_handler(
    api: Arc<dyn PostgresFlexApi>,
    project_id: &str,
    region: &str,
    instance_id: &str,
) -> AsyncHandler<Instance> {
    ready_handler(
        api,
        project_id.to_string(),
        region.to_string(),
        instance_id.to_string(),
        "update",
    )
}

/// Done once the instance reports `Deleted` or is gone altogether.
pub fn delete_instance_wait_handler(
    api: Arc<dyn PostgresFlexApi>,
    project_id: &str,
    region: &str,
    instance_id: &str,
) -> AsyncHandler<()> {
    let (project_id, region, instance_id) =
        (project_id.to_string(), region.to_string(), instance_id.to_string());
    AsyncHandler::new(move || {
        let api = api.clone();
        let (project_id, region, instance_id) =
            (project_id.clone(), region.clone(), instance_id.clone());
        async move {
            match api.get_instance(&project_id, &region, &instance_id).await {
                Ok(instance) => Ok(match instance_state(instance.status.as_deref()) {
                    OperationState::Deleted => WaitStatus::Done(()),
                    OperationState::Failed => WaitStatus::Failed {
                        state: OperationState::Failed,
                        message: format!("delete failed for instance with id {}", instance_id),
                    },
                    state => WaitStatus::InProgress(state),
                }),
                Err(e) if e.is_not_found() => Ok(WaitStatus::Done(())),
                Err(e) => Err(e),
            }
        }
        .boxed()
    })
    .with_timeout(Duration::from_secs(20 * 60))
}

/// Done only once the instance can no longer be found.
pub fn force_delete_instance_wait_handler(
    api: Arc<dyn PostgresFlexApi>,
    project_id: &str,
    region: &str,
    instance_id: &str,
) -> AsyncHandler<()> {
    let (project_id, region, instance_id) =
        (project_id.to_string(), region.to_string(), instance_id.to_string());
    AsyncHandler::new(move || {
        let api = api.clone();
        let (project_id, region, instance_id) =
            (project_id.clone(), region.clone(), instance_id.clone());
        async move {
            match api.get_instance(&project_id, &region, &instance_id).await {
                Ok(instance) => Ok(WaitStatus::InProgress(
                    match instance_state(instance.status.as_deref()) {
                        OperationState::Deleted => OperationState::Running,
                        state => state,
                    },
                )),
                Err(e) if e.is_not_found() => Ok(WaitStatus::Done(())),
                Err(e) => Err(e),
            }
        }
        .boxed()
    })
    .with_timeout(Duration::from_secs(15 * 60))
}
