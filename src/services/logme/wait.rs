use super::model::Instance;
use super::LogMeApi;
use crate::sdk::wait::{AsyncHandler, OperationState, WaitStatus};
use crate::sdk::SdkError;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

pub const OPERATION_STATE_IN_PROGRESS: &str = "in progress";
pub const OPERATION_STATE_SUCCEEDED: &str = "succeeded";
pub const OPERATION_STATE_FAILED: &str = "failed";

pub const OPERATION_TYPE_CREATE: &str = "create";
pub const OPERATION_TYPE_UPDATE: &str = "update";
pub const OPERATION_TYPE_DELETE: &str = "delete";

pub fn operation_state(state: Option<&str>) -> OperationState {
    match state {
        Some(OPERATION_STATE_SUCCEEDED) => OperationState::Succeeded,
        Some(OPERATION_STATE_FAILED) => OperationState::Failed,
        Some(OPERATION_STATE_IN_PROGRESS) => OperationState::Running,
        _ => OperationState::Pending,
    }
}

/// Lifecycle of the instance's last operation, or `Pending` if it concerns another operation type.
fn last_operation_state(instance: &Instance, operation: &str) -> OperationState {
    match &instance.last_operation {
        Some(op) if op.kind.as_deref() == Some(operation) => operation_state(op.state.as_deref()),
        _ => OperationState::Pending,
    }
}

fn failure_message(instance: &Instance, operation: &str, instance_id: &str) -> String {
    let description = instance
        .last_operation
        .as_ref()
        .and_then(|op| op.description.as_deref())
        .unwrap_or("no description");
    format!(
        "{} failed for instance with id {}: {}",
        operation, instance_id, description
    )
}

/// Done once the last operation of type `operation` succeeded.
fn operation_handler(
    api: Arc<dyn LogMeApi>,
    project_id: &str,
    instance_id: &str,
    operation: &'static str,
) -> AsyncHandler<Instance> {
    let (project_id, instance_id) = (project_id.to_string(), instance_id.to_string());
    AsyncHandler::new(move || {
        let api = api.clone();
        let (project_id, instance_id) = (project_id.clone(), instance_id.clone());
        async move {
            let instance = api.get_instance(&project_id, &instance_id).await?;
            let status = match last_operation_state(&instance, operation) {
                OperationState::Succeeded => WaitStatus::Done(instance),
                OperationState::Failed => WaitStatus::Failed {
                    state: OperationState::Failed,
                    message: failure_message(&instance, operation, &instance_id),
                },
                state => WaitStatus::InProgress(state),
            };
            Ok::<_, SdkError>(status)
        }
        .boxed()
    })
}

pub fn create_instance_wait_handler(
    api: Arc<dyn LogMeApi>,
    project_id: &str,
    instance_id: &str,
) -> AsyncHandler<Instance> {
    operation_handler(api, project_id, instance_id, OPERATION_TYPE_CREATE)
        .with_timeout(Duration::from_secs(45 * 60))
}

pub fn partial_update_instance_wait_handler(
    api: Arc<dyn LogMeApi>,
    project_id: &str,
    instance_id: &str,
) -> AsyncHandler<Instance> {
    operation_handler(api, project_id, instance_id, OPERATION_TYPE_UPDATE)
        .with_timeout(Duration::from_secs(45 * 60))
}

/// Done once the delete operation succeeded or the instance is gone.
pub fn delete_instance_wait_handler(
    api: Arc<dyn LogMeApi>,
    project_id: &str,
    instance_id: &str,
) -> AsyncHandler<()> {
    let (project_id, instance_id) = (project_id.to_string(), instance_id.to_string());
    AsyncHandler::new(move || {
        let api = api.clone();
        let (project_id, instance_id) = (project_id.clone(), instance_id.clone());
        async move {
            match api.get_instance(&project_id, &instance_id).await {
                Ok(instance) => Ok(match last_operation_state(&instance, OPERATION_TYPE_DELETE) {
                    OperationState::Succeeded => WaitStatus::Done(()),
                    OperationState::Failed => WaitStatus::Failed {
                        state: OperationState::Failed,
                        message: failure_message(&instance, "delete", &instance_id),
                    },
                    state => WaitStatus::InProgress(state),
                }),
                Err(e) if e.is_not_found() || e.status() == Some(410) => Ok(WaitStatus::Done(())),
                Err(e) => Err(e),
            }
        }
        .boxed()
    })
    .with_timeout(Duration::from_secs(15 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logme::model::LastOperation;

    fn instance(kind: &str, state: &str) -> Instance {
        Instance {
            last_operation: Some(LastOperation {
                kind: Some(kind.into()),
                state: Some(state.into()),
                description: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn only_the_matching_operation_counts() {
        let created = instance("create", "succeeded");
        assert_eq!(
            last_operation_state(&created, OPERATION_TYPE_CREATE),
            OperationState::Succeeded
        );
        assert_eq!(
            last_operation_state(&created, OPERATION_TYPE_DELETE),
            OperationState::Pending
        );
        assert_eq!(
            last_operation_state(&instance("delete", "in progress"), OPERATION_TYPE_DELETE),
            OperationState::Running
        );
        assert_eq!(
            last_operation_state(&Instance::default(), OPERATION_TYPE_CREATE),
            OperationState::Pending
        );
    }

    #[test]
    fn failure_message_carries_description() {
        let mut failed = instance("create", "failed");
        if let Some(op) = failed.last_operation.as_mut() {
            op.description = Some("quota exceeded".into());
        }
        assert_eq!(
            failure_message(&failed, "create", "abc"),
            "create failed for instance with id abc: quota exceeded"
        );
    }
}
