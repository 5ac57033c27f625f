#![allow(dead_code)]

use async_trait::async_trait;
use stackit::auth::StaticAuthenticator;
use stackit::cli::error::CliError;
use stackit::cli::params::CmdParams;
use stackit::config::Config;
use stackit::print::{buffered_printer, SharedBuffer};
use stackit::sdk::{Page, SdkError};
use stackit::services::loadbalancer::model::{
    CreateCredentialsPayload, CreateCredentialsResponse, Credentials, LoadBalancer,
    UpdateCredentialsPayload, UpdateCredentialsResponse,
};
use stackit::services::loadbalancer::LoadBalancerApi;
use stackit::services::logme::model as logme;
use stackit::services::logme::LogMeApi;
use stackit::services::postgresflex::model::{
    Backup, CreateInstancePayload, CreateInstanceResponse, Flavor, Instance, InstanceListItem,
    InstanceResponse, ListStoragesResponse, PartialUpdateInstancePayload, StorageRange,
};
use stackit::services::postgresflex::PostgresFlexApi;
use stackit::services::resourcemanager::{Project, ResourceManagerApi};
use stackit::services::ClientFactory;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const PROJECT_ID: &str = "cd1e3b1f-8a7e-4b52-9d3c-8a0fdd3e2c2b";
pub const PROJECT_NAME: &str = "my-project";
pub const INSTANCE_ID: &str = "5f1f6a0e-1d0a-4c7e-9a0b-2f0f3c8f7d11";
pub const CREATED_INSTANCE_ID: &str = "0b8e7c1a-2f4d-4e5a-9c3b-7d6e5f4a3b21";
pub const PAGE_SIZE: usize = 100;

/// Per-method call counters shared by the fakes.
#[derive(Default)]
pub struct Calls(Mutex<HashMap<&'static str, usize>>);

impl Calls {
    fn record(&self, method: &'static str) {
        *self.0.lock().unwrap().entry(method).or_default() += 1;
    }

    pub fn count(&self, method: &str) -> usize {
        self.0.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.lock().unwrap().values().sum()
    }
}

/// PostgreSQL Flex backend holding `instance_count` instances, served in pages of [`PAGE_SIZE`].
/// `status` is what `get_instance` reports; `None` answers 404.
pub struct FakePostgresFlex {
    pub calls: Arc<Calls>,
    pub instance_count: AtomicUsize,
    pub status: Mutex<Option<String>>,
}

impl FakePostgresFlex {
    fn set_status(&self, status: Option<&str>) {
        *self.status.lock().unwrap() = status.map(str::to_string);
    }
}

#[async_trait]
impl PostgresFlexApi for FakePostgresFlex {
    async fn list_instances(
        &self,
        _project_id: &str,
        _region: &str,
        page_token: Option<String>,
    ) -> Result<Page<InstanceListItem>, SdkError> {
        self.calls.record("list_instances");
        let total = self.instance_count.load(Ordering::SeqCst);
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + PAGE_SIZE).min(total);
        let items = (start..end)
            .map(|i| InstanceListItem {
                id: Some(format!("instance-{}", i)),
                name: Some(format!("db-{}", i)),
                status: Some("Ready".into()),
            })
            .collect();
        Ok(Page {
            items,
            next_page_token: (end < total).then(|| end.to_string()),
        })
    }

    async fn get_instance(
        &self,
        _project_id: &str,
        _region: &str,
        instance_id: &str,
    ) -> Result<Instance, SdkError> {
        self.calls.record("get_instance");
        let status = self.status.lock().unwrap().clone().ok_or(SdkError::Status {
            status: 404,
            message: "instance not found".into(),
        })?;
        Ok(Instance {
            id: Some(instance_id.to_string()),
            name: Some("example-instance".into()),
            status: Some(status),
            ..Default::default()
        })
    }

    async fn create_instance(
        &self,
        _project_id: &str,
        _region: &str,
        _payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, SdkError> {
        self.calls.record("create_instance");
        Ok(CreateInstanceResponse {
            id: Some(CREATED_INSTANCE_ID.into()),
        })
    }

    async fn partial_update_instance(
        &self,
        _project_id: &str,
        _region: &str,
        _instance_id: &str,
        _payload: &PartialUpdateInstancePayload,
    ) -> Result<InstanceResponse, SdkError> {
        self.calls.record("partial_update_instance");
        Ok(InstanceResponse::default())
    }

    async fn delete_instance(
        &self,
        _project_id: &str,
        _region: &str,
        _instance_id: &str,
    ) -> Result<(), SdkError> {
        self.calls.record("delete_instance");
        self.set_status(Some("Deleted"));
        Ok(())
    }

    async fn force_delete_instance(
        &self,
        _project_id: &str,
        _region: &str,
        _instance_id: &str,
    ) -> Result<(), SdkError> {
        self.calls.record("force_delete_instance");
        self.set_status(None);
        Ok(())
    }

    async fn list_flavors(&self, _project_id: &str, _region: &str) -> Result<Vec<Flavor>, SdkError> {
        self.calls.record("list_flavors");
        Ok(vec![Flavor {
            id: Some("flavor-2-4".into()),
            cpu: Some(2),
            memory: Some(4),
            description: Some("Small".into()),
        }])
    }

    async fn list_storages(
        &self,
        _project_id: &str,
        _region: &str,
        _flavor_id: &str,
    ) -> Result<ListStoragesResponse, SdkError> {
        self.calls.record("list_storages");
        Ok(ListStoragesResponse {
            storage_classes: Some(vec!["premium-perf2-stackit".into()]),
            storage_range: Some(StorageRange {
                min: Some(5),
                max: Some(100),
            }),
        })
    }

    async fn list_versions(&self, _project_id: &str, _region: &str) -> Result<Vec<String>, SdkError> {
        self.calls.record("list_versions");
        Ok(vec!["14".into(), "16".into(), "9".into()])
    }

    async fn list_backups(
        &self,
        _project_id: &str,
        _region: &str,
        _instance_id: &str,
    ) -> Result<Vec<Backup>, SdkError> {
        self.calls.record("list_backups");
        Ok(Vec::new())
    }

    async fn get_backup(
        &self,
        _project_id: &str,
        _region: &str,
        _instance_id: &str,
        backup_id: &str,
    ) -> Result<Backup, SdkError> {
        self.calls.record("get_backup");
        Ok(Backup {
            id: Some(backup_id.to_string()),
            ..Default::default()
        })
    }
}

pub struct FakeLoadBalancer {
    pub calls: Arc<Calls>,
}

#[async_trait]
impl LoadBalancerApi for FakeLoadBalancer {
    async fn add_credentials(
        &self,
        _project_id: &str,
        _region: &str,
        payload: &CreateCredentialsPayload,
    ) -> Result<CreateCredentialsResponse, SdkError> {
        self.calls.record("add_credentials");
        Ok(CreateCredentialsResponse {
            credential: Some(Credentials {
                credentials_ref: Some("credentials-abc".into()),
                display_name: payload.display_name.clone(),
                username: payload.username.clone(),
            }),
        })
    }

    async fn list_credentials(
        &self,
        _project_id: &str,
        _region: &str,
    ) -> Result<Vec<Credentials>, SdkError> {
        self.calls.record("list_credentials");
        Ok(Vec::new())
    }

    async fn get_credentials(
        &self,
        _project_id: &str,
        _region: &str,
        credentials_ref: &str,
    ) -> Result<Credentials, SdkError> {
        self.calls.record("get_credentials");
        Ok(Credentials {
            credentials_ref: Some(credentials_ref.to_string()),
            display_name: Some("observability".into()),
            username: Some("pusher".into()),
        })
    }

    async fn delete_credentials(
        &self,
        _project_id: &str,
        _region: &str,
        _credentials_ref: &str,
    ) -> Result<(), SdkError> {
        self.calls.record("delete_credentials");
        Ok(())
    }

    async fn update_credentials(
        &self,
        _project_id: &str,
        _region: &str,
        credentials_ref: &str,
        payload: &UpdateCredentialsPayload,
    ) -> Result<UpdateCredentialsResponse, SdkError> {
        self.calls.record("update_credentials");
        Ok(UpdateCredentialsResponse {
            credential: Some(Credentials {
                credentials_ref: Some(credentials_ref.to_string()),
                display_name: payload.display_name.clone(),
                username: payload.username.clone(),
            }),
        })
    }

    async fn list_load_balancers(
        &self,
        _project_id: &str,
        _region: &str,
    ) -> Result<Vec<LoadBalancer>, SdkError> {
        self.calls.record("list_load_balancers");
        Ok(Vec::new())
    }
}

pub struct FakeLogMe {
    pub calls: Arc<Calls>,
}

#[async_trait]
impl LogMeApi for FakeLogMe {
    async fn list_offerings(&self, _project_id: &str) -> Result<Vec<logme::Offering>, SdkError> {
        self.calls.record("list_offerings");
        Ok(Vec::new())
    }

    async fn create_instance(
        &self,
        _project_id: &str,
        _payload: &logme::CreateInstancePayload,
    ) -> Result<logme::CreateInstanceResponse, SdkError> {
        self.calls.record("logme_create_instance");
        Ok(logme::CreateInstanceResponse {
            instance_id: Some(CREATED_INSTANCE_ID.into()),
        })
    }

    async fn partial_update_instance(
        &self,
        _project_id: &str,
        _instance_id: &str,
        _payload: &logme::PartialUpdateInstancePayload,
    ) -> Result<(), SdkError> {
        self.calls.record("logme_partial_update_instance");
        Ok(())
    }

    async fn get_instance(
        &self,
        _project_id: &str,
        instance_id: &str,
    ) -> Result<logme::Instance, SdkError> {
        self.calls.record("logme_get_instance");
        Ok(logme::Instance {
            instance_id: Some(instance_id.to_string()),
            name: Some("example-logme".into()),
            ..Default::default()
        })
    }

    async fn delete_instance(&self, _project_id: &str, _instance_id: &str) -> Result<(), SdkError> {
        self.calls.record("logme_delete_instance");
        Ok(())
    }
}

pub struct FakeResourceManager {
    pub calls: Arc<Calls>,
}

#[async_trait]
impl ResourceManagerApi for FakeResourceManager {
    async fn get_project(&self, container_id: &str) -> Result<Project, SdkError> {
        self.calls.record("get_project");
        Ok(Project {
            container_id: Some(container_id.to_string()),
            name: Some(PROJECT_NAME.into()),
            ..Default::default()
        })
    }
}

/// Hands out the fakes above; every client shares one call log.
pub struct FakeClients {
    pub calls: Arc<Calls>,
    pub postgresflex: Arc<FakePostgresFlex>,
}

impl FakeClients {
    pub fn new() -> Self {
        let calls = Arc::new(Calls::default());
        Self {
            postgresflex: Arc::new(FakePostgresFlex {
                calls: calls.clone(),
                instance_count: AtomicUsize::new(0),
                status: Mutex::new(Some("Ready".into())),
            }),
            calls,
        }
    }

    pub fn with_instances(self, count: usize) -> Self {
        self.postgresflex.instance_count.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_instance_status(self, status: &str) -> Self {
        self.postgresflex.set_status(Some(status));
        self
    }
}

impl ClientFactory for FakeClients {
    fn postgresflex(&self, _params: &CmdParams) -> Result<Arc<dyn PostgresFlexApi>, CliError> {
        Ok(self.postgresflex.clone())
    }

    fn load_balancer(&self, _params: &CmdParams) -> Result<Arc<dyn LoadBalancerApi>, CliError> {
        Ok(Arc::new(FakeLoadBalancer {
            calls: self.calls.clone(),
        }))
    }

    fn logme(&self, _params: &CmdParams) -> Result<Arc<dyn LogMeApi>, CliError> {
        Ok(Arc::new(FakeLogMe {
            calls: self.calls.clone(),
        }))
    }

    fn resource_manager(
        &self,
        _params: &CmdParams,
    ) -> Result<Arc<dyn ResourceManagerApi>, CliError> {
        Ok(Arc::new(FakeResourceManager {
            calls: self.calls.clone(),
        }))
    }
}

/// Result of one in-process invocation.
pub struct Outcome {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub calls: Arc<Calls>,
}

/// Runs `stackit <args>` against `clients`, answering prompts from `stdin`.
pub async fn run_with(clients: FakeClients, args: &[&str], stdin: &str) -> Outcome {
    let dir = TempDir::new().expect("temp dir");
    let (printer, out, err): (_, SharedBuffer, SharedBuffer) = buffered_printer(stdin);
    let calls = clients.calls.clone();
    let params = CmdParams {
        printer: Arc::new(printer),
        cli_version: "test".into(),
        authenticator: Arc::new(StaticAuthenticator("token".into())),
        clients: Arc::new(clients),
        config: Config::default(),
        config_path: dir.path().join("cli-config.json"),
        cancel: CancellationToken::new(),
    };

    let mut argv = vec!["stackit"];
    argv.extend_from_slice(args);
    let code = stackit::cli::execute(argv, &params).await;
    Outcome {
        code,
        stdout: out.contents(),
        stderr: err.contents(),
        calls,
    }
}

pub async fn run(args: &[&str], stdin: &str) -> Outcome {
    run_with(FakeClients::new(), args, stdin).await
}
