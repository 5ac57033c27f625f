//! PostgreSQL Flex API.

mod client;
pub mod model;
pub mod utils;
pub mod wait;

pub use client::HttpPostgresFlexApi;

use crate::sdk::{Page, SdkError};
use async_trait::async_trait;
use model::{
    Backup, CreateInstancePayload, CreateInstanceResponse, Flavor, Instance, InstanceListItem,
    InstanceResponse, ListStoragesResponse, PartialUpdateInstancePayload,
};

pub const SERVICE_NAME: &str = "postgresflex";

#[async_trait]
pub trait PostgresFlexApi: Send + Sync {
    async fn list_instances(
        &self,
        project_id: &str,
        region: &str,
        page_token: Option<String>,
    ) -> Result<Page<InstanceListItem>, SdkError>;

    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<Instance, SdkError>;

    async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, SdkError>;

    async fn partial_update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<InstanceResponse, SdkError>;

    async fn delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<(), SdkError>;

    /// Permanently removes an instance, including one in the delayed deleted state.
    async fn force_delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<(), SdkError>;

    async fn list_flavors(&self, project_id: &str, region: &str) -> Result<Vec<Flavor>, SdkError>;

    async fn list_storages(
        &self,
        project_id: &str,
        region: &str,
        flavor_id: &str,
    ) -> Result<ListStoragesResponse, SdkError>;

    async fn list_versions(&self, project_id: &str, region: &str)
        -> Result<Vec<String>, SdkError>;

    async fn list_backups(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<Vec<Backup>, SdkError>;

    async fn get_backup(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        backup_id: &str,
    ) -> Result<Backup, SdkError>;
}
