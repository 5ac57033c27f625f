use super::model::{
    Backup, BackupResponse, CreateInstancePayload, CreateInstanceResponse, Flavor, Instance,
    InstanceListItem, InstanceResponse, ListBackupsResponse, ListFlavorsResponse,
    ListInstancesResponse, ListStoragesResponse, ListVersionsResponse,
    PartialUpdateInstancePayload,
};
use super::PostgresFlexApi;
use crate::sdk::{ApiClient, Page, SdkError};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub struct HttpPostgresFlexApi {
    client: ApiClient,
}

impl HttpPostgresFlexApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn region_path(project_id: &str, region: &str) -> String {
    format!("v2/projects/{}/regions/{}", project_id, region)
}

fn missing(what: &str) -> SdkError {
    SdkError::Status {
        status: 404,
        message: format!("response contains no {}", what),
    }
}

#[async_trait]
impl PostgresFlexApi for HttpPostgresFlexApi {
    async fn list_instances(
        &self,
        project_id: &str,
        region: &str,
        page_token: Option<String>,
    ) -> Result<Page<InstanceListItem>, SdkError> {
        let resp: ListInstancesResponse = self
            .client
            .request(Method::GET, format!("{}/instances", region_path(project_id, region)))
            .query_opt("pageToken", page_token)
            .execute()
            .await?;
        Ok(Page {
            items: resp.items.unwrap_or_default(),
            next_page_token: resp.next_page_token,
        })
    }

    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<Instance, SdkError> {
        let resp: InstanceResponse = self
            .client
            .request(
                Method::GET,
                format!("{}/instances/{}", region_path(project_id, region), instance_id),
            )
            .execute()
            .await?;
        resp.item.ok_or_else(|| missing("instance"))
    }

    async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, SdkError> {
        self.client
            .request(Method::POST, format!("{}/instances", region_path(project_id, region)))
            .payload(payload)
            .execute()
            .await
    }

    async fn partial_update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<InstanceResponse, SdkError> {
        self.client
            .request(
                Method::PATCH,
                format!("{}/instances/{}", region_path(project_id, region), instance_id),
            )
            .payload(payload)
            .execute()
            .await
    }

    async fn delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<(), SdkError> {
        let _: Value = self
            .client
            .request(
                Method::DELETE,
                format!("{}/instances/{}", region_path(project_id, region), instance_id),
            )
            .execute()
            .await?;
        Ok(())
    }

    async fn force_delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<(), SdkError> {
        let _: Value = self
            .client
            .request(
                Method::DELETE,
                format!(
                    "{}/instances/{}/force",
                    region_path(project_id, region),
                    instance_id
                ),
            )
            .execute()
            .await?;
        Ok(())
    }

    async fn list_flavors(&self, project_id: &str, region: &str) -> Result<Vec<Flavor>, SdkError> {
        let resp: ListFlavorsResponse = self
            .client
            .request(Method::GET, format!("{}/flavors", region_path(project_id, region)))
            .execute()
            .await?;
        Ok(resp.flavors.unwrap_or_default())
    }

    async fn list_storages(
        &self,
        project_id: &str,
        region: &str,
        flavor_id: &str,
    ) -> Result<ListStoragesResponse, SdkError> {
        self.client
            .request(
                Method::GET,
                format!("{}/storages/{}", region_path(project_id, region), flavor_id),
            )
            .execute()
            .await
    }

    async fn list_versions(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<String>, SdkError> {
        let resp: ListVersionsResponse = self
            .client
            .request(Method::GET, format!("{}/versions", region_path(project_id, region)))
            .execute()
            .await?;
        Ok(resp.versions.unwrap_or_default())
    }

    async fn list_backups(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<Vec<Backup>, SdkError> {
        let resp: ListBackupsResponse = self
            .client
            .request(
                Method::GET,
                format!(
                    "{}/instances/{}/backups",
                    region_path(project_id, region),
                    instance_id
                ),
            )
            .execute()
            .await?;
        Ok(resp.items.unwrap_or_default())
    }

    async fn get_backup(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        backup_id: &str,
    ) -> Result<Backup, SdkError> {
        let resp: BackupResponse = self
            .client
            .request(
                Method::GET,
                format!(
                    "{}/instances/{}/backups/{}",
                    region_path(project_id, region),
                    instance_id,
                    backup_id
                ),
            )
            .execute()
            .await?;
        resp.item.ok_or_else(|| missing("backup"))
    }
}
