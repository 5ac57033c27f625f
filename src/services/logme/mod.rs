//! LogMe API.

pub mod model;
pub mod utils;
pub mod wait;

use crate::sdk::{ApiClient, SdkError};
use async_trait::async_trait;
use model::{
    CreateInstancePayload, CreateInstanceResponse, Instance, ListOfferingsResponse, Offering,
    PartialUpdateInstancePayload,
};
use reqwest::Method;
use serde_json::Value;

pub const SERVICE_NAME: &str = "logme";

#[async_trait]
pub trait LogMeApi: Send + Sync {
    async fn list_offerings(&self, project_id: &str) -> Result<Vec<Offering>, SdkError>;

    async fn create_instance(
        &self,
        project_id: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, SdkError>;

    async fn partial_update_instance(
        &self,
        project_id: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<(), SdkError>;

    async fn get_instance(&self, project_id: &str, instance_id: &str)
        -> Result<Instance, SdkError>;

    async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<(), SdkError>;
}

pub struct HttpLogMeApi {
    client: ApiClient,
}

impl HttpLogMeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogMeApi for HttpLogMeApi {
    async fn list_offerings(&self, project_id: &str) -> Result<Vec<Offering>, SdkError> {
        let resp: ListOfferingsResponse = self
            .client
            .request(Method::GET, format!("v1/projects/{}/offerings", project_id))
            .execute()
            .await?;
        Ok(resp.offerings.unwrap_or_default())
    }

    async fn create_instance(
        &self,
        project_id: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, SdkError> {
        self.client
            .request(Method::POST, format!("v1/projects/{}/instances", project_id))
            .payload(payload)
            .execute()
            .await
    }

    async fn partial_update_instance(
        &self,
        project_id: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<(), SdkError> {
        let _: Value = self
            .client
            .request(
                Method::PATCH,
                format!("v1/projects/{}/instances/{}", project_id, instance_id),
            )
            .payload(payload)
            .execute()
            .await?;
        Ok(())
    }

    async fn get_instance(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<Instance, SdkError> {
        self.client
            .request(
                Method::GET,
                format!("v1/projects/{}/instances/{}", project_id, instance_id),
            )
            .execute()
            .await
    }

    async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<(), SdkError> {
        let _: Value = self
            .client
            .request(
                Method::DELETE,
                format!("v1/projects/{}/instances/{}", project_id, instance_id),
            )
            .execute()
            .await?;
        Ok(())
    }
}
