//! Load Balancer API, limited to observability credentials.

pub mod model;
pub mod utils;

use crate::sdk::{collect_pages, ApiClient, Page, SdkError};
use async_trait::async_trait;
use model::{
    CreateCredentialsPayload, CreateCredentialsResponse, Credentials, GetCredentialsResponse,
    ListCredentialsResponse, ListLoadBalancersResponse, LoadBalancer, UpdateCredentialsPayload,
    UpdateCredentialsResponse,
};
use reqwest::Method;
use serde_json::Value;

#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn add_credentials(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateCredentialsPayload,
    ) -> Result<CreateCredentialsResponse, SdkError>;

    async fn list_credentials(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<Credentials>, SdkError>;

    async fn get_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
    ) -> Result<Credentials, SdkError>;

    /// Replaces display name, username and password of existing credentials.
    async fn update_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
        payload: &UpdateCredentialsPayload,
    ) -> Result<UpdateCredentialsResponse, SdkError>;

    async fn delete_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
    ) -> Result<(), SdkError>;

    async fn list_load_balancers(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<LoadBalancer>, SdkError>;
}

pub struct HttpLoadBalancerApi {
    client: ApiClient,
}

impl HttpLoadBalancerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn credentials_path(project_id: &str, region: &str) -> String {
    format!("v2/projects/{}/regions/{}/credentials", project_id, region)
}

#[async_trait]
impl LoadBalancerApi for HttpLoadBalancerApi {
    async fn add_credentials(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateCredentialsPayload,
    ) -> Result<CreateCredentialsResponse, SdkError> {
        self.client
            .request(Method::POST, credentials_path(project_id, region))
            .payload(payload)
            .execute()
            .await
    }

    async fn list_credentials(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<Credentials>, SdkError> {
        let resp: ListCredentialsResponse = self
            .client
            .request(Method::GET, credentials_path(project_id, region))
            .execute()
            .await?;
        Ok(resp.credentials.unwrap_or_default())
    }

    async fn get_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
    ) -> Result<Credentials, SdkError> {
        let resp: GetCredentialsResponse = self
            .client
            .request(
                Method::GET,
                format!("{}/{}", credentials_path(project_id, region), credentials_ref),
            )
            .execute()
            .await?;
        resp.credential.ok_or_else(|| SdkError::Status {
            status: 404,
            message: format!("credentials {} not found", credentials_ref),
        })
    }

    async fn update_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
        payload: &UpdateCredentialsPayload,
    ) -> Result<UpdateCredentialsResponse, SdkError> {
        self.client
            .request(
                Method::PUT,
                format!("{}/{}", credentials_path(project_id, region), credentials_ref),
            )
            .payload(payload)
            .execute()
            .await
    }

    async fn delete_credentials(
        &self,
        project_id: &str,
        region: &str,
        credentials_ref: &str,
    ) -> Result<(), SdkError> {
        let _: Value = self
            .client
            .request(
                Method::DELETE,
                format!("{}/{}", credentials_path(project_id, region), credentials_ref),
            )
            .execute()
            .await?;
        Ok(())
    }

    async fn list_load_balancers(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<LoadBalancer>, SdkError> {
        let path = format!("v2/projects/{}/regions/{}/load-balancers", project_id, region);
        collect_pages(None, |token| {
            let request = self
                .client
                .request::<ListLoadBalancersResponse>(Method::GET, path.clone())
                .query_opt("pageId", token);
            async move {
                let resp = request.execute().await?;
                Ok::<_, SdkError>(Page {
                    items: resp.load_balancers.unwrap_or_default(),
                    next_page_token: resp.next_page_id,
                })
            }
        })
        .await
    }
}
