use crate::sdk::{ApiClient, SdkError};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

#[async_trait]
pub trait ResourceManagerApi: Send + Sync {
    async fn get_project(&self, container_id: &str) -> Result<Project, SdkError>;
}

pub struct HttpResourceManagerApi {
    client: ApiClient,
}

impl HttpResourceManagerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceManagerApi for HttpResourceManagerApi {
    async fn get_project(&self, container_id: &str) -> Result<Project, SdkError> {
        self.client
            .request(Method::GET, format!("v2/projects/{}", container_id))
            .execute()
            .await
    }
}
