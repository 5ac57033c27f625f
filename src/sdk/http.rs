use super::SdkError;
use crate::print::{
    build_debug_str_from_body, build_debug_str_from_headers, Level, Printer, DEFAULT_HTTP_HEADERS,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub access_token: String,
    pub timeout: Duration,
    pub printer: Arc<Printer>,
    pub cancel: CancellationToken,
}

/// Authenticated JSON client for one service endpoint.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    access_token: String,
    printer: Arc<Printer>,
    cancel: CancellationToken,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, SdkError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| SdkError::InvalidRequest(format!("parse endpoint {:?}: {}", config.base_url, e)))?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            user_agent: config.user_agent,
            access_token: config.access_token,
            printer: config.printer,
            cancel: config.cancel,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Starts a request for the operation at `path`, relative to the endpoint.
    pub fn request<R: DeserializeOwned>(&self, method: Method, path: impl Into<String>) -> ApiRequest<'_, R> {
        ApiRequest {
            client: self,
            method,
            path: path.into(),
            query: Vec::new(),
            payload: None,
            _response: PhantomData,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        payload: Option<Value>,
    ) -> Result<Vec<u8>, SdkError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SdkError::InvalidRequest(format!("build URL for {:?}: {}", path, e)))?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);

        let body = match &payload {
            Some(p) => serde_json::to_vec(p)?,
            None => Vec::new(),
        };
        if payload.is_some() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        if self.printer.is_verbosity_debug() {
            let mut headers = vec![("Accept", "application/json"), ("User-Agent", self.user_agent.as_str())];
            if payload.is_some() {
                headers.push(("Content-Type", "application/json"));
            }
            self.printer.debug(
                Level::Debug,
                &format!(
                    "request to {} {}: headers {} body {}",
                    method,
                    url,
                    build_debug_str_from_headers(headers, &DEFAULT_HTTP_HEADERS),
                    build_debug_str_from_body(&body)
                ),
            );
        }

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SdkError::Cancelled),
            r = request.send() => r?,
        };
        let status = response.status();
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let bytes = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SdkError::Cancelled),
            b = response.bytes() => b?,
        };

        if self.printer.is_verbosity_debug() {
            self.printer.debug(
                Level::Debug,
                &format!(
                    "response from {} {}: status {} headers {} body {}",
                    method,
                    url,
                    status.as_u16(),
                    build_debug_str_from_headers(
                        response_headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                        &DEFAULT_HTTP_HEADERS
                    ),
                    build_debug_str_from_body(&bytes)
                ),
            );
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(SdkError::Unauthorized(error_message(&bytes, status)));
        }
        if !status.is_success() {
            return Err(SdkError::Status {
                status: status.as_u16(),
                message: error_message(&bytes, status),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Fluent request: attach query parameters and a payload, then [`execute`](ApiRequest::execute).
pub struct ApiRequest<'a, R> {
    client: &'a ApiClient,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Option<Result<Value, serde_json::Error>>,
    _response: PhantomData<R>,
}

impl<R: DeserializeOwned> ApiRequest<'_, R> {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn payload<P: Serialize + ?Sized>(mut self, payload: &P) -> Self {
        self.payload = Some(serde_json::to_value(payload));
        self
    }

    /// Sends the request. An empty success body decodes as JSON `null`.
    pub async fn execute(self) -> Result<R, SdkError> {
        let payload = self.payload.transpose()?;
        let bytes = self
            .client
            .send(self.method, &self.path, &self.query, payload)
            .await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn error_message(body: &[u8], status: StatusCode) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;

    fn client(base: &str) -> ApiClient {
        let (p, _, _) = buffered_printer("");
        ApiClient::new(ClientConfig {
            base_url: base.to_string(),
            user_agent: "stackit-cli/test".into(),
            access_token: "token".into(),
            timeout: DEFAULT_TIMEOUT,
            printer: Arc::new(p),
            cancel: CancellationToken::new(),
        })
        .expect("valid client")
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let c = client("https://postgres-flex-service.api.stackit.cloud/base");
        assert_eq!(c.base_url().as_str(), "https://postgres-flex-service.api.stackit.cloud/base/");
        assert_eq!(
            c.base_url().join("v2/projects").unwrap().as_str(),
            "https://postgres-flex-service.api.stackit.cloud/base/v2/projects"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let (p, _, _) = buffered_printer("");
        let result = ApiClient::new(ClientConfig {
            base_url: "not a url".into(),
            user_agent: String::new(),
            access_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
            printer: Arc::new(p),
            cancel: CancellationToken::new(),
        });
        assert!(matches!(result, Err(SdkError::InvalidRequest(_))));
    }

    #[test]
    fn error_messages_prefer_json_fields() {
        assert_eq!(
            error_message(br#"{"message":"instance not found"}"#, StatusCode::NOT_FOUND),
            "instance not found"
        );
        assert_eq!(error_message(b"", StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(error_message(b"oops", StatusCode::BAD_REQUEST), "oops");
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let c = client("http://127.0.0.1:9");
        c.cancel.cancel();
        let result: Result<Value, SdkError> = c.request(Method::GET, "/anything").execute().await;
        assert!(matches!(result, Err(SdkError::Cancelled)));
    }
}
