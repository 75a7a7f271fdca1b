use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use lastro_logging::{log_request, log_response};
use lastro_types::{Project, QueryRequest, QueryResponse, Suggestion};

use crate::client::ArchiveService;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// reqwest-backed client for the archive backend
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    base_url: String,
    verbose: bool,
    client: reqwest::Client,
}

impl ArchiveClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        reqwest::Url::parse(&config.api_url).map_err(|e| ApiError::InvalidUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            verbose: config.verbose,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        log_request("GET", &url, None, self.verbose);

        let response = self.client
            .get(&url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        self.read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        if self.verbose {
            let value = serde_json::to_value(body)?;
            log_request("POST", &url, Some(&value), true);
        }

        let response = self.client
            .post(&url)
            .json(body)
            .send()
            .await?;

        self.read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        log_response(&status, &headers, &body, self.verbose);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ArchiveService for ArchiveClient {
    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json("/projects").await
    }

    async fn project(&self, id: &str) -> Result<Project, ApiError> {
        self.get_json(&format!("/projects/{}", id)).await
    }

    async fn suggestions(&self, id: &str) -> Result<Vec<Suggestion>, ApiError> {
        self.get_json(&format!("/suggestions/{}", id)).await
    }

    async fn random_projects(&self, count: usize) -> Result<Vec<Project>, ApiError> {
        self.get_json(&format!("/random-projects/{}", count)).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.post_json("/query", request).await
    }
}
