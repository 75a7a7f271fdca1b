use log::debug;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Looks up the visitor's public IP, which the backend uses to tell
/// visitors apart. Only used once data consent has been given.
#[derive(Debug, Clone)]
pub struct PublicIpResolver {
    url: String,
    client: reqwest::Client,
}

impl PublicIpResolver {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        reqwest::Url::parse(&config.ip_lookup_url).map_err(|e| ApiError::InvalidUrl {
            url: config.ip_lookup_url.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            url: config.ip_lookup_url.clone(),
            client,
        })
    }

    pub async fn resolve(&self) -> Result<String, ApiError> {
        debug!("Looking up public IP via {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: IpResponse = serde_json::from_str(&body)?;
        Ok(parsed.ip.trim().to_string())
    }
}
