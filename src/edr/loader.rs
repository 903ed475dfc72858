use crate::config::FluxConfig;
use crate::error::FluxError;
use log::{info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Issues GET requests against the WMS/EDR services and decodes JSON bodies.
#[derive(Debug, Clone)]
pub struct EdrLoader {
    client: Client,
}

impl EdrLoader {
    pub fn new(config: &FluxConfig) -> Result<Self, FluxError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(FluxError::HttpClient)?;
        Ok(Self { client })
    }

    /// Fetches `url` and deserializes the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FluxError> {
        info!("Requesting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FluxError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FluxError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FluxError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| FluxError::NetworkRequest(url.to_string(), e))?;
        info!("Received {} bytes from {}", body.len(), url);

        serde_json::from_slice(&body).map_err(|e| FluxError::JsonParse(url.to_string(), e))
    }
}
