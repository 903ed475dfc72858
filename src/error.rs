use crate::edr::error::ResponseError;
use crate::query::error::QueryError;
use crate::types::dataset::Dataset;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON response from {0}")]
    JsonParse(String, #[source] serde_json::Error),

    #[error("Failed building frame: {0}")]
    Frame(#[from] PolarsError),

    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("No {service} endpoint configured for {dataset}")]
    DatasetNotConfigured {
        service: &'static str,
        dataset: Dataset,
    },

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
