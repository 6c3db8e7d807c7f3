use crate::platform::checksum::ClientChecksums;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// The `Service` block of the version document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub version: String,
    pub sha: String,
}

/// Latest endorctl release as published by the Endor Labs API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMetadata {
    pub service: ServiceInfo,
    /// Falls back to `service.version` when the document has no client version.
    pub client_version: String,
    pub client_checksums: ClientChecksums,
}

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(rename = "Version", default)]
    version: Option<String>,
    #[serde(rename = "SHA", default)]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVersionResponse {
    #[serde(rename = "Service")]
    service: RawService,
    #[serde(rename = "ClientVersion", default)]
    client_version: Option<String>,
    #[serde(rename = "ClientChecksums")]
    client_checksums: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to fetch latest version of endorctl from Endor Labs API: {message}")]
    Network { message: String },

    #[error("Invalid response from Endor Labs API: `{body}`")]
    InvalidJson { body: String },

    #[error("Invalid response from Endor Labs API: `{body}`")]
    InvalidShape { body: String },
}

/// HTTP client shared by the metadata fetch and the binary download.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("endorshim/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Parse and validate a `/meta/version` body.
///
/// The document must carry a `Service` object and a `ClientChecksums` object;
/// anything else fails as a whole.
pub fn parse_version_response(body: &str) -> Result<VersionMetadata, MetadataError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| MetadataError::InvalidJson {
            body: body.to_string(),
        })?;

    let is_object = |key: &str| value.get(key).is_some_and(serde_json::Value::is_object);
    if !is_object("Service") || !is_object("ClientChecksums") {
        return Err(MetadataError::InvalidShape {
            body: body.to_string(),
        });
    }

    let invalid = || MetadataError::InvalidShape {
        body: body.to_string(),
    };
    let raw: RawVersionResponse = serde_json::from_value(value).map_err(|_| invalid())?;

    let service = ServiceInfo {
        version: raw.service.version.unwrap_or_default(),
        sha: raw.service.sha.unwrap_or_default(),
    };
    let client_version = raw
        .client_version
        .filter(|version| !version.is_empty())
        .unwrap_or_else(|| service.version.clone());
    if client_version.is_empty() {
        return Err(invalid());
    }

    let client_checksums = raw
        .client_checksums
        .into_iter()
        .filter_map(|(key, digest)| digest.map(|digest| (key, digest)))
        .collect();

    Ok(VersionMetadata {
        service,
        client_version,
        client_checksums,
    })
}

/// Client for the endorctl version endpoint.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: reqwest::Client,
}

impl MetadataClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the latest published endorctl version. A single attempt, no retries.
    pub async fn fetch_latest(&self, api_base: &str) -> Result<VersionMetadata, MetadataError> {
        let url = format!("{api_base}/meta/version");
        tracing::debug!("fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataError::Network {
                message: e.to_string(),
            })?;
        let body = response.text().await.map_err(|e| MetadataError::Network {
            message: e.to_string(),
        })?;

        parse_version_response(&body)
    }
}
