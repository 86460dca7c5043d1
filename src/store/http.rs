use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::ObjectStore;
use crate::config::AccessCredentials;
use crate::error::LoadError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Object store reached over path-style HTTP: `GET <endpoint>/<container>/<key>`.
///
/// Credentials travel as HTTP basic auth, so the endpoint must be public or
/// sit behind a basic-auth gateway. Signed S3 requests are not supported.
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    credentials: Option<AccessCredentials>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, credentials: Option<AccessCredentials>) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LoadError::Connectivity(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn object_url(&self, container: &str, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            container.trim_matches('/'),
            key.trim_start_matches('/')
        )
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.access_key_id, Some(&creds.secret_access_key)),
            None => request,
        }
    }
}

impl ObjectStore for HttpObjectStore {
    fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.object_url(container, key);
        let response = self
            .request(&url)
            .send()
            .map_err(|e| LoadError::Connectivity(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            warn!(container, key, %status, "Object store returned an error status");
            return Err(LoadError::Connectivity(format!(
                "Object store error: {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| LoadError::Connectivity(format!("Failed to read body: {}", e)))?;
        debug!(container, key, bytes = bytes.len(), "Fetched object");
        Ok(bytes.to_vec())
    }
}
