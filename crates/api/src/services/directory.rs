//! HTTP client for the employee directory endpoint.

use std::time::Duration;

use domain::services::{DirectoryEntry, DirectoryError, DirectoryResponse, EmployeeDirectory};
use reqwest::Client;

use crate::config::PortalConfig;

/// Queries `GET {directory_url}?kode={office_code}`.
#[derive(Debug, Clone)]
pub struct HttpEmployeeDirectory {
    client: Client,
    url: String,
}

impl HttpEmployeeDirectory {
    pub fn new(config: &PortalConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.directory_timeout_secs))
            .build()
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: config.directory_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn fetch(&self, office_code: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        if office_code.trim().is_empty() {
            return Err(DirectoryError::MissingOfficeCode);
        }
        if self.url.trim().is_empty() {
            return Err(DirectoryError::Request(
                "portal.directory_url is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&[("kode", office_code.trim())])
            .send()
            .await
            .map_err(|e| DirectoryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let body: DirectoryResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
        let entries = body.into_entries();

        tracing::debug!(office_code = %office_code, count = entries.len(), "Directory fetched");
        Ok(entries)
    }
}
