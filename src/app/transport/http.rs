//! HTTPS transport against the CEDA DAP service
//!
//! Downloads dataset resources over HTTPS from `dap.ceda.ac.uk`. Access to
//! MIDAS Open requires a CEDA account; the transport reads an access token
//! from the configured token file at session setup and sends it as a
//! bearer credential on every request.

use super::Transport;
use crate::config::DownloadConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("midas-downloader/", env!("CARGO_PKG_VERSION"));

/// Transport backend for the CEDA DAP HTTPS service
pub struct DapTransport {
    config: DownloadConfig,
    client: Option<Client>,
}

impl DapTransport {
    /// Create a transport for the given configuration. The session is not
    /// established until [`Transport::initialize_session`] runs.
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Read the access token from the configured token file, if any
    fn read_token(&self) -> Result<Option<String>> {
        let Some(token_file) = &self.config.token_file else {
            return Ok(None);
        };

        let token = std::fs::read_to_string(token_file).map_err(|e| {
            Error::authentication(format!(
                "Failed to read token file {}: {}",
                token_file.display(),
                e
            ))
        })?;

        Ok(Some(token.trim().to_string()))
    }
}

#[async_trait]
impl Transport for DapTransport {
    async fn initialize_session(&mut self) -> Result<()> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.read_token()? {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                Error::authentication("Access token is not a valid header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
            debug!("Using access token from token file");
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::connection("Failed to build HTTPS client", Some(e)))?;

        self.client = Some(client);
        info!("HTTPS session established for {}", self.config.base_url);
        Ok(())
    }

    async fn release_session(&mut self) {
        if self.client.take().is_some() {
            debug!("HTTPS session released");
        }
    }

    fn base_path(&self) -> &str {
        &self.config.base_url
    }

    fn dataset_version(&self) -> &str {
        &self.config.dataset_version
    }

    fn pacing(&self) -> Duration {
        self.config.pacing
    }

    async fn download(&self, resource: &str) -> Result<PathBuf> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::connection("Session not initialized", None))?;

        let response = client
            .get(resource)
            .send()
            .await
            .map_err(|e| Error::download(resource, e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::download(resource, e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::download(resource, e.to_string()))?;

        let file_name = resource.rsplit('/').next().unwrap_or(resource);
        let local_path = self.config.output_dir.join(file_name);

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| {
                Error::download(resource, format!("Failed to create output directory: {e}"))
            })?;
        tokio::fs::write(&local_path, &bytes).await.map_err(|e| {
            Error::download(
                resource,
                format!("Failed to write {}: {}", local_path.display(), e),
            )
        })?;

        debug!(
            "Fetched {} bytes from {} to {}",
            bytes.len(),
            resource,
            local_path.display()
        );
        Ok(local_path)
    }
}
