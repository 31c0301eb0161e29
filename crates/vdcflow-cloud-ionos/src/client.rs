//! IONOS Cloud API v6 client

use crate::auth::{AuthHeaders, CONTRACT_NUMBER_HEADER};
use crate::error::Result as IonosResult;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use vdcflow_cloud::{CloudApi, CloudError, Collection, Resource, ResourceRef, Result};

/// Base URL of the IONOS Cloud API
pub const IONOS_API_URL: &str = "https://api.ionos.com/cloudapi/v6";

/// Default timeout for API requests
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// IONOS Cloud API client
#[derive(Clone)]
pub struct IonosClient {
    client: Client,
    auth: AuthHeaders,
    base_url: String,
}

impl IonosClient {
    pub fn new(auth: AuthHeaders) -> IonosResult<Self> {
        Self::with_base_url(auth, IONOS_API_URL)
    }

    pub fn with_base_url(auth: AuthHeaders, base_url: impl Into<String>) -> IonosResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("vdcflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "API request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, &self.auth.authorization)
            .header(CONTRACT_NUMBER_HEADER, &self.auth.contract_number)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CloudError::AuthenticationFailed(message))
            }
            _ => Err(CloudError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CloudApi for IonosClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list(&self, collection: &str) -> Result<Vec<ResourceRef>> {
        let listing: Collection = self.json(self.request(Method::GET, collection)).await?;
        Ok(listing.items)
    }

    async fn get(&self, href: &str) -> Result<Resource> {
        self.json(self.request(Method::GET, href)).await
    }

    async fn create(&self, collection: &str, body: &Value) -> Result<Resource> {
        self.json(self.request(Method::POST, collection).json(body))
            .await
    }

    async fn update(&self, href: &str, body: &Value) -> Result<()> {
        self.send(self.request(Method::PATCH, href).json(body))
            .await?;
        Ok(())
    }

    async fn delete(&self, href: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, href)).await?;
        Ok(())
    }
}
