//! Clinic backend API client
//!
//! Provides an async HTTP client for the clinic REST backend with:
//! - Paginated, date-filtered list queries
//! - Point search by classified identifier
//! - Create / update mutations
//! - Staff authentication
//!
//! The [`ResourceGateway`] and [`AuthGateway`] traits sit between the
//! client and the browsers so everything above this module can be
//! exercised against in-memory fakes.

pub mod types;

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::browser::{ResourcePage, ResourceQuery};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::identifier::IdentifierKind;
use crate::resources::Resource;
use crate::session::Session;

use types::{ApiStatus, Credentials, Envelope, ErrorBody, PageData, QueryBody};

/// Seam between a [`ResourceBrowser`](crate::browser::ResourceBrowser)
/// and the backend for one resource type
#[async_trait]
pub trait ResourceGateway<T>: Send + Sync {
    /// Fetch one page matching the query
    async fn query(&self, query: &ResourceQuery) -> Result<ResourcePage<T>>;

    /// Point search by classified identifier; 404 maps to
    /// [`Error::NotFound`]
    async fn find(&self, kind: IdentifierKind, value: &str) -> Result<T>;

    /// Create a new item
    async fn create(&self, item: &T) -> Result<T>;

    /// Update an existing item
    async fn update(&self, id: i64, item: &T) -> Result<T>;
}

/// Seam between the login flow and the backend
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session>;
}

/// HTTP client for the clinic backend
#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    /// Create a client from the `[api]` configuration section
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Self::with_base_url(config.resolved_base_url(), config.timeout_secs)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// A typed gateway for one resource endpoint
    pub fn gateway<T: Resource>(&self) -> RestGateway<T> {
        RestGateway {
            client: self.clone(),
            _resource: PhantomData,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Unwrap a response into its envelope data
    ///
    /// 404 and NOT_FOUND envelopes become [`Error::NotFound`]; 401
    /// becomes [`Error::Session`]; ERROR envelopes surface the
    /// server's message verbatim; a body that fails to parse is
    /// treated like any other network failure.
    async fn parse_envelope<D: DeserializeOwned>(response: Response, name: &str) -> Result<D> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(name.to_string()));
        }

        // The backend rejects requests with a dead or tampered session
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Session);
        }

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => format!("Server returned {status}"),
            };
            warn!(%status, message = %message, "Request rejected by server");
            return Err(Error::Api(message));
        }

        let envelope: Envelope<D> = response.json().await.map_err(Error::Network)?;

        match envelope.status {
            ApiStatus::Success => envelope
                .data
                .ok_or_else(|| Error::Api("Response was missing its data".to_string())),
            ApiStatus::NotFound => Err(Error::NotFound(name.to_string())),
            ApiStatus::Error => Err(Error::Api(envelope.message)),
        }
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.url("staff/authenticate");
        debug!("Sending authentication request");

        let response = self
            .http_client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(Error::Network)?;

        Self::parse_envelope(response, "Account").await
    }
}

/// [`ResourceGateway`] implementation bound to one REST endpoint
#[derive(Debug, Clone)]
pub struct RestGateway<T> {
    client: ApiClient,
    _resource: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Resource> ResourceGateway<T> for RestGateway<T> {
    async fn query(&self, query: &ResourceQuery) -> Result<ResourcePage<T>> {
        let url = self.client.url(&format!("{}/query", T::ENDPOINT));
        let body = QueryBody {
            start: query.date_range.map(|r| r.start),
            end: query.date_range.map(|r| r.end),
            page: query.page,
            status: query.status_filter.clone(),
            sort: query.sort_key.clone(),
        };

        debug!(
            resource = T::ENDPOINT,
            page = query.page,
            status = ?query.status_filter,
            "Querying resource page"
        );

        let response = self
            .client
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Network)?;

        let data: PageData<T> = ApiClient::parse_envelope(response, T::NAME).await?;

        Ok(ResourcePage {
            items: data.items,
            current_page: query.page,
            total_pages: data.total_pages.max(1),
        })
    }

    async fn find(&self, kind: IdentifierKind, value: &str) -> Result<T> {
        let url = self.client.url(T::ENDPOINT);

        debug!(resource = T::ENDPOINT, kind = kind.query_param(), "Point search");

        let response = self
            .client
            .http_client
            .get(&url)
            .query(&[(kind.query_param(), value)])
            .send()
            .await
            .map_err(Error::Network)?;

        ApiClient::parse_envelope(response, T::NAME).await
    }

    async fn create(&self, item: &T) -> Result<T> {
        let url = self.client.url(T::ENDPOINT);

        let response = self
            .client
            .http_client
            .post(&url)
            .json(item)
            .send()
            .await
            .map_err(Error::Network)?;

        ApiClient::parse_envelope(response, T::NAME).await
    }

    async fn update(&self, id: i64, item: &T) -> Result<T> {
        let url = self.client.url(&format!("{}/{}", T::ENDPOINT, id));

        let response = self
            .client
            .http_client
            .put(&url)
            .json(item)
            .send()
            .await
            .map_err(Error::Network)?;

        ApiClient::parse_envelope(response, T::NAME).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let client = ApiClient::with_base_url("http://localhost:8080/api/", 5).unwrap();
        assert_eq!(client.url("staff/query"), "http://localhost:8080/api/staff/query");
    }
}
