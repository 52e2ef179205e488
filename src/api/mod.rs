//! HTTP gateway to the portal backend.
//!
//! [`ApiClient`] owns one `reqwest::Client` configured with the base URL,
//! timeout and (when signed in) the Authorization header. Endpoint methods
//! live next to their wire types in `auth`, `surveys` and `training`.

mod auth;
pub mod error;
pub mod models;
mod surveys;
mod training;

pub use error::ApiError;
pub use models::*;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ApiConfig, AuthScheme};
use crate::session::Session;

use error::ErrorBody;

/// Authenticated client for the portal backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    signed_in: bool,
}

impl ApiClient {
    /// Create a client; with a session every request carries its token
    pub fn new(config: &ApiConfig, session: Option<&Session>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(session) = session {
            let value = auth_header(config.auth_scheme, &session.token)?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signed_in: session.is_some(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    fn require_session(&self) -> Result<(), ApiError> {
        if self.signed_in {
            Ok(())
        } else {
            Err(ApiError::NotSignedIn)
        }
    }

    /// Send a request, turning non-2xx answers into [`ApiError::Status`]
    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!(%method, path, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ErrorBody::parse(&body);
        warn!(%method, path, %status, message = ?message, "Request failed");
        Err(ApiError::Status { status, message })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .send(Method::GET, path, self.request(Method::GET, path))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method.clone(), path).json(body);
        let response = self.send(method, path, request).await?;
        Self::decode(response).await
    }

    /// Send a JSON body and ignore whatever comes back
    pub(crate) async fn send_json_unit<B>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method.clone(), path).json(body);
        self.send(method, path, request).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }

    /// Send a multipart form; these endpoints answer with no useful body
    pub(crate) async fn send_multipart_unit(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<(), ApiError> {
        let request = self.request(method.clone(), path).multipart(form);
        self.send(method, path, request).await?;
        Ok(())
    }
}

/// Percent-encode `id` as one path segment.
///
/// `/`, `?`, `#` and `%` are escaped so an id can never address another
/// endpoint; empty and dot segments are refused outright.
pub(crate) fn path_segment(id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::InvalidId(id.to_string()));
    }
    let mut url = Url::parse("http://segment.local/").map_err(|_| ApiError::InvalidId(id.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidId(id.to_string()))?
        .clear()
        .push(id);
    Ok(url.path().trim_start_matches('/').to_string())
}

fn auth_header(scheme: AuthScheme, token: &str) -> Result<HeaderValue, ApiError> {
    let mut value =
        HeaderValue::from_str(&scheme.header_value(token)).map_err(|_| ApiError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}
