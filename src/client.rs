use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{error::ApiError, session::SessionStore};

/// ApiClient
///
/// Thin wrapper over `reqwest::Client` shared by every user-service call.
///
/// Responsibilities:
/// 1. Joining endpoint paths onto the configured base URL.
/// 2. The token hook: the current session token, when present, is attached
///    as a bearer credential. Without one the request goes out anonymous and
///    any resulting 401 is returned like every other backend error.
/// 3. Normalizing responses: 2xx bodies decode into the expected type,
///    everything else becomes `ApiError::Backend` with the backend's message.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

/// Error body shape used by the backend: `{ "error": "..." }`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, session)
    }

    /// Reuses an existing `reqwest::Client` (connection pool, timeouts).
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: SessionStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// authorize
    ///
    /// The token-attachment hook, invoked once per outgoing request.
    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// A request to `path` with the session token already attached.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.http.request(method, self.url(path)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST without a request body (logout, refresh).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        decode_response(response).await
    }
}

/// decode_response
///
/// Turns a backend response into either the expected body or an `ApiError`.
pub async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let url = response.url().path().to_string();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => body.error,
            Err(_) => String::from_utf8_lossy(&bytes).trim().to_string(),
        };
        tracing::debug!(%status, path = %url, %message, "backend returned an error");
        return Err(ApiError::Backend { status, message });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{url}: {e}")))
}
