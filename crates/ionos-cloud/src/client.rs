//! HTTP transport shared by all product APIs
//!
//! One `reqwest::Client` is reused for every product and region. The base URL
//! is an explicit [`Endpoint`] argument of each call.

use crate::endpoint::Endpoint;
use crate::error::{CloudError, Result};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("ionos-cloud-rs/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API credentials
#[derive(Clone)]
pub enum Credentials {
    Token(String),
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Basic { username, .. } => {
                write!(f, "Basic {{ username: {username:?}, password: *** }}")
            }
        }
    }
}

/// Typed JSON client for IONOS Cloud REST APIs
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, credentials })
    }

    /// Use a preconfigured reqwest client (proxies, custom roots, ...)
    pub fn with_http_client(http: reqwest::Client, credentials: Credentials) -> Self {
        Self { http, credentials }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint, path: &str) -> Result<T> {
        let body = self.send(Method::GET, endpoint, path, None::<&()>).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.send(Method::POST, endpoint, path, Some(body)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.send(Method::PUT, endpoint, path, Some(body)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// DELETE; response bodies are ignored
    pub async fn delete(&self, endpoint: &Endpoint, path: &str) -> Result<()> {
        self.send(Method::DELETE, endpoint, path, None::<&()>).await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &Endpoint,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>> {
        let url = endpoint.url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");

        request = match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => request.basic_auth(username, Some(password)),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "API request");

        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(CloudError::Api {
                status: status.as_u16(),
                message: error_message(status, &bytes),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Pull a readable message out of an IONOS error body.
///
/// Bodies look like `{"httpStatus":404,"messages":[{"errorCode":"...","message":"..."}]}`;
/// anything else is returned as text.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        messages: Vec<ErrorMessage>,
        #[serde(default)]
        message: Option<String>,
    }

    #[derive(serde::Deserialize)]
    struct ErrorMessage {
        #[serde(default, rename = "errorCode")]
        error_code: Option<String>,
        #[serde(default)]
        message: String,
    }

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        let joined: Vec<String> = parsed
            .messages
            .into_iter()
            .map(|m| match m.error_code {
                Some(code) if !code.is_empty() => format!("[{}] {}", code, m.message),
                _ => m.message,
            })
            .filter(|m| !m.is_empty())
            .collect();
        if !joined.is_empty() {
            return joined.join("; ");
        }
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text
    }
}
