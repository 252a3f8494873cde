use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// How a client presents its credentials.
#[derive(Debug, Clone)]
pub enum Authentication {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `PRIVATE-TOKEN: <token>`
    PrivateToken(String),
}

impl Authentication {
    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        match self {
            Authentication::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                value.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
            Authentication::PrivateToken(token) => {
                let mut value = HeaderValue::from_str(token)?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static("private-token"), value);
            }
        }
        Ok(headers)
    }
}

/// Builds the reqwest client shared by every collaborator.
pub fn build_client(auth: Option<&Authentication>, timeout: Option<Duration>) -> Result<reqwest::Client, ApiError> {
    let mut builder = reqwest::Client::builder();
    if let Some(auth) = auth {
        builder = builder.default_headers(auth.headers()?);
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|source| ApiError::Transport {
        url: String::new(),
        source,
    })
}

/// Sends the request and turns every non-2xx answer into an error.
pub async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let (client, request) = request.build_split();
    let request = request.map_err(|source| ApiError::Transport {
        url: String::new(),
        source,
    })?;
    let method = request.method().clone();
    let url = request.url().to_string();

    debug!("{} {}", method, url);
    let response = client
        .execute(request)
        .await
        .map_err(|source| ApiError::Transport { url: url.clone(), source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        method,
        url,
        status,
        body,
    })
}

pub async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let url = response.url().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport { url: url.clone(), source })?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        url,
        message: e.to_string(),
    })
}

pub async fn bytes(response: reqwest::Response) -> Result<bytes::Bytes, ApiError> {
    let url = response.url().to_string();
    response.bytes().await.map_err(|source| ApiError::Transport { url, source })
}

/// Like [`json`], but an empty body decodes to an empty object.
pub async fn json_or_empty(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
    let url = response.url().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport { url: url.clone(), source })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        url,
        message: e.to_string(),
    })
}
