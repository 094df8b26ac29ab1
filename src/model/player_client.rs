//! Remote player API client
//!
//! Every call resolves to an [`ApiResult`]. Transport failures, non-success
//! statuses and undecodable bodies all become an [`ApiError`] carrying a
//! human readable message; nothing here panics or propagates a transport error.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::SharedSettings;
use super::api::{
    CommandResponse, DevicesResponse, PlayingResponse, RemoteQueue, VolumeRequest, VolumeResponse,
};
use super::queue::QueueSnapshot;
use super::settings::Device;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// A fully built request, ready for the transport
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport. No timeout is configured: a hung API stalls only the call awaiting it.
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("cast-widget/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http_client.get(&request.url),
            HttpMethod::Post => self.http_client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Request never produced a response
    Transport,
    /// API answered with a non-success status
    Status(u16),
    /// Response body did not match the expected schema
    Decode,
    /// Request body could not be encoded
    Encode,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct PlayerClient {
    transport: Arc<dyn HttpTransport>,
    settings: SharedSettings,
}

impl PlayerClient {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: SharedSettings) -> Self {
        Self { transport, settings }
    }

    pub async fn get_devices(&self) -> ApiResult<DevicesResponse> {
        self.call_api(HttpMethod::Get, "/api/devices", None::<&()>).await
    }

    pub async fn get_queue(&self) -> ApiResult<RemoteQueue> {
        self.call_api(HttpMethod::Get, "/api/queue", None::<&()>).await
    }

    pub async fn post_queue(&self, queue: &QueueSnapshot) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/queue", Some(queue)).await
    }

    pub async fn post_play(&self, device: &Device) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/play", Some(device)).await
    }

    pub async fn post_stop(&self, device: &Device) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/stop", Some(device)).await
    }

    pub async fn post_next(&self, device: &Device) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/next", Some(device)).await
    }

    pub async fn post_prev(&self, device: &Device) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/prev", Some(device)).await
    }

    pub async fn get_playing(&self) -> ApiResult<PlayingResponse> {
        self.call_api(HttpMethod::Get, "/api/playing", None::<&()>).await
    }

    pub async fn get_volume(&self) -> ApiResult<VolumeResponse> {
        self.call_api(HttpMethod::Get, "/api/volume", None::<&()>).await
    }

    pub async fn post_volume(&self, request: &VolumeRequest) -> ApiResult<CommandResponse> {
        self.call_api(HttpMethod::Post, "/api/volume", Some(request)).await
    }

    async fn call_api<B, T>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body)?;
        crate::log_api_request!(path, method = %method, has_body = request.body.is_some());

        let result = self.execute(request).await;
        crate::log_api_result!(path, result);
        result
    }

    fn build_request<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> ApiResult<ApiRequest>
    where
        B: Serialize + ?Sized,
    {
        let (base_url, api_key) = {
            let settings = self.settings.lock();
            (
                settings.api_url().unwrap_or_default().to_string(),
                settings.api_key().unwrap_or_default().to_string(),
            )
        };

        let mut headers = vec![("Authorization".to_string(), format!("Bearer {}", api_key))];
        let body = match body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                let encoded = serde_json::to_string(body)
                    .map_err(|e| ApiError::new(ApiErrorKind::Encode, e.to_string()))?;
                Some(encoded)
            }
            None => None,
        };

        Ok(ApiRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
            headers,
            body,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::new(ApiErrorKind::Transport, e.0))?;

        if !response.is_success() {
            return Err(ApiError::new(
                ApiErrorKind::Status(response.status),
                error_message(&response),
            ));
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::new(ApiErrorKind::Decode, e.to_string()))
    }
}

/// Server supplied `message`, or the status code when the body carries none.
fn error_message(response: &ApiResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}
