//! `reqwest` clients of the RPC services.

use std::time::Duration;

use engine::EngineError;
use notification::NotificationError;
use reqwest::{Client, StatusCode};

use crate::{RpcErrorBody, error::engine_error_from_body};

mod notify;
mod plan;
mod users;

pub use notify::NotificationClient;
pub use plan::PlanClient;
pub use users::UserClient;

/// Connection settings shared by every client.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    /// Upper bound for one call; `None` waits as long as the transport does.
    pub timeout: Option<Duration>,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {}", .body.error)]
    Server {
        status: StatusCode,
        body: RpcErrorBody,
    },
}

impl From<ApiError> for EngineError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Network(err) if err.is_timeout() => {
                EngineError::Unavailable(format!("request timed out: {err}"))
            }
            ApiError::Network(err) => EngineError::Unavailable(err.to_string()),
            ApiError::Server { status, body } => engine_error_from_body(status.as_u16(), body),
        }
    }
}

impl From<ApiError> for NotificationError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Network(err) => NotificationError::Unavailable(err.to_string()),
            ApiError::Server { status, body } if status == StatusCode::UNPROCESSABLE_ENTITY => {
                NotificationError::InvalidEvent(body.error)
            }
            ApiError::Server { status, body } => {
                NotificationError::Unavailable(format!("{status}: {}", body.error))
            }
        }
    }
}

/// JSON-over-POST transport shared by the typed clients.
#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub(crate) fn new(options: ClientOptions) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: options.base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send<TReq: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = match resp.json::<RpcErrorBody>().await {
            Ok(body) => body,
            Err(_) => RpcErrorBody {
                error: "server error".to_string(),
                kind: String::new(),
            },
        };
        Err(ApiError::Server { status, body })
    }

    pub(crate) async fn post_json<
        TReq: serde::Serialize + ?Sized,
        TResp: for<'de> serde::Deserialize<'de>,
    >(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ApiError> {
        Ok(self.send(path, body).await?.json::<TResp>().await?)
    }

    pub(crate) async fn post_json_unit<TReq: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<(), ApiError> {
        self.send(path, body).await?;
        Ok(())
    }
}
