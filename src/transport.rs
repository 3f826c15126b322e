use crate::api::Session;
use async_trait::async_trait;
use bytes::Bytes;
use config::Settings;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{Level, event, instrument};

/// How a request failed before a typed value could be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportFailure {
    /// The server answered with a non-success status.
    Http { status: u16, error: String },
    /// No status is available: connection errors, timeouts, undecodable bodies.
    Unknown { diagnostic: String },
}

pub type TransportResult<T> = Result<T, TransportFailure>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum XrpcMethod {
    /// `GET /xrpc/<nsid>`
    Query,
    /// `POST /xrpc/<nsid>`
    Procedure,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Binary { bytes: Bytes, content_type: String },
}

#[derive(Clone)]
pub struct XrpcRequest {
    pub method: XrpcMethod,
    pub nsid: &'static str,
    pub params: Vec<(String, String)>,
    pub body: RequestBody,
    pub authorization: String,
}

impl XrpcRequest {
    pub fn query(nsid: &'static str, session: &Session) -> Self {
        XrpcRequest {
            method: XrpcMethod::Query,
            nsid,
            params: Vec::new(),
            body: RequestBody::Empty,
            authorization: session.authorization(),
        }
    }

    pub fn procedure(nsid: &'static str, session: &Session, body: RequestBody) -> Self {
        XrpcRequest {
            method: XrpcMethod::Procedure,
            nsid,
            params: Vec::new(),
            body,
            authorization: session.authorization(),
        }
    }

    /// Adds a query parameter only when a value is present.
    pub fn param(mut self, name: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.params.push((name.to_string(), value));
        }
        self
    }

    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for XrpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrpcRequest")
            .field("method", &self.method)
            .field("nsid", &self.nsid)
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Executes XRPC calls. Implementations must never panic on remote errors;
/// every outcome is reported through [`TransportResult`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: XrpcRequest) -> TransportResult<Bytes>;
}

#[derive(Deserialize)]
struct XrpcErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Renders an XRPC error body as `"<error>: <message>"`, or returns it raw.
pub(crate) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<XrpcErrorBody>(body) {
        Ok(XrpcErrorBody {
            error: Some(error),
            message: Some(message),
        }) => format!("{}: {}", error, message),
        Ok(XrpcErrorBody {
            error: Some(detail),
            message: None,
        })
        | Ok(XrpcErrorBody {
            error: None,
            message: Some(detail),
        }) => detail,
        _ => body.trim().to_string(),
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = &settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, settings.service_base()))
    }

    pub fn url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.base_url, nsid)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "trace", skip(self, request), fields(nsid = request.nsid))]
    async fn execute(&self, request: XrpcRequest) -> TransportResult<Bytes> {
        let url = self.url(request.nsid);
        let builder = match request.method {
            XrpcMethod::Query => self.client.get(&url),
            XrpcMethod::Procedure => self.client.post(&url),
        };
        let builder = builder
            .query(&request.params)
            .header(AUTHORIZATION, &request.authorization);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::Binary {
                bytes,
                content_type,
            } => builder.header(CONTENT_TYPE, content_type).body(bytes),
        };

        let response = builder.send().await.map_err(|e| TransportFailure::Unknown {
            diagnostic: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            event!(Level::TRACE, status = status.as_u16(), response = error_body);
            return Err(TransportFailure::Http {
                status: status.as_u16(),
                error: error_detail(&error_body),
            });
        }

        let body = response.bytes().await.map_err(|e| TransportFailure::Unknown {
            diagnostic: e.to_string(),
        })?;
        event!(Level::TRACE, bytes = body.len(), "response received");
        Ok(body)
    }
}
