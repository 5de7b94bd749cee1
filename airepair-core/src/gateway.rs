//! HTTP gateway to the repair service.
//!
//! `Gateway::call` is the single choke point for every service call made by
//! either workflow. It always reads and parses the JSON body, whatever the
//! status code, and folds every failure into an [`ApiError`] whose `Display`
//! is the text shown on the status line.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::types::{
    AnalyzeRequest, AnalyzeResponse, RepairRequest, RepairResponse, SolveRequest, SolveResponse,
};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const REPAIR_PATH: &str = "/api/repair";
pub const SOLVE_PATH: &str = "/api/solve";

/// Fallback used when a transport error carries no message of its own.
const UNREACHABLE: &str = "Unable to connect to server";

/// Cheaply cloneable handle to the service; the inner client is reference counted.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
}

impl Gateway {
    /// Builds a gateway rooted at `base_url` (e.g. `http://127.0.0.1:5000`).
    ///
    /// `timeout` bounds each whole request; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `payload` as JSON to `path` and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// - `ApiError::Service` for any non-2xx status whose body is valid JSON.
    /// - `ApiError::Network` for transport failures and unparsable bodies.
    pub async fn call<P, T>(&self, path: &str, payload: &P) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        info!(%url, "service call");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(%url, status = status.as_u16(), error = %e, "response body is not JSON");
            ApiError::Network(e.to_string())
        })?;

        if !status.is_success() {
            let message = error_message(&body, status.canonical_reason());
            warn!(%url, status = status.as_u16(), %message, "service reported failure");
            let detail = field_text(&body, "detail");
            return Err(ApiError::Service { status: status.as_u16(), message, detail });
        }

        debug!(%url, status = status.as_u16(), "service call succeeded");
        serde_json::from_value(body).map_err(|e| {
            warn!(%url, error = %e, "response did not match the expected shape");
            ApiError::Network(e.to_string())
        })
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        self.call(ANALYZE_PATH, request).await
    }

    pub async fn repair(&self, request: &RepairRequest) -> Result<RepairResponse, ApiError> {
        self.call(REPAIR_PATH, request).await
    }

    pub async fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, ApiError> {
        self.call(SOLVE_PATH, request).await
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    let message = e.to_string();
    if message.is_empty() {
        ApiError::Network(UNREACHABLE.to_owned())
    } else {
        ApiError::Network(message)
    }
}

/// Extracts the human-readable reason from a non-2xx body.
///
/// Checks, in order: a truthy string `detail`, any other truthy `detail`
/// (JSON-encoded), a truthy `error`, then the HTTP status text.
pub fn error_message(body: &Value, status_text: Option<&str>) -> String {
    field_text(body, "detail")
        .or_else(|| field_text(body, "error"))
        .unwrap_or_else(|| status_text.filter(|s| !s.is_empty()).unwrap_or("Request failed").to_owned())
}

/// A truthy field as text. Non-string values are JSON-encoded.
fn field_text(body: &Value, key: &str) -> Option<String> {
    body.get(key).filter(|v| is_truthy(v)).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// JSON truthiness as a browser would judge it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Styling class of the shared status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusKind {
    #[default]
    Idle,
    Working,
    Success,
    Danger,
}

/// The shared status display every service call writes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    pub fn working() -> Self {
        Self { text: "Working...".to_owned(), kind: StatusKind::Working }
    }

    pub fn done() -> Self {
        Self { text: "Done.".to_owned(), kind: StatusKind::Success }
    }

    pub fn failed(error: &ApiError) -> Self {
        Self { text: error.to_string(), kind: StatusKind::Danger }
    }

    pub fn from_outcome<T>(outcome: &Result<T, ApiError>) -> Self {
        match outcome {
            Ok(_) => Self::done(),
            Err(e) => Self::failed(e),
        }
    }
}
