//! Backend plumbing: a thin `reqwest` wrapper plus the [`Transport`] seam
//! the row lifecycle talks through.

use futures::future::BoxFuture;
use http::Method;
use reqwest::multipart;
use serde_json::Value;

use crate::config::{BodyFormat, RequestTarget};
use crate::error::RequestError;
use crate::grid::RowData;
use crate::utils::value_to_display;

/// Successful response wrapper, surfaced verbatim in `updated` /
/// `new-row-saved` events.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub data: Value,
}

/// Per-call overrides layered on top of a [`RequestTarget`].
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
}

/// Seam between the row lifecycle and the wire. [`HttpClient`] is the
/// production implementation; tests drive the engine with an in-memory one.
pub trait Transport: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        target: &'a RequestTarget,
        body: &'a RowData,
    ) -> BoxFuture<'a, Result<ApiResponse, RequestError>>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// POST the body to the create endpoint.
    pub async fn create(
        &self,
        target: &RequestTarget,
        body: &RowData,
        init: Option<&RequestInit>,
    ) -> Result<ApiResponse, RequestError> {
        self.send(target, body, init).await
    }

    /// Push an edited row to the update endpoint.
    pub async fn update(
        &self,
        target: &RequestTarget,
        body: &RowData,
        init: Option<&RequestInit>,
    ) -> Result<ApiResponse, RequestError> {
        self.send(target, body, init).await
    }

    /// Ask the delete endpoint to drop a row.
    pub async fn remove(
        &self,
        target: &RequestTarget,
        body: &RowData,
        init: Option<&RequestInit>,
    ) -> Result<ApiResponse, RequestError> {
        self.send(target, body, init).await
    }

    /// Issue one request. Non-2xx statuses come back as
    /// [`RequestError::Status`], an unparsable JSON body as
    /// [`RequestError::Parse`], anything else as [`RequestError::Unknown`].
    /// Nothing is retried here.
    #[tracing::instrument(skip(self, body), fields(url = %target.url, method = %target.method))]
    pub async fn send(
        &self,
        target: &RequestTarget,
        body: &RowData,
        init: Option<&RequestInit>,
    ) -> Result<ApiResponse, RequestError> {
        let method = init
            .and_then(|i| i.method.clone())
            .unwrap_or_else(|| target.method.clone());

        let mut request = self.client.request(method, &target.url);
        if let Some(init) = init {
            for (name, value) in &init.headers {
                request = request.header(name, value);
            }
        }
        let request = match target.format {
            BodyFormat::Json => request.json(body),
            BodyFormat::FormData => request.multipart(form_from(body)),
        };

        let response = request.send().await.map_err(|err| RequestError::Unknown {
            message: err.to_string(),
        })?;

        let status = response.status();
        let url = response.url().to_string();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                status_text,
                url,
            });
        }

        let text = response.text().await.map_err(|err| RequestError::Unknown {
            message: err.to_string(),
        })?;
        let data = if text.trim().is_empty() {
            // A bare 2xx with no body (204 on delete, typically).
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(RequestError::Parse)?
        };

        Ok(ApiResponse {
            url,
            status: status.as_u16(),
            status_text,
            data,
        })
    }
}

/// Multipart encoding stringifies every value, nested structures included.
fn form_from(body: &RowData) -> multipart::Form {
    let mut form = multipart::Form::new();
    for (key, value) in body {
        form = form.text(key.clone(), value_to_display(value));
    }
    form
}

impl Transport for HttpClient {
    fn dispatch<'a>(
        &'a self,
        target: &'a RequestTarget,
        body: &'a RowData,
    ) -> BoxFuture<'a, Result<ApiResponse, RequestError>> {
        Box::pin(self.send(target, body, None))
    }
}
