//! The canvases API client.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use canvas_core::config::Config;
use canvas_core::{
    Canvas, CanvasContent, CanvasError, CanvasFormData, ProcessCommand, ProcessContentRequest,
    ProcessedContent, Result,
};

use crate::Operation;
use crate::auth::{EnvToken, NoToken, StaticToken, TokenProvider};
use crate::logging::{FailureLogger, TracingLogger};

const API_PREFIX: &str = "api/v1/canvases";

/// Stateless client for canvas CRUD and content processing.
///
/// Clones share the underlying connection pool; every call is an independent
/// request, so any number may be in flight at once.
#[derive(Clone)]
pub struct CanvasClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
    logger: Arc<dyn FailureLogger>,
}

impl CanvasClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            tokens,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Build a client from config. A direct token is fixed at construction;
    /// `token_env` is read on every request.
    pub fn from_config(config: &Config) -> Self {
        let client = config.client.as_ref();
        let token = client.and_then(|c| c.token.clone()).filter(|t| !t.is_empty());
        let token_env = client.and_then(|c| c.token_env.clone());
        let tokens: Arc<dyn TokenProvider> = match (token, token_env) {
            (Some(token), _) => Arc::new(StaticToken::new(token)),
            (None, Some(var)) => Arc::new(EnvToken::new(var)),
            (None, None) => Arc::new(NoToken),
        };
        Self::new(&config.base_url(), tokens)
    }

    pub fn with_logger(mut self, logger: Arc<dyn FailureLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Use a preconfigured transport (timeouts, proxies, TLS roots).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    /// `GET canvases/{id}`
    pub async fn get_canvas_by_id(&self, id: &str) -> Result<Canvas> {
        let op = Operation::GetCanvas { id };
        let response = self.send(op, Method::GET, id, None::<&()>).await?;
        self.decode(op, response).await
    }

    /// `GET canvases/`, in server order.
    pub async fn get_canvases(&self) -> Result<Vec<Canvas>> {
        let op = Operation::ListCanvases;
        let response = self.send(op, Method::GET, "", None::<&()>).await?;
        self.decode(op, response).await
    }

    /// `POST canvases/new`
    pub async fn create_canvas(&self, form: &CanvasFormData) -> Result<Canvas> {
        let op = Operation::CreateCanvas;
        let response = self.send(op, Method::POST, "new", Some(form)).await?;
        self.decode(op, response).await
    }

    /// `POST canvases/{id}`. The server takes updates as POST, not PATCH/PUT.
    pub async fn update_canvas_by_id(&self, id: &str, form: &CanvasFormData) -> Result<Canvas> {
        let op = Operation::UpdateCanvas { id };
        let response = self.send(op, Method::POST, id, Some(form)).await?;
        self.decode(op, response).await
    }

    /// `DELETE canvases/{id}`. The success body is ignored.
    pub async fn delete_canvas_by_id(&self, id: &str) -> Result<()> {
        let op = Operation::DeleteCanvas { id };
        self.send(op, Method::DELETE, id, None::<&()>).await?;
        Ok(())
    }

    /// `POST canvases/{id}/process_content`
    pub async fn process_canvas_content(
        &self,
        id: &str,
        content: impl Into<CanvasContent>,
        command: impl Into<ProcessCommand>,
        model_id: Option<&str>,
    ) -> Result<ProcessedContent> {
        let op = Operation::ProcessContent { id };
        let body = ProcessContentRequest {
            content: content.into(),
            command: command.into(),
            model_id: model_id.map(str::to_string),
        };
        let path = format!("{id}/process_content");
        let response = self.send(op, Method::POST, &path, Some(&body)).await?;
        self.decode(op, response).await
    }

    /// Send one request; any non-success status becomes a logged error.
    async fn send<B: Serialize + ?Sized>(
        &self,
        op: Operation<'_>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.url(path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.tokens.token().await {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(operation = op.name(), %method, %url, "Sending canvas request");

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                return Err(self.fail(&op, CanvasError::request_failed(None, e.to_string())));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = reason_phrase(&response);
        let body = response.text().await.unwrap_or_default();
        let message = failure_message(&op, reason.as_deref(), &body);
        Err(self.fail(&op, CanvasError::request_failed(Some(status.as_u16()), message)))
    }

    async fn decode<T: DeserializeOwned>(&self, op: Operation<'_>, response: Response) -> Result<T> {
        let status = response.status().as_u16();
        let decoded: std::result::Result<T, String> = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        decoded.map_err(|e| {
            self.fail(
                &op,
                CanvasError::request_failed(Some(status), format!("Failed to decode response: {e}")),
            )
        })
    }

    fn fail(&self, op: &Operation<'_>, err: CanvasError) -> CanvasError {
        self.logger.request_failed(op, &err);
        err
    }
}

/// Status text as sent by the server, falling back to the canonical phrase.
fn reason_phrase(response: &Response) -> Option<String> {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|r| std::str::from_utf8(r.as_bytes()).ok())
        .filter(|r| !r.is_empty())
        .or_else(|| response.status().canonical_reason())
        .map(str::to_string)
}

/// Pick the message for a non-success response.
///
/// A JSON body's `detail` wins; JSON without a usable `detail` gets the
/// operation fallback; anything else gets the status text.
fn failure_message(op: &Operation<'_>, status_text: Option<&str>, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {
                op.fallback_message()
            }
            Some(other) => other.to_string(),
        },
        Err(_) => op
            .unparseable_body_message()
            .or(status_text)
            .map(str::to_string)
            .unwrap_or_else(|| op.fallback_message()),
    }
}
