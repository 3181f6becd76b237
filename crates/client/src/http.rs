use std::time::Instant;

use async_trait::async_trait;
use protocol::{
    AnalysisRequest, AnalysisResult, AskRequest, AskResponse, CitedDocument, HealthStatus,
    ResetSessionRequest, SearchHit, SearchQuery, ANALYSIS_PATH, ASK_PATH, HEALTH_PATH,
    RESET_SESSION_PATH, SEARCH_PATH,
};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ANALYSIS_REJECTED_FALLBACK, ASK_REJECTED_FALLBACK};

/// The bot's reply to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskAnswer {
    pub text: String,
    pub documents: Vec<CitedDocument>,
}

/// Backend operations the form and chat controllers depend on.
#[async_trait]
pub trait MortgageApi: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError>;
    async fn ask(&self, request: &AskRequest) -> Result<AskAnswer, ClientError>;
    async fn reset_session(&self, session_id: &str) -> Result<(), ClientError>;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("hipoteca-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::connectivity)?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Link for a cited document, resolved against the backend origin.
    pub fn document_url(&self, url: &str) -> String {
        document_url(&self.base_url, url)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = join_base_path(&self.base_url, HEALTH_PATH)?;
        let started = Instant::now();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| transport_error(HEALTH_PATH, err))?;
        let status = response.status();
        tracing::debug!(
            endpoint = HEALTH_PATH,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend response"
        );
        if !status.is_success() {
            return Err(ClientError::Connectivity(format!("HTTP {status}")));
        }
        response
            .json::<HealthStatus>()
            .await
            .map_err(|err| transport_error(HEALTH_PATH, err))
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, ClientError> {
        let url = join_base_path(&self.base_url, SEARCH_PATH)?;
        let mut query = query.clone();
        query.top_k = query.top_k.clamp(1, SearchQuery::MAX_TOP_K);
        query.min_score = query.min_score.clamp(0.0, 1.0);
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|err| transport_error(SEARCH_PATH, err))?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| transport_error(SEARCH_PATH, err))?;
        if !status.is_success() {
            return Err(ClientError::Rejected(
                detail_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }
        serde_json::from_value(body).map_err(ClientError::connectivity)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<Value, ClientError> {
        let url = join_base_path(&self.base_url, path)?;
        let started = Instant::now();
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| transport_error(path, err))?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| transport_error(path, err))?;
        tracing::info!(
            endpoint = path,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend response"
        );
        Ok(body)
    }
}

#[async_trait]
impl MortgageApi for ApiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        let body = self.post_json(ANALYSIS_PATH, request).await?;
        parse_analysis(body)
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskAnswer, ClientError> {
        let body = self.post_json(ASK_PATH, request).await?;
        parse_answer(body)
    }

    async fn reset_session(&self, session_id: &str) -> Result<(), ClientError> {
        let url = join_base_path(&self.base_url, RESET_SESSION_PATH)?;
        let payload = ResetSessionRequest {
            session_id: session_id.to_string(),
        };
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| transport_error(RESET_SESSION_PATH, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Connectivity(format!("HTTP {status}")));
        }
        Ok(())
    }
}

/// Interprets the body of `POST /analisis`. Anything other than `ok: true`
/// is a rejection carrying the server's text.
pub fn parse_analysis(body: Value) -> Result<AnalysisResult, ClientError> {
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| detail_message(&body))
            .unwrap_or_else(|| ANALYSIS_REJECTED_FALLBACK.to_string());
        return Err(ClientError::Rejected(message));
    }
    serde_json::from_value(body).map_err(ClientError::connectivity)
}

pub fn parse_answer(body: Value) -> Result<AskAnswer, ClientError> {
    if let Some(message) = detail_message(&body) {
        return Err(ClientError::Rejected(message));
    }
    let response: AskResponse = serde_json::from_value(body).map_err(ClientError::connectivity)?;
    if response.ok == Some(false) {
        return Err(ClientError::Rejected(
            response
                .error
                .unwrap_or_else(|| ASK_REJECTED_FALLBACK.to_string()),
        ));
    }
    let Some(text) = response.respuesta else {
        return Err(ClientError::Connectivity(
            "response without respuesta".to_string(),
        ));
    };
    Ok(AskAnswer {
        text,
        documents: response.documentos_usados.unwrap_or_default(),
    })
}

/// Flattens a FastAPI error body (`{"detail": ...}`) into one line.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect::<Vec<_>>();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

fn transport_error(endpoint: &'static str, err: reqwest::Error) -> ClientError {
    tracing::warn!(
        endpoint,
        is_timeout = err.is_timeout(),
        is_connect = err.is_connect(),
        is_decode = err.is_decode(),
        error = %err,
        "backend request failed"
    );
    ClientError::connectivity(err)
}

fn normalize_base_url(base: &str) -> Result<String, ClientError> {
    let trimmed = base.trim().trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).map_err(|err| ClientError::InvalidBaseUrl(format!("{base}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme {other}"
        ))),
    }
}

pub fn join_base_path(base: &str, path: &str) -> Result<String, ClientError> {
    if base.trim().is_empty() {
        return Err(ClientError::InvalidBaseUrl("base_url is empty".to_string()));
    }
    let normalized_base = base.trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(format!("{normalized_base}{normalized_path}"))
}

pub fn document_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    join_base_path(base, url).unwrap_or_else(|_| url.to_string())
}
