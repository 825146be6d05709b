use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api::errors::ApiError;
use crate::api::models::{BriefResponse, DataResponse, HistoryResponse, Indicator, Series};

/// Backend base URL when `LIQUIDITY_PULSE_API` is unset.
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Caller-supplied LLM credential, sent per-request as headers and never
/// stored server-side.
#[derive(Debug, Clone)]
pub struct ChatCredentials {
    pub api_key: String,
    pub provider: String,
}

/// Thin wrapper over the backend HTTP collaborator. Cloning is cheap; the
/// inner reqwest client shares its connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build a client from the `LIQUIDITY_PULSE_API` environment variable,
    /// falling back to localhost.
    pub fn from_env() -> Self {
        let base = std::env::var("LIQUIDITY_PULSE_API")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status(status, body));
        }
        Ok(resp.json::<T>().await?)
    }

    /// `GET /live/indicators` — the indicator catalog.
    pub async fn indicators(&self) -> Result<Vec<Indicator>, ApiError> {
        self.get_json("/live/indicators").await
    }

    /// `GET /live/series-list` — the series catalog.
    pub async fn series_list(&self) -> Result<Vec<Series>, ApiError> {
        self.get_json("/live/series-list").await
    }

    /// `GET /live/indicators/{id}?days=N` — recent data for one indicator.
    pub async fn indicator_data(&self, id: &str, days: u32) -> Result<DataResponse, ApiError> {
        self.get_json(&format!("/live/indicators/{id}?days={days}"))
            .await
    }

    /// `GET /live/series/{id}?days=N` — recent data for one series.
    pub async fn series_data(&self, id: &str, days: u32) -> Result<DataResponse, ApiError> {
        self.get_json(&format!("/live/series/{id}?days={days}")).await
    }

    /// `GET /llm/history?session_id=` — stored chat turns for the session.
    pub async fn chat_history(&self, session_id: &str) -> Result<HistoryResponse, ApiError> {
        let resp = self
            .http
            .get(self.url("/llm/history"))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status(status, body));
        }
        Ok(resp.json().await?)
    }

    /// `DELETE /llm/history?session_id=` — clear the stored session.
    pub async fn clear_chat_history(&self, session_id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url("/llm/history"))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status(status, body));
        }
        Ok(())
    }

    /// `POST /llm/brief` — generate the daily liquidity brief.
    pub async fn brief(&self, creds: &ChatCredentials) -> Result<BriefResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/llm/brief"))
            .header("X-LLM-API-Key", &creds.api_key)
            .header("X-LLM-Provider", &creds.provider)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status(status, body));
        }
        Ok(resp.json().await?)
    }

    /// `GET /llm/ask_stream` — open the server-sent-event answer stream.
    /// The caller consumes `bytes_stream()` through [`crate::api::sse::SseDecoder`].
    pub async fn ask_stream(
        &self,
        question: &str,
        session_id: &str,
        creds: &ChatCredentials,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .get(self.url("/llm/ask_stream"))
            .query(&[("question", question), ("session_id", session_id)])
            .header("X-LLM-API-Key", &creds.api_key)
            .header("X-LLM-Provider", &creds.provider)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status(status, body));
        }
        Ok(resp)
    }
}
