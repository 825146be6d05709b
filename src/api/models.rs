use serde::{Deserialize, Serialize};

/// A macro-liquidity indicator from the registry. Loaded once at startup and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub directionality: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    /// Constituent series ids, in registry order.
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub interpretation: Option<String>,
}

/// An underlying data series from the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub source: String,
    pub cadence: String,
    pub units: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub interpretation: Option<String>,
}

/// One observation in a time series. The date stays a string on the wire;
/// parsing happens in the chart fetch layer where bad dates drop the point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: String,
    pub value: f64,
}

/// Time-series payload for one indicator or series id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<DataPoint>,
}

/// One stored chat turn from `GET /llm/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// Response of `POST /llm/brief`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefResponse {
    #[serde(default)]
    pub markdown: String,
}

/// Payload of the `final` SSE event on the chat stream.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalPayload {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub tool_trace: Vec<serde_json::Value>,
}

/// Payload of the `thinking_token` SSE event.
#[derive(Debug, Clone, Deserialize)]
pub struct ThinkingPayload {
    #[serde(default)]
    pub text: String,
}
