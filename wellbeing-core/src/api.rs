use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "wellbeing/1";

/// Operations offered to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WellbeingRequest {
    Health,
    SubmitSurvey {
        stress: i64,
        workload: i64,
        satisfaction: i64,
        #[serde(default)]
        notes: Option<String>,
    },
    GetMetrics,
    GetRecentResponses {
        limit: Option<u32>,
    },
    GetAllResponses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Store,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WellbeingResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub version: String,
}

impl WellbeingResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            error_kind: None,
            version: API_VERSION.to_string(),
        }
    }

    pub fn err(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            error_kind: Some(kind),
            version: API_VERSION.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
