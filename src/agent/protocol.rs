//! Request/response contract between the orchestration layer and a page
//! agent. Failures are reported in the response body, never thrown; a host
//! message-passing adapter only has to serialize these types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AgentRequest {
    ApplyHideAtPoint { x: f64, y: f64 },
    ApplyShowAtPoint { x: f64, y: f64 },
    HideBySelector { selector: String, url: String },
    ShowBySelector { selector: String, url: String },
    StartPicker,
    StopPicker,
    /// Reverse the mutation for a pair without touching the stored rule.
    RemoveHiddenElement { selector: String, url: String },
    GetViewportSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResponse {
    Hidden {
        success: bool,
        selector: String,
        url: String,
    },
    Viewport {
        width: f64,
        height: f64,
    },
    Ack {
        success: bool,
    },
    Error {
        error: String,
    },
}

impl AgentResponse {
    pub fn ack(success: bool) -> Self {
        AgentResponse::Ack { success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AgentResponse::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            AgentResponse::Hidden { success, .. } | AgentResponse::Ack { success } => *success,
            AgentResponse::Viewport { .. } => true,
            AgentResponse::Error { .. } => false,
        }
    }
}
