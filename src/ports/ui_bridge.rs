//! UI Bridge Port - Message vocabulary shared with the presentation layer.
//!
//! Both directions use JSON objects tagged by a `command` field:
//!
//! - Core → Panel: `stream`, `source`, `complete`, `error`
//! - Panel → Core: `submit`, `setContext`, `selectModel`, `openChatWindow`,
//!   `webviewError`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================
// Core → Panel
// ============================================

/// Events sent from the core to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiEvent {
    /// Append text to the answer being streamed.
    Stream { content: String },
    /// One citation; the panel prepends it to its source list.
    Source { content: String },
    /// The answer is final; the panel may accept new input.
    Complete,
    /// Something went wrong.
    Error { content: serde_json::Value },
}

impl UiEvent {
    pub fn stream(content: impl Into<String>) -> Self {
        Self::Stream {
            content: content.into(),
        }
    }

    pub fn source(content: impl Into<String>) -> Self {
        Self::Source {
            content: content.into(),
        }
    }

    /// Error carrying a plain message.
    pub fn error_message(message: impl Into<String>) -> Self {
        Self::Error {
            content: serde_json::Value::String(message.into()),
        }
    }

    /// Error carrying a structured payload (e.g. an API error body).
    pub fn error_payload(content: serde_json::Value) -> Self {
        Self::Error { content }
    }
}

// ============================================
// Panel → Core
// ============================================

/// Commands received from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PanelCommand {
    /// New user text.
    Submit { content: String },

    /// The panel's copy of the turn it just displayed.
    SetContext {
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        response: Option<String>,
    },

    /// Model chosen in the selector.
    SelectModel { content: String },

    /// Open a fresh chat window.
    OpenChatWindow,

    /// Script error reported by the panel.
    WebviewError {
        #[serde(default)]
        content: serde_json::Value,
    },
}

// ============================================
// Delivery
// ============================================

/// Port for delivering UI events to the presentation layer.
///
/// Implementations must deliver events in the order `emit` is called.
#[async_trait]
pub trait UiEventSink: Send + Sync {
    async fn emit(&self, event: UiEvent) -> Result<(), BridgeError>;
}

/// Errors while talking to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("presentation layer disconnected")]
    Disconnected,

    #[error("bridge I/O error: {0}")]
    Io(String),

    #[error("malformed panel message: {0}")]
    Malformed(String),
}
