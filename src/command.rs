//! Command data model and wire types
//!
//! A `Command` is produced by the gateway from validated client input and
//! consumed exactly once by the motion dispatcher. Wire replies follow the
//! original client protocol: a `status` field plus an optional `message`
//! or `response`.

use serde::{Deserialize, Serialize};

/// Abstract command identifiers driving dispatch.
///
/// Unknown action strings survive parsing as `Other` so the dispatcher can
/// log and discard them instead of failing the relay hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Home,
    Open,
    Close,
    Other(String),
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "up" => Action::Up,
            "down" => Action::Down,
            "left" => Action::Left,
            "right" => Action::Right,
            "home" => Action::Home,
            "open" => Action::Open,
            "close" => Action::Close,
            _ => Action::Other(value),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Up => "up".to_string(),
            Action::Down => "down".to_string(),
            Action::Left => "left".to_string(),
            Action::Right => "right".to_string(),
            Action::Home => "home".to_string(),
            Action::Open => "open".to_string(),
            Action::Close => "close".to_string(),
            Action::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Other(s) => write!(f, "{}", s),
            _ => write!(f, "{}", String::from(self.clone())),
        }
    }
}

/// A validated command. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: Action,
    /// Optional command-specific parameters, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Command {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: None,
        }
    }
}

/// Per-message reply sent to gateway clients, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl Reply {
    /// One-time acknowledgement sent when a client connects.
    pub fn welcome() -> Self {
        Self {
            status: "ok".to_string(),
            message: Some("Connected to robot server".to_string()),
            response: None,
        }
    }

    /// Success envelope carrying the relay's acknowledgement text.
    pub fn ok_response(response: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
            response: Some(response.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
