//! Error taxonomy for the dashboard
//!
//! Four categories with different propagation rules:
//! - `Network`: transport failure or a non-2xx response without a parseable body.
//!   Logged, prior UI state left intact.
//! - `Server`: non-2xx response carrying a structured `detail` payload. Shown to the user.
//! - `NotFound`: unknown screen/modal identifier or an entity missing from a list.
//!   Programming error, logged only.
//! - `Precondition`: a user action attempted without its required prior state. Shown to the user.

use serde::Deserialize;
use std::fmt;

/// Top-level error type shared by the API client and the orchestrator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: ServerDetail },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Precondition(#[from] PreconditionError),
}

impl DashboardError {
    /// Whether this error should be surfaced to the user rather than only logged
    pub fn is_user_facing(&self) -> bool {
        matches!(self, DashboardError::Server { .. } | DashboardError::Precondition(_))
    }

    /// Text suitable for an error banner
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Server { detail, .. } => detail.to_string(),
            DashboardError::Precondition(p) => p.to_string(),
            DashboardError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            DashboardError::NotFound(what) => format!("{} was not found", what),
        }
    }

    /// Log the error at the level its category calls for
    pub fn log(&self, context: &str) {
        match self {
            DashboardError::NotFound(_) => log::error!("{}: {}", context, self),
            DashboardError::Network(_) => log::warn!("{}: {}", context, self),
            _ => log::info!("{}: {}", context, self),
        }
    }
}

/// The `detail` field of a FastAPI error body: either a message or a list of validation issues
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServerDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl fmt::Display for ServerDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerDetail::Message(msg) => write!(f, "{}", msg),
            ServerDetail::Validation(issues) => {
                let parts: Vec<String> = issues
                    .iter()
                    .map(|issue| {
                        let field = issue
                            .loc
                            .iter()
                            .filter(|part| part.as_str() != Some("body"))
                            .map(|part| match part {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".");
                        if field.is_empty() {
                            issue.msg.clone()
                        } else {
                            format!("{}: {}", field, issue.msg)
                        }
                    })
                    .collect();
                write!(f, "{}", parts.join("; "))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ServerDetail,
}

impl ServerDetail {
    /// Parse an error response body, returning None when it has no `detail`
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.detail)
    }
}

/// A user action attempted without the state it depends on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("Save the lecture before running an analysis")]
    NoLecture,

    #[error("Upload a lecture video before running an analysis")]
    NoVideo,

    #[error("An analysis for lecture {lecture_id} is already {state}")]
    JobInFlight { lecture_id: String, state: &'static str },

    #[error("Open a course first")]
    NoCourse,

    #[error("Choose a file to upload first")]
    NoFile,

    #[error("Open a lecture first")]
    NoLectureSelected,
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_detail() {
        let detail = ServerDetail::parse(r#"{"detail": "Class not found"}"#).unwrap();
        assert_eq!(detail, ServerDetail::Message("Class not found".to_string()));
        assert_eq!(detail.to_string(), "Class not found");
    }

    #[test]
    fn test_parse_validation_detail() {
        let body = r#"{"detail": [{"loc": ["body", "totalLectures"], "msg": "value is not a valid integer", "type": "type_error.integer"}]}"#;
        let detail = ServerDetail::parse(body).unwrap();
        assert_eq!(detail.to_string(), "totalLectures: value is not a valid integer");
    }

    #[test]
    fn test_unparseable_body_has_no_detail() {
        assert!(ServerDetail::parse("<html>Bad Gateway</html>").is_none());
        assert!(ServerDetail::parse(r#"{"message": "nope"}"#).is_none());
    }

    #[test]
    fn test_propagation_policy() {
        assert!(DashboardError::from(PreconditionError::NoVideo).is_user_facing());
        assert!(DashboardError::Server { status: 400, detail: ServerDetail::Message("bad".into()) }.is_user_facing());
        assert!(!DashboardError::Network("timeout".into()).is_user_facing());
        assert!(!DashboardError::NotFound("screen-nope".into()).is_user_facing());
    }
}
