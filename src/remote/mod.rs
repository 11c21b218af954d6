// Remote API seams used by the edit workflow. The remote service is opaque;
// these traits capture only the calls the workflow makes.

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::entity::{EntityKind, ReferenceItem, ReferenceKind};
use crate::session::SessionToken;

pub use client::RemoteClient;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Session expired or not authorized")]
    Unauthorized,

    /// The server answered but refused the operation; `message` is meant for the user.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response status {0}")]
    Status(u16),

    #[error("Invalid remote API URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Source of reference lists (e.g. the states autocomplete).
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_reference(
        &self,
        kind: ReferenceKind,
        token: &SessionToken,
    ) -> Result<Vec<ReferenceItem>, RemoteError>;
}

/// Per-kind create/update endpoints.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    async fn create(
        &self,
        kind: EntityKind,
        payload: &Value,
        token: &SessionToken,
    ) -> Result<MutationReply, RemoteError>;

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        payload: &Value,
        token: &SessionToken,
    ) -> Result<MutationReply, RemoteError>;
}

/// Body of a mutation response. Only `status` and `message` carry meaning.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationReply {
    /// Whether `status` reports success. An absent status defers to HTTP.
    pub fn status_ok(&self) -> bool {
        match &self.status {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_u64().map_or(false, |code| (200..300).contains(&code)),
            Some(Value::String(s)) => {
                let s = s.trim().to_ascii_lowercase();
                s == "success" || s == "ok" || s.parse::<u64>().map_or(false, |code| (200..300).contains(&code))
            }
            Some(_) => false,
        }
    }
}

/// Map an HTTP status plus (optional) parsed body onto success or a
/// user-facing failure.
pub fn interpret_mutation(status: u16, reply: Option<MutationReply>) -> Result<MutationReply, RemoteError> {
    if status == 401 {
        return Err(RemoteError::Unauthorized);
    }

    let http_ok = (200..300).contains(&status);
    match reply {
        Some(reply) if http_ok && reply.status_ok() => Ok(reply),
        None if http_ok => Ok(MutationReply::default()),
        Some(reply) => Err(RemoteError::Rejected {
            status,
            message: reply
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| generic_failure(status)),
        }),
        None => Err(RemoteError::Rejected {
            status,
            message: generic_failure(status),
        }),
    }
}

fn generic_failure(status: u16) -> String {
    format!("Request failed with status {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(body: Value) -> Option<MutationReply> {
        serde_json::from_value(body).ok()
    }

    #[test]
    fn success_shapes() {
        assert!(interpret_mutation(200, reply(json!({"message": "Company updated"}))).is_ok());
        assert!(interpret_mutation(201, reply(json!({"status": "success"}))).is_ok());
        assert!(interpret_mutation(200, reply(json!({"status": 200}))).is_ok());
        assert!(interpret_mutation(204, None).is_ok());
    }

    #[test]
    fn failure_in_body_surfaces_server_message() {
        let err = interpret_mutation(200, reply(json!({"status": "error", "message": "Name taken"}))).unwrap_err();
        assert_eq!(err.to_string(), "Name taken");

        let err = interpret_mutation(200, reply(json!({"status": false}))).unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 200");
    }

    #[test]
    fn http_failure_and_unauthorized() {
        let err = interpret_mutation(422, reply(json!({"message": "Invalid zip"}))).unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 422, .. }));
        assert_eq!(err.to_string(), "Invalid zip");

        assert!(matches!(interpret_mutation(500, None), Err(RemoteError::Rejected { status: 500, .. })));
        assert!(matches!(interpret_mutation(401, reply(json!({}))), Err(RemoteError::Unauthorized)));
    }
}
