use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kernel::modal::FormKind;
use crate::kernel::session::{Session, SessionId};

/// What the user said: free text or a quick-reply event. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Query {
    #[serde(rename = "message")]
    Message(String),
    #[serde(rename = "event")]
    Event(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub session_id: SessionId,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub query: Query,
}

impl MessageRequest {
    pub fn new(session: &Session, query: Query) -> Self {
        Self {
            session_id: session.id(),
            name: session.name.clone(),
            email: session.email.clone(),
            query,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub confirm_modal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogReply {
    pub reply: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub payload: Option<ReplyPayload>,
    /// Backend classified with its secondary model. Informational only.
    #[serde(default)]
    pub gpt_fallback: bool,
}

impl DialogReply {
    pub fn new(reply: &str, intent: &str) -> Self {
        Self {
            reply: reply.to_string(),
            intent: intent.to_string(),
            payload: None,
            gpt_fallback: false,
        }
    }

    pub fn with_confirm_modal(mut self, kind: FormKind) -> Self {
        self.payload = Some(ReplyPayload {
            confirm_modal: Some(kind.as_str().to_string()),
        });
        self
    }

    /// Form the backend wants opened next, if any. Unknown kinds are ignored.
    pub fn confirm_modal(&self) -> Option<FormKind> {
        let raw = self.payload.as_ref()?.confirm_modal.as_deref()?;
        match raw.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("Ignoring confirm_modal directive: {}", e);
                None
            }
        }
    }
}

/// Opaque acknowledgement from the form endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAck {
    #[serde(default)]
    pub status: Option<String>,
}

impl FormAck {
    pub fn ok() -> Self {
        Self { status: Some("ok".to_string()) }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("ok"))
    }
}
