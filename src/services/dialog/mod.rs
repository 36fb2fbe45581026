//! Round trips to the remote dialog service.
//!
//! Two operations only: a message/event turn and a structured form post.
//! Neither retries; a failure is reported once and the user decides.

pub mod client;
pub mod types;

pub use client::{DialogBackend, HttpDialogClient, NetworkError};
pub use types::{DialogReply, FormAck, MessageRequest, Query, ReplyPayload};
