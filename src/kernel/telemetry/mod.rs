//! Conversation telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel. The controller never reads it
//! back when deciding what to render next.
//!
//! # PRIVACY INVARIANT
//! Events carry no user content: no message text, names or emails. Only
//! phases, turn tokens, form kinds and counts.

pub mod event;
pub mod metrics;
pub mod recorder;
