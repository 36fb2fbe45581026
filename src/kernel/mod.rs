//! The conversation kernel: a pure state machine plus the types it speaks.
//!
//! Nothing in here performs I/O. The controller turns events into
//! [`effect::SideEffect`]s and the driver carries them out.

pub mod controller;
pub mod effect;
pub mod event;
pub mod modal;
pub mod phase;
pub mod session;
pub mod suggestion;
pub mod telemetry;
