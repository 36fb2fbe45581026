use std::collections::VecDeque;
use super::event::{ModalSource, TelemetryEvent, TurnKind, TurnOutcome};

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub phase_transitions: u64,
    pub turn_stats: TurnStats,
    pub modal_stats: ModalStats,
    pub rating_stats: RatingStats,
    pub rejected_actions: u64,
    /// Events pushed out of the recorder's window.
    pub evicted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TurnStats {
    pub messages: u64,
    pub events: u64,
    pub forms: u64,
    pub replied: u64,
    pub failed: u64,
    pub stale_discarded: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ModalStats {
    pub opened_by_quick_reply: u64,
    pub opened_by_server: u64,
    pub submitted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RatingStats {
    pub count: u64,
    pub total_stars: u64,
    pub avg_stars: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::PhaseTransition { .. } => snap.phase_transitions += 1,
            TelemetryEvent::TurnDispatched { kind, .. } => match kind {
                TurnKind::Message => snap.turn_stats.messages += 1,
                TurnKind::Event => snap.turn_stats.events += 1,
                TurnKind::Form => snap.turn_stats.forms += 1,
            },
            TelemetryEvent::TurnResolved { outcome, .. } => match outcome {
                TurnOutcome::Replied => snap.turn_stats.replied += 1,
                TurnOutcome::Failed => snap.turn_stats.failed += 1,
            },
            TelemetryEvent::StaleDiscarded { .. } => snap.turn_stats.stale_discarded += 1,
            TelemetryEvent::ModalOpened { source, .. } => match source {
                ModalSource::QuickReply => snap.modal_stats.opened_by_quick_reply += 1,
                ModalSource::ServerDirective => snap.modal_stats.opened_by_server += 1,
            },
            TelemetryEvent::FormSubmitted { .. } => snap.modal_stats.submitted += 1,
            TelemetryEvent::Rated { stars } => {
                snap.rating_stats.count += 1;
                snap.rating_stats.total_stars += u64::from(*stars);
            }
            TelemetryEvent::RejectedAction { .. } => snap.rejected_actions += 1,
        }
    }

    if snap.rating_stats.count > 0 {
        snap.rating_stats.avg_stars = snap.rating_stats.total_stars as f64 / snap.rating_stats.count as f64;
    }

    snap
}
