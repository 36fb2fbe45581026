use serde::{Deserialize, Serialize};
use crate::kernel::event::TurnToken;
use crate::kernel::modal::FormKind;
use crate::kernel::phase::ConversationPhase;

// Allowed: tokens, phases, enums, counts
// Forbidden: message text, names, emails

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PhaseTransition {
        from: ConversationPhase,
        to: ConversationPhase,
    },

    TurnDispatched {
        turn: TurnToken,
        kind: TurnKind,
    },

    TurnResolved {
        turn: TurnToken,
        outcome: TurnOutcome,
    },

    /// A completion or timer arrived for a turn that is no longer current.
    StaleDiscarded {
        turn: TurnToken,
    },

    ModalOpened {
        kind: FormKind,
        source: ModalSource,
    },

    FormSubmitted {
        kind: FormKind,
    },

    Rated {
        stars: u8,
    },

    /// An action arrived in a phase that does not offer it.
    RejectedAction {
        phase: ConversationPhase,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnKind {
    Message,
    Event,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Replied,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalSource {
    QuickReply,
    ServerDirective,
}
