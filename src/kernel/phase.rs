use serde::{Deserialize, Serialize};

/// The visible state of the widget. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationPhase {
    /// Widget collapsed, nothing rendered.
    Closed,
    /// Name/email capture. Message input disabled.
    Prechat,
    /// Free messaging and quick replies.
    Active,
    /// A message or event is in flight, or a server-requested form is about
    /// to open. Input disabled.
    AwaitingReply,
    /// Support/sales form on screen.
    ModalOpen,
    /// One-shot star prompt after a form submission. Free text stays open
    /// and dismisses the prompt.
    Rating,
}

impl Default for ConversationPhase {
    fn default() -> Self {
        Self::Closed
    }
}

impl ConversationPhase {
    /// Whether the free-text input and send button are enabled.
    pub fn accepts_input(&self) -> bool {
        matches!(self, ConversationPhase::Active | ConversationPhase::Rating)
    }
}

/// Requests for a phase change. The graph decides whether they are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRequest {
    Open,
    Close,
    PrechatCompleted,
    TurnDispatched,
    ReplyResolved,
    OpenForm,
    FormCancelled,
    FormSubmitted,
    Rated,
    RatingDismissed,
}

pub struct PhaseGraph;

impl PhaseGraph {
    /// Pure function: (Current Phase, Request) -> New Phase
    /// Returns None if the transition is illegal from `current`.
    pub fn transition(current: ConversationPhase, request: PhaseRequest) -> Option<ConversationPhase> {
        use ConversationPhase::*;
        use PhaseRequest::*;

        match (current, request) {
            (Closed, Open) => Some(Prechat),
            (Closed, Close) => None,
            (_, Close) => Some(Closed),

            (Prechat, PrechatCompleted) => Some(Active),

            (Active, TurnDispatched) => Some(AwaitingReply),
            (AwaitingReply, ReplyResolved) => Some(Active),

            // Local quick reply, or a server directive once the pause is over.
            (Active, OpenForm) | (AwaitingReply, OpenForm) => Some(ModalOpen),

            (ModalOpen, FormCancelled) => Some(Active),
            (ModalOpen, FormSubmitted) => Some(Rating),

            (Rating, Rated) | (Rating, RatingDismissed) => Some(Active),

            _ => None,
        }
    }
}
