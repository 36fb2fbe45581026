use super::event::{Message, TurnToken};
use super::modal::{FormKind, FormSubmission};
use super::suggestion::SuggestionSet;
use crate::outputs::transcript::TranscriptView;
use crate::services::dialog::MessageRequest;

/// Instructions for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetVisible(bool),
    Clear,
    ShowPrechat { name: String, email: String },
    SetInputEnabled(bool),
    AppendMessage(Message),
    ShowSuggestions(SuggestionSet),
    ClearSuggestions,
    OpenModal(FormKind),
    CloseModal,
    ShowRating,
    ClearRating,
}

impl ViewCommand {
    pub fn apply_to<V: TranscriptView + ?Sized>(self, view: &mut V) {
        match self {
            ViewCommand::SetVisible(visible) => view.set_visible(visible),
            ViewCommand::Clear => view.clear(),
            ViewCommand::ShowPrechat { name, email } => view.show_prechat(&name, &email),
            ViewCommand::SetInputEnabled(enabled) => view.set_input_enabled(enabled),
            ViewCommand::AppendMessage(message) => view.append_message(message.origin, &message.text),
            ViewCommand::ShowSuggestions(set) => view.show_suggestions(&set),
            ViewCommand::ClearSuggestions => view.clear_suggestions(),
            ViewCommand::OpenModal(kind) => view.open_modal(kind),
            ViewCommand::CloseModal => view.close_modal(),
            ViewCommand::ShowRating => view.show_rating(),
            ViewCommand::ClearRating => view.clear_rating(),
        }
    }
}

/// Output of a controller step. The driver executes these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Render(ViewCommand),
    SendMessage { turn: TurnToken, request: MessageRequest },
    SubmitForm { turn: TurnToken, submission: FormSubmission },
    /// Start the reading pause; answer with `Event::PaceElapsed`.
    SchedulePace { turn: TurnToken },
    /// Drop every pacing timer still pending.
    CancelPacing,
}

impl SideEffect {
    pub fn is_network(&self) -> bool {
        matches!(self, SideEffect::SendMessage { .. } | SideEffect::SubmitForm { .. })
    }
}

impl From<ViewCommand> for SideEffect {
    fn from(cmd: ViewCommand) -> Self {
        SideEffect::Render(cmd)
    }
}
