use serde::{Deserialize, Serialize};

use super::modal::FormValues;
use crate::services::dialog::{DialogReply, FormAck, NetworkError};

/// Identity of one round trip. `epoch` moves on every open/close, `turn` on
/// every dispatch. Completions are only honoured when their token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnToken {
    pub epoch: u64,
    pub turn: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Bot,
}

/// One transcript bubble. Immutable once rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: Origin,
    pub text: String,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self { origin: Origin::User, text: text.to_string() }
    }

    pub fn bot(text: &str) -> Self {
        Self { origin: Origin::Bot, text: text.to_string() }
    }
}

/// Things the person at the widget can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Launcher click.
    Open,
    /// Header close button.
    Close,
    SubmitPrechat { name: String, email: String },
    SendMessage(String),
    /// Index into the suggestion row currently on screen.
    SelectSuggestion(usize),
    SubmitForm(FormValues),
    CancelForm,
    Rate(u8),
}

#[derive(Debug)]
pub enum Event {
    Input(UserAction),
    ReplyReceived {
        turn: TurnToken,
        result: Result<DialogReply, NetworkError>,
    },
    FormAcknowledged {
        turn: TurnToken,
        result: Result<FormAck, NetworkError>,
    },
    /// The reading pause after a bot reply is over.
    PaceElapsed { turn: TurnToken },
}

impl From<UserAction> for Event {
    fn from(action: UserAction) -> Self {
        Event::Input(action)
    }
}
