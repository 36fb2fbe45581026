use crate::kernel::event::{Message, Origin};
use crate::kernel::modal::FormKind;
use crate::kernel::suggestion::SuggestionSet;

/// The host surface the widget draws into. Implementations render; they
/// never decide anything.
pub trait TranscriptView {
    /// Appends a bubble and scrolls it into view.
    fn append_message(&mut self, origin: Origin, text: &str);
    /// Replaces any suggestion row with `set`.
    fn show_suggestions(&mut self, set: &SuggestionSet);
    fn clear_suggestions(&mut self);
    /// Empties the log, including suggestion and rating rows.
    fn clear(&mut self);

    fn set_visible(&mut self, visible: bool);
    fn show_prechat(&mut self, name: &str, email: &str);
    fn set_input_enabled(&mut self, enabled: bool);
    fn open_modal(&mut self, kind: FormKind);
    fn close_modal(&mut self);
    fn show_rating(&mut self);
    fn clear_rating(&mut self);
}

/// Keeps what is on screen in memory. Useful for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingTranscript {
    pub visible: bool,
    pub input_enabled: bool,
    /// Prefill of the pre-chat form while it is on screen.
    pub prechat: Option<(String, String)>,
    pub messages: Vec<Message>,
    pub suggestions: Option<SuggestionSet>,
    pub modal: Option<FormKind>,
    pub rating_visible: bool,
    /// How many times a suggestion row was rendered.
    pub suggestion_renders: usize,
}

impl RecordingTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bot_messages(&self) -> Vec<&str> {
        self.texts(Origin::Bot)
    }

    pub fn user_messages(&self) -> Vec<&str> {
        self.texts(Origin::User)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn texts(&self, origin: Origin) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.origin == origin)
            .map(|m| m.text.as_str())
            .collect()
    }
}

impl TranscriptView for RecordingTranscript {
    fn append_message(&mut self, origin: Origin, text: &str) {
        self.messages.push(Message { origin, text: text.to_string() });
    }

    fn show_suggestions(&mut self, set: &SuggestionSet) {
        self.suggestions = Some(set.clone());
        self.suggestion_renders += 1;
    }

    fn clear_suggestions(&mut self) {
        self.suggestions = None;
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.suggestions = None;
        self.prechat = None;
        self.rating_visible = false;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn show_prechat(&mut self, name: &str, email: &str) {
        self.prechat = Some((name.to_string(), email.to_string()));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn open_modal(&mut self, kind: FormKind) {
        self.modal = Some(kind);
    }

    fn close_modal(&mut self) {
        self.modal = None;
    }

    fn show_rating(&mut self) {
        self.rating_visible = true;
    }

    fn clear_rating(&mut self) {
        self.rating_visible = false;
    }
}
