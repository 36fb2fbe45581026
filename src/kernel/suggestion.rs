use serde::{Deserialize, Serialize};

use super::modal::FormKind;

pub const EVENT_SUPPORT_REQUEST: &str = "SUPPORT_REQUEST";
pub const EVENT_TICKET_STATUS: &str = "TICKET_STATUS";
pub const EVENT_CONTACT_SALES: &str = "CONTACT_SALES";
pub const EVENT_SPEAK_TO_AGENT: &str = "SPEAK_TO_AGENT";

/// Label/event catalogue. A label always maps to the same event, whichever
/// menu it appears in.
const CATALOGUE: [(&str, &str); 4] = [
    ("Submit support ticket", EVENT_SUPPORT_REQUEST),
    ("Check ticket status", EVENT_TICKET_STATUS),
    ("Contact Sales", EVENT_CONTACT_SALES),
    ("Speak to Agent", EVENT_SPEAK_TO_AGENT),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    /// Sent back verbatim on selection.
    pub event: String,
}

impl Suggestion {
    pub fn new(label: &str, event: &str) -> Self {
        Self {
            label: label.to_string(),
            event: event.to_string(),
        }
    }

    /// Events that open a form locally instead of going to the backend.
    pub fn opens_form(&self) -> Option<FormKind> {
        match self.event.as_str() {
            EVENT_SUPPORT_REQUEST => Some(FormKind::Support),
            EVENT_CONTACT_SALES => Some(FormKind::Sales),
            _ => None,
        }
    }
}

/// The quick replies currently on offer. Replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    items: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn new(items: Vec<Suggestion>) -> Self {
        Self { items }
    }

    /// Entry menu shown after the greeting.
    pub fn main_menu() -> Self {
        Self::new(
            CATALOGUE
                .iter()
                .map(|(label, event)| Suggestion::new(label, event))
                .collect(),
        )
    }

    /// Follow-up options for a backend intent. Unknown intents get the main
    /// menu, so a successful reply never leaves the user without options.
    pub fn for_intent(intent: &str) -> Self {
        let labels: &[&str] = match intent {
            "support_request" => &["Check ticket status", "Speak to Agent"],
            "ticket_status" => &["Submit support ticket", "Speak to Agent"],
            _ => return Self::main_menu(),
        };
        Self::new(labels.iter().filter_map(|label| lookup(label)).collect())
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        self.items.get(index)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn lookup(label: &str) -> Option<Suggestion> {
    CATALOGUE
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(l, e)| Suggestion::new(l, e))
}
