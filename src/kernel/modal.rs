use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Support,
    Sales,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Support => "support",
            FormKind::Sales => "sales",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Support => "Submit Support Ticket",
            FormKind::Sales => "Contact Sales",
        }
    }

    /// Field set rendered for this kind: the topic line, then the body.
    pub fn fields(&self) -> [FormField; 2] {
        match self {
            FormKind::Support => [
                FormField { name: "subject", placeholder: "Subject", multiline: false },
                FormField { name: "message", placeholder: "Describe your issue", multiline: true },
            ],
            FormKind::Sales => [
                FormField { name: "company", placeholder: "Company Name", multiline: false },
                FormField { name: "message", placeholder: "Your inquiry", multiline: true },
            ],
        }
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "support" => Ok(FormKind::Support),
            "sales" => Ok(FormKind::Sales),
            other => Err(format!("unknown form kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub placeholder: &'static str,
    pub multiline: bool,
}

/// Raw values typed into an open modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    /// Subject (support) or company (sales).
    pub topic: String,
    pub message: String,
}

impl FormValues {
    pub fn new(topic: &str, message: &str) -> Self {
        Self {
            topic: topic.to_string(),
            message: message.to_string(),
        }
    }
}

/// Kind-specific topic line on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Topic {
    #[serde(rename = "subject")]
    Subject(String),
    #[serde(rename = "company")]
    Company(String),
}

/// Body of the form endpoint. Built once per submit and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub action: FormKind,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub topic: Topic,
    pub message: String,
}

/// The single open modal owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModal {
    kind: FormKind,
    submitting: bool,
}

impl FormModal {
    pub fn open(kind: FormKind) -> Self {
        Self { kind, submitting: false }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Trims the values and builds the submission. Returns `None` while a
    /// previous submit is still in flight.
    pub fn submit(&mut self, values: &FormValues, session: &Session) -> Option<FormSubmission> {
        if self.submitting {
            return None;
        }
        self.submitting = true;

        let topic = values.topic.trim().to_string();
        Some(FormSubmission {
            action: self.kind,
            name: session.name.clone(),
            email: session.email.clone(),
            topic: match self.kind {
                FormKind::Support => Topic::Subject(topic),
                FormKind::Sales => Topic::Company(topic),
            },
            message: values.message.trim().to_string(),
        })
    }

    /// Re-arms the Submit control after a failed attempt.
    pub fn submission_failed(&mut self) {
        self.submitting = false;
    }
}
