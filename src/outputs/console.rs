use crate::kernel::event::{Origin, UserAction};
use crate::kernel::modal::{FormKind, FormValues};
use crate::kernel::suggestion::SuggestionSet;
use super::transcript::TranscriptView;

/// Prints the widget to stdout, one line per render.
pub struct ConsoleTranscript {
    title: String,
}

impl ConsoleTranscript {
    pub fn new(title: &str) -> Self {
        Self { title: title.to_string() }
    }
}

impl TranscriptView for ConsoleTranscript {
    fn append_message(&mut self, origin: Origin, text: &str) {
        match origin {
            Origin::User => println!("  you > {}", text),
            Origin::Bot => println!("  bot > {}", text),
        }
    }

    fn show_suggestions(&mut self, set: &SuggestionSet) {
        let row = set
            .items()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[{}] {}", i + 1, s.label))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}   (/pick <n>)", row);
    }

    fn clear_suggestions(&mut self) {}

    fn clear(&mut self) {
        println!("---------------- {} ----------------", self.title);
    }

    fn set_visible(&mut self, visible: bool) {
        if !visible {
            println!("(chat closed, /open to start again)");
        }
    }

    fn show_prechat(&mut self, name: &str, email: &str) {
        println!("  Your name [{}], your email [{}]", name, email);
        println!("  /start <name> | <email>");
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if !enabled {
            println!("  (message input disabled)");
        }
    }

    fn open_modal(&mut self, kind: FormKind) {
        let [topic, body] = kind.fields();
        println!("  == {} ==", kind.title());
        println!("  /submit <{}> | <{}>   or /cancel", topic.placeholder, body.placeholder);
    }

    fn close_modal(&mut self) {}

    fn show_rating(&mut self) {
        println!("  Rate your experience: [1] [2] [3] [4] [5]   (/rate <n>)");
    }

    fn clear_rating(&mut self) {}
}

/// A line typed at the console host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Action(UserAction),
    Quit,
    Unknown(String),
}

/// `/open`, `/close`, `/start <name> | <email>`, `/pick <n>`,
/// `/submit <topic> | <message>`, `/cancel`, `/rate <n>`, `/quit`.
/// Anything else is a chat message.
pub fn parse_line(line: &str) -> ConsoleLine {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ConsoleLine::Action(UserAction::SendMessage(line.to_string()));
    };

    let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();

    match verb {
        "open" => ConsoleLine::Action(UserAction::Open),
        "close" => ConsoleLine::Action(UserAction::Close),
        "cancel" => ConsoleLine::Action(UserAction::CancelForm),
        "quit" => ConsoleLine::Quit,
        "start" => {
            let (name, email) = split_pair(rest);
            ConsoleLine::Action(UserAction::SubmitPrechat { name, email })
        }
        "submit" => {
            let (topic, message) = split_pair(rest);
            ConsoleLine::Action(UserAction::SubmitForm(FormValues { topic, message }))
        }
        // Buttons are numbered from 1 on screen.
        "pick" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => ConsoleLine::Action(UserAction::SelectSuggestion(n - 1)),
            _ => ConsoleLine::Unknown(line.to_string()),
        },
        "rate" => match rest.parse::<u8>() {
            Ok(n) => ConsoleLine::Action(UserAction::Rate(n)),
            Err(_) => ConsoleLine::Unknown(line.to_string()),
        },
        _ => ConsoleLine::Unknown(line.to_string()),
    }
}

fn split_pair(rest: &str) -> (String, String) {
    let (left, right) = rest.split_once('|').unwrap_or((rest, ""));
    (left.trim().to_string(), right.trim().to_string())
}
