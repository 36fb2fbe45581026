use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use regex::Regex;
use tracing::warn;
use uuid::Uuid;

/// Storage key the token lives under in tab-scoped storage.
pub const SESSION_KEY: &str = "session_id";

pub const DEFAULT_NAME: &str = "User";
pub const DEFAULT_EMAIL: &str = "anonymous@example.com";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Key/value storage scoped to one tab (or one embedding host process).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// In-process tab storage.
#[derive(Debug, Default)]
pub struct TabStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl TabStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for TabStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}

/// Resolves the stable session token for the current tab.
///
/// Without a store every call mints a fresh token. That is the accepted
/// degradation when the host gives us no tab storage.
pub struct SessionIdentity<'a> {
    store: Option<&'a dyn SessionStore>,
}

impl<'a> SessionIdentity<'a> {
    pub fn new(store: Option<&'a dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn get_or_create(&self) -> SessionId {
        let Some(store) = self.store else {
            return SessionId::new();
        };

        if let Some(raw) = store.get(SESSION_KEY) {
            match Uuid::parse_str(&raw) {
                Ok(id) => return SessionId(id),
                Err(e) => warn!("Stored session token is unreadable ({}), minting a new one", e),
            }
        }

        let id = SessionId::new();
        store.set(SESSION_KEY, id.to_string());
        id
    }
}

/// A default was substituted for user input. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFallback {
    Name,
    Email,
}

/// Identity fields sent with every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    pub name: String,
    pub email: String,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self::with_identity(id, DEFAULT_NAME, DEFAULT_EMAIL)
    }

    pub fn with_identity(id: SessionId, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Overwrites name/email from the pre-chat form. Never fails; reports
    /// which fields fell back to the given defaults.
    pub fn apply_prechat(
        &mut self,
        raw_name: &str,
        raw_email: &str,
        default_name: &str,
        default_email: &str,
    ) -> Vec<ValidationFallback> {
        let mut fallbacks = Vec::new();

        self.name = match display_name(raw_name) {
            Some(name) => name,
            None => {
                fallbacks.push(ValidationFallback::Name);
                default_name.to_string()
            }
        };

        self.email = match normalize_email(raw_email) {
            Some(email) => email,
            None => {
                fallbacks.push(ValidationFallback::Email);
                default_email.to_string()
            }
        };

        fallbacks
    }
}

/// First whitespace-delimited token of the input.
pub fn display_name(raw: &str) -> Option<String> {
    raw.split_whitespace().next().map(str::to_string)
}

/// Lower-cased address when it looks like `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    EMAIL_PATTERN
        .is_match(trimmed)
        .then(|| trimmed.to_lowercase())
}
