use std::path::PathBuf;

use serde::Deserialize;

use crate::journal::JournalStore;
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Per-process state. The stores exist once a profile has been opened;
/// until then only `health` and `profile.open` are serviceable.
pub struct AppState {
    pub profile: Option<PathBuf>,
    pub journal: Option<JournalStore>,
    pub session: Option<SessionStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            profile: None,
            journal: None,
            session: None,
        }
    }
}
