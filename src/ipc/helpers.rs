use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use super::error::err;
use super::types::AppState;
use crate::calc;
use crate::journal::{JournalStore, SectionId};
use crate::session::{Identity, SessionStore};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message)
    }
}

/// Typed param extraction; missing params deserialize as an empty object so
/// fully-optional param structs still parse.
pub fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    let value = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params.clone()
    };
    serde_json::from_value(value).map_err(|e| HandlerErr::new("bad_params", e.to_string()))
}

pub fn open_stores(
    state: &mut AppState,
) -> Result<(&mut JournalStore, &mut SessionStore), HandlerErr> {
    match (state.journal.as_mut(), state.session.as_mut()) {
        (Some(journal), Some(session)) => Ok((journal, session)),
        _ => Err(HandlerErr::new(
            "no_profile",
            "no profile open; call profile.open first",
        )),
    }
}

/// Requires a logged-in teacher and yields their authorized sections.
pub fn require_teacher(session: &SessionStore) -> Result<Vec<SectionId>, HandlerErr> {
    match session.current() {
        Some(Identity::Teacher { sections, .. }) => Ok(sections.clone()),
        Some(_) => Err(HandlerErr::new("forbidden", "teacher role required")),
        None => Err(HandlerErr::new("forbidden", "login required")),
    }
}

/// Boundary check for attendance/grade/note/section edits, delegating to
/// the central predicate.
pub fn require_section_editor(
    session: &SessionStore,
    section: SectionId,
) -> Result<(), HandlerErr> {
    if calc::can_edit(session.current(), section) {
        Ok(())
    } else {
        Err(HandlerErr::new(
            "forbidden",
            format!(
                "section {} is not editable by the current user",
                section.as_str()
            ),
        ))
    }
}

/// Students may read their own reports; teachers may read anyone's.
pub fn require_report_access(session: &SessionStore, student_id: &str) -> Result<(), HandlerErr> {
    match session.current() {
        Some(Identity::Teacher { .. }) => Ok(()),
        Some(Identity::Student { id, .. }) if id == student_id => Ok(()),
        Some(_) => Err(HandlerErr::new(
            "forbidden",
            "students may only view their own reports",
        )),
        None => Err(HandlerErr::new("forbidden", "login required")),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::new("bad_params", format!("date must be YYYY-MM-DD, got {raw}")))
}
