use std::path::PathBuf;

use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::open_stores;
use crate::ipc::types::{AppState, Request};
use crate::journal::JournalStore;
use crate::seed;
use crate::session::SessionStore;

fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "profilePath": state.profile.as_ref().map(|p| p.to_string_lossy().to_string()),
        }),
    )
}

/// Seeds the journal for a profile directory and restores any persisted
/// identity. Reopening swaps the whole state for the new profile.
fn handle_profile_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing params.path");
    };

    if let Err(e) = std::fs::create_dir_all(&path) {
        return err(&req.id, "profile_open_failed", e.to_string());
    }
    let journal = match seed::load_or_default(&path) {
        Ok(journal) => JournalStore::new(journal),
        Err(e) => return err(&req.id, "profile_open_failed", format!("{e:#}")),
    };
    let session = SessionStore::open(&path);

    log::info!("profile open: {}", path.display());
    let user = session.current().cloned();
    state.profile = Some(path.clone());
    state.journal = Some(journal);
    state.session = Some(session);

    ok(
        &req.id,
        json!({
            "profilePath": path.to_string_lossy(),
            "user": user,
        }),
    )
}

fn handle_journal_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, _session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let snapshot = journal.snapshot();
    ok(
        &req.id,
        json!({
            "students": snapshot.students,
            "sections": snapshot.sections,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "profile.open" => Some(handle_profile_open(state, req)),
        "journal.get" => Some(handle_journal_get(state, req)),
        _ => None,
    }
}
