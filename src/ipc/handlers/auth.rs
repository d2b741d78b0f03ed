use serde::Deserialize;
use serde_json::json;

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{open_stores, parse_params};
use crate::ipc::types::{AppState, Request};
use crate::journal::SectionId;

#[derive(Debug, Deserialize)]
struct LoginParams {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanEditParams {
    section_id: SectionId,
}

/// Bad credentials are a normal outcome, not an error: the reply is
/// `ok` with `success: false`.
fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: LoginParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let success = session.login(journal.snapshot(), &params.email, &params.password);
    ok(
        &req.id,
        json!({ "success": success, "user": session.current() }),
    )
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (_journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    session.logout();
    ok(&req.id, json!({}))
}

fn handle_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (_journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    ok(&req.id, json!({ "user": session.current() }))
}

fn handle_can_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (_journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: CanEditParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    ok(
        &req.id,
        json!({ "editable": calc::can_edit(session.current(), params.section_id) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "auth.current" => Some(handle_current(state, req)),
        "auth.canEdit" => Some(handle_can_edit(state, req)),
        _ => None,
    }
}
