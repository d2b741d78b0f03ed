use serde::Deserialize;
use serde_json::json;

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{open_stores, parse_params, require_teacher};
use crate::ipc::types::{AppState, Request};
use crate::journal::{NewStudent, StudentPatch};

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    student_id: String,
    patch: StudentPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteParams {
    student_id: String,
}

/// The teacher's roster: students enrolled in at least one authorized
/// section, optionally filtered by a name search.
fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let sections = match require_teacher(session) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: ListParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let query = params.query.unwrap_or_default();
    let students = calc::visible_students(journal.snapshot(), &sections, &query);
    ok(&req.id, json!({ "students": students }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_teacher(session) {
        return e.response(&req.id);
    }
    let new: NewStudent = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let student_id = journal.add_student(new);
    ok(&req.id, json!({ "studentId": student_id }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_teacher(session) {
        return e.response(&req.id);
    }
    let params: UpdateParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    journal.update_student(&params.student_id, params.patch);
    ok(&req.id, json!({}))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_teacher(session) {
        return e.response(&req.id);
    }
    let params: DeleteParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    journal.remove_student(&params.student_id);
    ok(&req.id, json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
