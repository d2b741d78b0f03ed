use serde::Deserialize;
use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{open_stores, parse_date, parse_params, require_section_editor};
use crate::ipc::types::{AppState, Request};
use crate::journal::{Grade, SectionId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    student_id: String,
    section_id: SectionId,
    date: String,
    // Out-of-range values fail deserialization, so nothing invalid ever
    // reaches the store. 0 records the cell as ungraded.
    grade: Grade,
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: UpdateParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_section_editor(session, params.section_id) {
        return e.response(&req.id);
    }
    if let Err(e) = parse_date(&params.date) {
        return e.response(&req.id);
    }

    journal.update_grade(
        &params.student_id,
        params.section_id,
        &params.date,
        params.grade,
    );
    ok(&req.id, json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.update" => Some(handle_update(state, req)),
        _ => None,
    }
}
