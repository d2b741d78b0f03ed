use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    open_stores, parse_date, parse_params, require_section_editor, require_teacher,
};
use crate::ipc::types::{AppState, Request};
use crate::journal::{SectionId, SectionPatch};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionListing {
    id: SectionId,
    name: String,
    description: String,
    schedule: String,
    teacher: String,
    student_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    section_id: SectionId,
    patch: SectionPatch,
}

#[derive(Debug, Deserialize)]
struct OnDateParams {
    date: String,
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, _session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let snapshot = journal.snapshot();
    let sections: Vec<SectionListing> = snapshot
        .sections
        .values()
        .map(|s| SectionListing {
            id: s.id,
            name: s.name.clone(),
            description: s.description.clone(),
            schedule: s.schedule.clone(),
            teacher: s.teacher.clone(),
            student_count: calc::section_student_count(snapshot, s.id),
        })
        .collect();
    ok(&req.id, json!({ "sections": sections }))
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

    journal.update_section(params.section_id, params.patch);
    ok(&req.id, json!({}))
}

/// The teacher's classes meeting on the given date's weekday.
fn handle_on_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let sections = match require_teacher(session) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: OnDateParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let date = match parse_date(&params.date) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let classes = calc::classes_on_date(journal.snapshot(), &sections, date);
    ok(&req.id, json!({ "classes": classes }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sections.list" => Some(handle_list(state, req)),
        "sections.update" => Some(handle_update(state, req)),
        "sections.onDate" => Some(handle_on_date(state, req)),
        _ => None,
    }
}
