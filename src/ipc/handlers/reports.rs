use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    open_stores, parse_date, parse_params, require_report_access, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::journal::{Journal, Student};

const DEFAULT_RECENT_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressParams {
    student_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpcomingParams {
    student_id: String,
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentParams {
    student_id: String,
    #[serde(default)]
    limit: Option<usize>,
}

fn find_student<'a>(journal: &'a Journal, id: &str) -> Result<&'a Student, HandlerErr> {
    journal
        .students
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| HandlerErr::new("not_found", "student not found"))
}

fn handle_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: ProgressParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_report_access(session, &params.student_id) {
        return e.response(&req.id);
    }
    let snapshot = journal.snapshot();
    let student = match find_student(snapshot, &params.student_id) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let sections = calc::student_progress(snapshot, student);
    ok(&req.id, json!({ "sections": sections }))
}

fn handle_upcoming(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: UpcomingParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_report_access(session, &params.student_id) {
        return e.response(&req.id);
    }
    let today: NaiveDate = match params.today.as_deref() {
        Some(raw) => match parse_date(raw) {
            Ok(v) => v,
            Err(e) => return e.response(&req.id),
        },
        None => Local::now().date_naive(),
    };
    let snapshot = journal.snapshot();
    let student = match find_student(snapshot, &params.student_id) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let classes = calc::upcoming_classes(snapshot, student, today);
    ok(&req.id, json!({ "classes": classes }))
}

fn handle_recent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (journal, session) = match open_stores(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let params: RecentParams = match parse_params(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if let Err(e) = require_report_access(session, &params.student_id) {
        return e.response(&req.id);
    }
    let snapshot = journal.snapshot();
    let student = match find_student(snapshot, &params.student_id) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let grades = calc::recent_grades(snapshot, student, limit);
    ok(&req.id, json!({ "grades": grades }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.studentProgress" => Some(handle_progress(state, req)),
        "reports.upcomingClasses" => Some(handle_upcoming(state, req)),
        "reports.recentGrades" => Some(handle_recent(state, req)),
        _ => None,
    }
}
