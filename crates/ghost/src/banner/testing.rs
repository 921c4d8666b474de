//! Stub Banner portal served by axum on an ephemeral local port.

use crate::config::ScrapeConfig;
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "stub-synchronizer-token";
const SESSION_COOKIE: &str = "JSESSIONID=stub-session";

/// Everything the stub saw, plus its canned data.
pub struct StubState {
    with_token: bool,
    landing_status: StatusCode,
    reject_term: bool,
    subjects: Vec<(String, Vec<Value>)>,
    searched_subject: Mutex<Option<String>>,
    pub selected_terms: Mutex<Vec<String>>,
    pub session_ids: Mutex<Vec<String>>,
    pub resets: AtomicUsize,
    pub fetches: Mutex<Vec<(String, u32)>>,
}

pub struct StubPortalBuilder {
    with_token: bool,
    landing_status: StatusCode,
    reject_term: bool,
    subjects: Vec<(String, Vec<Value>)>,
}

impl StubPortalBuilder {
    pub fn without_token(mut self) -> Self {
        self.with_token = false;
        self
    }

    pub fn landing_status(mut self, status: StatusCode) -> Self {
        self.landing_status = status;
        self
    }

    pub fn reject_term(mut self) -> Self {
        self.reject_term = true;
        self
    }

    pub fn subject(mut self, code: &str, sections: Vec<Value>) -> Self {
        self.subjects.push((code.to_string(), sections));
        self
    }

    pub async fn spawn(self) -> StubPortal {
        let state = Arc::new(StubState {
            with_token: self.with_token,
            landing_status: self.landing_status,
            reject_term: self.reject_term,
            subjects: self.subjects,
            searched_subject: Mutex::new(None),
            selected_terms: Mutex::new(Vec::new()),
            session_ids: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
            fetches: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/ssb/classSearch/classSearch", get(landing))
            .route("/ssb/term/search", post(select_term))
            .route("/ssb/classSearch/resetDataForm", post(reset))
            .route("/ssb/classSearch/get_subject", get(subjects))
            .route("/ssb/searchResults/searchResults", get(results))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        StubPortal {
            base_url: format!("http://{addr}/"),
            state,
        }
    }
}

pub struct StubPortal {
    base_url: String,
    state: Arc<StubState>,
}

impl StubPortal {
    pub fn builder() -> StubPortalBuilder {
        StubPortalBuilder {
            with_token: true,
            landing_status: StatusCode::OK,
            reject_term: false,
            subjects: Vec::new(),
        }
    }

    /// Scrape config pointed at the stub, with no politeness delays.
    pub fn config(&self) -> ScrapeConfig {
        ScrapeConfig {
            base_url: self.base_url.clone(),
            page_delay: Duration::ZERO,
            subject_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    pub fn state(&self) -> Arc<StubState> {
        self.state.clone()
    }

    /// `count` in-person sections, two per course, spread over four rooms.
    pub fn sections(subject: &str, count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| {
                section_json(
                    &format!("{subject}{i:04}"),
                    subject,
                    &(100 + i / 2).to_string(),
                    Some("HORIZN"),
                    Some(&(2000 + i % 4).to_string()),
                    Some("1030"),
                    Some("1145"),
                    &["monday", "wednesday"],
                )
            })
            .collect()
    }
}

/// One raw search record in Banner's shape.
#[allow(clippy::too_many_arguments)]
pub fn section_json(
    crn: &str,
    subject: &str,
    course_number: &str,
    building: Option<&str>,
    room: Option<&str>,
    begin: Option<&str>,
    end: Option<&str>,
    days: &[&str],
) -> Value {
    let mut meeting_time = json!({
        "beginTime": begin,
        "endTime": end,
        "building": building,
        "room": room,
        "sunday": false,
        "monday": false,
        "tuesday": false,
        "wednesday": false,
        "thursday": false,
        "friday": false,
        "saturday": false,
    });
    for day in days {
        meeting_time[*day] = Value::Bool(true);
    }

    json!({
        "id": 1,
        "term": "202610",
        "courseReferenceNumber": crn,
        "subject": subject,
        "courseNumber": course_number,
        "sequenceNumber": "001",
        "courseTitle": format!("{subject} {course_number} title"),
        "faculty": [{ "displayName": "Goof, Prof", "emailAddress": "goof@gmu.edu" }],
        "meetingsFaculty": [{ "meetingTime": meeting_time, "faculty": [] }],
    })
}

fn has_session(headers: &HeaderMap) -> bool {
    let token_ok = headers
        .get("x-synchronizer-token")
        .and_then(|v| v.to_str().ok())
        == Some(TOKEN);
    let cookie_ok = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains(SESSION_COOKIE));
    token_ok && cookie_ok
}

async fn landing(State(s): State<Arc<StubState>>) -> Response {
    if s.landing_status != StatusCode::OK {
        return (s.landing_status, "portal unavailable").into_response();
    }

    let meta = if s.with_token {
        format!(r#"<meta name="synchronizerToken" content="{TOKEN}">"#)
    } else {
        String::new()
    };
    let body = format!("<html><head>{meta}</head><body>Class Search</body></html>");

    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        Html(body),
    )
        .into_response()
}

async fn select_term(
    State(s): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if s.reject_term {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if !has_session(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }

    s.selected_terms
        .lock()
        .unwrap()
        .push(form.get("term").cloned().unwrap_or_default());
    s.session_ids
        .lock()
        .unwrap()
        .push(query.get("uniqueSessionId").cloned().unwrap_or_default());

    Json(json!({ "fwdURL": "/classSearch/classSearch" })).into_response()
}

async fn reset(State(s): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    s.resets.fetch_add(1, Ordering::SeqCst);
    *s.searched_subject.lock().unwrap() = None;
    Json(true).into_response()
}

async fn subjects(State(s): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let list: Vec<Value> = s
        .subjects
        .iter()
        .map(|(code, _)| json!({ "code": code, "description": format!("{code} department") }))
        .collect();
    Json(list).into_response()
}

async fn results(
    State(s): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !has_session(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let subject = query.get("txt_subject").cloned().unwrap_or_default();
    let offset: usize = query
        .get("pageOffset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let size: usize = query
        .get("pageMaxSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    // Mimic Banner: switching subject without a reset corrupts the search.
    {
        let mut searched = s.searched_subject.lock().unwrap();
        match searched.as_deref() {
            Some(current) if current != subject => return StatusCode::CONFLICT.into_response(),
            _ => *searched = Some(subject.clone()),
        }
    }

    s.fetches
        .lock()
        .unwrap()
        .push((subject.clone(), offset as u32));

    let records = s
        .subjects
        .iter()
        .find(|(code, _)| *code == subject)
        .map(|(_, records)| records.as_slice())
        .unwrap_or_default();

    let page: Vec<Value> = records.iter().skip(offset).take(size).cloned().collect();
    Json(json!({
        "success": true,
        "totalCount": records.len(),
        "data": page,
    }))
    .into_response()
}
