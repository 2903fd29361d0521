//! Shared harness for the HTTP integration tests: spawns the portal on an
//! ephemeral port over the seeded demo dataset, with canned assistant
//! adapters in place of the OpenAI-backed ones, and speaks raw HTTP/1.1 to
//! the running server.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use api_lib::adapters::seed::{seed_demo_data, DEMO_PASSWORD};
use api_lib::adapters::store::MemoryStore;
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use cotbe_portal_core::domain::ChatTurn;
use cotbe_portal_core::ports::{
    AcademicInsightService, AnnouncementDraftService, CourseQaService, FeedbackDraftService,
    HelpChatService, LogSummaryService, PortResult,
};

//=========================================================================================
// Canned Assistant Adapters
//=========================================================================================

/// Stands in for every assistant port. Records the context each call received
/// so tests can assert what the handlers assembled.
#[derive(Default)]
pub struct CannedAssistant {
    seen: Mutex<Vec<String>>,
}

impl CannedAssistant {
    fn record(&self, context: String) {
        self.seen.lock().expect("seen lock").push(context);
    }

    /// Everything the assistant ports have been called with, in order.
    pub fn contexts(&self) -> Vec<String> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl CourseQaService for CannedAssistant {
    async fn answer_question(&self, question: &str, material_context: &str) -> PortResult<String> {
        self.record(format!("course-qa|{}|{}", question, material_context));
        Ok("Canned answer".to_string())
    }
}

#[async_trait]
impl AcademicInsightService for CannedAssistant {
    async fn summarize_record(&self, record_context: &str) -> PortResult<String> {
        self.record(format!("insights|{}", record_context));
        Ok("Canned insight".to_string())
    }
}

#[async_trait]
impl FeedbackDraftService for CannedAssistant {
    async fn draft_feedback(&self, performance_context: &str, tone: &str) -> PortResult<String> {
        self.record(format!("feedback|{}|{}", tone, performance_context));
        Ok("Canned feedback".to_string())
    }
}

#[async_trait]
impl AnnouncementDraftService for CannedAssistant {
    async fn draft_announcement(
        &self,
        topic: &str,
        audience: &str,
        key_points: &str,
    ) -> PortResult<String> {
        self.record(format!("announcement|{}|{}|{}", topic, audience, key_points));
        Ok("Canned announcement".to_string())
    }
}

#[async_trait]
impl LogSummaryService for CannedAssistant {
    async fn summarize_logs(&self, log_lines: &str) -> PortResult<String> {
        self.record(format!("log-summary|{}", log_lines));
        Ok("Canned log summary".to_string())
    }
}

#[async_trait]
impl HelpChatService for CannedAssistant {
    async fn reply(&self, history: &[ChatTurn], message: &str) -> PortResult<String> {
        self.record(format!("help-chat|{}|{} prior turns", message, history.len()));
        Ok("Canned reply".to_string())
    }
}

//=========================================================================================
// Server Harness
//=========================================================================================

pub struct Portal {
    pub addr: SocketAddr,
    pub assistants: Arc<CannedAssistant>,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("bind address"),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        qa_model: "canned".to_string(),
        insight_model: "canned".to_string(),
        feedback_model: "canned".to_string(),
        announcement_model: "canned".to_string(),
        log_summary_model: "canned".to_string(),
        help_chat_model: "canned".to_string(),
        seed_demo_data: true,
        cors_origin: "http://localhost:3000".to_string(),
    }
}

/// Seeds a fresh in-memory portal and serves it on an ephemeral port.
pub async fn spawn_portal() -> Portal {
    let store = Arc::new(MemoryStore::new());
    seed_demo_data(&store).await.expect("seed demo data");

    let assistants = Arc::new(CannedAssistant::default());
    let state = Arc::new(AppState {
        store,
        config: Arc::new(test_config()),
        course_qa: assistants.clone(),
        academic_insight: assistants.clone(),
        feedback_draft: assistants.clone(),
        announcement_draft: assistants.clone(),
        log_summary: assistants.clone(),
        help_chat: assistants.clone(),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    Portal { addr, assistants }
}

/// Sends one request and returns (status, Set-Cookie header if any, JSON body).
/// Bodies that are empty come back as `Value::Null`.
pub async fn send_json(
    addr: SocketAddr,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<&Value>,
) -> (u16, Option<String>, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");

    let payload = body.map(|b| b.to_string()).unwrap_or_default();
    let mut request = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", method, path, addr);
    if let Some(cookie) = cookie {
        request.push_str(&format!("Cookie: {}\r\n", cookie));
    }
    if body.is_some() {
        request.push_str("Content-Type: application/json\r\n");
    }
    request.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    ));

    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");

    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status line");
    let set_cookie = head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("set-cookie") {
            Some(value.trim().to_string())
        } else {
            None
        }
    });
    let json = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).expect("json body")
    };
    (status, set_cookie, json)
}

/// Logs a seeded demo account in and returns its `session=...` cookie pair.
pub async fn login(addr: SocketAddr, username: &str) -> String {
    let (status, set_cookie, body) = send_json(
        addr,
        "POST",
        "/api/auth/login",
        None,
        Some(&json!({ "username": username, "password": DEMO_PASSWORD })),
    )
    .await;
    assert_eq!(status, 200, "login as {} failed: {}", username, body);
    set_cookie
        .expect("session cookie")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Convenience wrappers so the tests read as request lines.
pub async fn get(addr: SocketAddr, path: &str, cookie: &str) -> (u16, Value) {
    let (status, _, body) = send_json(addr, "GET", path, Some(cookie), None).await;
    (status, body)
}

pub async fn post(addr: SocketAddr, path: &str, cookie: &str, body: Value) -> (u16, Value) {
    let (status, _, body) = send_json(addr, "POST", path, Some(cookie), Some(&body)).await;
    (status, body)
}

pub async fn put(addr: SocketAddr, path: &str, cookie: &str, body: Value) -> (u16, Value) {
    let (status, _, body) = send_json(addr, "PUT", path, Some(cookie), Some(&body)).await;
    (status, body)
}

pub async fn delete(addr: SocketAddr, path: &str, cookie: &str) -> (u16, Value) {
    let (status, _, body) = send_json(addr, "DELETE", path, Some(cookie), None).await;
    (status, body)
}

/// Looks an entity id up inside an envelope's `data` array by a field value.
pub fn find_id(body: &Value, field: &str, value: &str) -> String {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .find(|item| item[field] == value)
        .unwrap_or_else(|| panic!("no entry with {} == {}", field, value))["id"]
        .as_str()
        .expect("id field")
        .to_string()
}
