//! HTTP coverage for the six assistant endpoints, with canned adapters in
//! place of the OpenAI client. The interesting part is the context each
//! handler assembles from the store before calling its port.

mod common;

use common::{find_id, get, login, post, spawn_portal, Portal};
use serde_json::json;

async fn section_id_of(portal: &Portal, cookie: &str, code: &str) -> String {
    let (_, courses) = get(portal.addr, "/api/courses", cookie).await;
    let course_id = find_id(&courses, "code", code);
    let (_, sections) = get(portal.addr, "/api/scheduled-courses", cookie).await;
    sections["data"]
        .as_array()
        .expect("sections")
        .iter()
        .find(|s| s["course_id"] == course_id.as_str())
        .unwrap_or_else(|| panic!("no section of {}", code))["id"]
        .as_str()
        .expect("section id")
        .to_string()
}

#[tokio::test]
async fn course_qa_reads_the_section_materials() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;
    let section_id = section_id_of(&portal, &cookie, "ARCH101").await;

    let (status, body) = post(
        portal.addr,
        "/api/assistant/course-qa",
        &cookie,
        json!({ "scheduled_course_id": section_id, "question": "What is schematic design?" }),
    )
    .await;
    assert_eq!(status, 200, "course qa failed: {}", body);
    assert_eq!(body["data"]["answer"], "Canned answer");

    let contexts = portal.assistants.contexts();
    let call = contexts
        .iter()
        .find(|c| c.starts_with("course-qa|"))
        .expect("course qa call");
    assert!(call.contains("What is schematic design?"));
    // Both seeded materials of the section are in the context.
    assert!(call.contains("Week 1 Notes: What Architects Do"));
    assert!(call.contains("Form, Space, and Order"));
}

#[tokio::test]
async fn course_qa_requires_materials() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;
    // The construction materials section is seeded without any materials.
    let section_id = section_id_of(&portal, &cookie, "COTM210").await;

    let (status, body) = post(
        portal.addr,
        "/api/assistant/course-qa",
        &cookie,
        json!({ "scheduled_course_id": section_id, "question": "Anything?" }),
    )
    .await;
    assert_eq!(status, 400, "expected refusal: {}", body);
    assert!(body["error"].as_str().expect("error").contains("materials"));
    assert!(portal.assistants.contexts().is_empty());
}

#[tokio::test]
async fn course_qa_rejects_unknown_sections_and_empty_questions() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;

    let (status, body) = post(
        portal.addr,
        "/api/assistant/course-qa",
        &cookie,
        json!({
            "scheduled_course_id": "00000000-0000-0000-0000-000000000000",
            "question": "Hello?"
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"]
        .as_str()
        .expect("error")
        .contains("Unknown scheduled course"));

    let section_id = section_id_of(&portal, &cookie, "ARCH101").await;
    let (status, _) = post(
        portal.addr,
        "/api/assistant/course-qa",
        &cookie,
        json!({ "scheduled_course_id": section_id, "question": "   " }),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn academic_insights_render_the_record_as_text() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;
    let (_, users) = get(portal.addr, "/api/users", &staff).await;
    let abebe = find_id(&users, "username", "abebe.kebede");

    let (status, body) = post(
        portal.addr,
        "/api/assistant/academic-insights",
        &staff,
        json!({ "student_id": abebe }),
    )
    .await;
    assert_eq!(status, 200, "insights failed: {}", body);
    assert_eq!(body["data"]["summary"], "Canned insight");

    let contexts = portal.assistants.contexts();
    let call = contexts
        .iter()
        .find(|c| c.starts_with("insights|"))
        .expect("insights call");
    assert!(call.contains("Student: Abebe Kebede"));
    assert!(call.contains("EMAT101"));
    assert!(call.contains("GPA: 3.77"));
}

#[tokio::test]
async fn feedback_draft_defaults_to_an_encouraging_tone() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;
    let (_, users) = get(portal.addr, "/api/users", &staff).await;
    let abebe = find_id(&users, "username", "abebe.kebede");
    let (_, registrations) = get(
        portal.addr,
        &format!("/api/registrations?student_id={}", abebe),
        &staff,
    )
    .await;
    let registration_id = registrations["data"][0]["id"].as_str().expect("registration id");

    let (status, body) = post(
        portal.addr,
        "/api/assistant/feedback-draft",
        &staff,
        json!({ "registration_id": registration_id }),
    )
    .await;
    assert_eq!(status, 200, "feedback draft failed: {}", body);
    assert_eq!(body["data"]["draft"], "Canned feedback");

    let contexts = portal.assistants.contexts();
    let call = contexts
        .iter()
        .find(|c| c.starts_with("feedback|"))
        .expect("feedback call");
    assert!(call.starts_with("feedback|encouraging|"));
    assert!(call.contains("Abebe Kebede"));

    // An explicit tone is passed through.
    let (status, _) = post(
        portal.addr,
        "/api/assistant/feedback-draft",
        &staff,
        json!({ "registration_id": registration_id, "tone": "stern" }),
    )
    .await;
    assert_eq!(status, 200);
    assert!(portal
        .assistants
        .contexts()
        .iter()
        .any(|c| c.starts_with("feedback|stern|")));
}

#[tokio::test]
async fn announcement_draft_passes_topic_audience_and_key_points() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "dawit.haile").await;

    let (status, body) = post(
        portal.addr,
        "/api/assistant/announcement-draft",
        &cookie,
        json!({
            "topic": "Midterm week",
            "audience": "Students",
            "key_points": ["Bring your ID", "No calculators"],
        }),
    )
    .await;
    assert_eq!(status, 200, "announcement draft failed: {}", body);
    assert_eq!(body["data"]["draft"], "Canned announcement");

    let contexts = portal.assistants.contexts();
    let call = contexts
        .iter()
        .find(|c| c.starts_with("announcement|"))
        .expect("announcement call");
    assert_eq!(
        call,
        "announcement|Midterm week|Students|- Bring your ID\n- No calculators"
    );
}

#[tokio::test]
async fn log_summary_is_staff_only_and_reads_the_audit_trail() {
    let portal = spawn_portal().await;
    let student = login(portal.addr, "abebe.kebede").await;
    let staff = login(portal.addr, "almaz.bekele").await;

    let (status, _) = post(
        portal.addr,
        "/api/assistant/log-summary",
        &student,
        json!({}),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = post(portal.addr, "/api/assistant/log-summary", &staff, json!({})).await;
    assert_eq!(status, 200, "log summary failed: {}", body);
    assert_eq!(body["data"]["summary"], "Canned log summary");

    let contexts = portal.assistants.contexts();
    let call = contexts
        .iter()
        .find(|c| c.starts_with("log-summary|"))
        .expect("log summary call");
    // The seed marker and the two logins this test performed are all there.
    assert!(call.contains("seed.completed"));
    assert!(call.contains("auth.login"));
}

#[tokio::test]
async fn help_chat_carries_the_history() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;

    let (status, body) = post(
        portal.addr,
        "/api/assistant/help-chat",
        &cookie,
        json!({
            "message": "How do I register for a section?",
            "history": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! How can I help?" },
            ],
        }),
    )
    .await;
    assert_eq!(status, 200, "help chat failed: {}", body);
    assert_eq!(body["data"]["reply"], "Canned reply");

    assert!(portal
        .assistants
        .contexts()
        .contains(&"help-chat|How do I register for a section?|2 prior turns".to_string()));
}
