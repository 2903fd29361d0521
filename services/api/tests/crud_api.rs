//! HTTP coverage for authentication, role gates, entity CRUD, the audit
//! trail, and the three dashboards, all against the seeded demo portal.

mod common;

use common::{delete, find_id, get, login, post, put, send_json, spawn_portal};
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let portal = spawn_portal().await;
    let (status, _, body) = send_json(portal.addr, "GET", "/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let portal = spawn_portal().await;

    let (status, _, body) = send_json(
        portal.addr,
        "POST",
        "/api/auth/login",
        None,
        Some(&json!({ "username": "abebe.kebede", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid username or password");

    // Unknown usernames get the same answer.
    let (status, _, _) = send_json(
        portal.addr,
        "POST",
        "/api/auth/login",
        None,
        Some(&json!({ "username": "nobody", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn me_returns_the_caller_without_the_password_hash() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;

    let (status, body) = get(portal.addr, "/api/auth/me", &cookie).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "abebe.kebede");
    assert_eq!(body["data"]["role"], "Student");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let portal = spawn_portal().await;
    let cookie = login(portal.addr, "abebe.kebede").await;

    let (status, _, _) = send_json(
        portal.addr,
        "POST",
        "/api/auth/logout",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = get(portal.addr, "/api/auth/me", &cookie).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn user_management_is_staff_only() {
    let portal = spawn_portal().await;
    let teacher = login(portal.addr, "dawit.haile").await;
    let staff = login(portal.addr, "almaz.bekele").await;

    let (status, body) = get(portal.addr, "/api/users", &teacher).await;
    assert_eq!(status, 403, "expected forbidden: {}", body);

    let (status, body) = get(portal.addr, "/api/users", &staff).await;
    assert_eq!(status, 200);
    let usernames: Vec<&str> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|u| u["username"].as_str().expect("username"))
        .collect();
    assert!(usernames.contains(&"yonas.tadesse"));
}

#[tokio::test]
async fn staff_can_create_and_deactivate_accounts() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;

    let (status, created) = post(
        portal.addr,
        "/api/users",
        &staff,
        json!({
            "username": "test.user",
            "email": "test.user@cotbe.edu.et",
            "password": "secret123",
            "role": "Student",
            "first_name": "Test",
            "last_name": "User",
        }),
    )
    .await;
    assert_eq!(status, 200, "user create failed: {}", created);
    assert!(created["data"].get("password_hash").is_none());
    let user_id = created["data"]["id"].as_str().expect("user id").to_string();

    // The new account can sign in with the raw password.
    let (status, _, _) = send_json(
        portal.addr,
        "POST",
        "/api/auth/login",
        None,
        Some(&json!({ "username": "test.user", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, 200);

    // Deactivation blocks further logins.
    let (status, _) = put(
        portal.addr,
        &format!("/api/users/{}", user_id),
        &staff,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(status, 200);
    let (status, _, _) = send_json(
        portal.addr,
        "POST",
        "/api/auth/login",
        None,
        Some(&json!({ "username": "test.user", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn catalog_crud_round_trip() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;

    let (_, created) = post(
        portal.addr,
        "/api/departments",
        &staff,
        json!({ "name": "Test Department", "description": "Scratch" }),
    )
    .await;
    let department_id = created["data"]["id"].as_str().expect("id").to_string();

    let (status, renamed) = put(
        portal.addr,
        &format!("/api/departments/{}", department_id),
        &staff,
        json!({ "name": "Renamed Department" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(renamed["data"]["name"], "Renamed Department");

    // Duplicate course codes are rejected.
    let (status, body) = post(
        portal.addr,
        "/api/courses",
        &staff,
        json!({
            "code": "ARCH101",
            "title": "Duplicate",
            "description": "Duplicate of a seeded code",
            "credits": 3,
            "department_id": department_id,
        }),
    )
    .await;
    assert_eq!(status, 409, "expected conflict: {}", body);

    // A department that still owns courses cannot be deleted.
    let (_, departments) = get(portal.addr, "/api/departments", &staff).await;
    let architecture = find_id(&departments, "name", "Architecture");
    let (status, _) = delete(
        portal.addr,
        &format!("/api/departments/{}", architecture),
        &staff,
    )
    .await;
    assert_eq!(status, 409);

    // The scratch department deletes cleanly and stays gone.
    let (status, _) = delete(
        portal.addr,
        &format!("/api/departments/{}", department_id),
        &staff,
    )
    .await;
    assert_eq!(status, 200);
    let (status, _) = get(
        portal.addr,
        &format!("/api/departments/{}", department_id),
        &staff,
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn audit_log_is_staff_only_and_newest_first() {
    let portal = spawn_portal().await;
    let student = login(portal.addr, "abebe.kebede").await;
    let staff = login(portal.addr, "almaz.bekele").await;

    let (status, _) = get(portal.addr, "/api/audit-log", &student).await;
    assert_eq!(status, 403);

    post(
        portal.addr,
        "/api/departments",
        &staff,
        json!({ "name": "Audit Probe", "description": "Probe" }),
    )
    .await;

    let (status, body) = get(portal.addr, "/api/audit-log?limit=3", &staff).await;
    assert_eq!(status, 200);
    let entries = body["data"].as_array().expect("entries");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["action"], "department.created");
    assert_eq!(entries[0]["actor"], "almaz.bekele");
}

#[tokio::test]
async fn announcements_cannot_be_posted_by_students() {
    let portal = spawn_portal().await;
    let student = login(portal.addr, "abebe.kebede").await;
    let teacher = login(portal.addr, "dawit.haile").await;

    let (status, body) = post(
        portal.addr,
        "/api/announcements",
        &student,
        json!({ "title": "Party", "body": "My place", "audience": "All" }),
    )
    .await;
    assert_eq!(status, 403, "expected forbidden: {}", body);

    let (status, posted) = post(
        portal.addr,
        "/api/announcements",
        &teacher,
        json!({ "title": "Office hours", "body": "Tuesdays 2pm", "audience": "Students" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(posted["data"]["title"], "Office hours");
}

#[tokio::test]
async fn dashboards_reflect_the_seeded_world() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;
    let student = login(portal.addr, "abebe.kebede").await;

    let (_, users) = get(portal.addr, "/api/users", &staff).await;
    let abebe = find_id(&users, "username", "abebe.kebede");
    let dawit = find_id(&users, "username", "dawit.haile");

    // Student dashboard: record with GPA, current enrollments, and the
    // announcements relevant to a student.
    let (status, body) = get(
        portal.addr,
        &format!("/api/dashboard/student/{}", abebe),
        &student,
    )
    .await;
    assert_eq!(status, 200);
    let dashboard = &body["data"];
    // 4 credits of A and 2 credits of B+ from the finished semester.
    assert_eq!(dashboard["record"]["gpa"], json!(3.77));
    assert_eq!(dashboard["enrollments"].as_array().expect("enrollments").len(), 2);
    assert_eq!(
        dashboard["announcements"].as_array().expect("announcements").len(),
        2
    );

    // Teacher dashboard: sections taught with rosters, dropped rows excluded.
    let (status, body) = get(
        portal.addr,
        &format!("/api/dashboard/teacher/{}", dawit),
        &staff,
    )
    .await;
    assert_eq!(status, 200);
    let sections = body["data"]["sections"].as_array().expect("sections");
    assert_eq!(sections.len(), 3);
    let arch101 = sections
        .iter()
        .find(|s| s["course"]["code"] == "ARCH101")
        .expect("ARCH101 section");
    assert_eq!(arch101["roster"].as_array().expect("roster").len(), 2);

    // Staff dashboard is gated and carries portal-wide counts.
    let teacher_cookie = login(portal.addr, "dawit.haile").await;
    let (status, _) = get(portal.addr, "/api/dashboard/staff", &teacher_cookie).await;
    assert_eq!(status, 403);
    let (status, body) = get(portal.addr, "/api/dashboard/staff", &staff).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["stats"]["students"], 4);
    assert_eq!(body["data"]["stats"]["teachers"], 2);
    assert_eq!(body["data"]["stats"]["waitlisted"], 1);
    assert!(body["data"]["recent_activity"].as_array().expect("activity").len() > 0);
}

#[tokio::test]
async fn scheduling_deletes_are_protected() {
    let portal = spawn_portal().await;
    let staff = login(portal.addr, "almaz.bekele").await;

    // The current semester still has sections scheduled in it.
    let (_, semesters) = get(portal.addr, "/api/semesters", &staff).await;
    let fall = find_id(&semesters, "term", "Fall");
    let (status, _) = delete(portal.addr, &format!("/api/semesters/{}", fall), &staff).await;
    assert_eq!(status, 409);

    // A room hosting a section cannot be removed either.
    let (_, sections) = get(portal.addr, "/api/scheduled-courses", &staff).await;
    let room_id = sections["data"][0]["room_id"].as_str().expect("room id");
    let (status, _) = delete(portal.addr, &format!("/api/rooms/{}", room_id), &staff).await;
    assert_eq!(status, 409);

    // Sections with registrations are protected too.
    let (_, courses) = get(portal.addr, "/api/courses", &staff).await;
    let arch101 = find_id(&courses, "code", "ARCH101");
    let section_id = sections["data"]
        .as_array()
        .expect("sections")
        .iter()
        .find(|s| s["course_id"] == arch101.as_str())
        .expect("ARCH101 section")["id"]
        .as_str()
        .expect("id");
    let (status, _) = delete(
        portal.addr,
        &format!("/api/scheduled-courses/{}", section_id),
        &staff,
    )
    .await;
    assert_eq!(status, 409);
}
