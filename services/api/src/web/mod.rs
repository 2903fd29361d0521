//! services/api/src/web/mod.rs
//!
//! Wires the HTTP surface together: the route table (public vs. session
//! protected), the health endpoint, and the master OpenAPI definition the
//! Swagger UI and the `openapi` binary both render.

pub mod announcements;
pub mod assessments;
pub mod assistant;
pub mod audit;
pub mod auth;
pub mod buildings;
pub mod courses;
pub mod dashboards;
pub mod departments;
pub mod envelope;
pub mod materials;
pub mod middleware;
pub mod registrations;
pub mod sections;
pub mod semesters;
pub mod state;
pub mod users;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::web::envelope::ApiEnvelope;
use crate::web::state::AppState;

pub use middleware::require_auth;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::logout_handler,
        registrations::create_registration_handler,
        assistant::course_qa_handler,
        assistant::academic_insights_handler,
        assistant::feedback_draft_handler,
        assistant::announcement_draft_handler,
        assistant::log_summary_handler,
        assistant::help_chat_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            registrations::RegistrationCreateRequest,
            assistant::CourseQaRequest,
            assistant::InsightRequest,
            assistant::FeedbackDraftRequest,
            assistant::LogSummaryRequest,
        )
    ),
    tags(
        (name = "auth", description = "Session login and logout."),
        (name = "registrations", description = "Course registration and grading."),
        (name = "assistant", description = "LLM-backed assistant features.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// GET /health
async fn health_handler() -> Json<ApiEnvelope<()>> {
    Json(ApiEnvelope::message("ok"))
}

/// Builds the full portal router. Everything except the health check and the
/// login/logout pair sits behind the session middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route(
            "/api/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route(
            "/api/departments",
            get(departments::list_departments_handler).post(departments::create_department_handler),
        )
        .route(
            "/api/departments/{id}",
            get(departments::get_department_handler)
                .put(departments::update_department_handler)
                .delete(departments::delete_department_handler),
        )
        .route(
            "/api/courses",
            get(courses::list_courses_handler).post(courses::create_course_handler),
        )
        .route(
            "/api/courses/{id}",
            get(courses::get_course_handler)
                .put(courses::update_course_handler)
                .delete(courses::delete_course_handler),
        )
        .route(
            "/api/buildings",
            get(buildings::list_buildings_handler).post(buildings::create_building_handler),
        )
        .route(
            "/api/buildings/{id}",
            get(buildings::get_building_handler)
                .put(buildings::update_building_handler)
                .delete(buildings::delete_building_handler),
        )
        .route(
            "/api/rooms",
            get(buildings::list_rooms_handler).post(buildings::create_room_handler),
        )
        .route(
            "/api/rooms/{id}",
            get(buildings::get_room_handler)
                .put(buildings::update_room_handler)
                .delete(buildings::delete_room_handler),
        )
        .route(
            "/api/semesters",
            get(semesters::list_semesters_handler).post(semesters::create_semester_handler),
        )
        .route(
            "/api/semesters/{id}",
            get(semesters::get_semester_handler)
                .put(semesters::update_semester_handler)
                .delete(semesters::delete_semester_handler),
        )
        .route(
            "/api/scheduled-courses",
            get(sections::list_scheduled_courses_handler)
                .post(sections::create_scheduled_course_handler),
        )
        .route(
            "/api/scheduled-courses/{id}",
            get(sections::get_scheduled_course_handler)
                .put(sections::update_scheduled_course_handler)
                .delete(sections::delete_scheduled_course_handler),
        )
        .route(
            "/api/registrations",
            get(registrations::list_registrations_handler)
                .post(registrations::create_registration_handler),
        )
        .route(
            "/api/registrations/{id}",
            get(registrations::get_registration_handler)
                .put(registrations::update_registration_handler)
                .delete(registrations::delete_registration_handler),
        )
        .route(
            "/api/materials",
            get(materials::list_materials_handler).post(materials::create_material_handler),
        )
        .route(
            "/api/materials/{id}",
            get(materials::get_material_handler)
                .put(materials::update_material_handler)
                .delete(materials::delete_material_handler),
        )
        .route(
            "/api/assessments",
            get(assessments::list_assessments_handler).post(assessments::create_assessment_handler),
        )
        .route(
            "/api/assessments/{id}",
            get(assessments::get_assessment_handler)
                .put(assessments::update_assessment_handler)
                .delete(assessments::delete_assessment_handler),
        )
        .route(
            "/api/announcements",
            get(announcements::list_announcements_handler)
                .post(announcements::create_announcement_handler),
        )
        .route(
            "/api/announcements/{id}",
            get(announcements::get_announcement_handler)
                .put(announcements::update_announcement_handler)
                .delete(announcements::delete_announcement_handler),
        )
        .route("/api/audit-log", get(audit::list_audit_log_handler))
        .route(
            "/api/dashboard/student/{id}",
            get(dashboards::student_dashboard_handler),
        )
        .route(
            "/api/dashboard/teacher/{id}",
            get(dashboards::teacher_dashboard_handler),
        )
        .route("/api/dashboard/staff", get(dashboards::staff_dashboard_handler))
        .route("/api/assistant/course-qa", post(assistant::course_qa_handler))
        .route(
            "/api/assistant/academic-insights",
            post(assistant::academic_insights_handler),
        )
        .route(
            "/api/assistant/feedback-draft",
            post(assistant::feedback_draft_handler),
        )
        .route(
            "/api/assistant/announcement-draft",
            post(assistant::announcement_draft_handler),
        )
        .route("/api/assistant/log-summary", post(assistant::log_summary_handler))
        .route("/api/assistant/help-chat", post(assistant::help_chat_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    public.merge(protected).with_state(state)
}
