//! services/api/src/web/assistant.rs
//!
//! The LLM-backed assistant endpoints. Each handler gathers its context from
//! the store, renders it to plain text, and hands it to the matching service
//! port; the adapters behind those ports own the prompts. Unknown ids arriving
//! in request bodies are reported as `Invalid` rather than `NotFound`.

use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use cotbe_portal_core::domain::{Audience, ChatTurn};
use cotbe_portal_core::ports::PortError;

use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, STAFF_ROLES};
use crate::web::state::AppState;

const DEFAULT_LOG_SUMMARY_LIMIT: usize = 100;
const DEFAULT_FEEDBACK_TONE: &str = "encouraging";

fn required_text(field: &str, value: &str) -> Result<(), ApiFailure> {
    if value.trim().is_empty() {
        return Err(PortError::Invalid(format!("{} must not be empty", field)).into());
    }
    Ok(())
}

//=========================================================================================
// Course Question Answering
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CourseQaRequest {
    pub scheduled_course_id: Uuid,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct CourseQaResponse {
    pub answer: String,
}

/// POST /api/assistant/course-qa - Answer a question from a section's materials
#[utoipa::path(
    post,
    path = "/api/assistant/course-qa",
    request_body = CourseQaRequest,
    responses(
        (status = 200, description = "Answer grounded in the section's materials"),
        (status = 400, description = "Unknown section, empty question, or no materials"),
        (status = 401, description = "Not signed in")
    ),
    tag = "assistant"
)]
pub async fn course_qa_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CourseQaRequest>,
) -> Result<Json<ApiEnvelope<CourseQaResponse>>, ApiFailure> {
    required_text("Question", &req.question)?;
    state
        .store
        .get_scheduled_course(req.scheduled_course_id)
        .await
        .map_err(|_| {
            PortError::Invalid(format!(
                "Unknown scheduled course {}",
                req.scheduled_course_id
            ))
        })?;

    let materials = state
        .store
        .list_materials(Some(req.scheduled_course_id))
        .await?;
    if materials.is_empty() {
        return Err(PortError::Invalid(
            "The scheduled course has no materials to answer from".to_string(),
        )
        .into());
    }
    let context = materials
        .iter()
        .map(|m| format!("# {}\n{}", m.title, m.body))
        .collect::<Vec<_>>()
        .join("\n\n");

    let answer = state
        .course_qa
        .answer_question(&req.question, &context)
        .await?;
    info!(
        "Answered a course question against {} material(s)",
        materials.len()
    );
    Ok(Json(ApiEnvelope::data(CourseQaResponse { answer })))
}

//=========================================================================================
// Academic Insights
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct InsightRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub summary: String,
}

/// POST /api/assistant/academic-insights - Summarize a student's record
#[utoipa::path(
    post,
    path = "/api/assistant/academic-insights",
    request_body = InsightRequest,
    responses(
        (status = 200, description = "Advisor-style summary of the record"),
        (status = 400, description = "Unknown student id"),
        (status = 401, description = "Not signed in")
    ),
    tag = "assistant"
)]
pub async fn academic_insights_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InsightRequest>,
) -> Result<Json<ApiEnvelope<InsightResponse>>, ApiFailure> {
    let record = state
        .store
        .student_academic_record(req.student_id)
        .await
        .map_err(|err| match err {
            PortError::NotFound(_) => {
                PortError::Invalid(format!("Unknown student {}", req.student_id))
            }
            other => other,
        })?;

    let mut context = format!(
        "Student: {}\nCredits attempted: {}\nCredits earned: {}\nGPA: {}\nCourses:\n",
        record.student_name,
        record.credits_attempted,
        record.credits_earned,
        record
            .gpa
            .map_or_else(|| "none yet".to_string(), |gpa| format!("{:.2}", gpa)),
    );
    for line in &record.lines {
        context.push_str(&format!(
            "- {} {} ({}, {} credits): {:?}{}\n",
            line.course_code,
            line.course_title,
            line.semester,
            line.credits,
            line.status,
            line.final_grade
                .map_or_else(String::new, |g| format!(", grade {}", g)),
        ));
    }

    let summary = state.academic_insight.summarize_record(&context).await?;
    info!(
        "Generated academic insights for student {}",
        req.student_id
    );
    Ok(Json(ApiEnvelope::data(InsightResponse { summary })))
}

//=========================================================================================
// Feedback Drafting
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackDraftRequest {
    pub registration_id: Uuid,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackDraftResponse {
    pub draft: String,
}

/// POST /api/assistant/feedback-draft - Draft feedback about one enrollment
#[utoipa::path(
    post,
    path = "/api/assistant/feedback-draft",
    request_body = FeedbackDraftRequest,
    responses(
        (status = 200, description = "Feedback draft in the requested tone"),
        (status = 400, description = "Unknown registration id"),
        (status = 401, description = "Not signed in")
    ),
    tag = "assistant"
)]
pub async fn feedback_draft_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackDraftRequest>,
) -> Result<Json<ApiEnvelope<FeedbackDraftResponse>>, ApiFailure> {
    let registration = state
        .store
        .get_registration(req.registration_id)
        .await
        .map_err(|_| {
            PortError::Invalid(format!("Unknown registration {}", req.registration_id))
        })?;
    let student = state.store.get_user(registration.student_id).await?;
    let section = state
        .store
        .get_scheduled_course(registration.scheduled_course_id)
        .await?;
    let course = state.store.get_course(section.course_id).await?;

    let context = format!(
        "Student: {}\nCourse: {} {} (section {})\nStatus: {:?}\nFinal grade: {}",
        student.full_name(),
        course.code,
        course.title,
        section.section_number,
        registration.status,
        registration
            .final_grade
            .map_or_else(|| "not yet recorded".to_string(), |g| g.to_string()),
    );
    let tone = req
        .tone
        .unwrap_or_else(|| DEFAULT_FEEDBACK_TONE.to_string());

    let draft = state.feedback_draft.draft_feedback(&context, &tone).await?;
    info!("Drafted feedback for registration {}", req.registration_id);
    Ok(Json(ApiEnvelope::data(FeedbackDraftResponse { draft })))
}

//=========================================================================================
// Announcement Drafting
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnnouncementDraftRequest {
    pub topic: String,
    #[schema(value_type = String)]
    pub audience: Audience,
    #[serde(default)]
    pub key_points: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementDraftResponse {
    pub draft: String,
}

/// POST /api/assistant/announcement-draft - Draft an announcement body
#[utoipa::path(
    post,
    path = "/api/assistant/announcement-draft",
    responses(
        (status = 200, description = "Announcement draft for the given topic"),
        (status = 400, description = "Empty topic"),
        (status = 401, description = "Not signed in")
    ),
    tag = "assistant"
)]
pub async fn announcement_draft_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnouncementDraftRequest>,
) -> Result<Json<ApiEnvelope<AnnouncementDraftResponse>>, ApiFailure> {
    required_text("Topic", &req.topic)?;
    let key_points = req
        .key_points
        .iter()
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n");

    let draft = state
        .announcement_draft
        .draft_announcement(&req.topic, &req.audience.to_string(), &key_points)
        .await?;
    info!("Drafted an announcement about '{}'", req.topic);
    Ok(Json(ApiEnvelope::data(AnnouncementDraftResponse { draft })))
}

//=========================================================================================
// Audit Log Summarization
//=========================================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogSummaryRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogSummaryResponse {
    pub summary: String,
}

/// POST /api/assistant/log-summary - Condense recent audit activity, staff only
#[utoipa::path(
    post,
    path = "/api/assistant/log-summary",
    request_body = LogSummaryRequest,
    responses(
        (status = 200, description = "Short report over the recent audit entries"),
        (status = 400, description = "The audit log is empty"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Caller is not staff")
    ),
    tag = "assistant"
)]
pub async fn log_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<LogSummaryRequest>,
) -> Result<Json<ApiEnvelope<LogSummaryResponse>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "summarize the audit log")?;
    let limit = req.limit.unwrap_or(DEFAULT_LOG_SUMMARY_LIMIT);
    let entries = state.store.list_audit(limit).await?;
    if entries.is_empty() {
        return Err(PortError::Invalid("No audit entries to summarize".to_string()).into());
    }
    let log_lines = entries
        .iter()
        .map(|e| format!("{} {} {} {}", e.at.to_rfc3339(), e.actor, e.action, e.detail))
        .collect::<Vec<_>>()
        .join("\n");

    let summary = state.log_summary.summarize_logs(&log_lines).await?;
    info!("Summarized {} audit entries", entries.len());
    Ok(Json(ApiEnvelope::data(LogSummaryResponse { summary })))
}

//=========================================================================================
// Help Chat
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct HelpChatRequest {
    pub message: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct HelpChatResponse {
    pub reply: String,
}

/// POST /api/assistant/help-chat - Portal usage help with conversation history
#[utoipa::path(
    post,
    path = "/api/assistant/help-chat",
    responses(
        (status = 200, description = "Assistant reply to the latest message"),
        (status = 400, description = "Empty message"),
        (status = 401, description = "Not signed in")
    ),
    tag = "assistant"
)]
pub async fn help_chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HelpChatRequest>,
) -> Result<Json<ApiEnvelope<HelpChatResponse>>, ApiFailure> {
    required_text("Message", &req.message)?;
    let reply = state.help_chat.reply(&req.history, &req.message).await?;
    Ok(Json(ApiEnvelope::data(HelpChatResponse { reply })))
}
