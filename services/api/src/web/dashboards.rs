//! services/api/src/web/dashboards.rs
//!
//! The three role dashboards. Each one is an aggregate assembled from store
//! reads: the student view joins enrollments to their sections and filters
//! announcements down to the relevant ones, the teacher view carries a roster
//! per section, and the staff view is portal-wide counts plus the tail of the
//! audit trail.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use cotbe_portal_core::domain::{
    AcademicRecord, Announcement, Audience, AuditLogEntry, Course, PortalStats, Registration,
    RegistrationStatus, ScheduledCourse, Semester, User, UserRole,
};
use cotbe_portal_core::ports::PortError;

use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, STAFF_ROLES};
use crate::web::state::AppState;

const RECENT_ACTIVITY_LIMIT: usize = 10;

//=========================================================================================
// View Types
//=========================================================================================

/// One current enrollment joined to its section, course, and semester.
#[derive(Debug, Serialize)]
pub struct EnrollmentView {
    pub registration: Registration,
    pub section: ScheduledCourse,
    pub course: Course,
    pub semester: Semester,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub record: AcademicRecord,
    pub enrollments: Vec<EnrollmentView>,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub registration: Registration,
    pub student: User,
}

#[derive(Debug, Serialize)]
pub struct TeacherSectionView {
    pub section: ScheduledCourse,
    pub course: Course,
    pub semester: Semester,
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Serialize)]
pub struct TeacherDashboard {
    pub teacher: User,
    pub sections: Vec<TeacherSectionView>,
}

#[derive(Debug, Serialize)]
pub struct StaffDashboard {
    pub stats: PortalStats,
    pub recent_activity: Vec<AuditLogEntry>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/dashboard/student/{id}
pub async fn student_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<StudentDashboard>>, ApiFailure> {
    // The record lookup also validates that the id belongs to a student.
    let record = state.store.student_academic_record(id).await?;

    let registrations = state.store.list_registrations(Some(id), None).await?;
    let mut enrollments = Vec::new();
    for registration in registrations {
        if !matches!(
            registration.status,
            RegistrationStatus::Registered | RegistrationStatus::Waitlisted
        ) {
            continue;
        }
        let section = state
            .store
            .get_scheduled_course(registration.scheduled_course_id)
            .await?;
        let course = state.store.get_course(section.course_id).await?;
        let semester = state.store.get_semester(section.semester_id).await?;
        enrollments.push(EnrollmentView {
            registration,
            section,
            course,
            semester,
        });
    }

    // Portal-wide and student-facing announcements, plus those pinned to a
    // section this student is currently in.
    let enrolled_sections: Vec<Uuid> = enrollments.iter().map(|e| e.section.id).collect();
    let announcements = state
        .store
        .list_announcements(None, None)
        .await?
        .into_iter()
        .filter(|a| matches!(a.audience, Audience::All | Audience::Students))
        .filter(|a| {
            a.scheduled_course_id
                .map_or(true, |section_id| enrolled_sections.contains(&section_id))
        })
        .collect();

    Ok(Json(ApiEnvelope::data(StudentDashboard {
        record,
        enrollments,
        announcements,
    })))
}

/// GET /api/dashboard/teacher/{id}
pub async fn teacher_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<TeacherDashboard>>, ApiFailure> {
    let teacher = state.store.get_user(id).await?;
    if teacher.role != UserRole::Teacher {
        return Err(PortError::Invalid(format!(
            "User '{}' is not a teacher",
            teacher.username
        ))
        .into());
    }

    let mut sections = Vec::new();
    for section in state.store.list_scheduled_courses(None, Some(id)).await? {
        let course = state.store.get_course(section.course_id).await?;
        let semester = state.store.get_semester(section.semester_id).await?;
        let mut roster = Vec::new();
        for registration in state
            .store
            .list_registrations(None, Some(section.id))
            .await?
        {
            if registration.status == RegistrationStatus::Dropped {
                continue;
            }
            let student = state.store.get_user(registration.student_id).await?;
            roster.push(RosterEntry {
                registration,
                student,
            });
        }
        sections.push(TeacherSectionView {
            section,
            course,
            semester,
            roster,
        });
    }

    Ok(Json(ApiEnvelope::data(TeacherDashboard {
        teacher,
        sections,
    })))
}

/// GET /api/dashboard/staff - Portal overview, staff only
pub async fn staff_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiEnvelope<StaffDashboard>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "view the staff dashboard")?;
    let stats = state.store.portal_stats().await?;
    let recent_activity = state.store.list_audit(RECENT_ACTIVITY_LIMIT).await?;
    Ok(Json(ApiEnvelope::data(StaffDashboard {
        stats,
        recent_activity,
    })))
}
