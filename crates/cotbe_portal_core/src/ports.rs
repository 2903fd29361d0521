//! crates/cotbe_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the portal's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! in-memory store or the hosted LLM APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AcademicRecord, Announcement, AnnouncementUpdate, Assessment, AssessmentUpdate, Audience,
    AuditLogEntry, Building, BuildingUpdate, ChatTurn, Course, CourseMaterial, CourseUpdate,
    Department, DepartmentUpdate, MaterialUpdate, NewAnnouncement, NewAssessment, NewBuilding,
    NewCourse, NewDepartment, NewMaterial, NewRegistration, NewRoom, NewScheduledCourse,
    NewSemester, NewUser, PortalStats, Registration, RegistrationUpdate, Room, RoomUpdate,
    ScheduledCourse, ScheduledCourseUpdate, Semester, SemesterUpdate, User, UserUpdate,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// The web layer maps these onto HTTP statuses (400/401/403/404/409/500); the
/// store and LLM adapters never see HTTP types.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port
//=========================================================================================

/// The full storage contract for the portal. The production adapter keeps
/// every table as an in-process vector behind one lock; registration
/// operations maintain the `current_enrollment` counter so it always matches
/// the count of `Registered` rows per section.
#[async_trait]
pub trait PortalStore: Send + Sync {
    // --- User Management ---
    async fn list_users(&self) -> PortResult<Vec<User>>;
    async fn get_user(&self, id: Uuid) -> PortResult<User>;
    async fn get_user_by_username(&self, username: &str) -> PortResult<User>;
    async fn create_user(&self, new: NewUser) -> PortResult<User>;
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> PortResult<User>;
    async fn delete_user(&self, id: Uuid) -> PortResult<()>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> PortResult<()>;
    /// Resolves a session token to its user. Expired sessions are purged and
    /// reported as `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User>;
    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Departments ---
    async fn list_departments(&self) -> PortResult<Vec<Department>>;
    async fn get_department(&self, id: Uuid) -> PortResult<Department>;
    async fn create_department(&self, new: NewDepartment) -> PortResult<Department>;
    async fn update_department(&self, id: Uuid, update: DepartmentUpdate)
        -> PortResult<Department>;
    async fn delete_department(&self, id: Uuid) -> PortResult<()>;

    // --- Course Catalog ---
    async fn list_courses(&self) -> PortResult<Vec<Course>>;
    async fn get_course(&self, id: Uuid) -> PortResult<Course>;
    async fn create_course(&self, new: NewCourse) -> PortResult<Course>;
    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> PortResult<Course>;
    async fn delete_course(&self, id: Uuid) -> PortResult<()>;

    // --- Buildings and Rooms ---
    async fn list_buildings(&self) -> PortResult<Vec<Building>>;
    async fn get_building(&self, id: Uuid) -> PortResult<Building>;
    async fn create_building(&self, new: NewBuilding) -> PortResult<Building>;
    async fn update_building(&self, id: Uuid, update: BuildingUpdate) -> PortResult<Building>;
    async fn delete_building(&self, id: Uuid) -> PortResult<()>;
    async fn list_rooms(&self) -> PortResult<Vec<Room>>;
    async fn get_room(&self, id: Uuid) -> PortResult<Room>;
    async fn create_room(&self, new: NewRoom) -> PortResult<Room>;
    async fn update_room(&self, id: Uuid, update: RoomUpdate) -> PortResult<Room>;
    async fn delete_room(&self, id: Uuid) -> PortResult<()>;

    // --- Semesters ---
    async fn list_semesters(&self) -> PortResult<Vec<Semester>>;
    async fn get_semester(&self, id: Uuid) -> PortResult<Semester>;
    async fn create_semester(&self, new: NewSemester) -> PortResult<Semester>;
    async fn update_semester(&self, id: Uuid, update: SemesterUpdate) -> PortResult<Semester>;
    async fn delete_semester(&self, id: Uuid) -> PortResult<()>;

    // --- Scheduled Courses (Sections) ---
    async fn list_scheduled_courses(
        &self,
        semester_id: Option<Uuid>,
        teacher_id: Option<Uuid>,
    ) -> PortResult<Vec<ScheduledCourse>>;
    async fn get_scheduled_course(&self, id: Uuid) -> PortResult<ScheduledCourse>;
    async fn create_scheduled_course(
        &self,
        new: NewScheduledCourse,
    ) -> PortResult<ScheduledCourse>;
    async fn update_scheduled_course(
        &self,
        id: Uuid,
        update: ScheduledCourseUpdate,
    ) -> PortResult<ScheduledCourse>;
    async fn delete_scheduled_course(&self, id: Uuid) -> PortResult<()>;

    // --- Registrations ---
    // Creation decides between Registered and Waitlisted based on capacity;
    // every mutation keeps the section enrollment counter in step.
    async fn list_registrations(
        &self,
        student_id: Option<Uuid>,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<Registration>>;
    async fn get_registration(&self, id: Uuid) -> PortResult<Registration>;
    async fn create_registration(&self, new: NewRegistration) -> PortResult<Registration>;
    async fn update_registration(
        &self,
        id: Uuid,
        update: RegistrationUpdate,
    ) -> PortResult<Registration>;
    async fn delete_registration(&self, id: Uuid) -> PortResult<()>;

    // --- Course Materials ---
    async fn list_materials(&self, scheduled_course_id: Option<Uuid>)
        -> PortResult<Vec<CourseMaterial>>;
    async fn get_material(&self, id: Uuid) -> PortResult<CourseMaterial>;
    async fn create_material(&self, new: NewMaterial, uploaded_by: Uuid)
        -> PortResult<CourseMaterial>;
    async fn update_material(&self, id: Uuid, update: MaterialUpdate)
        -> PortResult<CourseMaterial>;
    async fn delete_material(&self, id: Uuid) -> PortResult<()>;

    // --- Assessments ---
    async fn list_assessments(&self, scheduled_course_id: Option<Uuid>)
        -> PortResult<Vec<Assessment>>;
    async fn get_assessment(&self, id: Uuid) -> PortResult<Assessment>;
    async fn create_assessment(&self, new: NewAssessment) -> PortResult<Assessment>;
    async fn update_assessment(&self, id: Uuid, update: AssessmentUpdate)
        -> PortResult<Assessment>;
    async fn delete_assessment(&self, id: Uuid) -> PortResult<()>;

    // --- Announcements ---
    async fn list_announcements(
        &self,
        audience: Option<Audience>,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<Announcement>>;
    async fn get_announcement(&self, id: Uuid) -> PortResult<Announcement>;
    async fn create_announcement(&self, new: NewAnnouncement, posted_by: Uuid)
        -> PortResult<Announcement>;
    async fn update_announcement(&self, id: Uuid, update: AnnouncementUpdate)
        -> PortResult<Announcement>;
    async fn delete_announcement(&self, id: Uuid) -> PortResult<()>;

    // --- Audit Log ---
    async fn append_audit(
        &self,
        actor: &str,
        action: &str,
        entity: &str,
        entity_id: Option<Uuid>,
        detail: String,
    ) -> PortResult<()>;
    /// Most recent entries first, capped at `limit`.
    async fn list_audit(&self, limit: usize) -> PortResult<Vec<AuditLogEntry>>;

    // --- Aggregates ---
    async fn student_academic_record(&self, student_id: Uuid) -> PortResult<AcademicRecord>;
    async fn portal_stats(&self) -> PortResult<PortalStats>;
}

//=========================================================================================
// Assistant Service Ports (Traits)
//=========================================================================================

/// Answers a student question against the concatenated materials of one
/// section. The web layer assembles the context; the adapter only prompts.
#[async_trait]
pub trait CourseQaService: Send + Sync {
    async fn answer_question(&self, question: &str, material_context: &str) -> PortResult<String>;
}

/// Summarizes a student's academic record into advisor-style insights.
#[async_trait]
pub trait AcademicInsightService: Send + Sync {
    async fn summarize_record(&self, record_context: &str) -> PortResult<String>;
}

/// Drafts feedback from a teacher to a student about course performance.
#[async_trait]
pub trait FeedbackDraftService: Send + Sync {
    async fn draft_feedback(&self, performance_context: &str, tone: &str) -> PortResult<String>;
}

/// Drafts a portal announcement from a topic and key points.
#[async_trait]
pub trait AnnouncementDraftService: Send + Sync {
    async fn draft_announcement(
        &self,
        topic: &str,
        audience: &str,
        key_points: &str,
    ) -> PortResult<String>;
}

/// Condenses a window of audit-log lines into a short activity report.
#[async_trait]
pub trait LogSummaryService: Send + Sync {
    async fn summarize_logs(&self, log_lines: &str) -> PortResult<String>;
}

/// The portal help chat: answers usage questions given the prior turns.
#[async_trait]
pub trait HelpChatService: Send + Sync {
    async fn reply(&self, history: &[ChatTurn], message: &str) -> PortResult<String>;
}
