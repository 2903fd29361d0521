//! crates/cotbe_portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the portal.
//! These structs are independent of any storage or transport concern; the web
//! layer serializes them directly, which is why they carry serde derives.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// People and Access
//=========================================================================================

/// The four portal roles. `StaffHead` renders as "Staff Head" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    Teacher,
    #[serde(rename = "Staff Head")]
    StaffHead,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "Student"),
            UserRole::Teacher => write!(f, "Teacher"),
            UserRole::StaffHead => write!(f, "Staff Head"),
            UserRole::Admin => write!(f, "Admin"),
        }
    }
}

/// A portal account. Role-specific attributes are optional and only populated
/// for the roles they belong to (office for teachers, job title for the staff
/// head, enrollment date for students).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    /// Argon2 hash. Never serialized into API responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub department_id: Option<Uuid>,
    pub office: Option<String>,
    pub job_title: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Catalog and Facilities
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// A catalog course. `code` is unique across the catalog (e.g. "ARCH101").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: String,
    pub credits: u8,
    pub department_id: Uuid,
}

/// A campus building. `name` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    Lecture,
    Lab,
    Seminar,
    Auditorium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub building_id: Uuid,
    pub number: String,
    pub capacity: u32,
    pub kind: RoomKind,
}

//=========================================================================================
// Semesters and Scheduling
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Spring,
    Summer,
}

/// An academic semester with its registration and add/drop windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub id: Uuid,
    pub name: String,
    pub academic_year: String,
    pub term: Term,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_opens: NaiveDate,
    pub registration_closes: NaiveDate,
    pub add_drop_deadline: NaiveDate,
}

impl Semester {
    /// True while `today` falls inside the registration window (inclusive).
    pub fn registration_open(&self, today: NaiveDate) -> bool {
        today >= self.registration_opens && today <= self.registration_closes
    }

    /// True while drops are still allowed.
    pub fn drops_allowed(&self, today: NaiveDate) -> bool {
        today <= self.add_drop_deadline
    }
}

/// A specific offering (section) of a catalog course in a given semester,
/// taught by a given teacher in a given room.
///
/// `current_enrollment` is a maintained counter: it must always equal the
/// number of registrations for this section whose status is `Registered`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledCourse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub semester_id: Uuid,
    pub teacher_id: Uuid,
    pub room_id: Uuid,
    pub section_number: u32,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub days: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ScheduledCourse {
    pub fn is_full(&self) -> bool {
        self.current_enrollment >= self.max_capacity
    }
}

//=========================================================================================
// Registrations and Grades
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Registered,
    Dropped,
    Completed,
    Waitlisted,
}

impl RegistrationStatus {
    /// Only `Registered` rows occupy a seat in the section counter.
    pub fn occupies_seat(&self) -> bool {
        matches!(self, RegistrationStatus::Registered)
    }
}

/// Letter grades on the standard 4.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    D,
    F,
}

impl LetterGrade {
    /// Grade points earned per credit for this grade.
    pub fn points(&self) -> f32 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::AMinus => 3.7,
            LetterGrade::BPlus => 3.3,
            LetterGrade::B => 3.0,
            LetterGrade::BMinus => 2.7,
            LetterGrade::CPlus => 2.3,
            LetterGrade::C => 2.0,
            LetterGrade::CMinus => 1.7,
            LetterGrade::DPlus => 1.3,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }

    /// F earns no credit.
    pub fn earns_credit(&self) -> bool {
        !matches!(self, LetterGrade::F)
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        write!(f, "{}", label)
    }
}

/// The record linking a student to a scheduled course with a status and,
/// eventually, a grade. `grade_points` is derived from `final_grade` when a
/// grade is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub scheduled_course_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub status: RegistrationStatus,
    pub final_grade: Option<LetterGrade>,
    pub grade_points: Option<f32>,
}

//=========================================================================================
// Course Records, Announcements, Audit
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    Notes,
    Slides,
    Reading,
    Video,
    Link,
}

/// Material attached to a section. `body` holds the text used as context by
/// the course question-answering assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseMaterial {
    pub id: Uuid,
    pub scheduled_course_id: Uuid,
    pub title: String,
    pub kind: MaterialKind,
    pub body: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentKind {
    Quiz,
    Assignment,
    Midterm,
    Final,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub scheduled_course_id: Uuid,
    pub title: String,
    pub kind: AssessmentKind,
    pub max_score: u32,
    pub weight_percent: u32,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    All,
    Students,
    Teachers,
    Staff,
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Audience::All => write!(f, "All"),
            Audience::Students => write!(f, "Students"),
            Audience::Teachers => write!(f, "Teachers"),
            Audience::Staff => write!(f, "Staff"),
        }
    }
}

/// A portal announcement, optionally scoped to one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub scheduled_course_id: Option<Uuid>,
    pub posted_by: Uuid,
    pub posted_at: DateTime<Utc>,
}

/// One line in the portal audit trail. `action` is a dotted verb such as
/// "registration.created" or "auth.login".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub detail: String,
}

//=========================================================================================
// Assistant Conversations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single prior turn in the portal help chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

//=========================================================================================
// Aggregates
//=========================================================================================

/// One course line of a student's academic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordLine {
    pub course_code: String,
    pub course_title: String,
    pub semester: String,
    pub credits: u8,
    pub status: RegistrationStatus,
    pub final_grade: Option<LetterGrade>,
    pub grade_points: Option<f32>,
}

/// A student's academic record. GPA is the credit-weighted mean of grade
/// points over completed lines, absent until at least one grade exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub student_id: Uuid,
    pub student_name: String,
    pub lines: Vec<RecordLine>,
    pub credits_attempted: u32,
    pub credits_earned: u32,
    pub gpa: Option<f32>,
}

/// Portal-wide counts for the staff overview dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalStats {
    pub students: usize,
    pub teachers: usize,
    pub departments: usize,
    pub courses: usize,
    pub sections: usize,
    pub active_registrations: usize,
    pub waitlisted: usize,
    pub seats_filled: u32,
    pub seats_total: u32,
    pub announcements: usize,
}

//=========================================================================================
// Input Payloads
//=========================================================================================
// Create/update inputs passed through the store port. Handlers hash raw
// passwords before building `NewUser`; the raw password never reaches core.
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub department_id: Option<Uuid>,
    pub office: Option<String>,
    pub job_title: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
    pub department_id: Option<Uuid>,
    pub office: Option<String>,
    pub job_title: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub title: String,
    pub description: String,
    pub credits: u8,
    pub department_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub credits: Option<u8>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBuilding {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub building_id: Uuid,
    pub number: String,
    pub capacity: u32,
    pub kind: RoomKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub number: Option<String>,
    pub capacity: Option<u32>,
    pub kind: Option<RoomKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSemester {
    pub name: String,
    pub academic_year: String,
    pub term: Term,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_opens: NaiveDate,
    pub registration_closes: NaiveDate,
    pub add_drop_deadline: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemesterUpdate {
    pub name: Option<String>,
    pub academic_year: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_opens: Option<NaiveDate>,
    pub registration_closes: Option<NaiveDate>,
    pub add_drop_deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScheduledCourse {
    pub course_id: Uuid,
    pub semester_id: Uuid,
    pub teacher_id: Uuid,
    pub room_id: Uuid,
    pub section_number: u32,
    pub max_capacity: u32,
    pub days: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledCourseUpdate {
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub max_capacity: Option<u32>,
    pub days: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    pub student_id: Uuid,
    pub scheduled_course_id: Uuid,
}

/// Status changes and grading travel through the same update payload; a
/// final grade forces the status to `Completed` in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationUpdate {
    pub status: Option<RegistrationStatus>,
    pub final_grade: Option<LetterGrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    pub scheduled_course_id: Uuid,
    pub title: String,
    pub kind: MaterialKind,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    pub title: Option<String>,
    pub kind: Option<MaterialKind>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessment {
    pub scheduled_course_id: Uuid,
    pub title: String,
    pub kind: AssessmentKind,
    pub max_score: u32,
    pub weight_percent: u32,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentUpdate {
    pub title: Option<String>,
    pub kind: Option<AssessmentKind>,
    pub max_score: Option<u32>,
    pub weight_percent: Option<u32>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub scheduled_course_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub audience: Option<Audience>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_points_follow_the_four_point_scale() {
        assert_eq!(LetterGrade::A.points(), 4.0);
        assert_eq!(LetterGrade::AMinus.points(), 3.7);
        assert_eq!(LetterGrade::B.points(), 3.0);
        assert_eq!(LetterGrade::CMinus.points(), 1.7);
        assert_eq!(LetterGrade::F.points(), 0.0);
        assert!(!LetterGrade::F.earns_credit());
        assert!(LetterGrade::D.earns_credit());
    }

    #[test]
    fn letter_grades_serialize_with_signs() {
        assert_eq!(serde_json::to_string(&LetterGrade::AMinus).unwrap(), "\"A-\"");
        assert_eq!(serde_json::to_string(&LetterGrade::BPlus).unwrap(), "\"B+\"");
        let parsed: LetterGrade = serde_json::from_str("\"C+\"").unwrap();
        assert_eq!(parsed, LetterGrade::CPlus);
    }

    #[test]
    fn staff_head_role_uses_spaced_label() {
        assert_eq!(
            serde_json::to_string(&UserRole::StaffHead).unwrap(),
            "\"Staff Head\""
        );
        let parsed: UserRole = serde_json::from_str("\"Staff Head\"").unwrap();
        assert_eq!(parsed, UserRole::StaffHead);
        assert_eq!(UserRole::StaffHead.to_string(), "Staff Head");
    }

    #[test]
    fn registration_window_bounds_are_inclusive() {
        let semester = Semester {
            id: Uuid::new_v4(),
            name: "Fall 2026".to_string(),
            academic_year: "2026/27".to_string(),
            term: Term::Fall,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 20).unwrap(),
            registration_opens: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            registration_closes: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            add_drop_deadline: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        };
        assert!(semester.registration_open(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()));
        assert!(semester.registration_open(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()));
        assert!(!semester.registration_open(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()));
        assert!(semester.drops_allowed(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()));
        assert!(!semester.drops_allowed(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()));
    }
}
