//! services/api/src/adapters/store.rs
//!
//! This module contains the in-memory store adapter, which is the concrete
//! implementation of the `PortalStore` port from the `core` crate. Every table
//! is a plain vector held behind a single `tokio::sync::RwLock`, so writers are
//! serialized and the enrollment counter on scheduled courses cannot race.
//! State lives for the lifetime of the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotbe_portal_core::domain::{
    AcademicRecord, Announcement, AnnouncementUpdate, Assessment, AssessmentUpdate, Audience,
    AuditLogEntry, AuthSession, Building, BuildingUpdate, Course, CourseMaterial, CourseUpdate,
    Department, DepartmentUpdate, MaterialUpdate, NewAnnouncement, NewAssessment, NewBuilding,
    NewCourse, NewDepartment, NewMaterial, NewRegistration, NewRoom, NewScheduledCourse,
    NewSemester, NewUser, PortalStats, RecordLine, Registration, RegistrationStatus,
    RegistrationUpdate, Room, RoomUpdate, ScheduledCourse, ScheduledCourseUpdate, Semester,
    SemesterUpdate, User, UserRole, UserUpdate,
};
use cotbe_portal_core::ports::{PortError, PortResult, PortalStore};
use tokio::sync::RwLock;
use uuid::Uuid;

//=========================================================================================
// The Table Container
//=========================================================================================

/// All portal tables. One instance of this lives inside the store's lock;
/// anything that needs more than one table takes the lock once and works on
/// the whole container.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<AuthSession>,
    departments: Vec<Department>,
    courses: Vec<Course>,
    buildings: Vec<Building>,
    rooms: Vec<Room>,
    semesters: Vec<Semester>,
    scheduled_courses: Vec<ScheduledCourse>,
    registrations: Vec<Registration>,
    materials: Vec<CourseMaterial>,
    assessments: Vec<Assessment>,
    announcements: Vec<Announcement>,
    audit: Vec<AuditLogEntry>,
}

impl Tables {
    /// Counts the rows that occupy a seat in the given section.
    fn seat_count(&self, scheduled_course_id: Uuid) -> u32 {
        self.registrations
            .iter()
            .filter(|r| r.scheduled_course_id == scheduled_course_id && r.status.occupies_seat())
            .count() as u32
    }

    fn user_by_id(&self, id: Uuid) -> PortResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", id)))
    }

    fn section_by_id(&self, id: Uuid) -> PortResult<&ScheduledCourse> {
        self.scheduled_courses
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Scheduled course {} not found", id)))
    }

    /// Adjusts a section's enrollment counter by the given delta. The counter
    /// never goes below zero.
    fn adjust_enrollment(&mut self, scheduled_course_id: Uuid, delta: i32) {
        if delta == 0 {
            return;
        }
        if let Some(section) = self
            .scheduled_courses
            .iter_mut()
            .find(|s| s.id == scheduled_course_id)
        {
            if delta > 0 {
                section.current_enrollment += delta as u32;
            } else {
                section.current_enrollment =
                    section.current_enrollment.saturating_sub((-delta) as u32);
            }
        }
    }
}

/// Rejects empty or whitespace-only required fields.
fn require_text(field: &str, value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An in-memory store adapter that implements the `PortalStore` port.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates a new, empty `MemoryStore`.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Inserts a registration row exactly as given, bypassing the window and
    /// capacity rules. Seeding uses this for historical rows and must call
    /// `rebuild_enrollment_counts` once it has finished.
    pub async fn restore_registration(&self, registration: Registration) {
        let mut tables = self.tables.write().await;
        tables.registrations.push(registration);
    }

    /// Recomputes `current_enrollment` for every section from the actual
    /// registration rows. Run once after seeding.
    pub async fn rebuild_enrollment_counts(&self) {
        let mut tables = self.tables.write().await;
        let counts: Vec<(Uuid, u32)> = tables
            .scheduled_courses
            .iter()
            .map(|s| (s.id, tables.seat_count(s.id)))
            .collect();
        for (id, count) in counts {
            if let Some(section) = tables.scheduled_courses.iter_mut().find(|s| s.id == id) {
                section.current_enrollment = count;
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// `PortalStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PortalStore for MemoryStore {
    // --- User Management ---

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.clone())
    }

    async fn get_user(&self, id: Uuid) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables.user_by_id(id).cloned()
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))
    }

    async fn create_user(&self, new: NewUser) -> PortResult<User> {
        require_text("username", &new.username)?;
        require_text("email", &new.email)?;
        require_text("first_name", &new.first_name)?;
        require_text("last_name", &new.last_name)?;

        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == new.username) {
            return Err(PortError::Conflict(format!(
                "Username '{}' is already taken",
                new.username
            )));
        }
        if tables.users.iter().any(|u| u.email == new.email) {
            return Err(PortError::Conflict(format!(
                "Email '{}' is already in use",
                new.email
            )));
        }
        if let Some(dept_id) = new.department_id {
            if !tables.departments.iter().any(|d| d.id == dept_id) {
                return Err(PortError::Invalid(format!("Unknown department {}", dept_id)));
            }
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            password_hash: new.password_hash,
            department_id: new.department_id,
            office: new.office,
            job_title: new.job_title,
            enrollment_date: new.enrollment_date,
            date_of_birth: new.date_of_birth,
            address: new.address,
            phone: new.phone,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", id)))?;

        if let Some(email) = &update.email {
            require_text("email", email)?;
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(PortError::Conflict(format!(
                    "Email '{}' is already in use",
                    email
                )));
            }
        }
        if let Some(dept_id) = update.department_id {
            if !tables.departments.iter().any(|d| d.id == dept_id) {
                return Err(PortError::Invalid(format!("Unknown department {}", dept_id)));
            }
        }

        let user = &mut tables.users[idx];
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if update.department_id.is_some() {
            user.department_id = update.department_id;
        }
        if update.office.is_some() {
            user.office = update.office;
        }
        if update.job_title.is_some() {
            user.job_title = update.job_title;
        }
        if update.enrollment_date.is_some() {
            user.enrollment_date = update.enrollment_date;
        }
        if update.date_of_birth.is_some() {
            user.date_of_birth = update.date_of_birth;
        }
        if update.address.is_some() {
            user.address = update.address;
        }
        if update.phone.is_some() {
            user.phone = update.phone;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return Err(PortError::NotFound(format!("User {} not found", id)));
        }
        let has_active_registrations = tables.registrations.iter().any(|r| {
            r.student_id == id
                && matches!(
                    r.status,
                    RegistrationStatus::Registered | RegistrationStatus::Waitlisted
                )
        });
        if has_active_registrations {
            return Err(PortError::Conflict(
                "User has active registrations".to_string(),
            ));
        }
        if tables.scheduled_courses.iter().any(|s| s.teacher_id == id) {
            return Err(PortError::Conflict(
                "User is assigned to scheduled courses".to_string(),
            ));
        }
        tables.users.retain(|u| u.id != id);
        tables.sessions.retain(|s| s.user_id != id);
        Ok(())
    }

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.user_by_id(user_id)?;
        tables.sessions.push(AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        });
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        if session.expires_at <= Utc::now() {
            tables.sessions.retain(|s| s.id != session_id);
            return Err(PortError::Unauthorized);
        }
        let user = tables
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        if !user.is_active {
            return Err(PortError::Unauthorized);
        }
        Ok(user)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.sessions.retain(|s| s.id != session_id);
        Ok(())
    }

    // --- Departments ---

    async fn list_departments(&self) -> PortResult<Vec<Department>> {
        let tables = self.tables.read().await;
        Ok(tables.departments.clone())
    }

    async fn get_department(&self, id: Uuid) -> PortResult<Department> {
        let tables = self.tables.read().await;
        tables
            .departments
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Department {} not found", id)))
    }

    async fn create_department(&self, new: NewDepartment) -> PortResult<Department> {
        require_text("name", &new.name)?;
        let mut tables = self.tables.write().await;
        let department = Department {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
        };
        tables.departments.push(department.clone());
        Ok(department)
    }

    async fn update_department(
        &self,
        id: Uuid,
        update: DepartmentUpdate,
    ) -> PortResult<Department> {
        let mut tables = self.tables.write().await;
        let department = tables
            .departments
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Department {} not found", id)))?;
        if let Some(name) = update.name {
            require_text("name", &name)?;
            department.name = name;
        }
        if let Some(description) = update.description {
            department.description = description;
        }
        Ok(department.clone())
    }

    async fn delete_department(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.departments.iter().any(|d| d.id == id) {
            return Err(PortError::NotFound(format!("Department {} not found", id)));
        }
        if tables.courses.iter().any(|c| c.department_id == id) {
            return Err(PortError::Conflict(
                "Department still has courses in the catalog".to_string(),
            ));
        }
        tables.departments.retain(|d| d.id != id);
        Ok(())
    }

    // --- Course Catalog ---

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.clone())
    }

    async fn get_course(&self, id: Uuid) -> PortResult<Course> {
        let tables = self.tables.read().await;
        tables
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", id)))
    }

    async fn create_course(&self, new: NewCourse) -> PortResult<Course> {
        require_text("code", &new.code)?;
        require_text("title", &new.title)?;
        if !(1..=6).contains(&new.credits) {
            return Err(PortError::Invalid(
                "credits must be between 1 and 6".to_string(),
            ));
        }
        let mut tables = self.tables.write().await;
        if !tables.departments.iter().any(|d| d.id == new.department_id) {
            return Err(PortError::Invalid(format!(
                "Unknown department {}",
                new.department_id
            )));
        }
        if tables.courses.iter().any(|c| c.code == new.code) {
            return Err(PortError::Conflict(format!(
                "Course code '{}' already exists",
                new.code
            )));
        }
        let course = Course {
            id: Uuid::new_v4(),
            code: new.code,
            title: new.title,
            description: new.description,
            credits: new.credits,
            department_id: new.department_id,
        };
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> PortResult<Course> {
        let mut tables = self.tables.write().await;
        if let Some(credits) = update.credits {
            if !(1..=6).contains(&credits) {
                return Err(PortError::Invalid(
                    "credits must be between 1 and 6".to_string(),
                ));
            }
        }
        if let Some(dept_id) = update.department_id {
            if !tables.departments.iter().any(|d| d.id == dept_id) {
                return Err(PortError::Invalid(format!("Unknown department {}", dept_id)));
            }
        }
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", id)))?;
        if let Some(title) = update.title {
            require_text("title", &title)?;
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(credits) = update.credits {
            course.credits = credits;
        }
        if let Some(dept_id) = update.department_id {
            course.department_id = dept_id;
        }
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == id) {
            return Err(PortError::NotFound(format!("Course {} not found", id)));
        }
        if tables.scheduled_courses.iter().any(|s| s.course_id == id) {
            return Err(PortError::Conflict(
                "Course still has scheduled sections".to_string(),
            ));
        }
        tables.courses.retain(|c| c.id != id);
        Ok(())
    }

    // --- Buildings and Rooms ---

    async fn list_buildings(&self) -> PortResult<Vec<Building>> {
        let tables = self.tables.read().await;
        Ok(tables.buildings.clone())
    }

    async fn get_building(&self, id: Uuid) -> PortResult<Building> {
        let tables = self.tables.read().await;
        tables
            .buildings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Building {} not found", id)))
    }

    async fn create_building(&self, new: NewBuilding) -> PortResult<Building> {
        require_text("name", &new.name)?;
        let mut tables = self.tables.write().await;
        if tables.buildings.iter().any(|b| b.name == new.name) {
            return Err(PortError::Conflict(format!(
                "Building '{}' already exists",
                new.name
            )));
        }
        let building = Building {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
        };
        tables.buildings.push(building.clone());
        Ok(building)
    }

    async fn update_building(&self, id: Uuid, update: BuildingUpdate) -> PortResult<Building> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &update.name {
            require_text("name", name)?;
            if tables.buildings.iter().any(|b| b.id != id && &b.name == name) {
                return Err(PortError::Conflict(format!(
                    "Building '{}' already exists",
                    name
                )));
            }
        }
        let building = tables
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Building {} not found", id)))?;
        if let Some(name) = update.name {
            building.name = name;
        }
        if let Some(address) = update.address {
            building.address = address;
        }
        Ok(building.clone())
    }

    async fn delete_building(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.buildings.iter().any(|b| b.id == id) {
            return Err(PortError::NotFound(format!("Building {} not found", id)));
        }
        if tables.rooms.iter().any(|r| r.building_id == id) {
            return Err(PortError::Conflict("Building still has rooms".to_string()));
        }
        tables.buildings.retain(|b| b.id != id);
        Ok(())
    }

    async fn list_rooms(&self) -> PortResult<Vec<Room>> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.clone())
    }

    async fn get_room(&self, id: Uuid) -> PortResult<Room> {
        let tables = self.tables.read().await;
        tables
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Room {} not found", id)))
    }

    async fn create_room(&self, new: NewRoom) -> PortResult<Room> {
        require_text("number", &new.number)?;
        if new.capacity == 0 {
            return Err(PortError::Invalid("capacity must be at least 1".to_string()));
        }
        let mut tables = self.tables.write().await;
        if !tables.buildings.iter().any(|b| b.id == new.building_id) {
            return Err(PortError::Invalid(format!(
                "Unknown building {}",
                new.building_id
            )));
        }
        let room = Room {
            id: Uuid::new_v4(),
            building_id: new.building_id,
            number: new.number,
            capacity: new.capacity,
            kind: new.kind,
        };
        tables.rooms.push(room.clone());
        Ok(room)
    }

    async fn update_room(&self, id: Uuid, update: RoomUpdate) -> PortResult<Room> {
        let mut tables = self.tables.write().await;
        if let Some(capacity) = update.capacity {
            if capacity == 0 {
                return Err(PortError::Invalid("capacity must be at least 1".to_string()));
            }
        }
        let room = tables
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Room {} not found", id)))?;
        if let Some(number) = update.number {
            require_text("number", &number)?;
            room.number = number;
        }
        if let Some(capacity) = update.capacity {
            room.capacity = capacity;
        }
        if let Some(kind) = update.kind {
            room.kind = kind;
        }
        Ok(room.clone())
    }

    async fn delete_room(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.rooms.iter().any(|r| r.id == id) {
            return Err(PortError::NotFound(format!("Room {} not found", id)));
        }
        if tables.scheduled_courses.iter().any(|s| s.room_id == id) {
            return Err(PortError::Conflict(
                "Room is in use by scheduled courses".to_string(),
            ));
        }
        tables.rooms.retain(|r| r.id != id);
        Ok(())
    }

    // --- Semesters ---

    async fn list_semesters(&self) -> PortResult<Vec<Semester>> {
        let tables = self.tables.read().await;
        Ok(tables.semesters.clone())
    }

    async fn get_semester(&self, id: Uuid) -> PortResult<Semester> {
        let tables = self.tables.read().await;
        tables
            .semesters
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Semester {} not found", id)))
    }

    async fn create_semester(&self, new: NewSemester) -> PortResult<Semester> {
        require_text("name", &new.name)?;
        require_text("academic_year", &new.academic_year)?;
        let mut tables = self.tables.write().await;
        let semester = Semester {
            id: Uuid::new_v4(),
            name: new.name,
            academic_year: new.academic_year,
            term: new.term,
            start_date: new.start_date,
            end_date: new.end_date,
            registration_opens: new.registration_opens,
            registration_closes: new.registration_closes,
            add_drop_deadline: new.add_drop_deadline,
        };
        tables.semesters.push(semester.clone());
        Ok(semester)
    }

    async fn update_semester(&self, id: Uuid, update: SemesterUpdate) -> PortResult<Semester> {
        let mut tables = self.tables.write().await;
        let semester = tables
            .semesters
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Semester {} not found", id)))?;
        if let Some(name) = update.name {
            require_text("name", &name)?;
            semester.name = name;
        }
        if let Some(academic_year) = update.academic_year {
            semester.academic_year = academic_year;
        }
        if let Some(start_date) = update.start_date {
            semester.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            semester.end_date = end_date;
        }
        if let Some(registration_opens) = update.registration_opens {
            semester.registration_opens = registration_opens;
        }
        if let Some(registration_closes) = update.registration_closes {
            semester.registration_closes = registration_closes;
        }
        if let Some(add_drop_deadline) = update.add_drop_deadline {
            semester.add_drop_deadline = add_drop_deadline;
        }
        Ok(semester.clone())
    }

    async fn delete_semester(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.semesters.iter().any(|s| s.id == id) {
            return Err(PortError::NotFound(format!("Semester {} not found", id)));
        }
        if tables.scheduled_courses.iter().any(|s| s.semester_id == id) {
            return Err(PortError::Conflict(
                "Semester still has scheduled courses".to_string(),
            ));
        }
        tables.semesters.retain(|s| s.id != id);
        Ok(())
    }

    // --- Scheduled Courses (Sections) ---

    async fn list_scheduled_courses(
        &self,
        semester_id: Option<Uuid>,
        teacher_id: Option<Uuid>,
    ) -> PortResult<Vec<ScheduledCourse>> {
        let tables = self.tables.read().await;
        Ok(tables
            .scheduled_courses
            .iter()
            .filter(|s| semester_id.map_or(true, |id| s.semester_id == id))
            .filter(|s| teacher_id.map_or(true, |id| s.teacher_id == id))
            .cloned()
            .collect())
    }

    async fn get_scheduled_course(&self, id: Uuid) -> PortResult<ScheduledCourse> {
        let tables = self.tables.read().await;
        tables.section_by_id(id).cloned()
    }

    async fn create_scheduled_course(
        &self,
        new: NewScheduledCourse,
    ) -> PortResult<ScheduledCourse> {
        require_text("days", &new.days)?;
        if new.max_capacity == 0 {
            return Err(PortError::Invalid(
                "max_capacity must be at least 1".to_string(),
            ));
        }
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == new.course_id) {
            return Err(PortError::Invalid(format!("Unknown course {}", new.course_id)));
        }
        if !tables.semesters.iter().any(|s| s.id == new.semester_id) {
            return Err(PortError::Invalid(format!(
                "Unknown semester {}",
                new.semester_id
            )));
        }
        if !tables.rooms.iter().any(|r| r.id == new.room_id) {
            return Err(PortError::Invalid(format!("Unknown room {}", new.room_id)));
        }
        let teacher = tables
            .users
            .iter()
            .find(|u| u.id == new.teacher_id)
            .ok_or_else(|| PortError::Invalid(format!("Unknown teacher {}", new.teacher_id)))?;
        if teacher.role != UserRole::Teacher {
            return Err(PortError::Invalid(format!(
                "User '{}' is not a teacher",
                teacher.username
            )));
        }
        let duplicate = tables.scheduled_courses.iter().any(|s| {
            s.course_id == new.course_id
                && s.semester_id == new.semester_id
                && s.section_number == new.section_number
        });
        if duplicate {
            return Err(PortError::Conflict(format!(
                "Section {} of this course already exists in the semester",
                new.section_number
            )));
        }
        let section = ScheduledCourse {
            id: Uuid::new_v4(),
            course_id: new.course_id,
            semester_id: new.semester_id,
            teacher_id: new.teacher_id,
            room_id: new.room_id,
            section_number: new.section_number,
            max_capacity: new.max_capacity,
            current_enrollment: 0,
            days: new.days,
            start_time: new.start_time,
            end_time: new.end_time,
        };
        tables.scheduled_courses.push(section.clone());
        Ok(section)
    }

    async fn update_scheduled_course(
        &self,
        id: Uuid,
        update: ScheduledCourseUpdate,
    ) -> PortResult<ScheduledCourse> {
        let mut tables = self.tables.write().await;
        if let Some(teacher_id) = update.teacher_id {
            let teacher = tables
                .users
                .iter()
                .find(|u| u.id == teacher_id)
                .ok_or_else(|| PortError::Invalid(format!("Unknown teacher {}", teacher_id)))?;
            if teacher.role != UserRole::Teacher {
                return Err(PortError::Invalid(format!(
                    "User '{}' is not a teacher",
                    teacher.username
                )));
            }
        }
        if let Some(room_id) = update.room_id {
            if !tables.rooms.iter().any(|r| r.id == room_id) {
                return Err(PortError::Invalid(format!("Unknown room {}", room_id)));
            }
        }
        if let Some(max_capacity) = update.max_capacity {
            if max_capacity == 0 {
                return Err(PortError::Invalid(
                    "max_capacity must be at least 1".to_string(),
                ));
            }
        }
        let section = tables
            .scheduled_courses
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Scheduled course {} not found", id)))?;
        if let Some(teacher_id) = update.teacher_id {
            section.teacher_id = teacher_id;
        }
        if let Some(room_id) = update.room_id {
            section.room_id = room_id;
        }
        if let Some(max_capacity) = update.max_capacity {
            section.max_capacity = max_capacity;
        }
        if let Some(days) = update.days {
            require_text("days", &days)?;
            section.days = days;
        }
        if let Some(start_time) = update.start_time {
            section.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            section.end_time = end_time;
        }
        Ok(section.clone())
    }

    async fn delete_scheduled_course(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.scheduled_courses.iter().any(|s| s.id == id) {
            return Err(PortError::NotFound(format!(
                "Scheduled course {} not found",
                id
            )));
        }
        if tables
            .registrations
            .iter()
            .any(|r| r.scheduled_course_id == id)
        {
            return Err(PortError::Conflict(
                "Scheduled course still has registrations".to_string(),
            ));
        }
        tables.scheduled_courses.retain(|s| s.id != id);
        tables.materials.retain(|m| m.scheduled_course_id != id);
        tables.assessments.retain(|a| a.scheduled_course_id != id);
        Ok(())
    }

    // --- Registrations ---

    async fn list_registrations(
        &self,
        student_id: Option<Uuid>,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<Registration>> {
        let tables = self.tables.read().await;
        Ok(tables
            .registrations
            .iter()
            .filter(|r| student_id.map_or(true, |id| r.student_id == id))
            .filter(|r| scheduled_course_id.map_or(true, |id| r.scheduled_course_id == id))
            .cloned()
            .collect())
    }

    async fn get_registration(&self, id: Uuid) -> PortResult<Registration> {
        let tables = self.tables.read().await;
        tables
            .registrations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Registration {} not found", id)))
    }

    async fn create_registration(&self, new: NewRegistration) -> PortResult<Registration> {
        let mut tables = self.tables.write().await;

        let student = tables
            .users
            .iter()
            .find(|u| u.id == new.student_id)
            .ok_or_else(|| PortError::Invalid(format!("Unknown student {}", new.student_id)))?;
        if student.role != UserRole::Student {
            return Err(PortError::Invalid(format!(
                "User '{}' is not a student",
                student.username
            )));
        }
        if !student.is_active {
            return Err(PortError::Invalid(format!(
                "Student '{}' is not active",
                student.username
            )));
        }

        let section = tables
            .scheduled_courses
            .iter()
            .find(|s| s.id == new.scheduled_course_id)
            .ok_or_else(|| {
                PortError::Invalid(format!(
                    "Unknown scheduled course {}",
                    new.scheduled_course_id
                ))
            })?;
        let semester = tables
            .semesters
            .iter()
            .find(|s| s.id == section.semester_id)
            .ok_or_else(|| {
                PortError::Unexpected(format!(
                    "Scheduled course {} references a missing semester",
                    section.id
                ))
            })?;

        let today = Utc::now().date_naive();
        if !semester.registration_open(today) {
            return Err(PortError::Invalid(format!(
                "Registration for {} is closed",
                semester.name
            )));
        }

        let duplicate = tables.registrations.iter().any(|r| {
            r.student_id == new.student_id
                && r.scheduled_course_id == new.scheduled_course_id
                && r.status != RegistrationStatus::Dropped
        });
        if duplicate {
            return Err(PortError::Conflict(
                "Student is already registered for this scheduled course".to_string(),
            ));
        }

        // A full section still accepts the registration, but onto the
        // waitlist. Only a `Registered` row takes a seat.
        let status = if section.is_full() {
            RegistrationStatus::Waitlisted
        } else {
            RegistrationStatus::Registered
        };

        let registration = Registration {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            scheduled_course_id: new.scheduled_course_id,
            registered_at: Utc::now(),
            status,
            final_grade: None,
            grade_points: None,
        };
        tables.registrations.push(registration.clone());
        if status.occupies_seat() {
            tables.adjust_enrollment(new.scheduled_course_id, 1);
        }
        Ok(registration)
    }

    async fn update_registration(
        &self,
        id: Uuid,
        update: RegistrationUpdate,
    ) -> PortResult<Registration> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Registration {} not found", id)))?;

        let old_status = tables.registrations[idx].status;
        let section_id = tables.registrations[idx].scheduled_course_id;

        // A final grade always wins: it closes the registration out as
        // `Completed` and stores the derived grade points.
        let new_status = match (update.final_grade, update.status) {
            (Some(_), _) => RegistrationStatus::Completed,
            (None, Some(status)) => status,
            (None, None) => old_status,
        };

        if new_status == RegistrationStatus::Registered
            && old_status != RegistrationStatus::Registered
        {
            let section = tables.section_by_id(section_id)?;
            if section.is_full() {
                return Err(PortError::Conflict(format!(
                    "Scheduled course {} is full",
                    section_id
                )));
            }
        }

        if new_status == RegistrationStatus::Dropped
            && old_status == RegistrationStatus::Registered
        {
            let section = tables.section_by_id(section_id)?;
            let semester = tables
                .semesters
                .iter()
                .find(|s| s.id == section.semester_id)
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "Scheduled course {} references a missing semester",
                        section.id
                    ))
                })?;
            if !semester.drops_allowed(Utc::now().date_naive()) {
                return Err(PortError::Invalid(format!(
                    "The add/drop deadline for {} has passed",
                    semester.name
                )));
            }
        }

        {
            let registration = &mut tables.registrations[idx];
            registration.status = new_status;
            if let Some(grade) = update.final_grade {
                registration.final_grade = Some(grade);
                registration.grade_points = Some(grade.points());
            }
        }

        let delta = new_status.occupies_seat() as i32 - old_status.occupies_seat() as i32;
        tables.adjust_enrollment(section_id, delta);

        Ok(tables.registrations[idx].clone())
    }

    async fn delete_registration(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Registration {} not found", id)))?;
        let removed = tables.registrations.remove(idx);
        if removed.status.occupies_seat() {
            tables.adjust_enrollment(removed.scheduled_course_id, -1);
        }
        Ok(())
    }

    // --- Course Materials ---

    async fn list_materials(
        &self,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<CourseMaterial>> {
        let tables = self.tables.read().await;
        Ok(tables
            .materials
            .iter()
            .filter(|m| scheduled_course_id.map_or(true, |id| m.scheduled_course_id == id))
            .cloned()
            .collect())
    }

    async fn get_material(&self, id: Uuid) -> PortResult<CourseMaterial> {
        let tables = self.tables.read().await;
        tables
            .materials
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Course material {} not found", id)))
    }

    async fn create_material(
        &self,
        new: NewMaterial,
        uploaded_by: Uuid,
    ) -> PortResult<CourseMaterial> {
        require_text("title", &new.title)?;
        let mut tables = self.tables.write().await;
        if !tables
            .scheduled_courses
            .iter()
            .any(|s| s.id == new.scheduled_course_id)
        {
            return Err(PortError::Invalid(format!(
                "Unknown scheduled course {}",
                new.scheduled_course_id
            )));
        }
        let material = CourseMaterial {
            id: Uuid::new_v4(),
            scheduled_course_id: new.scheduled_course_id,
            title: new.title,
            kind: new.kind,
            body: new.body,
            uploaded_by,
            uploaded_at: Utc::now(),
        };
        tables.materials.push(material.clone());
        Ok(material)
    }

    async fn update_material(
        &self,
        id: Uuid,
        update: MaterialUpdate,
    ) -> PortResult<CourseMaterial> {
        let mut tables = self.tables.write().await;
        let material = tables
            .materials
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Course material {} not found", id)))?;
        if let Some(title) = update.title {
            require_text("title", &title)?;
            material.title = title;
        }
        if let Some(kind) = update.kind {
            material.kind = kind;
        }
        if let Some(body) = update.body {
            material.body = body;
        }
        Ok(material.clone())
    }

    async fn delete_material(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.materials.iter().any(|m| m.id == id) {
            return Err(PortError::NotFound(format!(
                "Course material {} not found",
                id
            )));
        }
        tables.materials.retain(|m| m.id != id);
        Ok(())
    }

    // --- Assessments ---

    async fn list_assessments(
        &self,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<Assessment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assessments
            .iter()
            .filter(|a| scheduled_course_id.map_or(true, |id| a.scheduled_course_id == id))
            .cloned()
            .collect())
    }

    async fn get_assessment(&self, id: Uuid) -> PortResult<Assessment> {
        let tables = self.tables.read().await;
        tables
            .assessments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Assessment {} not found", id)))
    }

    async fn create_assessment(&self, new: NewAssessment) -> PortResult<Assessment> {
        require_text("title", &new.title)?;
        if new.max_score == 0 {
            return Err(PortError::Invalid("max_score must be at least 1".to_string()));
        }
        if new.weight_percent > 100 {
            return Err(PortError::Invalid(
                "weight_percent must not exceed 100".to_string(),
            ));
        }
        let mut tables = self.tables.write().await;
        if !tables
            .scheduled_courses
            .iter()
            .any(|s| s.id == new.scheduled_course_id)
        {
            return Err(PortError::Invalid(format!(
                "Unknown scheduled course {}",
                new.scheduled_course_id
            )));
        }
        let assessment = Assessment {
            id: Uuid::new_v4(),
            scheduled_course_id: new.scheduled_course_id,
            title: new.title,
            kind: new.kind,
            max_score: new.max_score,
            weight_percent: new.weight_percent,
            due_date: new.due_date,
        };
        tables.assessments.push(assessment.clone());
        Ok(assessment)
    }

    async fn update_assessment(
        &self,
        id: Uuid,
        update: AssessmentUpdate,
    ) -> PortResult<Assessment> {
        let mut tables = self.tables.write().await;
        if let Some(max_score) = update.max_score {
            if max_score == 0 {
                return Err(PortError::Invalid("max_score must be at least 1".to_string()));
            }
        }
        if let Some(weight_percent) = update.weight_percent {
            if weight_percent > 100 {
                return Err(PortError::Invalid(
                    "weight_percent must not exceed 100".to_string(),
                ));
            }
        }
        let assessment = tables
            .assessments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Assessment {} not found", id)))?;
        if let Some(title) = update.title {
            require_text("title", &title)?;
            assessment.title = title;
        }
        if let Some(kind) = update.kind {
            assessment.kind = kind;
        }
        if let Some(max_score) = update.max_score {
            assessment.max_score = max_score;
        }
        if let Some(weight_percent) = update.weight_percent {
            assessment.weight_percent = weight_percent;
        }
        if let Some(due_date) = update.due_date {
            assessment.due_date = due_date;
        }
        Ok(assessment.clone())
    }

    async fn delete_assessment(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.assessments.iter().any(|a| a.id == id) {
            return Err(PortError::NotFound(format!("Assessment {} not found", id)));
        }
        tables.assessments.retain(|a| a.id != id);
        Ok(())
    }

    // --- Announcements ---

    async fn list_announcements(
        &self,
        audience: Option<Audience>,
        scheduled_course_id: Option<Uuid>,
    ) -> PortResult<Vec<Announcement>> {
        let tables = self.tables.read().await;
        let mut announcements: Vec<Announcement> = tables
            .announcements
            .iter()
            .filter(|a| audience.map_or(true, |wanted| a.audience == wanted))
            .filter(|a| scheduled_course_id.map_or(true, |id| a.scheduled_course_id == Some(id)))
            .cloned()
            .collect();
        announcements.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(announcements)
    }

    async fn get_announcement(&self, id: Uuid) -> PortResult<Announcement> {
        let tables = self.tables.read().await;
        tables
            .announcements
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Announcement {} not found", id)))
    }

    async fn create_announcement(
        &self,
        new: NewAnnouncement,
        posted_by: Uuid,
    ) -> PortResult<Announcement> {
        require_text("title", &new.title)?;
        require_text("body", &new.body)?;
        let mut tables = self.tables.write().await;
        if let Some(section_id) = new.scheduled_course_id {
            if !tables.scheduled_courses.iter().any(|s| s.id == section_id) {
                return Err(PortError::Invalid(format!(
                    "Unknown scheduled course {}",
                    section_id
                )));
            }
        }
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: new.title,
            body: new.body,
            audience: new.audience,
            scheduled_course_id: new.scheduled_course_id,
            posted_by,
            posted_at: Utc::now(),
        };
        tables.announcements.push(announcement.clone());
        Ok(announcement)
    }

    async fn update_announcement(
        &self,
        id: Uuid,
        update: AnnouncementUpdate,
    ) -> PortResult<Announcement> {
        let mut tables = self.tables.write().await;
        let announcement = tables
            .announcements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Announcement {} not found", id)))?;
        if let Some(title) = update.title {
            require_text("title", &title)?;
            announcement.title = title;
        }
        if let Some(body) = update.body {
            require_text("body", &body)?;
            announcement.body = body;
        }
        if let Some(audience) = update.audience {
            announcement.audience = audience;
        }
        Ok(announcement.clone())
    }

    async fn delete_announcement(&self, id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.announcements.iter().any(|a| a.id == id) {
            return Err(PortError::NotFound(format!("Announcement {} not found", id)));
        }
        tables.announcements.retain(|a| a.id != id);
        Ok(())
    }

    // --- Audit Log ---

    async fn append_audit(
        &self,
        actor: &str,
        action: &str,
        entity: &str,
        entity_id: Option<Uuid>,
        detail: String,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.audit.push(AuditLogEntry {
            id: Uuid::new_v4(),
            at: Utc::now(),
            actor: actor.to_string(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            detail,
        });
        Ok(())
    }

    async fn list_audit(&self, limit: usize) -> PortResult<Vec<AuditLogEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.audit.iter().rev().take(limit).cloned().collect())
    }

    // --- Aggregates ---

    async fn student_academic_record(&self, student_id: Uuid) -> PortResult<AcademicRecord> {
        let tables = self.tables.read().await;
        let student = tables.user_by_id(student_id)?;
        if student.role != UserRole::Student {
            return Err(PortError::Invalid(format!(
                "User '{}' is not a student",
                student.username
            )));
        }

        let mut lines = Vec::new();
        for registration in tables
            .registrations
            .iter()
            .filter(|r| r.student_id == student_id)
        {
            let section = tables.section_by_id(registration.scheduled_course_id)?;
            let course = tables
                .courses
                .iter()
                .find(|c| c.id == section.course_id)
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "Scheduled course {} references a missing course",
                        section.id
                    ))
                })?;
            let semester = tables
                .semesters
                .iter()
                .find(|s| s.id == section.semester_id)
                .ok_or_else(|| {
                    PortError::Unexpected(format!(
                        "Scheduled course {} references a missing semester",
                        section.id
                    ))
                })?;
            lines.push(RecordLine {
                course_code: course.code.clone(),
                course_title: course.title.clone(),
                semester: semester.name.clone(),
                credits: course.credits,
                status: registration.status,
                final_grade: registration.final_grade,
                grade_points: registration.grade_points,
            });
        }

        // GPA is the credit-weighted mean over graded lines; F still counts
        // as attempted credits but earns none.
        let mut quality_points = 0.0f32;
        let mut credits_attempted = 0u32;
        let mut credits_earned = 0u32;
        for line in &lines {
            if let Some(grade) = line.final_grade {
                let credits = line.credits as u32;
                credits_attempted += credits;
                quality_points += grade.points() * credits as f32;
                if grade.earns_credit() {
                    credits_earned += credits;
                }
            }
        }
        let gpa = if credits_attempted > 0 {
            let raw = quality_points / credits_attempted as f32;
            Some((raw * 100.0).round() / 100.0)
        } else {
            None
        };

        Ok(AcademicRecord {
            student_id,
            student_name: student.full_name(),
            lines,
            credits_attempted,
            credits_earned,
            gpa,
        })
    }

    async fn portal_stats(&self) -> PortResult<PortalStats> {
        let tables = self.tables.read().await;
        Ok(PortalStats {
            students: tables
                .users
                .iter()
                .filter(|u| u.role == UserRole::Student)
                .count(),
            teachers: tables
                .users
                .iter()
                .filter(|u| u.role == UserRole::Teacher)
                .count(),
            departments: tables.departments.len(),
            courses: tables.courses.len(),
            sections: tables.scheduled_courses.len(),
            active_registrations: tables
                .registrations
                .iter()
                .filter(|r| r.status == RegistrationStatus::Registered)
                .count(),
            waitlisted: tables
                .registrations
                .iter()
                .filter(|r| r.status == RegistrationStatus::Waitlisted)
                .count(),
            seats_filled: tables
                .scheduled_courses
                .iter()
                .map(|s| s.current_enrollment)
                .sum(),
            seats_total: tables.scheduled_courses.iter().map(|s| s.max_capacity).sum(),
            announcements: tables.announcements.len(),
        })
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, Utc};
    use cotbe_portal_core::domain::{LetterGrade, RoomKind, Term};

    struct World {
        store: MemoryStore,
        teacher_id: Uuid,
        student_ids: Vec<Uuid>,
        section_id: Uuid,
        department_id: Uuid,
    }

    /// Builds a store holding one department, one building/room, one semester
    /// whose registration window contains today, one course, one two-seat
    /// section, one teacher, and three students.
    async fn seeded_world() -> World {
        let store = MemoryStore::new();
        let today = Utc::now().date_naive();

        let department = store
            .create_department(NewDepartment {
                name: "Architecture".to_string(),
                description: "Architecture and urban design".to_string(),
            })
            .await
            .unwrap();
        let building = store
            .create_building(NewBuilding {
                name: "Main Block".to_string(),
                address: "1 Campus Way".to_string(),
            })
            .await
            .unwrap();
        let room = store
            .create_room(NewRoom {
                building_id: building.id,
                number: "101".to_string(),
                capacity: 40,
                kind: RoomKind::Lecture,
            })
            .await
            .unwrap();
        let semester = store
            .create_semester(NewSemester {
                name: "Fall 2026".to_string(),
                academic_year: "2026/27".to_string(),
                term: Term::Fall,
                start_date: today + Duration::days(20),
                end_date: today + Duration::days(130),
                registration_opens: today - Duration::days(10),
                registration_closes: today + Duration::days(10),
                add_drop_deadline: today + Duration::days(40),
            })
            .await
            .unwrap();
        let course = store
            .create_course(NewCourse {
                code: "ARCH101".to_string(),
                title: "Introduction to Architecture".to_string(),
                description: "Foundations of architectural design".to_string(),
                credits: 3,
                department_id: department.id,
            })
            .await
            .unwrap();
        let teacher = store
            .create_user(new_user("tmengistu", UserRole::Teacher))
            .await
            .unwrap();
        let section = store
            .create_scheduled_course(NewScheduledCourse {
                course_id: course.id,
                semester_id: semester.id,
                teacher_id: teacher.id,
                room_id: room.id,
                section_number: 1,
                max_capacity: 2,
                days: "Mon/Wed".to_string(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            })
            .await
            .unwrap();

        let mut student_ids = Vec::new();
        for name in ["abebe", "btsegaye", "chana"] {
            let student = store
                .create_user(new_user(name, UserRole::Student))
                .await
                .unwrap();
            student_ids.push(student.id);
        }

        World {
            store,
            teacher_id: teacher.id,
            student_ids,
            section_id: section.id,
            department_id: department.id,
        }
    }

    fn new_user(username: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@cotbe.edu.et", username),
            role,
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            password_hash: "hash".to_string(),
            department_id: None,
            office: None,
            job_title: None,
            enrollment_date: None,
            date_of_birth: None,
            address: None,
            phone: None,
        }
    }

    async fn registered_seat_count(store: &MemoryStore, section_id: Uuid) -> u32 {
        store
            .list_registrations(None, Some(section_id))
            .await
            .unwrap()
            .iter()
            .filter(|r| r.status == RegistrationStatus::Registered)
            .count() as u32
    }

    #[tokio::test]
    async fn registration_fills_seats_then_waitlists() {
        let world = seeded_world().await;
        let store = &world.store;

        let first = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let second = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[1],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let third = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[2],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();

        assert_eq!(first.status, RegistrationStatus::Registered);
        assert_eq!(second.status, RegistrationStatus::Registered);
        assert_eq!(third.status, RegistrationStatus::Waitlisted);

        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 2);
        assert_eq!(
            section.current_enrollment,
            registered_seat_count(store, world.section_id).await
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let world = seeded_world().await;
        let store = &world.store;

        store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let err = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn dropping_frees_a_seat_for_waitlist_promotion() {
        let world = seeded_world().await;
        let store = &world.store;

        let mut regs = Vec::new();
        for student_id in &world.student_ids {
            regs.push(
                store
                    .create_registration(NewRegistration {
                        student_id: *student_id,
                        scheduled_course_id: world.section_id,
                    })
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(regs[2].status, RegistrationStatus::Waitlisted);

        // The waitlisted student cannot take a seat while the section is full.
        let err = store
            .update_registration(
                regs[2].id,
                RegistrationUpdate {
                    status: Some(RegistrationStatus::Registered),
                    final_grade: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        store
            .update_registration(
                regs[0].id,
                RegistrationUpdate {
                    status: Some(RegistrationStatus::Dropped),
                    final_grade: None,
                },
            )
            .await
            .unwrap();
        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 1);

        let promoted = store
            .update_registration(
                regs[2].id,
                RegistrationUpdate {
                    status: Some(RegistrationStatus::Registered),
                    final_grade: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(promoted.status, RegistrationStatus::Registered);

        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 2);
        assert_eq!(
            section.current_enrollment,
            registered_seat_count(store, world.section_id).await
        );
    }

    #[tokio::test]
    async fn grading_completes_the_registration_and_derives_points() {
        let world = seeded_world().await;
        let store = &world.store;

        let registration = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let graded = store
            .update_registration(
                registration.id,
                RegistrationUpdate {
                    status: None,
                    final_grade: Some(LetterGrade::BPlus),
                },
            )
            .await
            .unwrap();

        assert_eq!(graded.status, RegistrationStatus::Completed);
        assert_eq!(graded.final_grade, Some(LetterGrade::BPlus));
        assert_eq!(graded.grade_points, Some(3.3));

        // A completed registration no longer holds a seat.
        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 0);
    }

    #[tokio::test]
    async fn deleting_a_registered_row_decrements_the_counter() {
        let world = seeded_world().await;
        let store = &world.store;

        let registration = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        store.delete_registration(registration.id).await.unwrap();

        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 0);
    }

    #[tokio::test]
    async fn registration_outside_the_window_is_invalid() {
        let world = seeded_world().await;
        let store = &world.store;
        let today = Utc::now().date_naive();

        let closed = store
            .create_semester(NewSemester {
                name: "Spring 2026".to_string(),
                academic_year: "2025/26".to_string(),
                term: Term::Spring,
                start_date: today - Duration::days(120),
                end_date: today - Duration::days(30),
                registration_opens: today - Duration::days(160),
                registration_closes: today - Duration::days(125),
                add_drop_deadline: today - Duration::days(110),
            })
            .await
            .unwrap();
        let course = store
            .create_course(NewCourse {
                code: "URBP210".to_string(),
                title: "Urban Planning Studio".to_string(),
                description: "Studio practice".to_string(),
                credits: 4,
                department_id: world.department_id,
            })
            .await
            .unwrap();
        let room = store.list_rooms().await.unwrap().remove(0);
        let stale_section = store
            .create_scheduled_course(NewScheduledCourse {
                course_id: course.id,
                semester_id: closed.id,
                teacher_id: world.teacher_id,
                room_id: room.id,
                section_number: 1,
                max_capacity: 30,
                days: "Tue/Thu".to_string(),
                start_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            })
            .await
            .unwrap();

        let err = store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: stale_section.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn duplicate_course_code_conflicts() {
        let world = seeded_world().await;
        let err = world
            .store
            .create_course(NewCourse {
                code: "ARCH101".to_string(),
                title: "Architecture Again".to_string(),
                description: String::new(),
                credits: 3,
                department_id: world.department_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn academic_record_computes_credit_weighted_gpa() {
        let world = seeded_world().await;
        let store = &world.store;
        let student_id = world.student_ids[0];

        // Second course so the record carries two graded lines.
        let course = store
            .create_course(NewCourse {
                code: "COTM205".to_string(),
                title: "Construction Materials".to_string(),
                description: "Materials and methods".to_string(),
                credits: 3,
                department_id: world.department_id,
            })
            .await
            .unwrap();
        let room = store.list_rooms().await.unwrap().remove(0);
        let semester = store.list_semesters().await.unwrap().remove(0);
        let second_section = store
            .create_scheduled_course(NewScheduledCourse {
                course_id: course.id,
                semester_id: semester.id,
                teacher_id: world.teacher_id,
                room_id: room.id,
                section_number: 1,
                max_capacity: 30,
                days: "Fri".to_string(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        let first = store
            .create_registration(NewRegistration {
                student_id,
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let second = store
            .create_registration(NewRegistration {
                student_id,
                scheduled_course_id: second_section.id,
            })
            .await
            .unwrap();
        store
            .update_registration(
                first.id,
                RegistrationUpdate {
                    status: None,
                    final_grade: Some(LetterGrade::A),
                },
            )
            .await
            .unwrap();
        store
            .update_registration(
                second.id,
                RegistrationUpdate {
                    status: None,
                    final_grade: Some(LetterGrade::B),
                },
            )
            .await
            .unwrap();

        let record = store.student_academic_record(student_id).await.unwrap();
        assert_eq!(record.lines.len(), 2);
        assert_eq!(record.credits_attempted, 6);
        assert_eq!(record.credits_earned, 6);
        // 3 credits of A (4.0) and 3 credits of B (3.0).
        assert_eq!(record.gpa, Some(3.5));
    }

    #[tokio::test]
    async fn failed_course_attempts_credits_but_earns_none() {
        let world = seeded_world().await;
        let store = &world.store;
        let student_id = world.student_ids[1];

        let registration = store
            .create_registration(NewRegistration {
                student_id,
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        store
            .update_registration(
                registration.id,
                RegistrationUpdate {
                    status: None,
                    final_grade: Some(LetterGrade::F),
                },
            )
            .await
            .unwrap();

        let record = store.student_academic_record(student_id).await.unwrap();
        assert_eq!(record.credits_attempted, 3);
        assert_eq!(record.credits_earned, 0);
        assert_eq!(record.gpa, Some(0.0));
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected_and_purged() {
        let world = seeded_world().await;
        let store = &world.store;
        let user_id = world.student_ids[0];

        store
            .create_auth_session("stale-token", user_id, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        let err = store.validate_auth_session("stale-token").await.unwrap_err();
        assert!(matches!(err, PortError::Unauthorized));

        // A live session still resolves to its user.
        store
            .create_auth_session("live-token", user_id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        let user = store.validate_auth_session("live-token").await.unwrap();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn rebuild_matches_restored_rows() {
        let world = seeded_world().await;
        let store = &world.store;

        store
            .restore_registration(Registration {
                id: Uuid::new_v4(),
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
                registered_at: Utc::now(),
                status: RegistrationStatus::Registered,
                final_grade: None,
                grade_points: None,
            })
            .await;
        store
            .restore_registration(Registration {
                id: Uuid::new_v4(),
                student_id: world.student_ids[1],
                scheduled_course_id: world.section_id,
                registered_at: Utc::now(),
                status: RegistrationStatus::Completed,
                final_grade: Some(LetterGrade::A),
                grade_points: Some(4.0),
            })
            .await;
        store.rebuild_enrollment_counts().await;

        let section = store.get_scheduled_course(world.section_id).await.unwrap();
        assert_eq!(section.current_enrollment, 1);
    }

    #[tokio::test]
    async fn deleting_a_user_with_active_registrations_conflicts() {
        let world = seeded_world().await;
        let store = &world.store;

        store
            .create_registration(NewRegistration {
                student_id: world.student_ids[0],
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap();
        let err = store.delete_user(world.student_ids[0]).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn audit_log_lists_recent_entries_first() {
        let world = seeded_world().await;
        let store = &world.store;

        for i in 0..5 {
            store
                .append_audit(
                    "abebe",
                    "registration.created",
                    "registration",
                    None,
                    format!("entry {}", i),
                )
                .await
                .unwrap();
        }
        let entries = store.list_audit(3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].detail, "entry 4");
        assert_eq!(entries[2].detail, "entry 2");
    }

    #[tokio::test]
    async fn unused_rooms_delete_but_scheduled_rooms_conflict() {
        let world = seeded_world().await;
        let store = &world.store;

        let building = store.list_buildings().await.unwrap().remove(0);
        let spare = store
            .create_room(NewRoom {
                building_id: building.id,
                number: "202".to_string(),
                capacity: 25,
                kind: RoomKind::Seminar,
            })
            .await
            .unwrap();
        store.delete_room(spare.id).await.unwrap();

        let used = store.list_rooms().await.unwrap().remove(0);
        let err = store.delete_room(used.id).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn inactive_students_cannot_register() {
        let world = seeded_world().await;
        let store = &world.store;
        let student_id = world.student_ids[0];

        store
            .update_user(
                student_id,
                UserUpdate {
                    is_active: Some(false),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        let err = store
            .create_registration(NewRegistration {
                student_id,
                scheduled_course_id: world.section_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }
}
