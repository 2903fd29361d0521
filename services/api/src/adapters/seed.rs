//! services/api/src/adapters/seed.rs
//!
//! Populates the in-memory store with a demo dataset at startup: departments,
//! facilities, two semesters (one open for registration, one finished),
//! catalog courses, users of every role, sections, registrations in mixed
//! statuses, course records, and announcements. Historical registrations are
//! restored directly and the enrollment counters are rebuilt in one final
//! rescan.

use chrono::{Datelike, Duration, NaiveTime, Utc};
use cotbe_portal_core::domain::{
    AssessmentKind, Audience, LetterGrade, MaterialKind, NewAnnouncement, NewAssessment,
    NewBuilding, NewCourse, NewDepartment, NewMaterial, NewRegistration, NewRoom,
    NewScheduledCourse, NewSemester, NewUser, Registration, RegistrationStatus,
    RegistrationUpdate, RoomKind, Term, UserRole,
};
use cotbe_portal_core::ports::{PortResult, PortalStore};
use tracing::info;
use uuid::Uuid;

use crate::adapters::store::MemoryStore;
use crate::web::auth::hash_password;

/// Every seeded account signs in with this password.
pub const DEMO_PASSWORD: &str = "cotbe-demo";

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn base_user(username: &str, first: &str, last: &str, role: UserRole, hash: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@cotbe.edu.et", username),
        role,
        first_name: first.to_string(),
        last_name: last.to_string(),
        password_hash: hash.to_string(),
        department_id: None,
        office: None,
        job_title: None,
        enrollment_date: None,
        date_of_birth: None,
        address: None,
        phone: None,
    }
}

/// Loads the demo dataset. The registration window of the current semester is
/// placed around today so the portal is immediately usable.
pub async fn seed_demo_data(store: &MemoryStore) -> PortResult<()> {
    let today = Utc::now().date_naive();
    let year = today.year();
    let password_hash = hash_password(DEMO_PASSWORD)?;

    // --- Departments ---
    let architecture = store
        .create_department(NewDepartment {
            name: "Architecture".to_string(),
            description: "Architectural design, theory, and building science".to_string(),
        })
        .await?;
    let civil = store
        .create_department(NewDepartment {
            name: "Civil Engineering".to_string(),
            description: "Structural, geotechnical, and transport engineering".to_string(),
        })
        .await?;
    let construction = store
        .create_department(NewDepartment {
            name: "Construction Technology and Management".to_string(),
            description: "Construction methods, materials, and project management".to_string(),
        })
        .await?;
    let planning = store
        .create_department(NewDepartment {
            name: "Urban and Regional Planning".to_string(),
            description: "Urban design, land use, and regional development".to_string(),
        })
        .await?;

    // --- Buildings and Rooms ---
    let main_block = store
        .create_building(NewBuilding {
            name: "Main Block".to_string(),
            address: "CoTBE Campus, Lideta".to_string(),
        })
        .await?;
    let workshop = store
        .create_building(NewBuilding {
            name: "Workshop Block".to_string(),
            address: "CoTBE Campus, Lideta".to_string(),
        })
        .await?;
    let a101 = store
        .create_room(NewRoom {
            building_id: main_block.id,
            number: "A-101".to_string(),
            capacity: 80,
            kind: RoomKind::Lecture,
        })
        .await?;
    let a102 = store
        .create_room(NewRoom {
            building_id: main_block.id,
            number: "A-102".to_string(),
            capacity: 60,
            kind: RoomKind::Lecture,
        })
        .await?;
    let b201 = store
        .create_room(NewRoom {
            building_id: workshop.id,
            number: "B-201".to_string(),
            capacity: 30,
            kind: RoomKind::Lab,
        })
        .await?;
    let b202 = store
        .create_room(NewRoom {
            building_id: workshop.id,
            number: "B-202".to_string(),
            capacity: 20,
            kind: RoomKind::Seminar,
        })
        .await?;

    // --- Semesters ---
    // The current semester's registration window brackets today.
    let current = store
        .create_semester(NewSemester {
            name: format!("Fall {}", year),
            academic_year: format!("{}/{}", year, year + 1),
            term: Term::Fall,
            start_date: today + Duration::days(30),
            end_date: today + Duration::days(130),
            registration_opens: today - Duration::days(21),
            registration_closes: today + Duration::days(21),
            add_drop_deadline: today + Duration::days(45),
        })
        .await?;
    let previous = store
        .create_semester(NewSemester {
            name: format!("Spring {}", year),
            academic_year: format!("{}/{}", year - 1, year),
            term: Term::Spring,
            start_date: today - Duration::days(200),
            end_date: today - Duration::days(80),
            registration_opens: today - Duration::days(240),
            registration_closes: today - Duration::days(205),
            add_drop_deadline: today - Duration::days(190),
        })
        .await?;

    // --- Users ---
    let admin = store
        .create_user(NewUser {
            job_title: Some("Portal Administrator".to_string()),
            ..base_user("admin", "Selam", "Worku", UserRole::Admin, &password_hash)
        })
        .await?;
    let almaz = store
        .create_user(NewUser {
            job_title: Some("Registrar Head".to_string()),
            office: Some("Registrar, Room 3".to_string()),
            ..base_user(
                "almaz.bekele",
                "Almaz",
                "Bekele",
                UserRole::StaffHead,
                &password_hash,
            )
        })
        .await?;
    let dawit = store
        .create_user(NewUser {
            department_id: Some(architecture.id),
            office: Some("A-210".to_string()),
            ..base_user("dawit.haile", "Dawit", "Haile", UserRole::Teacher, &password_hash)
        })
        .await?;
    let sara = store
        .create_user(NewUser {
            department_id: Some(civil.id),
            office: Some("B-104".to_string()),
            ..base_user("sara.tesfaye", "Sara", "Tesfaye", UserRole::Teacher, &password_hash)
        })
        .await?;

    let mut students = Vec::new();
    for (username, first, last, dept) in [
        ("abebe.kebede", "Abebe", "Kebede", architecture.id),
        ("hana.girma", "Hana", "Girma", architecture.id),
        ("mulu.alemu", "Mulu", "Alemu", civil.id),
        ("yonas.tadesse", "Yonas", "Tadesse", construction.id),
    ] {
        let student = store
            .create_user(NewUser {
                department_id: Some(dept),
                enrollment_date: Some(today - Duration::days(400)),
                ..base_user(username, first, last, UserRole::Student, &password_hash)
            })
            .await?;
        students.push(student);
    }

    // --- Catalog Courses ---
    let arch101 = store
        .create_course(NewCourse {
            code: "ARCH101".to_string(),
            title: "Introduction to Architecture".to_string(),
            description: "History, vocabulary, and practice of architectural design".to_string(),
            credits: 3,
            department_id: architecture.id,
        })
        .await?;
    let arch301 = store
        .create_course(NewCourse {
            code: "ARCH301".to_string(),
            title: "Architectural Design Studio III".to_string(),
            description: "Studio work on a public building program".to_string(),
            credits: 4,
            department_id: architecture.id,
        })
        .await?;
    let ceng201 = store
        .create_course(NewCourse {
            code: "CENG201".to_string(),
            title: "Engineering Mechanics: Statics".to_string(),
            description: "Equilibrium of particles and rigid bodies".to_string(),
            credits: 3,
            department_id: civil.id,
        })
        .await?;
    let cotm210 = store
        .create_course(NewCourse {
            code: "COTM210".to_string(),
            title: "Construction Materials".to_string(),
            description: "Properties and testing of concrete, steel, and timber".to_string(),
            credits: 3,
            department_id: construction.id,
        })
        .await?;
    let urbp110 = store
        .create_course(NewCourse {
            code: "URBP110".to_string(),
            title: "Introduction to Urban Planning".to_string(),
            description: "Foundations of land use and settlement planning".to_string(),
            credits: 2,
            department_id: planning.id,
        })
        .await?;
    let emat101 = store
        .create_course(NewCourse {
            code: "EMAT101".to_string(),
            title: "Engineering Mathematics I".to_string(),
            description: "Calculus and linear algebra for engineers".to_string(),
            credits: 4,
            department_id: civil.id,
        })
        .await?;

    // --- Scheduled Sections, Current Semester ---
    let arch101_s1 = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: arch101.id,
            semester_id: current.id,
            teacher_id: dawit.id,
            room_id: a101.id,
            section_number: 1,
            max_capacity: 60,
            days: "Mon/Wed".to_string(),
            start_time: hm(9, 0),
            end_time: hm(10, 30),
        })
        .await?;
    // Studio sections are deliberately small; this one fills up in the demo.
    let arch301_s1 = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: arch301.id,
            semester_id: current.id,
            teacher_id: dawit.id,
            room_id: b202.id,
            section_number: 1,
            max_capacity: 2,
            days: "Tue/Thu".to_string(),
            start_time: hm(14, 0),
            end_time: hm(17, 0),
        })
        .await?;
    let ceng201_s1 = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: ceng201.id,
            semester_id: current.id,
            teacher_id: sara.id,
            room_id: a102.id,
            section_number: 1,
            max_capacity: 50,
            days: "Tue/Thu".to_string(),
            start_time: hm(11, 0),
            end_time: hm(12, 30),
        })
        .await?;
    let cotm210_s1 = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: cotm210.id,
            semester_id: current.id,
            teacher_id: sara.id,
            room_id: b201.id,
            section_number: 1,
            max_capacity: 30,
            days: "Fri".to_string(),
            start_time: hm(8, 0),
            end_time: hm(11, 0),
        })
        .await?;

    // --- Scheduled Sections, Previous Semester ---
    let emat101_prev = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: emat101.id,
            semester_id: previous.id,
            teacher_id: sara.id,
            room_id: a101.id,
            section_number: 1,
            max_capacity: 80,
            days: "Mon/Wed/Fri".to_string(),
            start_time: hm(8, 0),
            end_time: hm(9, 0),
        })
        .await?;
    let urbp110_prev = store
        .create_scheduled_course(NewScheduledCourse {
            course_id: urbp110.id,
            semester_id: previous.id,
            teacher_id: dawit.id,
            room_id: a102.id,
            section_number: 1,
            max_capacity: 60,
            days: "Thu".to_string(),
            start_time: hm(15, 0),
            end_time: hm(17, 0),
        })
        .await?;

    // --- Historical Registrations (completed, graded) ---
    let history = [
        (students[0].id, emat101_prev.id, LetterGrade::A),
        (students[0].id, urbp110_prev.id, LetterGrade::BPlus),
        (students[1].id, emat101_prev.id, LetterGrade::B),
        (students[2].id, emat101_prev.id, LetterGrade::CPlus),
    ];
    for (student_id, section_id, grade) in history {
        store
            .restore_registration(Registration {
                id: Uuid::new_v4(),
                student_id,
                scheduled_course_id: section_id,
                registered_at: Utc::now() - Duration::days(210),
                status: RegistrationStatus::Completed,
                final_grade: Some(grade),
                grade_points: Some(grade.points()),
            })
            .await;
    }

    // --- Current Registrations ---
    for student in &students[..2] {
        store
            .create_registration(NewRegistration {
                student_id: student.id,
                scheduled_course_id: arch101_s1.id,
            })
            .await?;
    }
    let dropped = store
        .create_registration(NewRegistration {
            student_id: students[3].id,
            scheduled_course_id: arch101_s1.id,
        })
        .await?;
    store
        .update_registration(
            dropped.id,
            RegistrationUpdate {
                status: Some(RegistrationStatus::Dropped),
                final_grade: None,
            },
        )
        .await?;
    store
        .create_registration(NewRegistration {
            student_id: students[2].id,
            scheduled_course_id: ceng201_s1.id,
        })
        .await?;
    store
        .create_registration(NewRegistration {
            student_id: students[3].id,
            scheduled_course_id: cotm210_s1.id,
        })
        .await?;
    // The studio fills with two students; the third lands on the waitlist.
    for student in &students[..3] {
        store
            .create_registration(NewRegistration {
                student_id: student.id,
                scheduled_course_id: arch301_s1.id,
            })
            .await?;
    }

    // --- Course Materials ---
    store
        .create_material(
            NewMaterial {
                scheduled_course_id: arch101_s1.id,
                title: "Week 1 Notes: What Architects Do".to_string(),
                kind: MaterialKind::Notes,
                body: "Architecture sits between art and engineering. An architect \
translates a client's program into built form while balancing site, climate, \
structure, and budget. This week we survey the profession's phases of work, \
from schematic design through construction administration, and introduce the \
vocabulary of plan, section, and elevation."
                    .to_string(),
            },
            dawit.id,
        )
        .await?;
    store
        .create_material(
            NewMaterial {
                scheduled_course_id: arch101_s1.id,
                title: "Reading: Form, Space, and Order (excerpt)".to_string(),
                kind: MaterialKind::Reading,
                body: "Primary elements of form are the point, line, plane, and \
volume. A point extended becomes a line; a line swept becomes a plane; a plane \
extruded becomes a volume. Architectural composition manipulates these \
elements with proportion, scale, rhythm, and hierarchy to organize space."
                    .to_string(),
            },
            dawit.id,
        )
        .await?;
    store
        .create_material(
            NewMaterial {
                scheduled_course_id: ceng201_s1.id,
                title: "Statics Lecture 1 Slides".to_string(),
                kind: MaterialKind::Slides,
                body: "A body is in equilibrium when the resultant force and the \
resultant moment about any point are both zero. Free-body diagrams isolate the \
body and replace supports with reaction forces. Units follow SI throughout the \
course."
                    .to_string(),
            },
            sara.id,
        )
        .await?;
    store
        .create_material(
            NewMaterial {
                scheduled_course_id: arch301_s1.id,
                title: "Studio Brief: Community Library".to_string(),
                kind: MaterialKind::Notes,
                body: "This semester's program is a neighborhood library on a \
corner site. The brief asks for a reading hall, children's area, and a shaded \
courtyard. Deliverables are a site plan, two sections, and a massing model at \
1:200."
                    .to_string(),
            },
            dawit.id,
        )
        .await?;

    // --- Assessments ---
    store
        .create_assessment(NewAssessment {
            scheduled_course_id: arch101_s1.id,
            title: "Quiz 1: Design Vocabulary".to_string(),
            kind: AssessmentKind::Quiz,
            max_score: 20,
            weight_percent: 10,
            due_date: today + Duration::days(40),
        })
        .await?;
    store
        .create_assessment(NewAssessment {
            scheduled_course_id: arch101_s1.id,
            title: "Midterm Exam".to_string(),
            kind: AssessmentKind::Midterm,
            max_score: 100,
            weight_percent: 30,
            due_date: today + Duration::days(75),
        })
        .await?;
    store
        .create_assessment(NewAssessment {
            scheduled_course_id: arch101_s1.id,
            title: "Final Exam".to_string(),
            kind: AssessmentKind::Final,
            max_score: 100,
            weight_percent: 40,
            due_date: today + Duration::days(125),
        })
        .await?;
    store
        .create_assessment(NewAssessment {
            scheduled_course_id: ceng201_s1.id,
            title: "Problem Set 1".to_string(),
            kind: AssessmentKind::Assignment,
            max_score: 50,
            weight_percent: 15,
            due_date: today + Duration::days(38),
        })
        .await?;

    // --- Announcements ---
    store
        .create_announcement(
            NewAnnouncement {
                title: format!("Welcome to Fall {}", year),
                body: format!(
                    "Registration for Fall {} is open until {}. Check your student \
dashboard for your current enrollments and see the catalog for open sections.",
                    year,
                    today + Duration::days(21)
                ),
                audience: Audience::All,
                scheduled_course_id: None,
            },
            almaz.id,
        )
        .await?;
    store
        .create_announcement(
            NewAnnouncement {
                title: "ARCH101 room confirmed".to_string(),
                body: "Introduction to Architecture meets in A-101, Main Block, \
starting week one. Bring tracing paper and a scale ruler to the first session."
                    .to_string(),
                audience: Audience::Students,
                scheduled_course_id: Some(arch101_s1.id),
            },
            dawit.id,
        )
        .await?;
    store
        .create_announcement(
            NewAnnouncement {
                title: "Grade submission reminder".to_string(),
                body: "Final grades for the previous semester must be recorded in \
the portal before the end of the month. Contact the registrar for corrections."
                    .to_string(),
                audience: Audience::Teachers,
                scheduled_course_id: None,
            },
            almaz.id,
        )
        .await?;

    store
        .append_audit(
            "system",
            "seed.completed",
            "portal",
            None,
            "Demo dataset loaded".to_string(),
        )
        .await?;

    // Counters are authoritative only after the restored rows are rescanned.
    store.rebuild_enrollment_counts().await;

    let stats = store.portal_stats().await?;
    info!(
        "Seeded demo data: {} students, {} teachers, {} departments, {} courses, {} sections, {} active registrations ({} waitlisted)",
        stats.students,
        stats.teachers,
        stats.departments,
        stats.courses,
        stats.sections,
        stats.active_registrations,
        stats.waitlisted
    );
    info!(
        "Demo accounts ({}@cotbe.edu.et and friends) share the password '{}'",
        admin.username, DEMO_PASSWORD
    );

    Ok(())
}
