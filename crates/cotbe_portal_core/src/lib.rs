pub mod domain;
pub mod ports;

pub use domain::{
    AcademicRecord, Announcement, Assessment, Audience, AuditLogEntry, AuthSession, Building,
    ChatRole, ChatTurn, Course, CourseMaterial, Department, LetterGrade, Registration,
    RegistrationStatus, Room, ScheduledCourse, Semester, User, UserRole,
};
pub use ports::{
    AcademicInsightService, AnnouncementDraftService, CourseQaService, FeedbackDraftService,
    HelpChatService, LogSummaryService, PortError, PortResult, PortalStore,
};
