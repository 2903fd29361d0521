//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use cotbe_portal_core::ports::{
    AcademicInsightService, AnnouncementDraftService, CourseQaService, FeedbackDraftService,
    HelpChatService, LogSummaryService, PortalStore,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortalStore>,
    pub config: Arc<Config>,
    pub course_qa: Arc<dyn CourseQaService>,
    pub academic_insight: Arc<dyn AcademicInsightService>,
    pub feedback_draft: Arc<dyn FeedbackDraftService>,
    pub announcement_draft: Arc<dyn AnnouncementDraftService>,
    pub log_summary: Arc<dyn LogSummaryService>,
    pub help_chat: Arc<dyn HelpChatService>,
}
