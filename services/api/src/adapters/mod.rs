pub mod announcement_llm;
pub mod chat_llm;
pub mod feedback_llm;
pub mod insight_llm;
pub mod log_llm;
pub mod qa_llm;
pub mod seed;
pub mod store;

pub use announcement_llm::OpenAiAnnouncementAdapter;
pub use chat_llm::OpenAiHelpChatAdapter;
pub use feedback_llm::OpenAiFeedbackAdapter;
pub use insight_llm::OpenAiInsightAdapter;
pub use log_llm::OpenAiLogSummaryAdapter;
pub use qa_llm::OpenAiCourseQaAdapter;
pub use seed::seed_demo_data;
pub use store::MemoryStore;
