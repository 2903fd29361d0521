//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        announcement_llm::OpenAiAnnouncementAdapter, chat_llm::OpenAiHelpChatAdapter,
        feedback_llm::OpenAiFeedbackAdapter, insight_llm::OpenAiInsightAdapter,
        log_llm::OpenAiLogSummaryAdapter, qa_llm::OpenAiCourseQaAdapter,
        seed::seed_demo_data, store::MemoryStore,
    },
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::HeaderValue;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Create the In-Memory Store ---
    let store = Arc::new(MemoryStore::new());
    if config.seed_demo_data {
        info!("Seeding demo data...");
        seed_demo_data(&store).await?;
    }

    // --- 3. Initialize Assistant Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let course_qa = Arc::new(OpenAiCourseQaAdapter::new(
        openai_client.clone(),
        config.qa_model.clone(),
    ));
    let academic_insight = Arc::new(OpenAiInsightAdapter::new(
        openai_client.clone(),
        config.insight_model.clone(),
    ));
    let feedback_draft = Arc::new(OpenAiFeedbackAdapter::new(
        openai_client.clone(),
        config.feedback_model.clone(),
    ));
    let announcement_draft = Arc::new(OpenAiAnnouncementAdapter::new(
        openai_client.clone(),
        config.announcement_model.clone(),
    ));
    let log_summary = Arc::new(OpenAiLogSummaryAdapter::new(
        openai_client.clone(),
        config.log_summary_model.clone(),
    ));
    let help_chat = Arc::new(OpenAiHelpChatAdapter::new(
        openai_client.clone(),
        config.help_chat_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store: store.clone(),
        config: config.clone(),
        course_qa,
        academic_insight,
        feedback_draft,
        announcement_draft,
        log_summary,
        help_chat,
    });

    // --- 5. CORS for the Browser Frontend ---
    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|_| {
        ApiError::Internal(format!("Invalid CORS origin '{}'", config.cors_origin))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = build_router(app_state).layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
