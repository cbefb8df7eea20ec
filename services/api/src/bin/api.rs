//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MemStore, OpenAiEditalAdapter, OpenAiExtractionAdapter},
    config::Config,
    error::ApiError,
    web::{
        rest::{
            ai_generate_schedule_handler, create_schedule_handler, create_session_handler,
            delete_pdf_handler, delete_schedule_handler, get_pdf_handler, get_schedule_handler,
            get_user_stats_handler, list_pdfs_handler, list_schedules_handler,
            list_sessions_handler, update_pdf_handler, update_schedule_handler,
            upload_pdf_handler, ApiDoc,
        },
        state::{AppState, DEFAULT_USER_ID},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use study_planner_core::pipeline::SchedulePlanner;
use study_planner_core::ports::{EditalAnalysisService, StorageService, TextExtractionService};
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

    // --- 2. Set Up the Store & Seed the Default User ---
    let store: Arc<dyn StorageService> = Arc::new(MemStore::new());
    let demo_user = store.create_user("demo", "demo123").await?;
    debug_assert_eq!(demo_user.id, DEFAULT_USER_ID);
    info!(user_id = demo_user.id, "Seeded default user");

    // --- 3. Initialize the LLM Adapters (optional) ---
    let (extraction, analysis): (
        Option<Arc<dyn TextExtractionService>>,
        Option<Arc<dyn EditalAnalysisService>>,
    ) = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let client = Client::with_config(openai_config);
            info!(
                extraction_model = %config.extraction_model,
                analysis_model = %config.analysis_model,
                "LLM edital analysis enabled"
            );
            (
                Some(Arc::new(OpenAiExtractionAdapter::new(
                    client.clone(),
                    config.extraction_model.clone(),
                    config.llm_timeout,
                ))),
                Some(Arc::new(OpenAiEditalAdapter::new(
                    client,
                    config.analysis_model.clone(),
                    config.llm_timeout,
                ))),
            )
        }
        None => {
            info!("OPENAI_API_KEY not set; schedule generation will use the heuristic analyzer");
            (None, None)
        }
    };

    let planner = SchedulePlanner::new(store.clone(), extraction, analysis);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        planner,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/user/{user_id}/stats", get(get_user_stats_handler))
        .route(
            "/api/user/{user_id}/schedules",
            get(list_schedules_handler).post(create_schedule_handler),
        )
        .route(
            "/api/user/{user_id}/schedules/ai-generate",
            post(ai_generate_schedule_handler),
        )
        .route(
            "/api/schedules/{id}",
            get(get_schedule_handler)
                .put(update_schedule_handler)
                .delete(delete_schedule_handler),
        )
        .route(
            "/api/user/{user_id}/sessions",
            get(list_sessions_handler).post(create_session_handler),
        )
        .route(
            "/api/user/{user_id}/pdfs",
            get(list_pdfs_handler).post(upload_pdf_handler),
        )
        .route(
            "/api/pdfs/{id}",
            get(get_pdf_handler)
                .put(update_pdf_handler)
                .delete(delete_pdf_handler),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
