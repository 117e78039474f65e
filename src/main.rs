use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use narration_backend::controllers::narration::NarrationController;
use narration_backend::domain::narration::{CredentialPool, NarrationService, SpeechSynthesizer};
use narration_backend::infrastructure::config::{Config, LogFormat};
use narration_backend::infrastructure::db::{check_connection, create_pool};
use narration_backend::infrastructure::http::start_http_server;
use narration_backend::infrastructure::repositories::{
    GeminiTtsRepository, PgNarrationRecordRepository, SupabaseStorageRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting Narration Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    // Key values are never logged, only how many there are
    tracing::info!(
        credentials = config.tts_api_keys.len(),
        model = %config.tts_model,
        voice = %config.tts_voice,
        max_chunk_bytes = config.tts_max_chunk_bytes,
        concurrency = config.tts_concurrency,
        "Speech provider configured"
    );

    let pool = Arc::new(pool);
    let config = Arc::new(config);
    let http_client = reqwest::Client::new();

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let tts_repo = Arc::new(GeminiTtsRepository::new(
        http_client.clone(),
        config.tts_base_url.clone(),
        config.tts_model.clone(),
        config.tts_voice.clone(),
    ));
    let storage_repo = Arc::new(SupabaseStorageRepository::new(
        http_client,
        config.storage_url.clone(),
        config.storage_service_key.clone(),
        config.storage_bucket.clone(),
    ));
    let record_repo = Arc::new(PgNarrationRecordRepository::new(pool.clone()));

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let credentials = Arc::new(CredentialPool::new(config.tts_api_keys.clone()));
    let synthesizer = SpeechSynthesizer::new(
        tts_repo,
        credentials,
        Duration::from_millis(config.tts_backoff_ms),
    );
    let narration_service = Arc::new(NarrationService::new(
        synthesizer,
        storage_repo,
        record_repo,
        config.tts_max_chunk_bytes,
        config.tts_concurrency,
    ));

    // 3. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let narration_controller = Arc::new(NarrationController::new(narration_service));

    // Start HTTP server with all routes
    start_http_server(pool, config, narration_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "narration_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
