use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_api::config::Config;
use resume_api::extraction::entities::{EntityExtractor, EntityRecognizer, HttpEntityRecognizer};
use resume_api::extraction::role::RoleClassifier;
use resume_api::extraction::ResumeParser;
use resume_api::routes::build_router;
use resume_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Vocabularies, sections and default required skills
    let parser_config = config.parser_config()?;
    info!(
        "Vocabularies: {} skills, {} languages; sections: {:?}",
        parser_config.skills.len(),
        parser_config.languages.len(),
        parser_config.sections
    );

    // Optional models: absent or broken files leave the capability unavailable
    let roles = RoleClassifier::load(
        config.role_vectorizer_path.as_deref(),
        config.role_model_path.as_deref(),
        config.model_timeout,
    );
    if !roles.is_available() {
        warn!("Role classifier not loaded; predicted_role will be the placeholder");
    }

    let entities = connect_entity_recognizer(&config).await?;

    let parser = ResumeParser::new(parser_config, entities, roles);

    // Build app state
    let state = AppState::new(config.clone(), parser);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects to the entity-recognition service when one is configured.
/// An unreachable service is fatal only when `NER_REQUIRED=true`.
async fn connect_entity_recognizer(config: &Config) -> Result<EntityExtractor> {
    let Some(url) = config.ner_service_url.as_deref() else {
        if config.ner_required {
            bail!("NER_REQUIRED is set but NER_SERVICE_URL is not");
        }
        warn!("NER_SERVICE_URL not set; candidate names will not be extracted");
        return Ok(EntityExtractor::disabled());
    };

    match HttpEntityRecognizer::connect(url, config.model_timeout).await {
        Ok(recognizer) => {
            info!("Entity recognizer connected at {url}");
            let recognizer: Arc<dyn EntityRecognizer> = Arc::new(recognizer);
            Ok(EntityExtractor::new(Some(recognizer), config.model_timeout))
        }
        Err(e) if config.ner_required => Err(e.into()),
        Err(e) => {
            warn!("Entity recognizer unavailable, continuing without names: {e}");
            Ok(EntityExtractor::disabled())
        }
    }
}
