use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::extraction::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabularies and loaded models; read-only after startup.
    pub parser: Arc<ResumeParser>,
    /// Bounds how many documents a batch request parses at once.
    pub parse_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config, parser: ResumeParser) -> Self {
        let parse_permits = Arc::new(Semaphore::new(config.max_concurrent_parses));
        Self {
            config,
            parser: Arc::new(parser),
            parse_permits,
        }
    }
}
