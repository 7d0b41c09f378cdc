use std::sync::Arc;

use crate::config::Config;
use crate::scores::analysis::JdAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// JD analyzer. `None` when no LLM key is configured.
    pub analyzer: Option<Arc<dyn JdAnalyzer>>,
}
