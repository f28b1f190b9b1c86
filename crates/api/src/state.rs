use std::sync::Arc;

use crate::config::ServerConfig;
use crate::gateway::RazorpayGateway;
use crate::summarize::{Summarizer, TextExtractor};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). External
/// collaborators are injected here at startup; the optional ones are `None`
/// when their configuration is absent, and handlers degrade accordingly
/// (test-mode payments, unconfigured-service errors).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cursus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Analytics response cache; degrades to pass-through when disconnected.
    pub cache: Arc<cursus_cache::CacheClient>,
    /// Payment gateway client. `None` means test mode.
    pub gateway: Option<Arc<RazorpayGateway>>,
    /// Document text-extraction collaborator.
    pub extractor: Option<Arc<dyn TextExtractor>>,
    /// Text summarization collaborator.
    pub summarizer: Option<Arc<dyn Summarizer>>,
}
