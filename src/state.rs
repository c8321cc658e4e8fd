use std::sync::Arc;

use crate::infra::{HistoryStore, Resolver};
use crate::shared::HitCounter;

/// Shared state handed to every handler.
///
/// Everything here is either immutable for the process lifetime (version,
/// deployment marker) or safe for concurrent use (resolver, store, counter).
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn Resolver>,
    pub store: Arc<dyn HistoryStore>,
    pub hits: HitCounter,
    pub version: Arc<str>,
    pub kubernetes: bool,
}

impl AppState {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        store: Arc<dyn HistoryStore>,
        version: impl Into<Arc<str>>,
        kubernetes: bool,
    ) -> Self {
        Self {
            resolver,
            store,
            hits: HitCounter::new(),
            version: version.into(),
            kubernetes,
        }
    }
}
