// src/writer/options.rs
use crate::types::{CacheTuning, ChunkShape};

/// Optional tuning for [`WriteSession`](super::WriteSession) open.
///
/// Everything left unset falls back to the chunk advisor and the store's
/// default caching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    /// Used as-is instead of the advised chunk shape
    pub chunk_shape: Option<ChunkShape>,
    pub cache: Option<CacheTuning>,
    /// Promote progress and context diagnostics from `debug` to `info`
    pub verbose: bool,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_shape(mut self, shape: ChunkShape) -> Self {
        self.chunk_shape = Some(shape);
        self
    }

    pub fn with_cache(mut self, tuning: CacheTuning) -> Self {
        self.cache = Some(tuning);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
