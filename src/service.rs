use std::sync::{
    Arc,
    Mutex,
    PoisonError,
    RwLock,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    corpus::CorpusLoader,
    error::Result,
    format::SearchResponse,
    index::SearchIndex,
    search::SearchRequest,
};

/// Shared handle to a lazily loaded, searchable corpus.
///
/// The corpus is read and indexed on first use. Readers always see a
/// complete [`SearchIndex`]; a reload swaps in a new one without disturbing
/// searches already holding the previous `Arc`.
#[derive(Debug)]
pub struct Bible {
    loader: CorpusLoader,
    current: RwLock<Option<Arc<SearchIndex>>>,
    /// Serializes loads so concurrent first callers share a single one.
    loading: Mutex<()>,
    generation: AtomicU64,
}

impl Bible {
    pub fn new(loader: CorpusLoader) -> Self {
        Self {
            loader,
            current: RwLock::new(None),
            loading: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn loader(&self) -> &CorpusLoader {
        &self.loader
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return the index, loading the corpus first if needed.
    ///
    /// A failed load is not cached: the next call tries again.
    pub fn ensure_loaded(&self) -> Result<Arc<SearchIndex>> {
        if let Some(index) = self.current() {
            return Ok(index);
        }

        let _guard =
            self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = self.current() {
            return Ok(index);
        }
        self.load_locked()
    }

    /// Re-read the corpus and swap the new index in.
    ///
    /// On failure the previous index, if any, keeps being served.
    pub fn reload(&self) -> Result<Arc<SearchIndex>> {
        let _guard =
            self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        Ok(self.ensure_loaded()?.search(request))
    }

    fn current(&self) -> Option<Arc<SearchIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn load_locked(&self) -> Result<Arc<SearchIndex>> {
        let corpus = self.loader.load().inspect_err(|e| {
            tracing::error!(
                error = %e,
                dir = %self.loader.dir().display(),
                "corpus load failed"
            );
        })?;

        let index = Arc::new(SearchIndex::build(corpus));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::clone(&index));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "search index installed");

        Ok(index)
    }
}
