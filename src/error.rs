use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The corpus could not be materialized. Fatal: no query is served.
    #[error("failed to load book '{book}': {reason}")]
    CorpusLoad { book: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}

impl Error {
    pub(crate) fn corpus(
        book: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::CorpusLoad {
            book: book.into(),
            reason: reason.to_string(),
        }
    }
}
