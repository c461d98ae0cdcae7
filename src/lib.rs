//! versefind - instant full-text search over a bilingual Bible corpus.
//!
//! The whole corpus (one JSON document per book) is loaded into memory and
//! folded once; every query is a case-insensitive substring scan that
//! returns book-name matches, verse matches with highlight ranges, and
//! per-book totals that ignore display limits.
//!
//! # Quick start
//!
//! ```no_run
//! use versefind::{Bible, Catalog, CorpusLoader, DataDir, SearchRequest};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let catalog = Catalog::resolve(&data_dir.catalog_file()).unwrap();
//! let bible = Bible::new(CorpusLoader::new(data_dir.corpus_dir(), catalog));
//!
//! let response = bible.search(&SearchRequest::dropdown("love")).unwrap();
//! println!("{} matching verses", response.total_matches);
//! for (book, count) in response.ranked_book_counts() {
//!     println!("{book}: {}", count.count);
//! }
//! ```

pub mod book;
pub mod cli;
pub mod corpus;
pub mod data_dir;
pub mod error;
pub mod format;
pub mod index;
pub mod mcp;
pub mod reference;
pub mod search;
pub mod service;
pub mod text_util;

pub use book::{Book, Catalog, Testament};
pub use corpus::{Corpus, CorpusLoader, Verse};
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use format::{BookCount, SearchResponse, SearchResult};
pub use index::SearchIndex;
pub use reference::{Passage, Reference};
pub use search::SearchRequest;
pub use service::Bible;
