use std::{ops::Range, time::Instant};

use rayon::prelude::*;

use crate::{
    book::Book,
    corpus::{Corpus, Verse},
    text_util::{OffsetMap, fold},
};

/// Separates verses inside a book haystack. Never part of a folded query.
pub(crate) const VERSE_SEPARATOR: char = '\0';

/// Folded, searchable form of one book.
#[derive(Debug, Clone)]
pub(crate) struct BookIndex {
    /// Folded verse texts, in canonical order, joined by [`VERSE_SEPARATOR`].
    haystack: String,
    /// Byte offset of each verse inside `haystack`.
    starts: Vec<u32>,
    /// Folded-to-original offset map per verse.
    maps: Vec<OffsetMap>,
    /// Folded English, Amharic and short names.
    names: Vec<String>,
}

impl BookIndex {
    fn build(book: &Book, verses: &[Verse]) -> Self {
        let capacity = verses.iter().map(|v| v.text.len() + 1).sum();
        let mut haystack = String::with_capacity(capacity);
        let mut starts = Vec::with_capacity(verses.len());
        let mut maps = Vec::with_capacity(verses.len());

        for verse in verses {
            starts.push(haystack.len() as u32);
            let (folded, map) = fold(&verse.text);
            haystack.push_str(&folded);
            haystack.push(VERSE_SEPARATOR);
            maps.push(map);
        }

        let names = [&book.name_en, &book.name_am, &book.short_name_en]
            .into_iter()
            .filter(|n| !n.is_empty())
            .map(|n| fold(n).0)
            .collect();

        Self {
            haystack,
            starts,
            maps,
            names,
        }
    }

    /// Whether any of the book's names contains the folded query.
    pub(crate) fn name_matches(&self, query: &str) -> bool {
        self.names.iter().any(|n| n.contains(query))
    }

    /// Every non-overlapping occurrence of `query`, as (verse position,
    /// folded byte range local to that verse), in canonical order.
    pub(crate) fn occurrences<'a>(
        &'a self,
        query: &'a str,
    ) -> impl Iterator<Item = (usize, Range<usize>)> + 'a {
        self.haystack.match_indices(query).map(move |(pos, found)| {
            let verse = self.starts.partition_point(|&s| s as usize <= pos) - 1;
            let local = pos - self.starts[verse] as usize;
            (verse, local..local + found.len())
        })
    }

    /// Translate a folded range of verse `verse` into its original text.
    pub(crate) fn to_original(
        &self,
        verse: usize,
        range: Range<usize>,
    ) -> Range<usize> {
        self.maps[verse].to_original(range)
    }
}

/// Immutable search structure over a loaded corpus.
///
/// Built once; every query is a read-only pass over each candidate book's
/// pre-folded haystack.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    corpus: Corpus,
    /// Parallel to `corpus.books()`.
    books: Vec<BookIndex>,
}

impl SearchIndex {
    /// Fold and index every book. Deterministic for a given corpus.
    pub fn build(corpus: Corpus) -> Self {
        let started = Instant::now();
        let books: Vec<BookIndex> = corpus
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(book, verses)| BookIndex::build(book, verses))
            .collect();

        tracing::info!(
            books = books.len(),
            bytes = books.iter().map(|b| b.haystack.len()).sum::<usize>(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search index built"
        );

        Self { corpus, books }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Books with their verses and index, in canonical order.
    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (&Book, &[Verse], &BookIndex)> {
        self.corpus
            .iter()
            .zip(self.books.iter())
            .map(|((book, verses), index)| (book, verses, index))
    }
}
