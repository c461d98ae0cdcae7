use std::{collections::BTreeMap, fmt::Write as _, ops::Range};

use serde::Serialize;

use crate::{
    book::Book,
    corpus::Verse,
    error::Result,
    text_util::mark,
};

/// A book whose name contains the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookMatch {
    pub book_number: u16,
    pub book_name_en: String,
    pub book_name_am: String,
    /// Verses in this book whose text contains the query.
    #[serde(rename = "matchCount")]
    pub match_count: usize,
}

/// A verse whose text contains the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseMatch {
    pub book_number: u16,
    pub book_name_en: String,
    pub book_short_name_en: String,
    pub chapter: u32,
    pub verse: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    pub text: String,
    /// Byte ranges of `text` holding each occurrence of the query.
    pub highlights: Vec<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    Book(BookMatch),
    Verse(VerseMatch),
}

impl SearchResult {
    pub fn book(book: &Book, match_count: usize) -> Self {
        SearchResult::Book(BookMatch {
            book_number: book.number,
            book_name_en: book.name_en.clone(),
            book_name_am: book.name_am.clone(),
            match_count,
        })
    }

    pub fn verse(
        book: &Book,
        verse: &Verse,
        highlights: Vec<Range<usize>>,
    ) -> Self {
        SearchResult::Verse(VerseMatch {
            book_number: book.number,
            book_name_en: book.name_en.clone(),
            book_short_name_en: book.short_name_en.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            section_title: verse.section_title.clone(),
            text: verse.text.clone(),
            highlights,
        })
    }

    pub fn book_number(&self) -> u16 {
        match self {
            SearchResult::Book(b) => b.book_number,
            SearchResult::Verse(v) => v.book_number,
        }
    }

    pub fn is_verse(&self) -> bool {
        matches!(self, SearchResult::Verse(_))
    }
}

/// Matching-verse total for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCount {
    pub count: usize,
    pub book_name: String,
    pub book_name_am: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Matching verses across all candidate books, before truncation.
    pub total_matches: usize,
    /// Per-book totals, before truncation.
    pub book_counts: BTreeMap<u16, BookCount>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.total_matches == 0
    }

    /// Book counts ordered by descending count, then book number.
    pub fn ranked_book_counts(&self) -> Vec<(u16, &BookCount)> {
        let mut ranked: Vec<_> =
            self.book_counts.iter().map(|(n, c)| (*n, c)).collect();
        ranked
            .sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
        ranked
    }
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render results for a terminal.
pub fn format_human(
    response: &SearchResponse,
    query: &str,
    color: bool,
) -> String {
    if response.is_empty() {
        return format!("No results found for \"{}\".\n", query.trim());
    }

    let (open, close) = if color { (BOLD, RESET) } else { ("[", "]") };
    let mut out = String::new();

    for result in &response.results {
        match result {
            SearchResult::Book(b) => {
                let _ = write!(out, "{open}{}{close}", b.book_name_en);
                if !b.book_name_am.is_empty() {
                    let _ = write!(out, " / {}", b.book_name_am);
                }
                let _ = writeln!(out, " ({} verses)", b.match_count);
            }
            SearchResult::Verse(v) => {
                let _ = write!(
                    out,
                    "{} {}:{}",
                    v.book_short_name_en, v.chapter, v.verse
                );
                if let Some(title) = &v.section_title {
                    let _ = write!(out, " ({title})");
                }
                let text = mark(&v.text, &v.highlights, open, close);
                let _ = writeln!(out, "\n    {text}");
            }
        }
    }

    let shown = response.results.iter().filter(|r| r.is_verse()).count();
    let _ = writeln!(
        out,
        "\nFound in {} verses across {} books (showing {shown})",
        response.total_matches,
        response.book_counts.len()
    );
    for (_, count) in response.ranked_book_counts() {
        let _ = writeln!(out, "  {:<20} {:>6}", count.book_name, count.count);
    }

    out
}

/// Render results as pretty-printed JSON.
pub fn format_json(response: &SearchResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}
