use std::{ops::Range, time::Instant};

use crate::{
    book::{Book, Testament},
    corpus::Verse,
    format::{BookCount, SearchResponse, SearchResult},
    index::{BookIndex, SearchIndex, VERSE_SEPARATOR},
    text_util::fold_query,
};

/// Result limit for search-as-you-type dropdowns.
pub const DROPDOWN_RESULT_LIMIT: usize = 100;
/// Verse matches shown per book in dropdowns.
pub const DROPDOWN_PER_BOOK_CAP: usize = 15;
/// Result limit for the full results page.
pub const PAGE_RESULT_LIMIT: usize = 500;
pub const PAGE_PER_BOOK_CAP: usize = 50;
/// Limits for the full results page restricted to one book.
pub const BOOK_PAGE_RESULT_LIMIT: usize = 1000;
pub const BOOK_PAGE_PER_BOOK_CAP: usize = 200;

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free text; matched case-insensitively as a literal substring.
    pub query: String,
    /// Maximum entries in `results` (book and verse matches combined).
    pub result_limit: usize,
    pub testament: Option<Testament>,
    /// Restrict to exactly this book number.
    pub book: Option<u16>,
    /// Maximum verse matches listed per book.
    pub per_book_display_cap: usize,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        result_limit: usize,
        per_book_display_cap: usize,
    ) -> Self {
        Self {
            query: query.into(),
            result_limit,
            testament: None,
            book: None,
            per_book_display_cap,
        }
    }

    /// Limits used by the live search box.
    pub fn dropdown(query: impl Into<String>) -> Self {
        Self::new(query, DROPDOWN_RESULT_LIMIT, DROPDOWN_PER_BOOK_CAP)
    }

    /// Limits used by the full results page; larger when one book is
    /// selected.
    pub fn page(query: impl Into<String>, book: Option<u16>) -> Self {
        let request = match book {
            Some(_) => Self::new(
                query,
                BOOK_PAGE_RESULT_LIMIT,
                BOOK_PAGE_PER_BOOK_CAP,
            ),
            None => Self::new(query, PAGE_RESULT_LIMIT, PAGE_PER_BOOK_CAP),
        };
        request.with_book(book)
    }

    pub fn with_testament(mut self, testament: Option<Testament>) -> Self {
        self.testament = testament;
        self
    }

    pub fn with_book(mut self, book: Option<u16>) -> Self {
        self.book = book;
        self
    }

    /// Replace the preset limits with any that are given.
    pub fn with_limits(
        mut self,
        result_limit: Option<usize>,
        per_book_display_cap: Option<usize>,
    ) -> Self {
        self.result_limit = result_limit.unwrap_or(self.result_limit);
        self.per_book_display_cap =
            per_book_display_cap.unwrap_or(self.per_book_display_cap);
        self
    }

    fn admits(&self, book: &Book) -> bool {
        self.testament.is_none_or(|t| t == book.testament)
            && self.book.is_none_or(|n| n == book.number)
    }
}

/// A verse being accumulated while its occurrences are scanned.
struct Pending {
    verse: usize,
    /// `None` when the verse is counted but not listed.
    ranges: Option<Vec<Range<usize>>>,
}

impl SearchIndex {
    /// Execute a search.
    ///
    /// 1. Fold the query; blank queries return an empty response
    /// 2. Select candidate books by testament, then by book number
    /// 3. Per book, in canonical order: emit a book match if a name contains
    ///    the query, then scan its verses once, counting every matching
    ///    verse and listing up to `per_book_display_cap` of them
    /// 4. Stop listing once `result_limit` entries exist; keep counting
    ///
    /// Never fails: an unmatched query yields an empty response.
    pub fn search(&self, request: &SearchRequest) -> SearchResponse {
        let started = Instant::now();
        let query = fold_query(&request.query);
        if query.is_empty() || query.contains(VERSE_SEPARATOR) {
            return SearchResponse::default();
        }

        let mut response = SearchResponse::default();

        for (book, verses, index) in self.entries() {
            if !request.admits(book) {
                continue;
            }

            let book_slot = (index.name_matches(&query)
                && response.results.len() < request.result_limit)
                .then(|| {
                    response.results.push(SearchResult::book(book, 0));
                    response.results.len() - 1
                });

            let count = scan_book(
                book,
                verses,
                index,
                &query,
                request,
                &mut response.results,
            );

            if let Some(slot) = book_slot
                && let SearchResult::Book(entry) = &mut response.results[slot]
            {
                entry.match_count = count;
            }

            if count > 0 {
                response.total_matches += count;
                response.book_counts.insert(
                    book.number,
                    BookCount {
                        count,
                        book_name: book.name_en.clone(),
                        book_name_am: book.name_am.clone(),
                    },
                );
            }
        }

        tracing::debug!(
            query = %request.query,
            total = response.total_matches,
            returned = response.results.len(),
            books = response.book_counts.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "search"
        );

        response
    }
}

/// Count the verses of one book containing `query`, appending listed verse
/// matches to `results`. Returns the number of matching verses.
fn scan_book(
    book: &Book,
    verses: &[Verse],
    index: &BookIndex,
    query: &str,
    request: &SearchRequest,
    results: &mut Vec<SearchResult>,
) -> usize {
    let mut count = 0;
    let mut listed = 0;
    let mut pending: Option<Pending> = None;

    for (verse, range) in index.occurrences(query) {
        if let Some(current) = pending.as_mut()
            && current.verse == verse
        {
            if let Some(ranges) = current.ranges.as_mut() {
                ranges.push(range);
            }
            continue;
        }

        if let Some(done) = pending.take() {
            listed += flush(book, verses, index, done, results);
        }

        count += 1;
        let list = listed < request.per_book_display_cap
            && results.len() < request.result_limit;
        pending = Some(Pending {
            verse,
            ranges: list.then(|| vec![range]),
        });
    }

    if let Some(done) = pending {
        flush(book, verses, index, done, results);
    }

    count
}

/// Append a listed verse match; returns how many entries were added.
fn flush(
    book: &Book,
    verses: &[Verse],
    index: &BookIndex,
    pending: Pending,
    results: &mut Vec<SearchResult>,
) -> usize {
    let Some(ranges) = pending.ranges else {
        return 0;
    };

    let highlights = ranges
        .into_iter()
        .map(|r| index.to_original(pending.verse, r))
        .collect();
    results.push(SearchResult::verse(
        book,
        &verses[pending.verse],
        highlights,
    ));
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::fixtures;

    fn index() -> SearchIndex {
        SearchIndex::build(fixtures::corpus())
    }

    fn verse_refs(response: &SearchResponse) -> Vec<(u16, u32, u32)> {
        response
            .results
            .iter()
            .filter_map(|r| match r {
                SearchResult::Verse(v) => {
                    Some((v.book_number, v.chapter, v.verse))
                }
                SearchResult::Book(_) => None,
            })
            .collect()
    }

    #[test]
    fn blank_query_returns_empty_response() {
        let index = index();
        for query in ["", "   ", "\t\n"] {
            let response = index.search(&SearchRequest::dropdown(query));
            assert_eq!(response, SearchResponse::default());
        }
    }

    #[test]
    fn separator_in_query_matches_nothing() {
        let request = SearchRequest::dropdown("earth.\0and");
        let response = index().search(&request);
        assert_eq!(response, SearchResponse::default());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let index = index();
        let lower = index.search(&SearchRequest::dropdown("love"));
        let upper = index.search(&SearchRequest::dropdown("LOVE"));

        assert_eq!(lower, upper);
        // "loved" (John 3:16), "loveth"/"love" (1 John 4:8), "LOVE"/"love"
        // (1 John 4:16).
        assert_eq!(lower.total_matches, 3);
        assert_eq!(
            verse_refs(&lower),
            vec![(43, 3, 16), (62, 4, 8), (62, 4, 16)]
        );
    }

    #[test]
    fn results_follow_canonical_order() {
        let response = index().search(&SearchRequest::dropdown("beginning"));
        assert_eq!(
            verse_refs(&response),
            vec![(1, 1, 1), (43, 1, 1), (43, 1, 2)]
        );
        assert_eq!(response.total_matches, 3);
    }

    #[test]
    fn highlights_cover_every_occurrence() {
        let response = index().search(&SearchRequest::dropdown("the word"));
        let SearchResult::Verse(verse) = &response.results[0] else {
            panic!("expected a verse match");
        };
        assert_eq!(verse.highlights.len(), 3);
        for range in &verse.highlights {
            assert_eq!(verse.text[range.clone()].to_lowercase(), "the word");
        }
    }

    #[test]
    fn book_name_produces_book_match_before_its_verses() {
        // "john" matches the names "John" and "1 John"; no verse text
        // contains it.
        let response = index().search(&SearchRequest::dropdown("john"));
        let books: Vec<_> = response
            .results
            .iter()
            .map(|r| match r {
                SearchResult::Book(b) => (b.book_number, b.match_count),
                SearchResult::Verse(_) => panic!("unexpected verse match"),
            })
            .collect();
        assert_eq!(books, vec![(43, 0), (62, 0)]);
        assert_eq!(response.total_matches, 0);
        assert!(response.book_counts.is_empty());
    }

    #[test]
    fn book_match_without_matching_verses() {
        // Genesis matches by name; no verse text contains "gen".
        let response = index().search(&SearchRequest::dropdown("gen"));
        let SearchResult::Book(genesis) = &response.results[0] else {
            panic!("expected book match first");
        };
        assert_eq!(genesis.book_number, 1);
        assert_eq!(genesis.match_count, 0);
        assert!(!response.book_counts.contains_key(&1));
    }

    #[test]
    fn book_match_count_is_verse_total() {
        // "e" is part of "Genesis" and of all three Genesis verses.
        let response = index().search(&SearchRequest::dropdown("e"));
        let SearchResult::Book(genesis) = &response.results[0] else {
            panic!("expected book match first");
        };
        assert_eq!(genesis.book_number, 1);
        assert_eq!(genesis.match_count, response.book_counts[&1].count);
        assert_eq!(genesis.match_count, 3);
        assert!(response.results[1].is_verse());
    }

    #[test]
    fn book_match_joins_amharic_name() {
        let response = index().search(&SearchRequest::dropdown("ዘፍጥረት"));
        assert_eq!(response.results.len(), 1);
        let SearchResult::Book(book) = &response.results[0] else {
            panic!("expected book match");
        };
        assert_eq!(book.book_name_en, "Genesis");
        assert_eq!(book.book_name_am, "ኦሪት ዘፍጥረት");
    }

    #[test]
    fn per_book_cap_limits_listing_not_counts() {
        let request = SearchRequest::new("god", 100, 1);
        let response = index().search(&request);

        let john_listed = verse_refs(&response)
            .iter()
            .filter(|(b, _, _)| *b == 43)
            .count();
        assert_eq!(john_listed, 1);
        assert_eq!(response.book_counts[&43].count, 3);
        assert_eq!(response.book_counts[&62].count, 2);
        assert_eq!(response.book_counts[&1].count, 1);
        assert_eq!(response.total_matches, 6);
    }

    #[test]
    fn result_limit_truncates_list_not_counts() {
        let request = SearchRequest::new("the", 2, 50);
        let response = index().search(&request);

        assert_eq!(response.results.len(), 2);
        let sum: usize = response.book_counts.values().map(|c| c.count).sum();
        assert_eq!(response.total_matches, sum);
        assert!(response.total_matches > 2);
    }

    #[test]
    fn zero_limit_still_counts() {
        let response = index().search(&SearchRequest::new("god", 0, 0));
        assert!(response.results.is_empty());
        assert_eq!(response.total_matches, 6);
    }

    #[test]
    fn testament_filter_restricts_books() {
        let request =
            SearchRequest::dropdown("god").with_testament(Some(Testament::Old));
        let response = index().search(&request);
        assert_eq!(
            response.book_counts.keys().copied().collect::<Vec<_>>(),
            vec![1]
        );
        assert!(response.results.iter().all(|r| r.book_number() < 40));

        let request =
            SearchRequest::dropdown("god").with_testament(Some(Testament::New));
        let response = index().search(&request);
        assert_eq!(
            response.book_counts.keys().copied().collect::<Vec<_>>(),
            vec![43, 62]
        );
    }

    #[test]
    fn book_filter_restricts_to_one_book() {
        let response = index().search(&SearchRequest::page("god", Some(62)));
        assert_eq!(
            response.book_counts.keys().copied().collect::<Vec<_>>(),
            vec![62]
        );
        assert!(response.results.iter().all(|r| r.book_number() == 62));
        assert_eq!(response.total_matches, 2);
    }

    #[test]
    fn conflicting_filters_return_nothing() {
        let request = SearchRequest::page("god", Some(62))
            .with_testament(Some(Testament::Old));
        let response = index().search(&request);
        assert!(response.is_empty());
    }

    #[test]
    fn unknown_book_filter_returns_nothing() {
        let response = index().search(&SearchRequest::page("god", Some(7)));
        assert!(response.is_empty());
    }

    #[test]
    fn repeated_search_is_identical() {
        let index = index();
        let request = SearchRequest::page("in", None);
        assert_eq!(index.search(&request), index.search(&request));
    }

    #[test]
    fn page_presets() {
        let page = SearchRequest::page("faith", None);
        assert_eq!((page.result_limit, page.per_book_display_cap), (500, 50));
        let book = SearchRequest::page("faith", Some(45));
        assert_eq!((book.result_limit, book.per_book_display_cap), (1000, 200));
        assert_eq!(book.book, Some(45));
        let dropdown = SearchRequest::dropdown("faith");
        assert_eq!(
            (dropdown.result_limit, dropdown.per_book_display_cap),
            (100, 15)
        );

        let custom =
            SearchRequest::dropdown("faith").with_limits(Some(5), None);
        assert_eq!((custom.result_limit, custom.per_book_display_cap), (5, 15));
    }
}
