//! Text folding for case-insensitive matching, and match highlighting.
//!
//! Matching happens on a *folded* copy of each text: NFC-composed (done once
//! when the corpus is loaded) and lowercased character by character. Folding
//! can change byte lengths (`'İ'` lowercases to two characters), so every
//! folded text carries an [`OffsetMap`] that translates folded byte ranges
//! back into ranges of the original text.

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;

/// Compose `text` to Unicode NFC.
pub fn nfc(text: &str) -> String {
    text.nfc().collect()
}

/// Translates byte ranges in a folded text back to the original text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    /// Original `(start, end)` char span for every folded byte. `None` when
    /// folding mapped each char to one char of the same byte length.
    spans: Option<Box<[(u32, u32)]>>,
}

impl OffsetMap {
    pub fn is_identity(&self) -> bool {
        self.spans.is_none()
    }

    /// Map a folded byte range to the smallest original range covering it.
    pub fn to_original(&self, range: Range<usize>) -> Range<usize> {
        let Some(spans) = &self.spans else {
            return range;
        };

        if range.is_empty() {
            let at = spans
                .get(range.start)
                .map(|s| s.0 as usize)
                .unwrap_or_else(|| spans.last().map_or(0, |s| s.1 as usize));
            return at..at;
        }

        let start = spans[range.start].0 as usize;
        let end = spans[range.end - 1].1 as usize;
        start..end
    }
}

/// Lowercase `text` per character, recording how folded bytes map back.
pub fn fold(text: &str) -> (String, OffsetMap) {
    let mut folded = String::with_capacity(text.len());
    let mut spans: Vec<(u32, u32)> = Vec::with_capacity(text.len());
    let mut identity = true;

    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        let before = folded.len();
        let mut produced = 0;
        for lower in ch.to_lowercase() {
            folded.push(lower);
            produced += 1;
        }

        let written = folded.len() - before;
        if produced != 1 || written != ch.len_utf8() {
            identity = false;
        }
        spans.extend(std::iter::repeat_n((start as u32, end as u32), written));
    }

    let map = if identity {
        OffsetMap::default()
    } else {
        OffsetMap {
            spans: Some(spans.into_boxed_slice()),
        }
    };
    (folded, map)
}

/// Fold a user query: trim, compose to NFC, lowercase.
///
/// Returns an empty string for blank input.
pub fn fold_query(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    fold(&nfc(trimmed)).0
}

/// Wrap each range of `text` in `open`/`close`.
///
/// Ranges must be sorted and non-overlapping; ranges that do not fall on
/// char boundaries are left unmarked.
pub fn mark(
    text: &str,
    ranges: &[Range<usize>],
    open: &str,
    close: &str,
) -> String {
    let mut out = String::with_capacity(
        text.len() + ranges.len() * (open.len() + close.len()),
    );
    let mut cursor = 0;

    for range in ranges {
        if range.start < cursor {
            continue;
        }
        let (Some(before), Some(inner)) =
            (text.get(cursor..range.start), text.get(range.clone()))
        else {
            continue;
        };
        out.push_str(before);
        out.push_str(open);
        out.push_str(inner);
        out.push_str(close);
        cursor = range.end;
    }

    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_ascii_is_identity() {
        let (folded, map) = fold("For God so Loved");
        assert_eq!(folded, "for god so loved");
        assert!(map.is_identity());
        assert_eq!(map.to_original(4..7), 4..7);
    }

    #[test]
    fn fold_ethiopic_is_identity() {
        // Ethiopic has no case; folding leaves it untouched.
        let text = "በመጀመሪያ እግዚአብሔር ሰማይንና ምድርን ፈጠረ።";
        let (folded, map) = fold(text);
        assert_eq!(folded, text);
        assert!(map.is_identity());
    }

    #[test]
    fn fold_maps_expanding_chars_back() {
        // 'İ' lowercases to 'i' + U+0307.
        let text = "İstanbul";
        let (folded, map) = fold(text);
        assert!(!map.is_identity());
        assert!(folded.starts_with("i\u{307}"));

        let pos = folded.find("stan").unwrap();
        let original = map.to_original(pos..pos + 4);
        assert_eq!(&text[original], "stan");

        // A match on the first half of an expansion covers the whole char.
        let original = map.to_original(0..1);
        assert_eq!(&text[original], "İ");
    }

    #[test]
    fn fold_query_trims_and_composes() {
        assert_eq!(fold_query("  LOVE  "), "love");
        assert_eq!(fold_query("   "), "");
        // e + combining acute composes to é.
        assert_eq!(fold_query("Caf\u{0065}\u{0301}"), "café");
    }

    #[test]
    fn nfc_composes() {
        assert_eq!(nfc("e\u{0301}"), "é");
    }

    #[test]
    fn mark_wraps_ranges() {
        let text = "love one another as I have loved you";
        assert_eq!(
            mark(text, &[0..4, 27..31], "<mark>", "</mark>"),
            "<mark>love</mark> one another as I have <mark>love</mark>d you"
        );
    }

    #[test]
    fn mark_without_ranges_returns_text() {
        assert_eq!(mark("faith", &[], "[", "]"), "faith");
    }

    #[test]
    fn mark_skips_invalid_ranges() {
        let text = "ሰላም";
        // Byte 1 is inside the first Ethiopic char.
        assert_eq!(mark(text, &[1..3], "[", "]"), text);
    }
}
