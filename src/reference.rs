use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    book::Book,
    corpus::{Corpus, Verse},
    error::{Error, Result},
};

/// A passage address such as `"1 John 3:16"` or `"song-of-solomon 2"`.
///
/// The book part is matched against slugs, names and short names when the
/// reference is resolved, so it may contain spaces and digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    /// `None` selects the whole chapter.
    pub verse: Option<u32>,
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid reference: {s:?}"));

        let (book, location) = s
            .trim()
            .rsplit_once(char::is_whitespace)
            .ok_or_else(invalid)?;
        let book = book.trim();
        if book.is_empty() {
            return Err(invalid());
        }

        let (chapter, verse) = match location.split_once(':') {
            Some((c, v)) => (c, Some(v)),
            None => (location, None),
        };
        let number = |part: &str| {
            part.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(invalid)
        };

        Ok(Self {
            book: book.to_string(),
            chapter: number(chapter)?,
            verse: verse.map(number).transpose()?,
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)?;
        if let Some(verse) = self.verse {
            write!(f, ":{verse}")?;
        }
        Ok(())
    }
}

/// The verses a [`Reference`] selects, with their book.
#[derive(Debug, Clone, Serialize)]
pub struct Passage<'a> {
    pub book: &'a Book,
    pub chapter: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    pub verses: &'a [Verse],
}

impl Passage<'_> {
    /// Canonical form of the reference, using the book's short name.
    pub fn reference(&self) -> Reference {
        Reference {
            book: self.book.short_name_en.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}

impl fmt::Display for Passage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.reference())?;

        let mut title = None;
        for verse in self.verses {
            if verse.section_title.is_some() && verse.section_title != title {
                title = verse.section_title.clone();
                if let Some(t) = &title {
                    writeln!(f, "\n{t}")?;
                }
            }
            writeln!(f, "{:>3} {}", verse.verse, verse.text)?;
        }
        Ok(())
    }
}

impl Corpus {
    /// Look up the verses a reference points at.
    pub fn resolve(&self, reference: &Reference) -> Result<Passage<'_>> {
        let book = self.book_by_name(&reference.book).ok_or_else(|| {
            Error::NotFound {
                kind: "book",
                name: reference.book.clone(),
            }
        })?;

        let not_found =
            |kind: &'static str, name: String| Error::NotFound { kind, name };
        let short = &book.short_name_en;

        let Some(chapter) = self.chapter(book.number, reference.chapter) else {
            return Err(not_found(
                "chapter",
                format!("{short} {}", reference.chapter),
            ));
        };

        let verses = match reference.verse {
            None => chapter,
            Some(n) => {
                let Ok(i) = chapter.binary_search_by_key(&n, |v| v.verse)
                else {
                    return Err(not_found(
                        "verse",
                        format!("{short} {}:{n}", reference.chapter),
                    ));
                };
                &chapter[i..=i]
            }
        };

        Ok(Passage {
            book,
            chapter: reference.chapter,
            verse: reference.verse,
            verses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::fixtures;

    fn parse(s: &str) -> Reference {
        s.parse().unwrap()
    }

    #[test]
    fn parses_multi_word_books() {
        let r = parse("1 John 4:8");
        assert_eq!(r.book, "1 John");
        assert_eq!((r.chapter, r.verse), (4, Some(8)));

        let r = parse("  song-of-solomon 2 ");
        assert_eq!(r.book, "song-of-solomon");
        assert_eq!((r.chapter, r.verse), (2, None));
    }

    #[test]
    fn rejects_malformed_references() {
        for bad in ["", "John", "3:16", "John 0", "John 3:0", "John x:1"] {
            let err = bad.parse::<Reference>().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(parse("John 3:16").to_string(), "John 3:16");
        assert_eq!(parse("Psalms 23").to_string(), "Psalms 23");
    }

    #[test]
    fn resolves_single_verse() {
        let corpus = fixtures::corpus();
        let passage = corpus.resolve(&parse("1-john 4:16")).unwrap();
        assert_eq!(passage.book.number, 62);
        assert_eq!(passage.verses.len(), 1);
        assert!(passage.verses[0].text.starts_with("God is LOVE"));
        assert_eq!(passage.reference().to_string(), "1 John 4:16");
    }

    #[test]
    fn resolves_whole_chapter() {
        let corpus = fixtures::corpus();
        let passage = corpus.resolve(&parse("john 1")).unwrap();
        let numbers: Vec<_> = passage.verses.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(passage.reference().to_string(), "John 1");

        let text = passage.to_string();
        assert!(text.starts_with("John 1\n\nThe Word\n  1 In the beginning"));
        assert_eq!(text.matches("The Word\n").count(), 1);
    }

    #[test]
    fn unknown_parts_are_not_found() {
        let corpus = fixtures::corpus();
        for (reference, kind) in [
            ("Exodus 1", "book"),
            ("Genesis 3", "chapter"),
            ("Genesis 1:9", "verse"),
        ] {
            match corpus.resolve(&parse(reference)) {
                Err(Error::NotFound { kind: k, .. }) => assert_eq!(k, kind),
                other => panic!("{reference}: unexpected {other:?}"),
            }
        }
    }
}
