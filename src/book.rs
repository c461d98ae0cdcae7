use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Coarse partition of the canon used for filtering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn as_str(self) -> &'static str {
        match self {
            Testament::Old => "old",
            Testament::New => "new",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Testament {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "old" | "ot" => Ok(Testament::Old),
            "new" | "nt" => Ok(Testament::New),
            other => Err(Error::Config(format!("unknown testament: {other}"))),
        }
    }
}

/// Static metadata for one book, as configured in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub number: u16,
    pub name_en: String,
    pub short_name_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_am: Option<String>,
    pub testament: Testament,
    /// File stem of the book document inside the corpus directory.
    pub file_reference: String,
}

impl BookEntry {
    pub fn slug(&self) -> String {
        slugify(&self.name_en)
    }
}

/// A loaded book: catalog metadata joined with what its document provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub number: u16,
    pub name_en: String,
    pub name_am: String,
    pub short_name_en: String,
    pub testament: Testament,
    pub file_reference: String,
    pub chapter_count: u32,
}

impl Book {
    pub fn slug(&self) -> String {
        slugify(&self.name_en)
    }
}

/// URL-style identifier used by readers: `"1 John"` becomes `"1-john"`.
pub fn slugify(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// (English name, short name) in canonical order.
const CANON: [(&str, &str); 66] = [
    ("Genesis", "Gen"),
    ("Exodus", "Exod"),
    ("Leviticus", "Lev"),
    ("Numbers", "Num"),
    ("Deuteronomy", "Deut"),
    ("Joshua", "Josh"),
    ("Judges", "Judg"),
    ("Ruth", "Ruth"),
    ("1 Samuel", "1 Sam"),
    ("2 Samuel", "2 Sam"),
    ("1 Kings", "1 Kgs"),
    ("2 Kings", "2 Kgs"),
    ("1 Chronicles", "1 Chr"),
    ("2 Chronicles", "2 Chr"),
    ("Ezra", "Ezra"),
    ("Nehemiah", "Neh"),
    ("Esther", "Esth"),
    ("Job", "Job"),
    ("Psalms", "Ps"),
    ("Proverbs", "Prov"),
    ("Ecclesiastes", "Eccl"),
    ("Song of Solomon", "Song"),
    ("Isaiah", "Isa"),
    ("Jeremiah", "Jer"),
    ("Lamentations", "Lam"),
    ("Ezekiel", "Ezek"),
    ("Daniel", "Dan"),
    ("Hosea", "Hos"),
    ("Joel", "Joel"),
    ("Amos", "Amos"),
    ("Obadiah", "Obad"),
    ("Jonah", "Jonah"),
    ("Micah", "Mic"),
    ("Nahum", "Nah"),
    ("Habakkuk", "Hab"),
    ("Zephaniah", "Zeph"),
    ("Haggai", "Hag"),
    ("Zechariah", "Zech"),
    ("Malachi", "Mal"),
    ("Matthew", "Matt"),
    ("Mark", "Mark"),
    ("Luke", "Luke"),
    ("John", "John"),
    ("Acts", "Acts"),
    ("Romans", "Rom"),
    ("1 Corinthians", "1 Cor"),
    ("2 Corinthians", "2 Cor"),
    ("Galatians", "Gal"),
    ("Ephesians", "Eph"),
    ("Philippians", "Phil"),
    ("Colossians", "Col"),
    ("1 Thessalonians", "1 Thess"),
    ("2 Thessalonians", "2 Thess"),
    ("1 Timothy", "1 Tim"),
    ("2 Timothy", "2 Tim"),
    ("Titus", "Titus"),
    ("Philemon", "Phlm"),
    ("Hebrews", "Heb"),
    ("James", "Jas"),
    ("1 Peter", "1 Pet"),
    ("2 Peter", "2 Pet"),
    ("1 John", "1 John"),
    ("2 John", "2 John"),
    ("3 John", "3 John"),
    ("Jude", "Jude"),
    ("Revelation", "Rev"),
];

/// Number of the first New Testament book in the canonical catalog.
const FIRST_NEW_TESTAMENT_BOOK: u16 = 40;

/// The ordered set of books a corpus is expected to contain.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<BookEntry>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// The 66-book canon with `NN_Name` file references.
    pub fn canonical() -> Self {
        let entries = CANON
            .iter()
            .enumerate()
            .map(|(i, (name, short))| {
                let number = i as u16 + 1;
                BookEntry {
                    number,
                    name_en: name.to_string(),
                    short_name_en: short.to_string(),
                    name_am: None,
                    testament: if number < FIRST_NEW_TESTAMENT_BOOK {
                        Testament::Old
                    } else {
                        Testament::New
                    },
                    file_reference: format!(
                        "{number:02}_{}",
                        name.replace(' ', "_")
                    ),
                }
            })
            .collect();

        // The table above is fixed and valid.
        Self::index(entries)
    }

    /// Build a catalog from arbitrary entries, sorted by book number.
    pub fn from_entries(mut entries: Vec<BookEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("book catalog is empty".into()));
        }

        entries.sort_by_key(|e| e.number);

        for pair in entries.windows(2) {
            if pair[0].number == pair[1].number {
                return Err(Error::Config(format!(
                    "duplicate book number {} in catalog",
                    pair[0].number
                )));
            }
        }

        for entry in &entries {
            if entry.name_en.trim().is_empty()
                || entry.short_name_en.trim().is_empty()
                || entry.file_reference.trim().is_empty()
            {
                return Err(Error::Config(format!(
                    "book {} has an empty name or file reference",
                    entry.number
                )));
            }
        }

        let catalog = Self::index(entries);
        if catalog.by_slug.len() != catalog.entries.len() {
            return Err(Error::Config(
                "two catalog books share the same slug".into(),
            ));
        }
        Ok(catalog)
    }

    /// Read a JSON array of [`BookEntry`] values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<BookEntry> =
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!(
                    "invalid catalog {}: {e}",
                    path.display()
                ))
            })?;
        Self::from_entries(entries)
    }

    /// Use `catalog_file` when it exists, the canonical catalog otherwise.
    pub fn resolve(catalog_file: &Path) -> Result<Self> {
        if catalog_file.is_file() {
            tracing::info!(
                path = %catalog_file.display(),
                "using custom book catalog"
            );
            Self::from_file(catalog_file)
        } else {
            Ok(Self::canonical())
        }
    }

    fn index(entries: Vec<BookEntry>) -> Self {
        let by_slug = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.slug(), i))
            .collect();
        Self { entries, by_slug }
    }

    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, number: u16) -> Option<&BookEntry> {
        self.entries
            .binary_search_by_key(&number, |e| e.number)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn by_slug(&self, slug: &str) -> Option<&BookEntry> {
        self.by_slug.get(slug).map(|&i| &self.entries[i])
    }
}
