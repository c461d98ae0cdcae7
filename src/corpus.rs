use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    book::{Book, BookEntry, Catalog, slugify},
    error::{Error, Result},
    text_util::nfc,
};

/// One verse of one chapter of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verse {
    pub book_number: u16,
    pub chapter: u32,
    pub verse: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    pub text: String,
}

/// On-disk shape of a book document.
#[derive(Debug, Clone, Deserialize)]
pub struct BookDocument {
    #[serde(default)]
    pub book_name_en: Option<String>,
    #[serde(default)]
    pub book_name_am: Option<String>,
    pub chapters: Vec<ChapterDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterDocument {
    pub chapter: u32,
    pub sections: Vec<SectionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionDocument {
    #[serde(default)]
    pub title: Option<String>,
    pub verses: Vec<VerseDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerseDocument {
    pub verse: u32,
    pub text: String,
}

/// Every book and verse, in memory, in canonical order.
#[derive(Debug, Clone)]
pub struct Corpus {
    books: Vec<Book>,
    /// Parallel to `books`; each sorted by (chapter, verse).
    verses: Vec<Vec<Verse>>,
    by_number: HashMap<u16, usize>,
    by_slug: HashMap<String, usize>,
    /// Lowercased slugs, names and short names.
    by_name: HashMap<String, usize>,
}

impl Corpus {
    /// Assemble a corpus from already-parsed documents, one per catalog
    /// entry. Documents are validated exactly as [`CorpusLoader`] does.
    pub fn from_documents(
        catalog: &Catalog,
        mut documents: HashMap<u16, BookDocument>,
    ) -> Result<Self> {
        let mut books = Vec::with_capacity(catalog.len());
        let mut verses = Vec::with_capacity(catalog.len());

        for entry in catalog.entries() {
            let document = documents.remove(&entry.number).ok_or_else(|| {
                Error::corpus(&entry.name_en, "no document provided")
            })?;
            let (book, book_verses) = assemble_book(entry, document)?;
            books.push(book);
            verses.push(book_verses);
        }

        Ok(Self::index(books, verses))
    }

    fn index(books: Vec<Book>, verses: Vec<Vec<Verse>>) -> Self {
        let by_number = books
            .iter()
            .enumerate()
            .map(|(i, b)| (b.number, i))
            .collect();
        let by_slug = books
            .iter()
            .enumerate()
            .map(|(i, b)| (b.slug(), i))
            .collect();

        let mut by_name = HashMap::new();
        for (i, book) in books.iter().enumerate() {
            let aliases = [
                book.slug(),
                book.name_en.to_lowercase(),
                book.short_name_en.to_lowercase(),
                slugify(&book.short_name_en),
                book.name_am.to_lowercase(),
            ];
            for alias in aliases {
                if !alias.is_empty() {
                    by_name.entry(alias).or_insert(i);
                }
            }
        }

        Self {
            books,
            verses,
            by_number,
            by_slug,
            by_name,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, number: u16) -> Option<&Book> {
        self.by_number.get(&number).map(|&i| &self.books[i])
    }

    pub fn book_by_slug(&self, slug: &str) -> Option<&Book> {
        self.by_slug.get(slug).map(|&i| &self.books[i])
    }

    /// Look a book up by slug, English name, short name or Amharic name,
    /// ignoring case.
    pub fn book_by_name(&self, name: &str) -> Option<&Book> {
        let key = name.trim().to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_name.get(&slugify(&key)))
            .map(|&i| &self.books[i])
    }

    /// Look a book up by number, or by any name [`Corpus::book_by_name`]
    /// accepts.
    pub fn find_book(&self, key: &str) -> Option<&Book> {
        match key.trim().parse::<u16>() {
            Ok(number) => self.book(number),
            Err(_) => self.book_by_name(key),
        }
    }

    /// All verses of a book in canonical order.
    pub fn verses(&self, book_number: u16) -> Option<&[Verse]> {
        self.by_number
            .get(&book_number)
            .map(|&i| self.verses[i].as_slice())
    }

    pub fn chapter(&self, book_number: u16, chapter: u32) -> Option<&[Verse]> {
        let verses = self.verses(book_number)?;
        let start = verses.partition_point(|v| v.chapter < chapter);
        let end = verses.partition_point(|v| v.chapter <= chapter);
        (start < end).then(|| &verses[start..end])
    }

    pub fn verse(
        &self,
        book_number: u16,
        chapter: u32,
        verse: u32,
    ) -> Option<&Verse> {
        let verses = self.chapter(book_number, chapter)?;
        verses
            .binary_search_by_key(&verse, |v| v.verse)
            .ok()
            .map(|i| &verses[i])
    }

    pub fn verse_count(&self) -> usize {
        self.verses.iter().map(Vec::len).sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Book, &[Verse])> {
        self.books
            .iter()
            .zip(self.verses.iter().map(Vec::as_slice))
    }
}

/// Reads one JSON document per catalog entry from a directory.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    dir: PathBuf,
    catalog: Catalog,
}

impl CorpusLoader {
    pub fn new(dir: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            dir: dir.into(),
            catalog,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn book_path(&self, entry: &BookEntry) -> PathBuf {
        self.dir.join(format!("{}.json", entry.file_reference))
    }

    /// Read, parse and validate every book.
    ///
    /// Files are parsed in parallel. If several books fail, the error for the
    /// first one in catalog order is returned.
    pub fn load(&self) -> Result<Corpus> {
        let started = Instant::now();

        let loaded: Vec<Result<(Book, Vec<Verse>)>> = self
            .catalog
            .entries()
            .par_iter()
            .map(|entry| {
                let document = read_document(entry, &self.book_path(entry))?;
                assemble_book(entry, document)
            })
            .collect();

        let mut books = Vec::with_capacity(loaded.len());
        let mut verses = Vec::with_capacity(loaded.len());
        for result in loaded {
            let (book, book_verses) = result?;
            books.push(book);
            verses.push(book_verses);
        }

        let corpus = Corpus::index(books, verses);
        tracing::info!(
            books = corpus.books().len(),
            verses = corpus.verse_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            dir = %self.dir.display(),
            "corpus loaded"
        );
        Ok(corpus)
    }
}

fn read_document(entry: &BookEntry, path: &Path) -> Result<BookDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::corpus(
                &entry.name_en,
                format!("missing file {}", path.display()),
            )
        } else {
            Error::corpus(
                &entry.name_en,
                format!("cannot read {}: {e}", path.display()),
            )
        }
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::corpus(&entry.name_en, format!("malformed: {e}")))
}

/// Validate a document and flatten chapters → sections → verses.
fn assemble_book(
    entry: &BookEntry,
    document: BookDocument,
) -> Result<(Book, Vec<Verse>)> {
    let fail = |reason: String| Error::corpus(&entry.name_en, reason);

    if document.chapters.is_empty() {
        return Err(fail("book has no chapters".into()));
    }

    if let Some(doc_name) = &document.book_name_en
        && doc_name.trim() != entry.name_en
    {
        tracing::warn!(
            book = entry.number,
            catalog = %entry.name_en,
            document = %doc_name,
            "book name in document differs from catalog"
        );
    }

    let mut seen_chapters = BTreeSet::new();
    let mut verses = Vec::new();

    for chapter in document.chapters {
        if chapter.chapter == 0 {
            return Err(fail("chapter number 0".into()));
        }
        if !seen_chapters.insert(chapter.chapter) {
            return Err(fail(format!("duplicate chapter {}", chapter.chapter)));
        }

        let mut seen_verses = BTreeSet::new();
        for section in chapter.sections {
            let title = section
                .title
                .map(|t| nfc(t.trim()))
                .filter(|t| !t.is_empty());

            for verse in section.verses {
                if verse.verse == 0 {
                    return Err(fail(format!(
                        "verse number 0 in chapter {}",
                        chapter.chapter
                    )));
                }
                if !seen_verses.insert(verse.verse) {
                    return Err(fail(format!(
                        "duplicate verse {}:{}",
                        chapter.chapter, verse.verse
                    )));
                }
                verses.push(Verse {
                    book_number: entry.number,
                    chapter: chapter.chapter,
                    verse: verse.verse,
                    section_title: title.clone(),
                    text: nfc(&verse.text),
                });
            }
        }

        if seen_verses.is_empty() {
            return Err(fail(format!(
                "chapter {} has no verses",
                chapter.chapter
            )));
        }
    }

    verses.sort_by_key(|v| (v.chapter, v.verse));

    let name_am = entry
        .name_am
        .clone()
        .or(document.book_name_am)
        .map(|n| nfc(n.trim()))
        .unwrap_or_default();

    let book = Book {
        number: entry.number,
        name_en: entry.name_en.clone(),
        name_am,
        short_name_en: entry.short_name_en.clone(),
        testament: entry.testament,
        file_reference: entry.file_reference.clone(),
        chapter_count: seen_chapters.len() as u32,
    };

    Ok((book, verses))
}
