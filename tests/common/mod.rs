#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use versefind::{
    Catalog,
    book::{BookEntry, Testament},
};

pub fn entry(number: u16, name: &str, short: &str, am: &str) -> BookEntry {
    BookEntry {
        number,
        name_en: name.to_string(),
        short_name_en: short.to_string(),
        name_am: Some(am.to_string()),
        testament: if number < 40 {
            Testament::Old
        } else {
            Testament::New
        },
        file_reference: format!("{number:02}_{}", name.replace(' ', "_")),
    }
}

pub fn entries() -> Vec<BookEntry> {
    vec![
        entry(1, "Genesis", "Gen", "ኦሪት ዘፍጥረት"),
        entry(2, "Exodus", "Exod", "ኦሪት ዘጸአት"),
        entry(40, "Matthew", "Matt", "የማቴዎስ ወንጌል"),
        entry(43, "John", "John", "የዮሐንስ ወንጌል"),
    ]
}

pub fn catalog() -> Catalog {
    Catalog::from_entries(entries()).unwrap()
}

fn chapter(number: u32, verses: &[(u32, &str)]) -> Value {
    let verses: Vec<_> = verses
        .iter()
        .map(|(v, text)| json!({ "verse": v, "text": text }))
        .collect();
    json!({ "chapter": number, "sections": [{ "verses": verses }] })
}

pub fn documents() -> Vec<(u16, Value)> {
    vec![
        (
            1,
            json!({ "book_name_en": "Genesis", "chapters": [
                chapter(1, &[
                    (1, "In the beginning God created the heaven and the earth."),
                    (3, "And God said, Let there be light: and there was light."),
                ]),
            ]}),
        ),
        (
            2,
            json!({ "book_name_en": "Exodus", "chapters": [
                chapter(3, &[(14, "And God said unto Moses, I AM THAT I AM.")]),
                chapter(20, &[(3, "Thou shalt have no other gods before me.")]),
            ]}),
        ),
        (
            40,
            json!({ "book_name_en": "Matthew", "chapters": [
                chapter(5, &[
                    (9, "Blessed are the peacemakers: for they shall be called the children of God."),
                    (14, "Ye are the light of the world."),
                ]),
            ]}),
        ),
        (
            43,
            json!({ "book_name_en": "John", "chapters": [
                chapter(1, &[
                    (5, "And the light shineth in darkness; and the darkness comprehended it not."),
                ]),
                chapter(3, &[
                    (16, "For God so loved the world, that he gave his only begotten Son."),
                ]),
            ]}),
        ),
    ]
}

/// Lay out a complete data directory: book documents plus a catalog file.
pub fn write_data_dir(root: &Path) -> PathBuf {
    let corpus_dir = root.join("bible-data");
    std::fs::create_dir_all(&corpus_dir).unwrap();

    let entries = entries();
    for (number, doc) in documents() {
        let entry = entries.iter().find(|e| e.number == number).unwrap();
        std::fs::write(
            corpus_dir.join(format!("{}.json", entry.file_reference)),
            serde_json::to_string_pretty(&doc).unwrap(),
        )
        .unwrap();
    }

    std::fs::write(
        root.join("books.json"),
        serde_json::to_string_pretty(&entries).unwrap(),
    )
    .unwrap();

    root.to_path_buf()
}

pub fn versefind_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_versefind"))
}
