use std::{io::IsTerminal, time::Instant};

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use versefind::{
    Bible,
    Catalog,
    CorpusLoader,
    DataDir,
    Reference,
    SearchIndex,
    SearchRequest,
    cli::{self, Cli, Command},
    error::{self, Error},
    format,
    mcp,
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("VERSEFIND_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let catalog = Catalog::resolve(&data_dir.catalog_file())?;
    let bible = Bible::new(CorpusLoader::new(data_dir.corpus_dir(), catalog));

    match cli.command {
        Command::Search(args) => cmd_search(&bible, &args)?,
        Command::Get(args) => cmd_get(&bible, &args)?,
        Command::Books(args) => cmd_books(&bible, &args)?,
        Command::Check(args) => cmd_check(&bible, &data_dir, args.json)?,
        Command::Mcp => mcp::run_mcp(bible)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

fn build_request(
    index: &SearchIndex,
    args: &cli::SearchArgs,
) -> error::Result<SearchRequest> {
    let book = args
        .book
        .as_deref()
        .map(|key| {
            index
                .corpus()
                .find_book(key)
                .map(|b| b.number)
                .ok_or_else(|| Error::NotFound {
                    kind: "book",
                    name: key.to_string(),
                })
        })
        .transpose()?;

    let request = if args.page {
        SearchRequest::page(&args.query, book)
    } else {
        SearchRequest::dropdown(&args.query).with_book(book)
    };

    Ok(request
        .with_testament(args.testament)
        .with_limits(args.limit, args.per_book))
}

fn cmd_search(bible: &Bible, args: &cli::SearchArgs) -> error::Result<()> {
    let index = bible.ensure_loaded()?;
    let request = build_request(&index, args)?;
    let response = index.search(&request);

    if args.json {
        println!("{}", format::format_json(&response)?);
    } else {
        let color = use_color();
        print!("{}", format::format_human(&response, &args.query, color));
    }
    Ok(())
}

fn cmd_get(bible: &Bible, args: &cli::GetArgs) -> error::Result<()> {
    let reference: Reference = args.reference.parse()?;
    let index = bible.ensure_loaded()?;
    let passage = index.corpus().resolve(&reference)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&passage)?);
    } else {
        print!("{passage}");
    }
    Ok(())
}

fn cmd_books(bible: &Bible, args: &cli::BooksArgs) -> error::Result<()> {
    let index = bible.ensure_loaded()?;
    let books: Vec<_> = index
        .corpus()
        .books()
        .iter()
        .filter(|b| args.testament.is_none_or(|t| t == b.testament))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }

    for book in books {
        println!(
            "{:>2}  {:<8} {:<20} {:<4} {:>3} ch  {}",
            book.number,
            book.short_name_en,
            book.name_en,
            book.testament.as_str(),
            book.chapter_count,
            book.name_am
        );
    }
    Ok(())
}

fn cmd_check(
    bible: &Bible,
    data_dir: &DataDir,
    json: bool,
) -> error::Result<()> {
    let started = Instant::now();
    let index = bible.ensure_loaded()?;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let corpus = index.corpus();

    if json {
        let report = json!({
            "dataDir": data_dir.root(),
            "corpusDir": bible.loader().dir(),
            "books": corpus.books().len(),
            "verses": corpus.verse_count(),
            "elapsedMs": elapsed_ms,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Corpus: {}", bible.loader().dir().display());
        println!("Books: {}", corpus.books().len());
        println!("Verses: {}", corpus.verse_count());
        println!("Loaded in {elapsed_ms} ms");
    }
    Ok(())
}

fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
