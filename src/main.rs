// ABOUTME: Entry point for the readlist binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and applies one change to the stored reading list.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use readlist_core::{Book, Intent, Status};
use readlist_store::{FileKv, ReadingListManager};

use crate::config::ReadlistConfig;

#[derive(Debug, Parser)]
#[command(name = "readlist", version, about = "Keep track of what you are reading")]
struct Cli {
    /// Data directory (overrides READLIST_HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Storage key (overrides READLIST_STORAGE_KEY)
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the whole list in order
    List,
    /// Show only the books you have read
    Read,
    /// Add a book to the end of the list
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
    },
    /// Move a book to its next status (waiting, reading, read, waiting)
    Advance { id: String },
    /// Set a book's status
    Status { id: String, status: Status },
    /// Mark a book read and attach a summary
    Summary { id: String, text: String },
    /// Move the book at position FROM to position TO (1-based)
    Move { from: usize, to: usize },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "readlist=info,readlist_store=info,readlist_core=info",
                )
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ReadlistConfig::from_env()
        .and_then(|c| c.with_overrides(cli.home.clone(), cli.key.clone()))
        .context("invalid configuration")?;

    tracing::debug!(home = %config.home.display(), key = %config.storage_key, "readlist starting");

    let kv = FileKv::open(&config.home)
        .await
        .with_context(|| format!("failed to open data directory {}", config.home.display()))?;
    let manager = ReadingListManager::open(Arc::new(kv), config.storage_key.clone()).await;

    let result = run(&manager, cli.command).await;
    manager.shutdown().await.context("failed to close reading list")?;
    result
}

async fn run(manager: &ReadingListManager, command: Command) -> anyhow::Result<()> {
    let handle = manager.handle();

    let intent = match command {
        Command::List => {
            print_books(handle.snapshot().await.iter().enumerate());
            return Ok(());
        }
        Command::Read => {
            let books = handle.snapshot().await;
            print_books(books.iter().enumerate().filter(|(_, b)| b.is_read()));
            return Ok(());
        }
        Command::Add { title, author } => Intent::AddNew { title, author },
        Command::Advance { id } => Intent::AdvanceStatus { id },
        Command::Status { id, status } => Intent::SetStatus { id, status },
        Command::Summary { id, text } => Intent::AttachSummary { id, summary: text },
        Command::Move { from, to } => Intent::Move {
            from: from.saturating_sub(1),
            to: to.saturating_sub(1),
        },
    };

    match manager.apply(intent).await.context("change rejected")? {
        Some(change) => {
            tracing::debug!(revision = change.revision, "change applied");
            print_books(handle.snapshot().await.iter().enumerate());
        }
        None => println!("nothing changed"),
    }
    Ok(())
}

fn print_books<'a>(books: impl Iterator<Item = (usize, &'a Book)>) {
    for (index, book) in books {
        println!(
            "{:>3}. [{}] {} by {} ({})",
            index + 1,
            book.status,
            book.title,
            book.author,
            book.id
        );
        if let Some(summary) = &book.summary {
            println!("       {}", summary);
        }
    }
}
