//! # Circulate CLI (`circ`)
//!
//! The `circ` binary is the interface to the library catalog and
//! circulation manager: store initialization, catalog and borrower
//! management, borrow/return transactions, NLP-assisted search, and
//! reviews with sentiment.
//!
//! ## Usage
//!
//! ```bash
//! circ --config ./config/circ.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `circ init` | Create the store (JSON document or SQLite schema) |
//! | `circ add-book` | Add a book to the catalog |
//! | `circ update-book <id>` | Change a book's fields or copy count |
//! | `circ books` | List the catalog |
//! | `circ delete-book <id>` | Remove a book (admin) |
//! | `circ add-borrower` | Register a borrower |
//! | `circ borrowers` | List registered borrowers |
//! | `circ borrow <book-id> <borrower-id>` | Check a book out |
//! | `circ return <transaction-id>` | Check a book back in |
//! | `circ circulation` | List active loans |
//! | `circ search "<query>"` | Rank the catalog against a query |
//! | `circ review <book-id>` | Add a review (sentiment computed) |
//! | `circ reviews <book-id>` | List a book's reviews with the tally |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use circulate::config::{self, Backend};
use circulate::json_store::JsonStore;
use circulate::{catalog, circulation, migrate, review, search};

/// Circulate — a library catalog and circulation manager with
/// NLP-assisted search and review sentiment.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file selecting the backend (JSON file or SQLite) and circulation policy.
#[derive(Parser)]
#[command(
    name = "circ",
    about = "Circulate — a library catalog and circulation manager",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/circ.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the configured store.
    ///
    /// For the SQLite backend this creates the database file and runs the
    /// schema migrations; for the file backend it writes an empty document.
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Add a book to the catalog. All copies start available.
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        genre: String,
        /// Number of copies the library holds.
        #[arg(long, default_value_t = 1)]
        copies: u32,
    },

    /// Update a book's fields. Only the flags given change; adjusting
    /// `--copies` keeps the count currently on loan.
    UpdateBook {
        /// Book id.
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        copies: Option<u32>,
    },

    /// List the catalog in insertion order.
    Books,

    /// Remove a book from the catalog.
    ///
    /// Outstanding transactions and reviews keep their book id; returns
    /// against a deleted book still close cleanly.
    DeleteBook {
        /// Book id.
        id: i64,
    },

    /// Register a borrower. The id code (B0001, B0002, ...) is allocated
    /// by the store; the email must not already be registered.
    AddBorrower {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },

    /// List registered borrowers.
    Borrowers,

    /// Check a book out to a borrower.
    ///
    /// Fails if the book has no available copies. The due date is the
    /// borrow date plus the configured loan period (default 14 days).
    Borrow {
        /// Book id.
        book_id: i64,
        /// Borrower id code.
        borrower_id: String,
    },

    /// Check a book back in by its transaction id.
    ///
    /// Fails if the transaction does not exist or was already returned.
    Return {
        /// Transaction id.
        transaction_id: i64,
    },

    /// List active loans (transactions without a return date).
    Circulation,

    /// Rank the catalog against a query.
    ///
    /// Query and records are normalized (lowercase, punctuation stripped,
    /// stopwords dropped, stemmed) and scored by set overlap. Zero-score
    /// records are omitted.
    Search {
        /// The search query string.
        query: String,

        /// Fields to match: `title`, `author`, `genre`, or `all`.
        #[arg(long, default_value = "all")]
        scope: String,

        /// Print hits as JSON instead of the text listing.
        #[arg(long)]
        json: bool,
    },

    /// Add a review for a book. The sentiment label and scores are
    /// computed once here and stored with the review.
    Review {
        /// Book id.
        book_id: i64,

        /// Review text.
        #[arg(long)]
        text: String,

        /// Star rating, 1 to 5.
        #[arg(long)]
        rating: u8,

        /// Borrower id code, if the reviewer is registered.
        #[arg(long)]
        borrower: Option<String>,
    },

    /// List a book's reviews with the sentiment tally.
    Reviews {
        /// Book id.
        book_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            match cfg.store.backend {
                Backend::Sqlite => migrate::run_migrations(&cfg).await?,
                Backend::File => JsonStore::open(&cfg.store.path)?.flush()?,
            }
            println!("Store initialized successfully.");
        }
        Commands::AddBook {
            title,
            author,
            isbn,
            genre,
            copies,
        } => {
            catalog::run_add_book(&cfg, &title, &author, &isbn, &genre, copies).await?;
        }
        Commands::UpdateBook {
            id,
            title,
            author,
            isbn,
            genre,
            copies,
        } => {
            catalog::run_update_book(&cfg, id, title, author, isbn, genre, copies).await?;
        }
        Commands::Books => {
            catalog::run_list_books(&cfg).await?;
        }
        Commands::DeleteBook { id } => {
            catalog::run_delete_book(&cfg, id).await?;
        }
        Commands::AddBorrower { name, email, phone } => {
            catalog::run_add_borrower(&cfg, &name, &email, &phone).await?;
        }
        Commands::Borrowers => {
            catalog::run_list_borrowers(&cfg).await?;
        }
        Commands::Borrow {
            book_id,
            borrower_id,
        } => {
            circulation::run_borrow(&cfg, book_id, &borrower_id).await?;
        }
        Commands::Return { transaction_id } => {
            circulation::run_return(&cfg, transaction_id).await?;
        }
        Commands::Circulation => {
            circulation::run_circulation(&cfg).await?;
        }
        Commands::Search { query, scope, json } => {
            search::run_search(&cfg, &query, &scope, json).await?;
        }
        Commands::Review {
            book_id,
            text,
            rating,
            borrower,
        } => {
            review::run_add_review(&cfg, book_id, borrower, &text, rating).await?;
        }
        Commands::Reviews { book_id } => {
            review::run_list_reviews(&cfg, book_id).await?;
        }
    }

    Ok(())
}
