//! Database schema migrations (idempotent).
//!
//! One table per record collection. `borrowers.borrowed_books` and
//! `reviews.sentiment_scores` are JSON text columns; review ids are
//! allocated per book, so the primary key is (book_id, id).
//!
//! Cross-table references are by id only, without FOREIGN KEY constraints:
//! deleting a book is allowed to orphan its transactions and reviews, and
//! returns tolerate the orphaned ids.

use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            isbn TEXT NOT NULL,
            genre TEXT NOT NULL,
            copies INTEGER NOT NULL,
            available INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS borrowers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            borrowed_books TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            borrower_id TEXT NOT NULL,
            borrow_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            return_date TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            borrower_id TEXT,
            review_text TEXT NOT NULL,
            rating INTEGER NOT NULL,
            sentiment TEXT NOT NULL,
            sentiment_scores TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (book_id, id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_book_id ON transactions(book_id)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_borrower_id ON transactions(borrower_id)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
