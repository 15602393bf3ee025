//! SQLite-backed [`Store`] implementation using sqlx.
//!
//! Dates are stored as RFC 3339 text, `borrowed_books` and
//! `sentiment_scores` as JSON text columns. Book and transaction ids come
//! from AUTOINCREMENT; borrower codes and per-book review ids are allocated
//! by querying the current maximum, matching the file backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use circulate_core::error::{Error, RecordKind, Result};
use circulate_core::models::{Book, Borrower, Review, Transaction};
use circulate_core::store::{next_borrower_code, Store};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(Error::backend)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn book_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Book> {
    Ok(Book {
        id: row.try_get("id").map_err(Error::backend)?,
        title: row.try_get("title").map_err(Error::backend)?,
        author: row.try_get("author").map_err(Error::backend)?,
        isbn: row.try_get("isbn").map_err(Error::backend)?,
        genre: row.try_get("genre").map_err(Error::backend)?,
        copies: row.try_get("copies").map_err(Error::backend)?,
        available: row.try_get("available").map_err(Error::backend)?,
    })
}

fn borrower_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Borrower> {
    let borrowed_raw: String = row.try_get("borrowed_books").map_err(Error::backend)?;
    Ok(Borrower {
        id: row.try_get("id").map_err(Error::backend)?,
        name: row.try_get("name").map_err(Error::backend)?,
        email: row.try_get("email").map_err(Error::backend)?,
        phone: row.try_get("phone").map_err(Error::backend)?,
        borrowed_books: serde_json::from_str(&borrowed_raw).map_err(Error::backend)?,
    })
}

fn transaction_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
    let borrow_date: String = row.try_get("borrow_date").map_err(Error::backend)?;
    let due_date: String = row.try_get("due_date").map_err(Error::backend)?;
    let return_date: Option<String> = row.try_get("return_date").map_err(Error::backend)?;
    Ok(Transaction {
        id: row.try_get("id").map_err(Error::backend)?,
        book_id: row.try_get("book_id").map_err(Error::backend)?,
        borrower_id: row.try_get("borrower_id").map_err(Error::backend)?,
        borrow_date: parse_date(&borrow_date)?,
        due_date: parse_date(&due_date)?,
        return_date: return_date.as_deref().map(parse_date).transpose()?,
    })
}

fn review_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Review> {
    let sentiment_raw: String = row.try_get("sentiment").map_err(Error::backend)?;
    let scores_raw: String = row.try_get("sentiment_scores").map_err(Error::backend)?;
    let created_at: String = row.try_get("created_at").map_err(Error::backend)?;
    Ok(Review {
        id: row.try_get("id").map_err(Error::backend)?,
        book_id: row.try_get("book_id").map_err(Error::backend)?,
        borrower_id: row.try_get("borrower_id").map_err(Error::backend)?,
        review_text: row.try_get("review_text").map_err(Error::backend)?,
        rating: row.try_get("rating").map_err(Error::backend)?,
        sentiment: sentiment_raw.parse()?,
        sentiment_scores: serde_json::from_str(&scores_raw).map_err(Error::backend)?,
        created_at: parse_date(&created_at)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn put_book(&self, book: &Book) -> Result<i64> {
        if book.id == 0 {
            let result = sqlx::query(
                "INSERT INTO books (title, author, isbn, genre, copies, available)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.genre)
            .bind(book.copies)
            .bind(book.available)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
            Ok(result.last_insert_rowid())
        } else {
            sqlx::query(
                "INSERT INTO books (id, title, author, isbn, genre, copies, available)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     author = excluded.author,
                     isbn = excluded.isbn,
                     genre = excluded.genre,
                     copies = excluded.copies,
                     available = excluded.available",
            )
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.genre)
            .bind(book.copies)
            .bind(book.available)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
            Ok(book.id)
        }
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::backend)?;
        row.as_ref().map(book_from_row).transpose()
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::backend)?;
        rows.iter().map(book_from_row).collect()
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(RecordKind::Book, id));
        }
        Ok(())
    }

    async fn put_borrower(&self, borrower: &Borrower) -> Result<String> {
        let id = if borrower.id.is_empty() {
            let rows = sqlx::query("SELECT id FROM borrowers")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::backend)?;
            let codes = rows
                .iter()
                .map(|row| row.try_get::<String, _>("id").map_err(Error::backend))
                .collect::<Result<Vec<String>>>()?;
            next_borrower_code(codes.iter().map(String::as_str))
        } else {
            borrower.id.clone()
        };

        let borrowed = serde_json::to_string(&borrower.borrowed_books).map_err(Error::backend)?;
        let result = sqlx::query(
            "INSERT INTO borrowers (id, name, email, phone, borrowed_books)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 phone = excluded.phone,
                 borrowed_books = excluded.borrowed_books",
        )
        .bind(&id)
        .bind(&borrower.name)
        .bind(&borrower.email)
        .bind(&borrower.phone)
        .bind(&borrowed)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(err) if is_unique_violation(&err) => Err(Error::Conflict(format!(
                "email {} already registered",
                borrower.email
            ))),
            Err(err) => Err(Error::backend(err)),
        }
    }

    async fn get_borrower(&self, id: &str) -> Result<Option<Borrower>> {
        let row = sqlx::query("SELECT * FROM borrowers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::backend)?;
        row.as_ref().map(borrower_from_row).transpose()
    }

    async fn list_borrowers(&self) -> Result<Vec<Borrower>> {
        let rows = sqlx::query("SELECT * FROM borrowers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::backend)?;
        rows.iter().map(borrower_from_row).collect()
    }

    async fn delete_borrower(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM borrowers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(RecordKind::Borrower, id));
        }
        Ok(())
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<i64> {
        let borrow_date = tx.borrow_date.to_rfc3339();
        let due_date = tx.due_date.to_rfc3339();
        let return_date = tx.return_date.map(|d| d.to_rfc3339());

        if tx.id == 0 {
            let result = sqlx::query(
                "INSERT INTO transactions (book_id, borrower_id, borrow_date, due_date, return_date)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(tx.book_id)
            .bind(&tx.borrower_id)
            .bind(&borrow_date)
            .bind(&due_date)
            .bind(&return_date)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
            Ok(result.last_insert_rowid())
        } else {
            sqlx::query(
                "INSERT INTO transactions (id, book_id, borrower_id, borrow_date, due_date, return_date)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     book_id = excluded.book_id,
                     borrower_id = excluded.borrower_id,
                     borrow_date = excluded.borrow_date,
                     due_date = excluded.due_date,
                     return_date = excluded.return_date",
            )
            .bind(tx.id)
            .bind(tx.book_id)
            .bind(&tx.borrower_id)
            .bind(&borrow_date)
            .bind(&due_date)
            .bind(&return_date)
            .execute(&self.pool)
            .await
            .map_err(Error::backend)?;
            Ok(tx.id)
        }
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::backend)?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query("SELECT * FROM transactions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::backend)?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn put_review(&self, review: &Review) -> Result<i64> {
        let id = if review.id == 0 {
            let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM reviews WHERE book_id = ?")
                .bind(review.book_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::backend)?;
            let max_id: i64 = row.try_get("max_id").map_err(Error::backend)?;
            max_id + 1
        } else {
            review.id
        };

        let scores = serde_json::to_string(&review.sentiment_scores).map_err(Error::backend)?;
        sqlx::query(
            "INSERT INTO reviews (id, book_id, borrower_id, review_text, rating,
                                  sentiment, sentiment_scores, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(review.book_id)
        .bind(&review.borrower_id)
        .bind(&review.review_text)
        .bind(review.rating)
        .bind(review.sentiment.to_string())
        .bind(&scores)
        .bind(review.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(Error::backend)?;
        Ok(id)
    }

    async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>> {
        let rows = sqlx::query("SELECT * FROM reviews WHERE book_id = ? ORDER BY id")
            .bind(book_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::backend)?;
        rows.iter().map(review_from_row).collect()
    }
}
