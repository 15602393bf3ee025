//! JSON-file-backed [`Store`] implementation.
//!
//! All four collections live in one document, held in memory behind an
//! `RwLock` and rewritten on every mutation. The write goes to a temporary
//! file first and is then renamed over the target, so a crash mid-write
//! never leaves a partial document: the whole document is the unit of
//! persistence.
//!
//! Mutations are staged on a copy of the document and the in-memory state
//! advances only after the rename lands. A failed persist therefore leaves
//! the store unchanged, on disk and in memory.
//!
//! Document layout (top-level mappings):
//! - `books`: id (string form of the integer) → record
//! - `borrowers`: id code → record
//! - `transactions`: sequence of records with ISO-8601 dates
//! - `reviews`: book id → sequence of records

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use circulate_core::error::{Error, RecordKind, Result};
use circulate_core::models::{Book, Borrower, Review, Transaction};
use circulate_core::sentiment::{Sentiment, SentimentScores};
use circulate_core::store::{next_borrower_code, next_numeric_id, Store};

/// Book record as stored in the document; the id is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookRecord {
    title: String,
    author: String,
    isbn: String,
    genre: String,
    copies: u32,
    available: u32,
}

impl BookRecord {
    fn from_book(book: &Book) -> Self {
        BookRecord {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
            copies: book.copies,
            available: book.available,
        }
    }

    fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            genre: self.genre,
            copies: self.copies,
            available: self.available,
        }
    }
}

/// Borrower record as stored in the document; the id code is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BorrowerRecord {
    name: String,
    email: String,
    phone: String,
    #[serde(default)]
    borrowed_books: Vec<i64>,
}

impl BorrowerRecord {
    fn from_borrower(borrower: &Borrower) -> Self {
        BorrowerRecord {
            name: borrower.name.clone(),
            email: borrower.email.clone(),
            phone: borrower.phone.clone(),
            borrowed_books: borrower.borrowed_books.clone(),
        }
    }

    fn into_borrower(self, id: String) -> Borrower {
        Borrower {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            borrowed_books: self.borrowed_books,
        }
    }
}

/// Review record as stored in the document; the book id is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReviewRecord {
    id: i64,
    #[serde(default)]
    borrower_id: Option<String>,
    review_text: String,
    rating: u8,
    sentiment: Sentiment,
    sentiment_scores: SentimentScores,
    timestamp: DateTime<Utc>,
}

impl ReviewRecord {
    fn from_review(review: &Review) -> Self {
        ReviewRecord {
            id: review.id,
            borrower_id: review.borrower_id.clone(),
            review_text: review.review_text.clone(),
            rating: review.rating,
            sentiment: review.sentiment,
            sentiment_scores: review.sentiment_scores,
            timestamp: review.created_at,
        }
    }

    fn into_review(self, book_id: i64) -> Review {
        Review {
            id: self.id,
            book_id,
            borrower_id: self.borrower_id,
            review_text: self.review_text,
            rating: self.rating,
            sentiment: self.sentiment,
            sentiment_scores: self.sentiment_scores,
            created_at: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LibraryDocument {
    #[serde(default)]
    books: BTreeMap<String, BookRecord>,
    #[serde(default)]
    borrowers: BTreeMap<String, BorrowerRecord>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    reviews: BTreeMap<String, Vec<ReviewRecord>>,
}

/// File-backed store holding the whole library in one JSON document.
pub struct JsonStore {
    path: PathBuf,
    doc: RwLock<LibraryDocument>,
}

impl JsonStore {
    /// Load the document at `path`, or start empty if the file does not
    /// exist yet. Loaded books are validated before the store is handed out.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = if path.exists() {
            let content = fs::read_to_string(path).map_err(Error::backend)?;
            let doc: LibraryDocument = serde_json::from_str(&content).map_err(Error::backend)?;
            for (key, record) in &doc.books {
                let id = parse_numeric_key(key)?;
                record.clone().into_book(id).validate()?;
            }
            doc
        } else {
            LibraryDocument::default()
        };

        Ok(JsonStore {
            path: path.to_path_buf(),
            doc: RwLock::new(doc),
        })
    }

    /// Write the current document to disk. Used by `circ init` to create
    /// the file up front; every mutation persists on its own.
    pub fn flush(&self) -> Result<()> {
        let doc = self.doc.read().unwrap();
        self.persist(&doc)
    }

    /// Serialize the whole document and replace the file atomically:
    /// write to `<path>.tmp`, then rename over the target.
    fn persist(&self, doc: &LibraryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(Error::backend)?;
            }
        }
        let json = serde_json::to_string_pretty(doc).map_err(Error::backend)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(Error::backend)?;
        fs::rename(&tmp, &self.path).map_err(Error::backend)?;
        Ok(())
    }
}

fn parse_numeric_key(key: &str) -> Result<i64> {
    key.parse::<i64>()
        .map_err(|_| Error::Invalid(format!("record key '{}' is not an integer id", key)))
}

#[async_trait]
impl Store for JsonStore {
    async fn put_book(&self, book: &Book) -> Result<i64> {
        let mut doc = self.doc.write().unwrap();
        let id = if book.id == 0 {
            let existing = doc
                .books
                .keys()
                .map(|k| parse_numeric_key(k))
                .collect::<Result<Vec<_>>>()?;
            next_numeric_id(existing.into_iter())
        } else {
            book.id
        };
        let mut next = doc.clone();
        next.books.insert(id.to_string(), BookRecord::from_book(book));
        self.persist(&next)?;
        *doc = next;
        Ok(id)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let doc = self.doc.read().unwrap();
        Ok(doc
            .books
            .get(&id.to_string())
            .map(|r| r.clone().into_book(id)))
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let doc = self.doc.read().unwrap();
        let mut books = doc
            .books
            .iter()
            .map(|(key, record)| Ok(record.clone().into_book(parse_numeric_key(key)?)))
            .collect::<Result<Vec<Book>>>()?;
        // Map keys are strings, so sort numerically to restore insertion order.
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        let mut doc = self.doc.write().unwrap();
        if !doc.books.contains_key(&id.to_string()) {
            return Err(Error::not_found(RecordKind::Book, id));
        }
        let mut next = doc.clone();
        next.books.remove(&id.to_string());
        self.persist(&next)?;
        *doc = next;
        Ok(())
    }

    async fn put_borrower(&self, borrower: &Borrower) -> Result<String> {
        let mut doc = self.doc.write().unwrap();
        let id = if borrower.id.is_empty() {
            next_borrower_code(doc.borrowers.keys().map(String::as_str))
        } else {
            borrower.id.clone()
        };
        if let Some((other_id, other)) = doc
            .borrowers
            .iter()
            .find(|(bid, b)| b.email == borrower.email && **bid != id)
        {
            return Err(Error::Conflict(format!(
                "email {} already registered to borrower {}",
                other.email, other_id
            )));
        }
        let mut next = doc.clone();
        next.borrowers
            .insert(id.clone(), BorrowerRecord::from_borrower(borrower));
        self.persist(&next)?;
        *doc = next;
        Ok(id)
    }

    async fn get_borrower(&self, id: &str) -> Result<Option<Borrower>> {
        let doc = self.doc.read().unwrap();
        Ok(doc
            .borrowers
            .get(id)
            .map(|r| r.clone().into_borrower(id.to_string())))
    }

    async fn list_borrowers(&self) -> Result<Vec<Borrower>> {
        let doc = self.doc.read().unwrap();
        Ok(doc
            .borrowers
            .iter()
            .map(|(id, record)| record.clone().into_borrower(id.clone()))
            .collect())
    }

    async fn delete_borrower(&self, id: &str) -> Result<()> {
        let mut doc = self.doc.write().unwrap();
        if !doc.borrowers.contains_key(id) {
            return Err(Error::not_found(RecordKind::Borrower, id));
        }
        let mut next = doc.clone();
        next.borrowers.remove(id);
        self.persist(&next)?;
        *doc = next;
        Ok(())
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<i64> {
        let mut doc = self.doc.write().unwrap();
        let mut next = doc.clone();
        let id = if tx.id == 0 {
            let id = next_numeric_id(next.transactions.iter().map(|t| t.id));
            next.transactions.push(Transaction { id, ..tx.clone() });
            id
        } else {
            match next.transactions.iter_mut().find(|t| t.id == tx.id) {
                Some(slot) => *slot = tx.clone(),
                None => next.transactions.push(tx.clone()),
            }
            tx.id
        };
        self.persist(&next)?;
        *doc = next;
        Ok(id)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let doc = self.doc.read().unwrap();
        Ok(doc.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let doc = self.doc.read().unwrap();
        Ok(doc.transactions.clone())
    }

    async fn put_review(&self, review: &Review) -> Result<i64> {
        let mut doc = self.doc.write().unwrap();
        let mut next = doc.clone();
        let entries = next.reviews.entry(review.book_id.to_string()).or_default();
        let id = if review.id == 0 {
            next_numeric_id(entries.iter().map(|r| r.id))
        } else {
            review.id
        };
        entries.push(ReviewRecord::from_review(&Review {
            id,
            ..review.clone()
        }));
        self.persist(&next)?;
        *doc = next;
        Ok(id)
    }

    async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>> {
        let doc = self.doc.read().unwrap();
        Ok(doc
            .reviews
            .get(&book_id.to_string())
            .map(|entries| {
                entries
                    .iter()
                    .map(|r| r.clone().into_review(book_id))
                    .collect()
            })
            .unwrap_or_default())
    }
}
