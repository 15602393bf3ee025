//! Core data models for the catalog, borrowers, transactions, and reviews.
//!
//! Records are related purely by id; nothing here holds a live reference to
//! another entity. Constructors validate input so malformed records are
//! rejected before they ever reach the state machine or a store write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sentiment::{Sentiment, SentimentScores};

/// A catalog entry. `available` tracks loanable copies and never exceeds
/// `copies`, never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub copies: u32,
    pub available: u32,
}

impl Book {
    /// Create a new book with all copies available. Pass `id = 0` to let
    /// the store allocate the next id on insert.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        genre: impl Into<String>,
        copies: u32,
    ) -> Result<Self> {
        let book = Book {
            id: 0,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            genre: genre.into(),
            copies,
            available: copies,
        };
        book.validate()?;
        Ok(book)
    }

    /// Check the invariants a well-formed book record must hold. Applied at
    /// construction and when loading untrusted rows or documents.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Invalid("book: title must not be empty".into()));
        }
        if self.author.trim().is_empty() {
            return Err(Error::Invalid("book: author must not be empty".into()));
        }
        if self.available > self.copies {
            return Err(Error::Invalid(format!(
                "book {}: available ({}) exceeds copies ({})",
                self.id, self.available, self.copies
            )));
        }
        Ok(())
    }
}

/// A registered borrower. `borrowed_books` lists the ids of books currently
/// on loan: appended on borrow, first matching entry removed on return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub borrowed_books: Vec<i64>,
}

impl Borrower {
    /// Create a new borrower with an empty loan list. Pass an empty id to
    /// let the store allocate the next `B0001`-style code on insert.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self> {
        let borrower = Borrower {
            id: String::new(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            borrowed_books: Vec::new(),
        };
        borrower.validate()?;
        Ok(borrower)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Invalid("borrower: name must not be empty".into()));
        }
        if !self.email.contains('@') {
            return Err(Error::Invalid(format!(
                "borrower: email '{}' is not an address",
                self.email
            )));
        }
        Ok(())
    }
}

/// A borrow/return record. A transaction is active while `return_date`
/// is absent. Transactions are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub book_id: i64,
    pub borrower_id: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

/// A reader review. Sentiment fields are computed once at creation and
/// stored immutably thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    #[serde(default)]
    pub borrower_id: Option<String>,
    pub review_text: String,
    pub rating: u8,
    pub sentiment: Sentiment,
    pub sentiment_scores: SentimentScores,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a review with pre-computed sentiment. Pass `id = 0` to let
    /// the store allocate the next per-book id on insert.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        book_id: i64,
        borrower_id: Option<String>,
        review_text: impl Into<String>,
        rating: u8,
        sentiment: Sentiment,
        sentiment_scores: SentimentScores,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let review = Review {
            id: 0,
            book_id,
            borrower_id,
            review_text: review_text.into(),
            rating,
            sentiment,
            sentiment_scores,
            created_at,
        };
        review.validate()?;
        Ok(review)
    }

    pub fn validate(&self) -> Result<()> {
        if self.review_text.trim().is_empty() {
            return Err(Error::Invalid("review: text must not be empty".into()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(Error::Invalid(format!(
                "review: rating {} out of range 1-5",
                self.rating
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn book_available_never_exceeds_copies() {
        let mut book = Book::new("Dune", "Frank Herbert", "9780441013593", "Sci-Fi", 2).unwrap();
        assert_eq!(book.available, 2);
        book.available = 3;
        assert!(matches!(book.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn book_rejects_empty_title() {
        assert!(Book::new("  ", "Someone", "x", "y", 1).is_err());
    }

    #[test]
    fn borrower_rejects_bad_email() {
        assert!(Borrower::new("Ada", "not-an-email", "555-0100").is_err());
        assert!(Borrower::new("Ada", "ada@example.com", "555-0100").is_ok());
    }

    #[test]
    fn review_rejects_out_of_range_rating() {
        let (label, scores) = crate::sentiment::classify("fine");
        let r = Review::new(1, None, "fine", 6, label, scores, Utc::now());
        assert!(matches!(r, Err(Error::Invalid(_))));
    }

    #[test]
    fn transaction_serializes_without_absent_return_date() {
        let now = Utc::now();
        let tx = Transaction {
            id: 1,
            book_id: 1,
            borrower_id: "B0001".to_string(),
            borrow_date: now,
            due_date: now + chrono::Duration::days(14),
            return_date: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("return_date").is_none());
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
        assert!(back.is_active());
    }
}
