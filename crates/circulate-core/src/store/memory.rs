//! In-memory [`Store`] implementation for tests.
//!
//! Uses `BTreeMap` and `Vec` behind `std::sync::RwLock` for thread safety.
//! Shares the id-allocation rules of the durable backends so circulation
//! tests observe the same behavior they would against a file or database.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, RecordKind, Result};
use crate::models::{Book, Borrower, Review, Transaction};

use super::{next_borrower_code, next_numeric_id, Store};

/// In-memory store for tests. Cheap to construct, nothing persists.
#[derive(Default)]
pub struct InMemoryStore {
    books: RwLock<BTreeMap<i64, Book>>,
    borrowers: RwLock<BTreeMap<String, Borrower>>,
    transactions: RwLock<Vec<Transaction>>,
    reviews: RwLock<BTreeMap<i64, Vec<Review>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put_book(&self, book: &Book) -> Result<i64> {
        let mut books = self.books.write().unwrap();
        let id = if book.id == 0 {
            next_numeric_id(books.keys().copied())
        } else {
            book.id
        };
        books.insert(id, Book { id, ..book.clone() });
        Ok(id)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        Ok(self.books.read().unwrap().get(&id).cloned())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.books.read().unwrap().values().cloned().collect())
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        match self.books.write().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(RecordKind::Book, id)),
        }
    }

    async fn put_borrower(&self, borrower: &Borrower) -> Result<String> {
        let mut borrowers = self.borrowers.write().unwrap();
        let id = if borrower.id.is_empty() {
            next_borrower_code(borrowers.keys().map(String::as_str))
        } else {
            borrower.id.clone()
        };
        if let Some(other) = borrowers
            .values()
            .find(|b| b.email == borrower.email && b.id != id)
        {
            return Err(Error::Conflict(format!(
                "email {} already registered to borrower {}",
                other.email, other.id
            )));
        }
        borrowers.insert(
            id.clone(),
            Borrower {
                id: id.clone(),
                ..borrower.clone()
            },
        );
        Ok(id)
    }

    async fn get_borrower(&self, id: &str) -> Result<Option<Borrower>> {
        Ok(self.borrowers.read().unwrap().get(id).cloned())
    }

    async fn list_borrowers(&self) -> Result<Vec<Borrower>> {
        Ok(self.borrowers.read().unwrap().values().cloned().collect())
    }

    async fn delete_borrower(&self, id: &str) -> Result<()> {
        match self.borrowers.write().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(RecordKind::Borrower, id)),
        }
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<i64> {
        let mut transactions = self.transactions.write().unwrap();
        if tx.id == 0 {
            let id = next_numeric_id(transactions.iter().map(|t| t.id));
            transactions.push(Transaction { id, ..tx.clone() });
            Ok(id)
        } else {
            match transactions.iter_mut().find(|t| t.id == tx.id) {
                Some(slot) => *slot = tx.clone(),
                None => transactions.push(tx.clone()),
            }
            Ok(tx.id)
        }
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.read().unwrap().clone())
    }

    async fn put_review(&self, review: &Review) -> Result<i64> {
        let mut reviews = self.reviews.write().unwrap();
        let entries = reviews.entry(review.book_id).or_default();
        let id = if review.id == 0 {
            next_numeric_id(entries.iter().map(|r| r.id))
        } else {
            review.id
        };
        entries.push(Review {
            id,
            ..review.clone()
        });
        Ok(id)
    }

    async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>> {
        Ok(self
            .reviews
            .read()
            .unwrap()
            .get(&book_id)
            .cloned()
            .unwrap_or_default())
    }
}
