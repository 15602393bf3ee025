//! Storage abstraction over the four record collections.
//!
//! The [`Store`] trait gives uniform put/get/list/delete access to books,
//! borrowers, transactions, and reviews, enabling pluggable backends (JSON
//! file, SQLite, in-memory). Core components never branch on which backend
//! is active.
//!
//! Cross-record consistency (e.g. decrementing a book's `available` and
//! inserting a transaction) is the caller's responsibility: the store makes
//! no multi-record transaction guarantee. Implementations must be
//! `Send + Sync`.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Book, Borrower, Review, Transaction};

/// Abstract record store.
///
/// `put_*` is insert-or-update keyed on id; passing the zero value of the
/// id (`0`, or an empty string for borrowers) inserts with the next
/// allocated id, which is returned. Allocation is monotonic for
/// transactions. `delete_*` fails with `NotFound` for an absent id.
#[async_trait]
pub trait Store: Send + Sync {
    // Books.
    async fn put_book(&self, book: &Book) -> Result<i64>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>>;
    /// List in insertion order (ascending id) so search tie-breaks stay
    /// reproducible.
    async fn list_books(&self) -> Result<Vec<Book>>;
    /// Administrative removal. Outstanding transactions and reviews that
    /// reference the book are left in place (orphaned by id).
    async fn delete_book(&self, id: i64) -> Result<()>;

    // Borrowers.
    /// Rejects an email already registered to a different borrower with
    /// `Conflict`.
    async fn put_borrower(&self, borrower: &Borrower) -> Result<String>;
    async fn get_borrower(&self, id: &str) -> Result<Option<Borrower>>;
    async fn list_borrowers(&self) -> Result<Vec<Borrower>>;
    async fn delete_borrower(&self, id: &str) -> Result<()>;

    // Transactions (never deleted).
    async fn put_transaction(&self, tx: &Transaction) -> Result<i64>;
    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    // Reviews (created once, immutable afterwards).
    async fn put_review(&self, review: &Review) -> Result<i64>;
    async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>>;
}

/// Next id for an integer-keyed collection: one past the current maximum,
/// so deleting an interior id never causes reuse.
pub fn next_numeric_id<I: Iterator<Item = i64>>(existing: I) -> i64 {
    existing.max().unwrap_or(0) + 1
}

/// Next `B0001`-style borrower code. Scans existing codes for the largest
/// numeric suffix so deletions never cause a collision.
pub fn next_borrower_code<'a, I: Iterator<Item = &'a str>>(existing: I) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix('B'))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("B{:04}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_follow_the_maximum() {
        assert_eq!(next_numeric_id([].into_iter()), 1);
        assert_eq!(next_numeric_id([1, 2, 3].into_iter()), 4);
        // After deleting id 2, the next id is still one past the max.
        assert_eq!(next_numeric_id([1, 3].into_iter()), 4);
    }

    #[test]
    fn borrower_codes_are_zero_padded_and_collision_free() {
        assert_eq!(next_borrower_code([].into_iter()), "B0001");
        assert_eq!(next_borrower_code(["B0001", "B0002"].into_iter()), "B0003");
        assert_eq!(next_borrower_code(["B0002"].into_iter()), "B0003");
        assert_eq!(next_borrower_code(["B9999"].into_iter()), "B10000");
    }
}
