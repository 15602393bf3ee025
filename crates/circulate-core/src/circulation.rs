//! Circulation state machine: borrow and return.
//!
//! The states per (book, borrower) pairing are implicit in the active
//! transaction set: available-to-borrow, on-loan, returned. Both operations
//! validate everything before the first store write, so a rejected action
//! never leaves a partial update behind.
//!
//! The read-modify-write of `available` and borrower lists is the one place
//! that needs serialization per book/borrower pair; callers that process
//! requests concurrently must guard these calls (the `circ` binary holds a
//! process-wide mutex around them).

use chrono::{Duration, Utc};

use crate::error::{Error, RecordKind, Result};
use crate::models::Transaction;
use crate::store::Store;

/// Default loan period when a borrow does not override it.
pub const DEFAULT_LOAN_DAYS: u32 = 14;

/// Borrow a book: decrement `available`, append the book to the borrower's
/// loan list, and record a new transaction due `loan_days` from now.
///
/// Fails with `NotFound` if either id does not resolve and `Unavailable`
/// when no copies are loanable. A borrower may borrow a book they already
/// hold, as long as copies remain.
pub async fn borrow_book(
    store: &dyn Store,
    book_id: i64,
    borrower_id: &str,
    loan_days: u32,
) -> Result<Transaction> {
    let mut book = store
        .get_book(book_id)
        .await?
        .ok_or_else(|| Error::not_found(RecordKind::Book, book_id))?;
    let mut borrower = store
        .get_borrower(borrower_id)
        .await?
        .ok_or_else(|| Error::not_found(RecordKind::Borrower, borrower_id))?;

    if book.available == 0 {
        return Err(Error::Unavailable { book_id });
    }

    let now = Utc::now();
    let tx = Transaction {
        id: 0,
        book_id,
        borrower_id: borrower.id.clone(),
        borrow_date: now,
        due_date: now + Duration::days(i64::from(loan_days)),
        return_date: None,
    };
    let tx_id = store.put_transaction(&tx).await?;

    book.available -= 1;
    store.put_book(&book).await?;

    borrower.borrowed_books.push(book_id);
    store.put_borrower(&borrower).await?;

    Ok(Transaction { id: tx_id, ..tx })
}

/// Return a borrowed book: stamp the transaction's `return_date`, restore
/// the book's `available` count, and drop the book from the borrower's
/// loan list.
///
/// Fails with `NotFound` if the transaction does not exist or was already
/// returned (no double-return). `available` is clamped to `copies` so
/// erroneous call orders can never push it past the owned count. A book or
/// borrower deleted since the borrow is tolerated: the orphaned reference
/// is skipped and the transaction still closes.
pub async fn return_book(store: &dyn Store, transaction_id: i64) -> Result<Transaction> {
    let mut tx = store
        .get_transaction(transaction_id)
        .await?
        .ok_or_else(|| Error::not_found(RecordKind::Transaction, transaction_id))?;
    if !tx.is_active() {
        return Err(Error::not_found(RecordKind::Transaction, transaction_id));
    }

    tx.return_date = Some(Utc::now());
    store.put_transaction(&tx).await?;

    if let Some(mut book) = store.get_book(tx.book_id).await? {
        book.available = (book.available + 1).min(book.copies);
        store.put_book(&book).await?;
    }

    if let Some(mut borrower) = store.get_borrower(&tx.borrower_id).await? {
        if let Some(pos) = borrower.borrowed_books.iter().position(|&b| b == tx.book_id) {
            borrower.borrowed_books.remove(pos);
            store.put_borrower(&borrower).await?;
        }
    }

    Ok(tx)
}

/// Transactions with no return timestamp, in id order.
pub async fn active_loans(store: &dyn Store) -> Result<Vec<Transaction>> {
    let mut active: Vec<Transaction> = store
        .list_transactions()
        .await?
        .into_iter()
        .filter(Transaction::is_active)
        .collect();
    active.sort_by_key(|t| t.id);
    Ok(active)
}
