//! Circulation commands: borrow, return, and the active-loan listing.
//!
//! Borrow and return run under a process-wide async mutex. The store gives
//! no multi-record transaction guarantee, so without the lock two borrows
//! racing on the last copy could both pass the availability check. The
//! guard covers concurrent tasks within one process, such as a host
//! embedding this crate as a library; separate `circ` invocations are
//! separate processes and are not serialized against each other (a
//! single-process deployment is assumed, as with the store files
//! themselves).

use anyhow::Result;
use tokio::sync::Mutex;

use circulate_core::circulation;

use crate::config::Config;
use crate::store::open_store;

static CIRCULATION_LOCK: Mutex<()> = Mutex::const_new(());

pub async fn run_borrow(config: &Config, book_id: i64, borrower_id: &str) -> Result<()> {
    let _guard = CIRCULATION_LOCK.lock().await;
    let store = open_store(config).await?;
    let tx = circulation::borrow_book(
        store.as_ref(),
        book_id,
        borrower_id,
        config.circulation.loan_days,
    )
    .await?;
    println!(
        "Borrowed book {} as transaction {}, due {}",
        tx.book_id,
        tx.id,
        tx.due_date.format("%Y-%m-%d")
    );
    Ok(())
}

pub async fn run_return(config: &Config, transaction_id: i64) -> Result<()> {
    let _guard = CIRCULATION_LOCK.lock().await;
    let store = open_store(config).await?;
    let tx = circulation::return_book(store.as_ref(), transaction_id).await?;
    println!("Returned transaction {}.", tx.id);
    Ok(())
}

pub async fn run_circulation(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let loans = circulation::active_loans(store.as_ref()).await?;
    if loans.is_empty() {
        println!("No active loans.");
        return Ok(());
    }
    for tx in loans {
        let title = match store.get_book(tx.book_id).await? {
            Some(book) => book.title,
            None => format!("(deleted book {})", tx.book_id),
        };
        println!(
            "{}: {} -> {} (due {})",
            tx.id,
            title,
            tx.borrower_id,
            tx.due_date.format("%Y-%m-%d")
        );
    }
    Ok(())
}
