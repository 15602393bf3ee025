//! Catalog commands: books and borrowers.

use anyhow::Result;

use circulate_core::error::{Error, RecordKind};
use circulate_core::models::{Book, Borrower};

use crate::config::Config;
use crate::store::open_store;

pub async fn run_add_book(
    config: &Config,
    title: &str,
    author: &str,
    isbn: &str,
    genre: &str,
    copies: u32,
) -> Result<()> {
    let store = open_store(config).await?;
    let book = Book::new(title, author, isbn, genre, copies)?;
    let id = store.put_book(&book).await?;
    println!("Added book {}: {}", id, title);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn run_update_book(
    config: &Config,
    id: i64,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    genre: Option<String>,
    copies: Option<u32>,
) -> Result<()> {
    let store = open_store(config).await?;
    let mut book = store
        .get_book(id)
        .await?
        .ok_or_else(|| Error::not_found(RecordKind::Book, id))?;

    if let Some(title) = title {
        book.title = title;
    }
    if let Some(author) = author {
        book.author = author;
    }
    if let Some(isbn) = isbn {
        book.isbn = isbn;
    }
    if let Some(genre) = genre {
        book.genre = genre;
    }
    if let Some(copies) = copies {
        // Growing or shrinking the holding adjusts the shelf count by the
        // same amount, floored at zero when copies were recalled while out.
        let on_loan = book.copies.saturating_sub(book.available);
        book.copies = copies;
        book.available = copies.saturating_sub(on_loan);
    }
    book.validate()?;
    store.put_book(&book).await?;
    println!("Updated book {}: {}", id, book.title);
    Ok(())
}

pub async fn run_list_books(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let books = store.list_books().await?;
    if books.is_empty() {
        println!("No books in the catalog.");
        return Ok(());
    }
    for book in books {
        println!(
            "{}: {} by {} [{}] {}/{} available",
            book.id, book.title, book.author, book.genre, book.available, book.copies
        );
    }
    Ok(())
}

pub async fn run_delete_book(config: &Config, id: i64) -> Result<()> {
    let store = open_store(config).await?;
    store.delete_book(id).await?;
    println!("Deleted book {}.", id);
    Ok(())
}

pub async fn run_add_borrower(
    config: &Config,
    name: &str,
    email: &str,
    phone: &str,
) -> Result<()> {
    let store = open_store(config).await?;
    let borrower = Borrower::new(name, email, phone)?;
    let id = store.put_borrower(&borrower).await?;
    println!("Registered borrower {}: {}", id, name);
    Ok(())
}

pub async fn run_list_borrowers(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let borrowers = store.list_borrowers().await?;
    if borrowers.is_empty() {
        println!("No borrowers registered.");
        return Ok(());
    }
    for borrower in borrowers {
        println!(
            "{}: {} <{}> ({} on loan)",
            borrower.id,
            borrower.name,
            borrower.email,
            borrower.borrowed_books.len()
        );
    }
    Ok(())
}
