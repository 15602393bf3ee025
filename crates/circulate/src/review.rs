//! Review commands: add a review and list a book's reviews with the
//! sentiment tally.
//!
//! Sentiment is computed here, once, at creation; the stored label and
//! scores are never recomputed on read.

use anyhow::Result;
use chrono::Utc;

use circulate_core::error::{Error, RecordKind};
use circulate_core::models::Review;
use circulate_core::sentiment::{classify, summarize};

use crate::config::Config;
use crate::store::open_store;

pub async fn run_add_review(
    config: &Config,
    book_id: i64,
    borrower_id: Option<String>,
    text: &str,
    rating: u8,
) -> Result<()> {
    let store = open_store(config).await?;
    if store.get_book(book_id).await?.is_none() {
        return Err(Error::not_found(RecordKind::Book, book_id).into());
    }
    if let Some(ref borrower_id) = borrower_id {
        if store.get_borrower(borrower_id).await?.is_none() {
            return Err(Error::not_found(RecordKind::Borrower, borrower_id).into());
        }
    }

    let (sentiment, scores) = classify(text);
    let review = Review::new(book_id, borrower_id, text, rating, sentiment, scores, Utc::now())?;
    let id = store.put_review(&review).await?;
    println!("Review {} added with {} sentiment.", id, sentiment);
    Ok(())
}

pub async fn run_list_reviews(config: &Config, book_id: i64) -> Result<()> {
    let store = open_store(config).await?;
    if store.get_book(book_id).await?.is_none() {
        return Err(Error::not_found(RecordKind::Book, book_id).into());
    }
    let reviews = store.list_reviews(book_id).await?;
    if reviews.is_empty() {
        println!("No reviews for book {}.", book_id);
        return Ok(());
    }
    for review in &reviews {
        let who = review.borrower_id.as_deref().unwrap_or("anonymous");
        println!(
            "{}: {}/5 [{}] {} ({})",
            review.id, review.rating, review.sentiment, review.review_text, who
        );
    }
    let summary = summarize(&reviews);
    println!(
        "Sentiment: {} positive, {} negative, {} neutral ({} total)",
        summary.positive, summary.negative, summary.neutral, summary.total
    );
    Ok(())
}
