//! # Circulate Core
//!
//! Shared logic for Circulate: data models, error taxonomy, text
//! normalization, the search ranker, the sentiment classifier, the
//! circulation state machine, and the store abstraction.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. The search ranker
//! and sentiment classifier are pure functions; the circulation operations
//! reach storage only through the [`store::Store`] trait, so every backend
//! (JSON file, SQLite, in-memory) sees identical semantics.

pub mod circulation;
pub mod error;
pub mod models;
pub mod normalize;
pub mod search;
pub mod sentiment;
pub mod store;

pub use error::{Error, RecordKind, Result};
pub use models::{Book, Borrower, Review, Transaction};
pub use sentiment::{Sentiment, SentimentScores, SentimentSummary};
