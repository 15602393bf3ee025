//! Error taxonomy shared by every component.
//!
//! Each failing action reports enough context (record kind + id) for the
//! caller to render a precise message. None of these are fatal: the store is
//! left unchanged for that action and the process keeps serving requests.

use std::fmt;

/// The four record collections managed by the [`Store`](crate::store::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Book,
    Borrower,
    Transaction,
    Review,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Book => write!(f, "book"),
            RecordKind::Borrower => write!(f, "borrower"),
            RecordKind::Transaction => write!(f, "transaction"),
            RecordKind::Review => write!(f, "review"),
        }
    }
}

/// Failure modes surfaced by the store and the circulation state machine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A book, borrower, transaction, or review id did not resolve.
    /// Also covers returning a transaction that was already closed.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// A borrow was requested while `available == 0`.
    #[error("no copies available for book {book_id}")]
    Unavailable { book_id: i64 },

    /// A uniqueness rule was violated (e.g. duplicate borrower email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input rejected by constructor-time validation, before any write.
    #[error("invalid {0}")]
    Invalid(String),

    /// The storage backend failed. Surfaced to the caller, never retried
    /// silently: masking a persistence failure would corrupt the
    /// availability invariant.
    #[error("storage backend unavailable")]
    Backend(#[source] anyhow::Error),
}

impl Error {
    pub fn not_found(kind: RecordKind, id: impl fmt::Display) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Error::Backend(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
