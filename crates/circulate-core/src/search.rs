//! Search ranker: Jaccard similarity over normalized token sets.
//!
//! The ranker operates on a catalog slice supplied by the caller (read from
//! the [`Store`](crate::store::Store)) and depends only on the
//! [`normalize`](crate::normalize::normalize) pipeline. No inverted index or
//! cache is kept at this scale; output ordering and scores are the contract.

use serde::Serialize;
use std::str::FromStr;

use crate::error::Error;
use crate::models::Book;
use crate::normalize::normalize;

/// Which book fields a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Title,
    Author,
    Genre,
    All,
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "title" => Ok(SearchScope::Title),
            "author" => Ok(SearchScope::Author),
            "genre" => Ok(SearchScope::Genre),
            "all" => Ok(SearchScope::All),
            other => Err(Error::Invalid(format!(
                "search scope: '{}' (use title, author, genre, or all)",
                other
            ))),
        }
    }
}

/// A catalog record matched by a query, with its relevance score in [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub book: Book,
    pub score: f64,
}

/// Score every catalog entry against the query and return matches ordered
/// by descending relevance.
///
/// Score is the Jaccard similarity |Q ∩ T| / |Q ∪ T| between the normalized
/// query set and the normalized text of the scoped fields (0 when both sets
/// are empty). Zero-score records are excluded. The sort is stable, so equal
/// scores keep the catalog iteration order and results stay reproducible.
pub fn search_catalog(query: &str, scope: SearchScope, catalog: &[Book]) -> Vec<SearchHit> {
    let query_tokens = normalize(query);

    let mut hits: Vec<SearchHit> = catalog
        .iter()
        .filter_map(|book| {
            let field_text = scoped_text(book, scope);
            let field_tokens = normalize(&field_text);

            let intersection = query_tokens.intersection(&field_tokens).count();
            let union = query_tokens.union(&field_tokens).count();
            if union == 0 {
                return None;
            }
            let score = intersection as f64 / union as f64;
            if score > 0.0 {
                Some(SearchHit {
                    book: book.clone(),
                    score,
                })
            } else {
                None
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    hits
}

fn scoped_text(book: &Book, scope: SearchScope) -> String {
    match scope {
        SearchScope::Title => book.title.clone(),
        SearchScope::Author => book.author.clone(),
        SearchScope::Genre => book.genre.clone(),
        SearchScope::All => format!("{} {} {}", book.title, book.author, book.genre),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, author: &str, genre: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            isbn: format!("isbn-{}", id),
            genre: genre.to_string(),
            copies: 1,
            available: 1,
        }
    }

    fn fixture() -> Vec<Book> {
        vec![
            book(1, "The Great Gatsby", "F. Scott Fitzgerald", "Classic"),
            book(2, "Moby Dick", "Herman Melville", "Classic"),
            book(3, "Gatsby Annotated", "Jane Doe", "Reference"),
        ]
    }

    #[test]
    fn title_scope_matches_only_gatsby() {
        let catalog = vec![
            book(1, "The Great Gatsby", "F. Scott Fitzgerald", "Classic"),
            book(2, "Moby Dick", "Herman Melville", "Classic"),
        ];
        let hits = search_catalog("gatsby", SearchScope::Title, &catalog);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.id, 1);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn disjoint_stems_are_excluded() {
        let hits = search_catalog("submarine warfare", SearchScope::All, &fixture());
        assert!(hits.is_empty());
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let hits = search_catalog("great gatsby classic melville", SearchScope::All, &fixture());
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!((0.0..=1.0).contains(&hit.score), "score {}", hit.score);
        }
    }

    #[test]
    fn higher_overlap_ranks_first() {
        // Full title overlap (2/2) must outrank a partial one (1/3).
        let hits = search_catalog("great gatsby", SearchScope::Title, &fixture());
        assert_eq!(hits[0].book.id, 1, "exact-title overlap should rank first");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = vec![
            book(1, "Rust in Action", "Tim McNamara", "Programming"),
            book(2, "Rust for Rustaceans", "Jon Gjengset", "Programming"),
        ];
        // "programming" matches both only through the genre field with the
        // same score; insertion order must be preserved.
        let hits = search_catalog("programming", SearchScope::Genre, &catalog);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].book.id, 1);
        assert_eq!(hits[1].book.id, 2);
        assert!((hits[0].score - hits[1].score).abs() < f64::EPSILON);
    }

    #[test]
    fn scope_author_ignores_title() {
        let hits = search_catalog("melville", SearchScope::Author, &fixture());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.id, 2);
        let none = search_catalog("gatsby", SearchScope::Author, &fixture());
        assert!(none.is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(search_catalog("", SearchScope::All, &fixture()).is_empty());
        assert!(search_catalog("?!", SearchScope::All, &fixture()).is_empty());
    }

    #[test]
    fn scope_parses_from_str() {
        assert_eq!("title".parse::<SearchScope>().unwrap(), SearchScope::Title);
        assert_eq!("all".parse::<SearchScope>().unwrap(), SearchScope::All);
        assert!("isbn".parse::<SearchScope>().is_err());
    }
}
