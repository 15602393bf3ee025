//! Text normalizer: free text to a canonical set of stemmed tokens.
//!
//! Pipeline: lowercase, strip punctuation, split into word tokens, drop
//! stopwords, stem the remainder with the Snowball English stemmer. The
//! output is a set (duplicates collapse) with deterministic iteration
//! order, so identical input produces bit-identical output across runs.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};

/// Fixed English stopword set (the standard NLTK list).
/// Not user-configurable. Entries carrying apostrophes never match after
/// punctuation stripping; they are kept so the set stays the canonical one.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Normalize free text into a set of stemmed, stopword-free tokens.
///
/// Pure and side-effect free; empty or punctuation-only input yields an
/// empty set. A `BTreeSet` keeps iteration order deterministic for tests.
pub fn normalize(text: &str) -> BTreeSet<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    stripped
        .split_whitespace()
        .filter(|token| !STOPWORD_SET.contains(token))
        .map(|token| stemmer.stem(token).into_owned())
        .collect()
}
