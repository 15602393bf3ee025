//! Sentiment classifier for review text.
//!
//! Delegates to the VADER lexicon/rule-based analyzer and maps its compound
//! score to a three-way label with fixed thresholds. The thresholds are a
//! policy constant, not learned, and are part of the round-trip contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::Review;

/// Compound score above which a text is labeled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score below which a text is labeled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Three-way polarity label derived from the compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_compound(compound: f64) -> Self {
        if compound > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if compound < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(Error::Invalid(format!("unknown sentiment label '{}'", other))),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// The four-component VADER score breakdown. `negative`, `neutral`, and
/// `positive` lie in [0, 1] and sum to 1; `compound` lies in [-1, 1].
/// Serialized with the analyzer's original short keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(rename = "neg")]
    pub negative: f64,
    #[serde(rename = "neu")]
    pub neutral: f64,
    #[serde(rename = "pos")]
    pub positive: f64,
    pub compound: f64,
}

/// Per-book tally of review labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

/// Classify a text into a polarity label with its score breakdown.
///
/// Pure and stateless; safe to call concurrently. The analyzer builds its
/// lexicon from data embedded in the crate, so output depends only on the
/// input text.
pub fn classify(text: &str) -> (Sentiment, SentimentScores) {
    let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
    let polarity = analyzer.polarity_scores(text);

    let scores = SentimentScores {
        negative: polarity.get("neg").copied().unwrap_or(0.0),
        neutral: polarity.get("neu").copied().unwrap_or(0.0),
        positive: polarity.get("pos").copied().unwrap_or(0.0),
        compound: polarity.get("compound").copied().unwrap_or(0.0),
    };

    (Sentiment::from_compound(scores.compound), scores)
}

/// Tally the stored labels of a book's reviews. Empty input yields
/// all-zero counts.
pub fn summarize(reviews: &[Review]) -> SentimentSummary {
    let mut summary = SentimentSummary::default();
    for review in reviews {
        match review.sentiment {
            Sentiment::Positive => summary.positive += 1,
            Sentiment::Negative => summary.negative += 1,
            Sentiment::Neutral => summary.neutral += 1,
        }
        summary.total += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn glowing_review_is_positive() {
        let (label, scores) = classify("I absolutely loved this book, wonderful!");
        assert_eq!(label, Sentiment::Positive);
        assert!(scores.compound > POSITIVE_THRESHOLD);
    }

    #[test]
    fn scathing_review_is_negative() {
        let (label, scores) = classify("Terrible, boring, waste of time");
        assert_eq!(label, Sentiment::Negative);
        assert!(scores.compound < NEGATIVE_THRESHOLD);
    }

    #[test]
    fn flat_statement_is_neutral() {
        let (label, _) = classify("The book has three hundred pages.");
        assert_eq!(label, Sentiment::Neutral);
    }

    #[test]
    fn components_are_a_distribution() {
        let (_, scores) = classify("I absolutely loved this book, wonderful!");
        for part in [scores.negative, scores.neutral, scores.positive] {
            assert!((0.0..=1.0).contains(&part));
        }
        let sum = scores.negative + scores.neutral + scores.positive;
        assert!((sum - 1.0).abs() < 0.01, "components sum to {}", sum);
        assert!((-1.0..=1.0).contains(&scores.compound));
    }

    #[test]
    fn label_thresholds_are_exact() {
        assert_eq!(Sentiment::from_compound(0.05), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(0.051), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(-0.05), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(-0.051), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(0.0), Sentiment::Neutral);
    }

    #[test]
    fn classify_is_deterministic() {
        let a = classify("A gripping, memorable story.");
        let b = classify("A gripping, memorable story.");
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    fn review_with(label: Sentiment) -> Review {
        Review {
            id: 0,
            book_id: 1,
            borrower_id: None,
            review_text: "text".to_string(),
            rating: 3,
            sentiment: label,
            sentiment_scores: SentimentScores::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summarize_tallies_labels() {
        let reviews = vec![
            review_with(Sentiment::Positive),
            review_with(Sentiment::Positive),
            review_with(Sentiment::Negative),
            review_with(Sentiment::Neutral),
        ];
        let summary = summarize(&reviews);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn summarize_empty_is_all_zero() {
        assert_eq!(summarize(&[]), SentimentSummary::default());
    }
}
