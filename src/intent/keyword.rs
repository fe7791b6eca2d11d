//! Keyword-based intent classification.
//!
//! A single substring hit is enough: there is no scoring and no negation
//! handling. Classification is pure and never fails.

use super::keywords::{CS_TUTOR_KEYWORDS, VISUALIZATION_KEYWORDS};
use super::types::{Classification, Intent};

/// Classifies a query into an [`Intent`].
///
/// Visualization keywords are checked first, then tutoring keywords;
/// anything else is [`Intent::General`].
#[must_use]
pub fn classify(query: &str) -> Intent {
    let lower = query.to_lowercase();

    if contains_any(&lower, VISUALIZATION_KEYWORDS) {
        Intent::Visualization
    } else if contains_any(&lower, CS_TUTOR_KEYWORDS) {
        Intent::CsTutor
    } else {
        Intent::General
    }
}

/// Classifies a query and reports the keywords that decided it.
///
/// Always agrees with [`classify`]. `matched_keywords` only lists hits from
/// the winning table and is empty for [`Intent::General`].
#[must_use]
pub fn classify_detailed(query: &str) -> Classification {
    let lower = query.to_lowercase();

    let visualization = matches_in(&lower, VISUALIZATION_KEYWORDS);
    if !visualization.is_empty() {
        return Classification {
            intent: Intent::Visualization,
            matched_keywords: visualization,
        };
    }

    let tutor = matches_in(&lower, CS_TUTOR_KEYWORDS);
    if !tutor.is_empty() {
        return Classification {
            intent: Intent::CsTutor,
            matched_keywords: tutor,
        };
    }

    Classification {
        intent: Intent::General,
        matched_keywords: Vec::new(),
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

fn matches_in(haystack: &str, keywords: &[&'static str]) -> Vec<&'static str> {
    keywords
        .iter()
        .copied()
        .filter(|kw| haystack.contains(kw))
        .collect()
}
