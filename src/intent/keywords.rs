//! Keyword tables for intent classification.
//!
//! Entries are lower-case and matched as plain substrings of the lower-cased
//! query. The tables overlap on purpose ("algorithm"); precedence is decided
//! by the classifier, not by the tables.

/// Keywords that request a visualization.
pub const VISUALIZATION_KEYWORDS: &[&str] = &[
    "visualize",
    "show",
    "steps",
    "algorithm",
    "sort",
    "tree",
    "graph",
];

/// Keywords that mark a computer-science tutoring question.
pub const CS_TUTOR_KEYWORDS: &[&str] = &[
    "computer science",
    "data structure",
    "algorithm",
    "explain",
    "how to",
    "example",
];
