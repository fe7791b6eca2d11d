//! Intent classification for incoming chat queries.
//!
//! Decides which instruction template a query is answered with and whether a
//! structured visualization payload is requested alongside the text.
//!
//! # Architecture
//!
//! - [`types`]: Core types (`Intent`, `Classification`)
//! - [`keywords`]: Static keyword tables
//! - [`keyword`]: Substring-based classification
//!
//! # Intents and Triggers
//!
//! | Intent | Example Triggers | Text Prompt | Visualization Call |
//! |--------|------------------|-------------|--------------------|
//! | `Visualization` | "visualize", "show", "steps", "sort", "tree", "graph" | CS tutor | yes |
//! | `CsTutor` | "computer science", "data structure", "explain", "how to" | CS tutor | no |
//! | `General` | anything else | general assistant | no |
//!
//! # Precedence
//!
//! The visualization table is checked first, so a query such as
//! "explain how to sort a list" is a visualization request even though it
//! also matches tutoring keywords. "algorithm" appears in both tables and
//! therefore always classifies as a visualization request.

mod keyword;
pub mod keywords;
mod types;

pub use keyword::{classify, classify_detailed};
pub use types::{Classification, Intent};
