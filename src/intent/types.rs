//! Types for intent classification.

use serde::{Deserialize, Serialize};

/// Coarse category assigned to a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user wants to see an algorithm or data structure in action.
    Visualization,
    /// A computer-science tutoring question without a visualization request.
    CsTutor,
    /// Anything else.
    #[default]
    General,
}

impl Intent {
    /// Returns the string representation used in serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visualization => "visualization",
            Self::CsTutor => "cs_tutor",
            Self::General => "general",
        }
    }

    /// Returns true when the intent asks for a structured visualization payload.
    #[must_use]
    pub const fn wants_visualization(&self) -> bool {
        matches!(self, Self::Visualization)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying a query, with the keywords that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The selected intent.
    pub intent: Intent,
    /// Keywords from the winning table found in the query, in table order.
    pub matched_keywords: Vec<&'static str>,
}
