//! Visualization payloads emitted by the model.
//!
//! The payload is loosely typed: the frontend renders whatever the model
//! returns, dispatching on the `visualizationType` field. Vizchat only checks
//! that the payload is a non-empty JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the discriminator field inside a payload.
pub const DISCRIMINATOR_FIELD: &str = "visualizationType";

/// Visualization kinds the frontend knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    /// Bar animation of array states.
    Sorting,
    /// Nodes and edges, optionally with a traversal order.
    Graph,
    /// Hierarchical nodes.
    Tree,
    /// Push/pop operations.
    Stack,
    /// Enqueue/dequeue operations.
    Queue,
    /// Bucket inserts and lookups.
    Hashmap,
    /// Tabular step data, e.g. dynamic programming tables.
    Table,
}

impl VisualizationKind {
    /// Returns the discriminator value used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sorting => "sorting",
            Self::Graph => "graph",
            Self::Tree => "tree",
            Self::Stack => "stack",
            Self::Queue => "queue",
            Self::Hashmap => "hashmap",
            Self::Table => "table",
        }
    }

    /// Parses a discriminator value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sorting" | "sort" => Some(Self::Sorting),
            "graph" => Some(Self::Graph),
            "tree" => Some(Self::Tree),
            "stack" => Some(Self::Stack),
            "queue" => Some(Self::Queue),
            "hashmap" | "hash_map" => Some(Self::Hashmap),
            "table" => Some(Self::Table),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-empty JSON object describing a visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualizationPayload(Map<String, Value>);

impl VisualizationPayload {
    /// Wraps a parsed JSON value.
    ///
    /// Returns `None` for anything other than a non-empty object: the model
    /// answers `{}` when no visualization applies.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the raw discriminator value, if present.
    #[must_use]
    pub fn visualization_type(&self) -> Option<&str> {
        self.0.get(DISCRIMINATOR_FIELD).and_then(Value::as_str)
    }

    /// Returns the discriminator as a known kind, if recognised.
    #[must_use]
    pub fn kind(&self) -> Option<VisualizationKind> {
        self.visualization_type().and_then(VisualizationKind::parse)
    }

    /// Returns a field of the payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
