//! Instruction templates prepended to user queries.
//!
//! Three templates exist: a general assistant, a computer-science tutor and
//! a visualization generator. The generator template documents the JSON
//! shapes the frontend renders and asks for `{}` when no visualization
//! applies.

use crate::intent::Intent;

/// Template for queries with no computer-science focus.
pub const GENERAL_PROMPT: &str = r"<identity>
You are a friendly and knowledgeable assistant embedded in an interactive algorithm-visualization website.
</identity>

<guidelines>
- Answer clearly and concisely.
- Prefer short paragraphs and bullet points over long prose.
- If the question drifts into computer science, answer it, and mention that the site can visualize algorithms and data structures.
- If you do not know the answer, say so instead of guessing.
</guidelines>";

/// Template for computer-science tutoring, also used for the text half of visualization requests.
pub const CS_TUTOR_PROMPT: &str = r"<identity>
You are an expert computer-science tutor. Your students are learning algorithms and data structures with the help of step-by-step visualizations.
</identity>

<teaching_style>
- Start with the intuition, then give the precise definition.
- Walk through a small concrete example step by step.
- State time and space complexity, with best, average and worst cases where they differ.
- Show short code in Python unless the student asks for another language, inside fenced code blocks.
- Point out common mistakes and edge cases.
- When a visualization accompanies your answer, refer to its steps rather than repeating every array state.
</teaching_style>

<format>
Use Markdown headings and lists. Keep the answer under 400 words unless the student asks for more depth.
</format>";

/// Template for the structured visualization call.
pub const VISUALIZATION_PROMPT: &str = r#"<task>
You generate step-by-step visualization data for an algorithm or data structure described in the user's request.
Respond with a single JSON object and nothing else: no prose, no Markdown, no code fences.
</task>

<schemas>
Every object has a "visualizationType" field. Use exactly one of these shapes.

Sorting:
{"visualizationType": "sorting", "algorithm": "bubble_sort", "steps": [{"array": [5, 3, 8, 6], "message": "Initial array"}, {"array": [3, 5, 8, 6], "message": "Compare 5 and 3, swap"}]}

Graph:
{"visualizationType": "graph", "algorithm": "bfs", "nodes": [{"id": "A"}, {"id": "B"}], "edges": [{"source": "A", "target": "B", "weight": 1}], "steps": [{"visited": ["A"], "current": "A", "message": "Start at A"}]}

Tree:
{"visualizationType": "tree", "structure": "binary_search_tree", "nodes": [{"id": "A", "value": 10, "children": ["B", "C"]}, {"id": "B", "value": 5, "children": []}, {"id": "C", "value": 15, "children": []}], "steps": [{"highlight": ["A"], "message": "Root is 10"}]}

Stack:
{"visualizationType": "stack", "steps": [{"operation": "push", "value": 3, "stack": [3], "message": "Push 3"}]}

Queue:
{"visualizationType": "queue", "steps": [{"operation": "enqueue", "value": 3, "queue": [3], "message": "Enqueue 3"}]}

Hash map:
{"visualizationType": "hashmap", "buckets": 8, "steps": [{"operation": "insert", "key": "apple", "value": 1, "bucket": 3, "message": "hash('apple') % 8 = 3"}]}

Table:
{"visualizationType": "table", "columns": ["i", "dp[i]"], "steps": [{"row": [0, 0], "message": "Base case"}]}
</schemas>

<rules>
- Use small inputs (at most 8 elements) so every step fits on screen.
- Every step carries a short human-readable "message".
- Steps must follow the algorithm faithfully, one meaningful operation per step.
- If the request cannot be visualized with any of the shapes above, respond with exactly {}.
</rules>"#;

/// The set of instruction templates used by the chat pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLibrary {
    /// General assistant template.
    pub general: String,
    /// Computer-science tutor template.
    pub cs_tutor: String,
    /// Visualization generator template.
    pub visualization: String,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self {
            general: GENERAL_PROMPT.to_string(),
            cs_tutor: CS_TUTOR_PROMPT.to_string(),
            visualization: VISUALIZATION_PROMPT.to_string(),
        }
    }
}

impl PromptLibrary {
    /// Builds the library from config overrides, keeping defaults for unset entries.
    #[must_use]
    pub fn from_config(config: &crate::config::PromptConfig) -> Self {
        let mut library = Self::default();
        if let Some(general) = &config.general {
            library.general.clone_from(general);
        }
        if let Some(cs_tutor) = &config.cs_tutor {
            library.cs_tutor.clone_from(cs_tutor);
        }
        if let Some(visualization) = &config.visualization {
            library.visualization.clone_from(visualization);
        }
        library
    }

    /// Returns the template for the text half of the reply.
    ///
    /// Visualization requests are answered by the tutor.
    #[must_use]
    pub fn text_prompt(&self, intent: Intent) -> &str {
        match intent {
            Intent::Visualization | Intent::CsTutor => &self.cs_tutor,
            Intent::General => &self.general,
        }
    }

    /// Composes the prompt for the conversational call.
    #[must_use]
    pub fn conversation_prompt(&self, intent: Intent, query: &str) -> String {
        format!("{}\n\nUser Query: {query}", self.text_prompt(intent))
    }

    /// Composes the prompt for the visualization call.
    #[must_use]
    pub fn visualization_prompt(&self, query: &str) -> String {
        format!("{}\n\n{query}", self.visualization)
    }
}
