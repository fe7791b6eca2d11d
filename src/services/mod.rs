//! Chat services.
//!
//! Services combine intent classification, prompt selection and the model
//! client into the reply for one query.

mod chat;
mod prompts;
mod response_cleaner;
mod visualization;

pub use chat::ChatService;
pub use prompts::{CS_TUTOR_PROMPT, GENERAL_PROMPT, PromptLibrary, VISUALIZATION_PROMPT};
pub use response_cleaner::clean;
pub use visualization::{
    VisualizationSkip, generate_visualization, get_visualization, parse_payload,
};
