//! CLI interface for ragex

mod assistant;
mod ui;

pub use assistant::{AssistantCommand, DEFAULT_QUESTION};
pub use ui::{display_banner, format_answer, format_banner, print_answer, print_error};

// Re-export core types
pub use ragex_core::{Error, Result};
