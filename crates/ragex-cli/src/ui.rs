//! Terminal output for the CLI

use colored::*;
use ragex_core::Error;

/// Banner text naming the active model and store
pub fn format_banner(chat_model: &str, store: &str) -> String {
    format!(
        "\n{}\n{} {}   {} {}\n",
        "ragex - retrieval-augmented chat".blue().bold(),
        "model:".dimmed(),
        chat_model,
        "store:".dimmed(),
        store
    )
}

/// Print the startup banner on stderr; stdout carries only the answer
pub fn display_banner(chat_model: &str, store: &str) {
    eprintln!("{}", format_banner(chat_model, store));
}

/// Answer text with surrounding whitespace removed and a trailing newline
pub fn format_answer(answer: &str) -> String {
    format!("{}\n", answer.trim())
}

pub fn print_answer(answer: &str) {
    print!("{}", format_answer(answer));
}

pub fn print_error(err: &Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    if err.is_upstream() {
        eprintln!(
            "{}",
            "hint: check that Ollama and the vector store are running and reachable".dimmed()
        );
    }
}
