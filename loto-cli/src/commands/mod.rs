pub mod generate;
pub mod history;
pub mod rules;
pub mod verify;

pub use generate::{handle_generate_command, GenerateCommands};
pub use history::{handle_history_command, HistoryCommands};
pub use rules::{handle_rules_command, RulesCommands};
pub use verify::{handle_verify_command, VerifyCommands};

use loto_core::{Combination, LotoError, Result};
use std::path::Path;

/// One combination per line; blank lines and `#` comments are ignored.
pub(crate) fn read_combinations(path: &Path) -> Result<Vec<Combination>> {
    let text = std::fs::read_to_string(path)?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.parse())
        .collect()
}

pub(crate) fn dialog_error(e: dialoguer::Error) -> LotoError {
    LotoError::internal(format!("Prompt failed: {}", e))
}
