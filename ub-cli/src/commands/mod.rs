//! CLI command implementations.

pub mod alert;
pub mod chats;
pub mod messages;
pub mod session;
pub mod stations;

use std::time::Duration;

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use ub_core::error::{UbError, UbResult};

/// Prompt for a line of text.
pub fn prompt(label: &str) -> UbResult<String> {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| UbError::Internal(e.to_string()))
}

/// Prompt for a line of text that may be left empty.
pub fn prompt_optional(label: &str) -> UbResult<String> {
    Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| UbError::Internal(e.to_string()))
}

/// Prompt for a secret without echoing it.
pub fn prompt_password(label: &str) -> UbResult<String> {
    Password::new()
        .with_prompt(label)
        .interact()
        .map_err(|e| UbError::Internal(e.to_string()))
}

/// A spinner shown while a request is in flight.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hola", 10), "hola");
        assert_eq!(truncate("Bomberos Voluntarios", 10), "Bomberos...");
        assert_eq!(truncate("estación", 4), "e...");
        assert_eq!(truncate("abc", 2), "ab");
    }
}
