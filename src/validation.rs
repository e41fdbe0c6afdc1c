//! Task text validation.
//!
//! Rules are checked in order: empty, too short, digits only.

use crate::error::{Error, Result};

pub const MIN_TEXT_LEN: usize = 3;

pub const EMPTY_MESSAGE: &str = "Please enter a task description";
pub const TOO_SHORT_MESSAGE: &str = "Task must be at least 3 characters long";
pub const DIGITS_ONLY_MESSAGE: &str = "Task cannot contain only numbers";

pub fn is_valid(text: &str) -> bool {
    validation_message(text).is_empty()
}

/// The reason `text` is rejected, or an empty string when it is acceptable.
pub fn validation_message(text: &str) -> &'static str {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return EMPTY_MESSAGE;
    }
    if trimmed.chars().count() < MIN_TEXT_LEN {
        return TOO_SHORT_MESSAGE;
    }
    if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return DIGITS_ONLY_MESSAGE;
    }

    ""
}

/// Return the trimmed text, or a `Validation` error naming the first failed rule.
pub fn validate(text: &str) -> Result<&str> {
    match validation_message(text) {
        "" => Ok(text.trim()),
        message => Err(Error::Validation(message.to_string())),
    }
}
