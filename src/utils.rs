//! # Utilities Module
//!
//! ## Purpose
//! Common helpers used throughout the engine for timing and text display.
//!
//! ## Key Features
//! - Performance measurement helpers
//! - Text truncation for log and report previews

use std::time::Instant;

/// Performance timer for measuring operation duration
pub struct Timer {
    start: Instant,
    name: String,
}

/// Text display utilities
pub struct TextUtils;

impl Timer {
    /// Start a new timer with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Stop timer and log duration
    pub fn stop(self) -> u64 {
        let elapsed = self.elapsed_ms();
        tracing::debug!("Timer '{}' completed in {}ms", self.name, elapsed);
        elapsed
    }
}

impl TextUtils {
    /// Truncate text to specified length with ellipsis
    pub fn truncate(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }

    /// Take at most `max_chars` characters, respecting char boundaries.
    /// Unlike `truncate`, no ellipsis is appended; used for feeding bounded
    /// excerpts to the extraction collaborator.
    pub fn head_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Count non-blank lines in a text blob
    pub fn non_blank_lines(text: &str) -> usize {
        text.lines().filter(|l| !l.trim().is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_truncate() {
        assert_eq!(TextUtils::truncate("Hello world", 20), "Hello world");
        assert_eq!(
            TextUtils::truncate("This is a very long text", 10),
            "This is..."
        );
    }

    #[test]
    fn test_head_chars() {
        assert_eq!(TextUtils::head_chars("abcdef", 4), "abcd");
        assert_eq!(TextUtils::head_chars("abc", 10), "abc");
    }

    #[test]
    fn test_non_blank_lines() {
        assert_eq!(TextUtils::non_blank_lines("a\n\n  \nb\n"), 2);
        assert_eq!(TextUtils::non_blank_lines(""), 0);
    }
}
