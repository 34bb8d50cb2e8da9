//! Terminal-style typing animation for the hero banner.
//!
//! Types a line one character at a time, holds it, deletes it, then moves
//! to the next line, forever. [`TypingEffect::tick`] is pure: it returns
//! the text to show and how long to wait before the next tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lines cycled by the landing page banner.
pub const DEFAULT_LINES: [&str; 5] = [
    "Initializing system...",
    "Loading challenges...",
    "Scanning vulnerabilities...",
    "Access granted.",
    "Welcome, hacker.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub type_ms: u64,
    pub delete_ms: u64,
    /// Pause once a line is fully typed.
    pub hold_ms: u64,
    /// Pause after a line is fully deleted.
    pub next_line_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            type_ms: 60,
            delete_ms: 30,
            hold_ms: 2_000,
            next_line_ms: 500,
        }
    }
}

/// One step of the animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingFrame {
    pub text: String,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct TypingEffect {
    lines: Vec<Vec<char>>,
    line: usize,
    chars: usize,
    deleting: bool,
    config: TypingConfig,
}

impl TypingEffect {
    pub fn new<I, S>(lines: I, config: TypingConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|line| line.as_ref().chars().collect())
                .collect(),
            line: 0,
            chars: 0,
            deleting: false,
            config,
        }
    }

    /// Advances one character and returns what to display.
    pub fn tick(&mut self) -> TypingFrame {
        let Some(current) = self.lines.get(self.line) else {
            return TypingFrame {
                text: String::new(),
                delay: Duration::from_millis(self.config.hold_ms),
            };
        };
        let len = current.len();

        if self.deleting {
            self.chars = self.chars.saturating_sub(1);
        } else {
            self.chars = (self.chars + 1).min(len);
        }
        let text: String = current[..self.chars].iter().collect();

        let mut delay_ms = if self.deleting {
            self.config.delete_ms
        } else {
            self.config.type_ms
        };

        if !self.deleting && self.chars == len {
            delay_ms = self.config.hold_ms;
            self.deleting = true;
        } else if self.deleting && self.chars == 0 {
            self.deleting = false;
            self.line = (self.line + 1) % self.lines.len();
            delay_ms = self.config.next_line_ms;
        }

        TypingFrame {
            text,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Index of the line currently being typed or deleted.
    pub fn line_index(&self) -> usize {
        self.line
    }

    /// Drives the animation forever, handing each frame to `render`.
    pub async fn run<F>(mut self, mut render: F)
    where
        F: FnMut(&str),
    {
        loop {
            let frame = self.tick();
            render(&frame.text);
            tokio::time::sleep(frame.delay).await;
        }
    }
}

impl Default for TypingEffect {
    fn default() -> Self {
        Self::new(DEFAULT_LINES, TypingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(lines: &[&str]) -> TypingEffect {
        TypingEffect::new(lines.iter().copied(), TypingConfig::default())
    }

    #[test]
    fn test_tick_types_then_holds_then_deletes() {
        let mut fx = effect(&["ab", "c"]);

        let f1 = fx.tick();
        assert_eq!((f1.text.as_str(), f1.delay.as_millis()), ("a", 60));
        let f2 = fx.tick();
        assert_eq!((f2.text.as_str(), f2.delay.as_millis()), ("ab", 2_000));
        let f3 = fx.tick();
        assert_eq!((f3.text.as_str(), f3.delay.as_millis()), ("a", 30));
        let f4 = fx.tick();
        assert_eq!((f4.text.as_str(), f4.delay.as_millis()), ("", 500));
        assert_eq!(fx.line_index(), 1);

        let f5 = fx.tick();
        assert_eq!((f5.text.as_str(), f5.delay.as_millis()), ("c", 2_000));
    }

    #[test]
    fn test_tick_wraps_to_first_line() {
        let mut fx = effect(&["x"]);
        fx.tick();
        fx.tick();
        assert_eq!(fx.line_index(), 0);
        assert_eq!(fx.tick().text, "x");
    }

    #[test]
    fn test_tick_handles_multibyte_chars() {
        let mut fx = effect(&["✓ok"]);
        assert_eq!(fx.tick().text, "✓");
        assert_eq!(fx.tick().text, "✓o");
    }

    #[test]
    fn test_tick_without_lines_is_empty() {
        let mut fx = effect(&[]);
        assert_eq!(fx.tick().text, "");
    }

    #[test]
    fn test_default_uses_banner_lines() {
        let mut fx = TypingEffect::default();
        assert_eq!(fx.tick().text, "I");
    }
}
