//! The challenge page's mock flag checker.
//!
//! Not a scoring backend: the answer is a literal compared on the client.
//! The terminal keeps a transcript of styled lines for the host to render.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::FlagError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    /// Accepted answer, compared case-insensitively.
    pub answer: String,
    /// Shown around the submission as `<prefix>{...}`.
    pub prefix: String,
    /// Fake verification latency.
    pub verify_delay_ms: u64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            answer: "rsa_cracked".to_string(),
            prefix: "GDG".to_string(),
            verify_delay_ms: 1_500,
        }
    }
}

/// Styling class of a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Muted,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub text: String,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagVerdict {
    /// Accepted; the terminal is now locked.
    Correct,
    /// Rejected; the host should clear the input.
    Incorrect,
}

#[derive(Debug)]
pub struct FlagTerminal {
    config: FlagConfig,
    lines: Vec<TerminalLine>,
    solved: bool,
}

impl FlagTerminal {
    pub fn new(config: FlagConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
            solved: false,
        }
    }

    /// Checks a submitted flag, appending to the transcript as it goes.
    ///
    /// # Errors
    /// - [`FlagError::Empty`]: nothing typed; never "verified"
    /// - [`FlagError::AlreadySolved`]: the terminal is locked
    pub async fn submit(&mut self, input: &str) -> Result<FlagVerdict, FlagError> {
        if self.solved {
            return Err(FlagError::AlreadySolved);
        }

        let flag = input.trim();
        if flag.is_empty() {
            self.push("[!] Error: No flag provided.", LineStyle::Error);
            return Err(FlagError::Empty);
        }

        let echo = format!("root@ctf:~$ check_flag \"{}{{{flag}}}\"", self.config.prefix);
        self.push(echo, LineStyle::Plain);
        self.push("[*] Verifying flag...", LineStyle::Muted);

        tokio::time::sleep(Duration::from_millis(self.config.verify_delay_ms)).await;

        if flag.to_lowercase() == self.config.answer.to_lowercase() {
            self.solved = true;
            self.push("[+] ✓ Correct! Flag accepted!", LineStyle::Success);
            tracing::info!("flag accepted");
            Ok(FlagVerdict::Correct)
        } else {
            self.push("[-] ✗ Incorrect flag.", LineStyle::Error);
            tracing::debug!("flag rejected");
            Ok(FlagVerdict::Incorrect)
        }
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    fn push(&mut self, text: impl Into<String>, style: LineStyle) {
        self.lines.push(TerminalLine {
            text: text.into(),
            style,
        });
    }
}

impl Default for FlagTerminal {
    fn default() -> Self {
        Self::new(FlagConfig::default())
    }
}
