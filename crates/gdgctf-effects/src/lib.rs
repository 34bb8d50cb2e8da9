//! Decorative effects for the GDG CTF site.
//!
//! None of these touch the router or the session gateway. They are either
//! pure state machines stepped by the host ([`TypingEffect`],
//! [`MatrixRain`], [`CounterAnimation`]) or timers that own their own task
//! ([`ChallengeTimer`] via [`IntervalSlot`]).
//!
//! # Restarting timers
//!
//! Every repeating task lives in an [`IntervalSlot`]. Starting a slot that
//! is already running cancels the old task first:
//!
//! ```ignore
//! let mut timer = ChallengeTimer::new(ChallengeTimerConfig::default());
//! timer.restart();
//! timer.restart(); // still exactly one interval task
//! ```

mod counter;
mod error;
mod flag;
mod matrix;
mod slot;
mod timer;
mod typing;

pub use counter::{CounterAnimation, StatCounters};
pub use error::FlagError;
pub use flag::{FlagConfig, FlagTerminal, FlagVerdict, LineStyle, TerminalLine};
pub use matrix::{Glyph, MATRIX_GLYPHS, MatrixConfig, MatrixRain};
pub use slot::IntervalSlot;
pub use timer::{ChallengeClock, ChallengeTimer, ChallengeTimerConfig};
pub use typing::{DEFAULT_LINES, TypingConfig, TypingEffect, TypingFrame};
