//! Matrix rain background.
//!
//! One falling drop per text column. Each frame draws a random glyph at
//! every drop's position and moves it down one row; drops that have left
//! the screen restart at the top with a small probability per frame, which
//! keeps the columns out of sync.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Glyphs drawn by the rain.
pub const MATRIX_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*(){}[]|;:<>?/~";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Glyph size in pixels; also the column width and row height.
    pub font_size: u32,
    pub frame_interval_ms: u64,
    /// Chance per frame that an off-screen drop restarts at the top.
    pub reset_probability: f64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            font_size: 14,
            frame_interval_ms: 50,
            reset_probability: 0.025,
        }
    }
}

impl MatrixConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// A glyph to draw at pixel position (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub column: usize,
    pub x: u32,
    pub y: u32,
    pub ch: char,
}

#[derive(Debug, Clone)]
pub struct MatrixRain {
    config: MatrixConfig,
    glyphs: Vec<char>,
    height: u32,
    /// Row of each column's drop, starting at 1.
    drops: Vec<u32>,
}

impl MatrixRain {
    pub fn new(width: u32, height: u32, config: MatrixConfig) -> Self {
        let mut rain = Self {
            config: MatrixConfig {
                font_size: config.font_size.max(1),
                reset_probability: config.reset_probability.clamp(0.0, 1.0),
                ..config
            },
            glyphs: MATRIX_GLYPHS.chars().collect(),
            height: 0,
            drops: Vec::new(),
        };
        rain.resize(width, height);
        rain
    }

    /// Recomputes the columns for a new viewport; all drops restart.
    pub fn resize(&mut self, width: u32, height: u32) {
        let columns = (width / self.config.font_size).max(1) as usize;
        self.height = height;
        self.drops = vec![1; columns];
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Produces one frame and advances every drop.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Glyph> {
        let font = self.config.font_size;
        let mut frame = Vec::with_capacity(self.drops.len());

        for (column, drop) in self.drops.iter_mut().enumerate() {
            let ch = self.glyphs[rng.random_range(0..self.glyphs.len())];
            frame.push(Glyph {
                column,
                x: column as u32 * font,
                y: drop.saturating_mul(font),
                ch,
            });

            if drop.saturating_mul(font) > self.height
                && rng.random_bool(self.config.reset_probability)
            {
                *drop = 0;
            }
            *drop += 1;
        }

        frame
    }
}
