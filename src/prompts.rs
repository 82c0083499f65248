//! Prompt pool: the sentences offered for typing

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::io;
use std::path::Path;

/// Sentences bundled with the binary
const BUNDLED_SENTENCES: &str = include_str!("../assets/sentences.txt");

/// Pool of prompt strings to draw sessions from
#[derive(Debug, Clone, Default)]
pub struct PromptPool {
    lines: Vec<String>,
}

impl PromptPool {
    /// Build a pool from newline-delimited text, dropping blank lines
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    /// Read a newline-delimited prompt file
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let pool = Self::from_text(&text);
        debug!("loaded {} prompts from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// The sentences shipped with the crate
    pub fn bundled() -> Self {
        Self::from_text(BUNDLED_SENTENCES)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Pick up to `n` distinct prompts in random order.
    ///
    /// The pool itself is left intact, so later sessions may repeat prompts.
    pub fn select_random(&self, n: usize) -> Vec<String> {
        self.select_random_with(n, &mut rand::thread_rng())
    }

    /// [`select_random`](Self::select_random) with a caller-supplied RNG
    pub fn select_random_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<String> {
        self.lines.choose_multiple(rng, n).cloned().collect()
    }
}
