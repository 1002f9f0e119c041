use game_types::PuzzleId;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Header the puzzle puts at the top of every shared result.
pub const DEFAULT_RESULT_HEADER: &str = "СЛОВКО";

const MAX_ATTEMPTS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleResult {
    pub puzzle_id: PuzzleId,
    /// `None` when the character before `/6` is not a digit (e.g. `X/6`).
    pub attempts: Option<u8>,
    pub score: u8,
}

/// Points awarded for solving in `attempts` guesses: 6 for a first-guess
/// solve down to 1 for the sixth guess, 0 for anything else.
pub fn score_for_attempts(attempts: Option<u8>) -> u8 {
    match attempts {
        Some(n @ 1..=MAX_ATTEMPTS) => MAX_ATTEMPTS + 1 - n,
        _ => 0,
    }
}

#[derive(Debug, Clone)]
pub struct ResultParser {
    shape: Regex,
    first_number: Regex,
    attempt_marker: Regex,
}

impl ResultParser {
    pub fn new(header: &str) -> Result<Self, regex::Error> {
        let shape = Regex::new(&format!(
            r"(?is){}\s*\d+.*./6",
            regex::escape(header.trim())
        ))?;

        Ok(Self {
            shape,
            first_number: Regex::new(r"\d+")?,
            attempt_marker: Regex::new(r"(?s)(.)/6")?,
        })
    }

    /// Check whether the text looks like a shared puzzle result
    pub fn is_result(&self, text: &str) -> bool {
        self.shape.is_match(text)
    }

    /// Extract puzzle id and score from shared result text. Returns `None`
    /// for anything that is not a result.
    pub fn parse(&self, text: &str) -> Option<PuzzleResult> {
        if !self.is_result(text) {
            return None;
        }

        let puzzle_id = self
            .first_number
            .find(text)?
            .as_str()
            .parse::<PuzzleId>()
            .ok()?;

        let attempts = self
            .attempt_marker
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|marker| marker.as_str().chars().next())
            .and_then(|ch| ch.to_digit(10))
            .map(|n| n as u8);

        Some(PuzzleResult {
            puzzle_id,
            attempts,
            score: score_for_attempts(attempts),
        })
    }
}

impl Default for ResultParser {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_HEADER).expect("escaped header is a valid pattern")
    }
}
