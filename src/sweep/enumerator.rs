//! Search token enumeration
//!
//! The index is partitioned by single-symbol search queries. Tokens run
//! `A..=Z` then `0..=9`; a sweep covers an inclusive sub-range of that order so
//! an interrupted sweep can be resumed from any token.

use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// The ordered search alphabet
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One symbol of the search alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SearchToken(u8);

impl SearchToken {
    /// First token of the alphabet (`A`)
    pub const FIRST: SearchToken = SearchToken(0);

    /// Last token of the alphabet (`9`)
    pub const LAST: SearchToken = SearchToken(35);

    /// Returns the token at `index` in the alphabet
    pub fn from_index(index: usize) -> Option<Self> {
        (index < ALPHABET.len()).then(|| Self(index as u8))
    }

    /// Position of this token in the alphabet
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn as_char(&self) -> char {
        ALPHABET[self.index()] as char
    }

    /// The token that follows this one, or `None` after `9`
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for SearchToken {
    type Err = ConfigError;

    /// Parses a one-character token; letters are case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(ConfigError::InvalidToken(format!(
                "'{}' must be exactly one character",
                s
            )));
        };

        let upper = c.to_ascii_uppercase();
        ALPHABET
            .iter()
            .position(|&b| b as char == upper)
            .and_then(Self::from_index)
            .ok_or_else(|| ConfigError::InvalidToken(format!("'{}' is not in A-Z or 0-9", s)))
    }
}

/// An inclusive range of search tokens in alphabet order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    start: SearchToken,
    end: SearchToken,
}

impl TokenRange {
    /// Creates a range; `start` must not come after `end`
    pub fn new(start: SearchToken, end: SearchToken) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::Validation(format!(
                "start token {} comes after end token {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole alphabet
    pub fn full() -> Self {
        Self {
            start: SearchToken::FIRST,
            end: SearchToken::LAST,
        }
    }

    pub fn start(&self) -> SearchToken {
        self.start
    }

    pub fn end(&self) -> SearchToken {
        self.end
    }

    /// Number of tokens in the range
    pub fn len(&self) -> usize {
        self.end.index() - self.start.index() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Narrows the range so it starts at `start`
    ///
    /// Returns `None` if `start` lies beyond the end of the range.
    pub fn resume_from(&self, start: SearchToken) -> Option<Self> {
        (start <= self.end).then(|| Self {
            start: start.max(self.start),
            end: self.end,
        })
    }

    /// Iterates the tokens of the range in order
    pub fn iter(&self) -> Tokens {
        Tokens {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl Default for TokenRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

impl IntoIterator for TokenRange {
    type Item = SearchToken;
    type IntoIter = Tokens;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`TokenRange`]
#[derive(Debug, Clone)]
pub struct Tokens {
    next: Option<SearchToken>,
    end: SearchToken,
}

impl Iterator for Tokens {
    type Item = SearchToken;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end { current.next() } else { None };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|n| self.end.index() - n.index() + 1)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tokens {}
