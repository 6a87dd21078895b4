//! Operation words
//!
//! A word is an ordered sequence of steps, each a generator symbol raised
//! to an exponent. Generators are named `B1`, `B2`, ... and index the
//! adjacent-event transitions of a session: a session tracking `n` events
//! has generators `B1 ..= B(n-1)`.
//!
//! Exponents are kept as plain integers so that a malformed proposal
//! (`B2^2`) can be represented and then rejected by validation rather than
//! silently coerced.
//!
//! ## Text form
//!
//! ```text
//! B2 B1 B2        three positive steps
//! B2 B1^-1 B2^+1  explicit exponents
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// One step of a word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    /// Generator symbol, e.g. `B2`
    pub generator: String,
    /// Exponent; only +1 and -1 are lawful
    pub exponent: i64,
}

impl Step {
    /// Create a step.
    pub fn new(generator: impl Into<String>, exponent: i64) -> Self {
        Step {
            generator: generator.into(),
            exponent,
        }
    }

    /// Positive step `B<index>`.
    pub fn positive(index: usize) -> Self {
        Step::new(format!("B{}", index), 1)
    }

    /// Inverse step `B<index>^-1`.
    pub fn inverse(index: usize) -> Self {
        Step::new(format!("B{}", index), -1)
    }

    /// Numeric index of the generator, if the symbol is well-formed.
    ///
    /// `B3` → `Some(3)`; `B0`, `X1`, `B` → `None`.
    pub fn generator_index(&self) -> Option<usize> {
        let digits = self.generator.strip_prefix('B')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(index) => Some(index),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 1 {
            write!(f, "{}", self.generator)
        } else {
            write!(f, "{}^{}", self.generator, self.exponent)
        }
    }
}

impl FromStr for Step {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidStep(s.to_string());
        let (generator, exponent) = match s.split_once('^') {
            Some((generator, exponent)) => {
                let exponent = exponent.parse::<i64>().map_err(|_| invalid())?;
                (generator, exponent)
            }
            None => (s, 1),
        };
        if generator.is_empty() {
            return Err(invalid());
        }
        Ok(Step::new(generator.to_ascii_uppercase(), exponent))
    }
}

/// Ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(Vec<Step>);

impl Word {
    /// Create a word from steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Word(steps)
    }

    /// The identity (empty) word.
    pub fn identity() -> Self {
        Word(Vec::new())
    }

    /// Steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the identity word.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over steps.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.0.iter()
    }
}

impl From<Vec<Step>> for Word {
    fn from(steps: Vec<Step>) -> Self {
        Word(steps)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", step)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Word {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(Step::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Word)
    }
}
