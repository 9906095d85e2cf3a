//! Dice expressions: `2D6`, `D6+1`, `3D6-2`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dice expression: `count` dice with `faces` sides plus a flat modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpr {
    pub count: u8,
    pub faces: u8,
    pub modifier: i32,
}

impl DiceExpr {
    pub const fn new(count: u8, faces: u8, modifier: i32) -> Self {
        Self {
            count,
            faces,
            modifier,
        }
    }

    /// One six-sided die
    pub const fn d6() -> Self {
        Self::new(1, 6, 0)
    }

    /// Two six-sided dice, the standard throw
    pub const fn two_d6() -> Self {
        Self::new(2, 6, 0)
    }

    /// Lowest natural total (dice only, no modifier)
    pub fn min_natural(&self) -> i32 {
        self.count as i32
    }

    /// Highest natural total (dice only, no modifier)
    pub fn max_natural(&self) -> i32 {
        self.count as i32 * self.faces as i32
    }
}

impl Default for DiceExpr {
    fn default() -> Self {
        Self::two_d6()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D{}", self.count, self.faces)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

/// Error type for dice expression parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

fn parse_error(input: &str, reason: &str) -> ParseError {
    ParseError {
        message: format!("'{}': {}", input, reason),
    }
}

impl FromStr for DiceExpr {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let upper = compact.to_uppercase();

        let (count_part, rest) = upper
            .split_once('D')
            .ok_or_else(|| parse_error(input, "missing 'D'"))?;

        let count = if count_part.is_empty() {
            1
        } else {
            count_part
                .parse::<u8>()
                .map_err(|_| parse_error(input, "bad dice count"))?
        };

        let split_at = rest.find(['+', '-']);
        let (faces_part, modifier) = match split_at {
            Some(idx) => {
                let modifier = rest[idx..]
                    .parse::<i32>()
                    .map_err(|_| parse_error(input, "bad modifier"))?;
                (&rest[..idx], modifier)
            }
            None => (rest, 0),
        };

        let faces = faces_part
            .parse::<u8>()
            .map_err(|_| parse_error(input, "bad face count"))?;

        if count == 0 {
            return Err(parse_error(input, "dice count must be at least 1"));
        }
        if faces < 2 {
            return Err(parse_error(input, "dice need at least 2 faces"));
        }

        Ok(Self::new(count, faces, modifier))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}
