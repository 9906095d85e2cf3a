//! Attribute set: the six UPP characteristics
//!
//! Values are bounded by the ruleset's floor and maximum. Gains clamp at the
//! maximum. Losses are never clamped at the floor: a loss that would take a
//! characteristic below it is reported as a breach, and the caller must move
//! the character to `deceased` in the same step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::Characteristic;

/// Extended hex digits used by UPP strings (I and O are skipped)
const EHEX: &[u8] = b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// A signed change to one characteristic, written `+1 Str` / `-2 End`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacteristicChange {
    pub characteristic: Characteristic,
    pub amount: i32,
}

impl CharacteristicChange {
    pub fn new(characteristic: Characteristic, amount: i32) -> Self {
        Self {
            characteristic,
            amount,
        }
    }

    /// Whether `s` looks like a characteristic change rather than a name
    pub fn looks_like(s: &str) -> bool {
        s.trim_start().starts_with(['+', '-']) && s.trim().len() > 1
    }
}

impl fmt::Display for CharacteristicChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+} {}", self.amount, self.characteristic)
    }
}

impl FromStr for CharacteristicChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_alphabetic())
            .ok_or_else(|| format!("Missing characteristic in '{}'", s))?;
        let amount = s[..split]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Bad amount in '{}'", s))?;
        let characteristic = s[split..].parse::<Characteristic>()?;
        if amount == 0 {
            return Err(format!("Zero change in '{}'", s));
        }
        Ok(Self::new(characteristic, amount))
    }
}

impl TryFrom<String> for CharacteristicChange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CharacteristicChange> for String {
    fn from(change: CharacteristicChange) -> Self {
        change.to_string()
    }
}

/// Result of applying a change to an attribute set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedChange {
    pub characteristic: Characteristic,
    pub before: u8,
    pub after: u8,
    /// The change took the characteristic below the floor
    pub breached: bool,
}

/// The six characteristics in UPP order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSet {
    values: [u8; 6],
}

impl AttributeSet {
    pub fn new(values: [u8; 6]) -> Self {
        Self { values }
    }

    /// Every characteristic at the same value
    pub fn uniform(value: u8) -> Self {
        Self { values: [value; 6] }
    }

    pub fn get(&self, characteristic: Characteristic) -> u8 {
        self.values[characteristic.index()]
    }

    pub fn set(&mut self, characteristic: Characteristic, value: u8) {
        self.values[characteristic.index()] = value;
    }

    pub fn values(&self) -> [u8; 6] {
        self.values
    }

    /// Characteristic modifier: 0 → -3, 1-2 → -2, 3-5 → -1, 6-8 → 0,
    /// 9-11 → +1, 12-14 → +2, 15 → +3
    pub fn modifier(&self, characteristic: Characteristic) -> i32 {
        let value = self.get(characteristic) as i32;
        if value == 0 {
            -3
        } else {
            value / 3 - 2
        }
    }

    /// Whether every characteristic is at or above `floor`
    pub fn above_floor(&self, floor: u8) -> bool {
        self.values.iter().all(|&v| v >= floor)
    }

    /// Apply a change; gains clamp at `max`, losses below `floor` breach
    pub fn apply(&mut self, change: CharacteristicChange, floor: u8, max: u8) -> AppliedChange {
        let before = self.get(change.characteristic);
        let raw = before as i32 + change.amount;
        let breached = raw < floor as i32;
        let after = raw.clamp(0, max as i32) as u8;
        // Gains never lower a value that already sits above the cap
        let after = if change.amount > 0 { after.max(before) } else { after };
        self.set(change.characteristic, after);

        AppliedChange {
            characteristic: change.characteristic,
            before,
            after,
            breached,
        }
    }

    /// Universal Personality Profile string, e.g. `777A98`
    pub fn upp(&self) -> String {
        self.values
            .iter()
            .map(|&v| EHEX[(v as usize).min(EHEX.len() - 1)] as char)
            .collect()
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.upp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_parsing() {
        let change: CharacteristicChange = "+1 Str".parse().unwrap();
        assert_eq!(change, CharacteristicChange::new(Characteristic::Str, 1));

        let change: CharacteristicChange = "-2 end".parse().unwrap();
        assert_eq!(change, CharacteristicChange::new(Characteristic::End, -2));

        assert!("+0 Soc".parse::<CharacteristicChange>().is_err());
        assert!("Pilot".parse::<CharacteristicChange>().is_err());
    }

    #[test]
    fn test_looks_like_change() {
        assert!(CharacteristicChange::looks_like("+1 Edu"));
        assert!(!CharacteristicChange::looks_like("Vacc Suit"));
        assert!(!CharacteristicChange::looks_like("-"));
    }

    #[test]
    fn test_gain_clamps_at_max() {
        let mut attrs = AttributeSet::uniform(14);
        let applied = attrs.apply(CharacteristicChange::new(Characteristic::Soc, 2), 1, 15);
        assert_eq!(applied.after, 15);
        assert!(!applied.breached);
    }

    #[test]
    fn test_loss_below_floor_breaches() {
        let mut attrs = AttributeSet::uniform(2);
        let applied = attrs.apply(CharacteristicChange::new(Characteristic::End, -2), 1, 15);
        assert!(applied.breached);
        assert_eq!(attrs.get(Characteristic::End), 0);
    }

    #[test]
    fn test_loss_to_floor_is_not_a_breach() {
        let mut attrs = AttributeSet::uniform(2);
        let applied = attrs.apply(CharacteristicChange::new(Characteristic::Dex, -1), 1, 15);
        assert!(!applied.breached);
        assert_eq!(applied.after, 1);
    }

    #[test]
    fn test_modifier_table() {
        let attrs = AttributeSet::new([0, 2, 5, 8, 11, 15]);
        assert_eq!(attrs.modifier(Characteristic::Str), -3);
        assert_eq!(attrs.modifier(Characteristic::Dex), -2);
        assert_eq!(attrs.modifier(Characteristic::End), -1);
        assert_eq!(attrs.modifier(Characteristic::Int), 0);
        assert_eq!(attrs.modifier(Characteristic::Edu), 1);
        assert_eq!(attrs.modifier(Characteristic::Soc), 3);
    }

    #[test]
    fn test_upp_uses_extended_hex() {
        let attrs = AttributeSet::new([7, 7, 7, 10, 9, 8]);
        assert_eq!(attrs.upp(), "777A98");
    }
}
