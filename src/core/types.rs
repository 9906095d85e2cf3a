//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a career definition in the rule tables (e.g. "navy")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CareerId(pub String);

impl CareerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CareerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CareerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a skill in the skill ledger (e.g. "Vacc Suit")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The six characteristics of the Universal Personality Profile, in UPP order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Characteristic {
    Str,
    Dex,
    End,
    Int,
    Edu,
    Soc,
}

impl Characteristic {
    /// All characteristics in UPP order
    pub const ALL: [Characteristic; 6] = [
        Characteristic::Str,
        Characteristic::Dex,
        Characteristic::End,
        Characteristic::Int,
        Characteristic::Edu,
        Characteristic::Soc,
    ];

    /// Position in the UPP string
    pub fn index(self) -> usize {
        match self {
            Characteristic::Str => 0,
            Characteristic::Dex => 1,
            Characteristic::End => 2,
            Characteristic::Int => 3,
            Characteristic::Edu => 4,
            Characteristic::Soc => 5,
        }
    }

    /// Short display label ("Str", "Dex", ...)
    pub fn label(self) -> &'static str {
        match self {
            Characteristic::Str => "Str",
            Characteristic::Dex => "Dex",
            Characteristic::End => "End",
            Characteristic::Int => "Int",
            Characteristic::Edu => "Edu",
            Characteristic::Soc => "Soc",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Characteristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(Characteristic::Str),
            "dex" | "dexterity" => Ok(Characteristic::Dex),
            "end" | "endurance" => Ok(Characteristic::End),
            "int" | "intelligence" => Ok(Characteristic::Int),
            "edu" | "education" => Ok(Characteristic::Edu),
            "soc" | "social" | "social standing" => Ok(Characteristic::Soc),
            other => Err(format!("Unknown characteristic: {}", other)),
        }
    }
}

impl TryFrom<String> for Characteristic {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
