//! Generation configuration with documented defaults
//!
//! Policies the rule tables do not decide (what happens when a candidate
//! fails to qualify, how long they want to serve, how an injury discharge
//! interacts with the rest of the term) and the safety bounds that
//! guarantee every run terminates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{ChargenError, Result};

/// What to do when a candidate fails to qualify for the chosen career
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationFailurePolicy {
    /// Enter the ruleset's fallback career (the drifter)
    #[default]
    Fallback,
    /// Submit to the draft once per character, fallback career afterwards
    Draft,
    /// Refuse the candidate
    Reject,
}

impl FromStr for QualificationFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" | "drifter" => Ok(Self::Fallback),
            "draft" => Ok(Self::Draft),
            "reject" => Ok(Self::Reject),
            other => Err(format!("Unknown qualification policy: {}", other)),
        }
    }
}

/// What a mishap that forces discharge takes away from the current term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryDischargePolicy {
    /// Skip advancement, still roll the term's skills
    #[default]
    ForfeitAdvancement,
    /// Skip advancement and every skill roll of the term
    ForfeitTerm,
}

/// The candidate's own wish to continue serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReenlistPolicy {
    /// Always ask to reenlist; the tables decide
    #[default]
    Always,
    /// Leave after the first term unless forced to stay
    Never,
    /// Serve this many terms per career, then leave
    Terms(u32),
}

impl ReenlistPolicy {
    /// Whether the candidate wants another term after `served` terms
    pub fn wants_another(&self, served: u32) -> bool {
        match self {
            ReenlistPolicy::Always => true,
            ReenlistPolicy::Never => false,
            ReenlistPolicy::Terms(n) => served < *n,
        }
    }
}

impl fmt::Display for ReenlistPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReenlistPolicy::Always => write!(f, "always"),
            ReenlistPolicy::Never => write!(f, "never"),
            ReenlistPolicy::Terms(n) => write!(f, "{} terms", n),
        }
    }
}

/// Configuration for character generation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of careers a character may enter
    ///
    /// Reaching it after a muster-out is a normal end of generation.
    pub max_careers: u32,

    /// Maximum number of terms across all careers
    ///
    /// The termination guarantee. A career still running when it is hit
    /// ends the run with `BoundExceeded` and a partial character.
    pub max_total_terms: u32,

    /// Policy applied when qualification fails
    pub qualification_failure: QualificationFailurePolicy,

    /// How a discharging mishap interacts with the rest of its term
    pub injury_discharge: InjuryDischargePolicy,

    /// Candidate's reenlistment wish
    pub reenlistment: ReenlistPolicy,

    /// Retire (rather than muster out for another career) once eligible
    pub retire_when_eligible: bool,

    /// Default seed when the candidate does not supply one
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_careers: 3,
            // Seven-term careers three times over, rounded down
            max_total_terms: 20,
            qualification_failure: QualificationFailurePolicy::Fallback,
            injury_discharge: InjuryDischargePolicy::ForfeitAdvancement,
            reenlistment: ReenlistPolicy::Always,
            retire_when_eligible: true,
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GenerationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_careers == 0 {
            return Err(ChargenError::InvalidConfig(
                "max_careers must be at least 1".into(),
            ));
        }
        if self.max_total_terms == 0 {
            return Err(ChargenError::InvalidConfig(
                "max_total_terms must be at least 1".into(),
            ));
        }
        if self.reenlistment == ReenlistPolicy::Terms(0) {
            return Err(ChargenError::InvalidConfig(
                "reenlistment terms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
