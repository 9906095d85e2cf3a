//! Character assembler
//!
//! Rolls starting characteristics, then drives the progression engine
//! through careers until the character dies, retires, runs out of careers
//! or hits the total-terms limit. Party generation runs independent
//! characters in parallel, each on its own derived seed.

pub mod output;

pub use output::FinalCharacter;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::character::{AttributeSet, CharacterState};
use crate::core::config::{GenerationConfig, ReenlistPolicy};
use crate::core::error::{ChargenError, Result};
use crate::core::types::{CareerId, Characteristic};
use crate::dice::{Dice, RollKind};
use crate::progression::{CareerEngine, CareerOutcome};
use crate::rules::RuleTables;

/// Golden-ratio increment used to spread party member seeds
const SEED_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// A desired career, or a random pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerChoice {
    Named(String),
    Random,
}

impl From<&str> for CareerChoice {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            CareerChoice::Random
        } else {
            CareerChoice::Named(s.to_string())
        }
    }
}

impl FromStr for CareerChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err("Empty career choice".into())
        } else {
            Ok(CareerChoice::from(s))
        }
    }
}

impl fmt::Display for CareerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CareerChoice::Named(name) => f.write_str(name),
            CareerChoice::Random => f.write_str("random"),
        }
    }
}

/// What the candidate asks for
///
/// Careers are tried in order, one per career slot; slots beyond the list
/// pick at random.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePreferences {
    pub name: String,
    pub careers: Vec<CareerChoice>,
    pub seed: Option<u64>,
    pub max_careers: Option<u32>,
    /// Fixed starting characteristics instead of rolled ones
    pub attributes: Option<AttributeSet>,
    pub reenlistment: Option<ReenlistPolicy>,
}

impl Default for CandidatePreferences {
    fn default() -> Self {
        Self {
            name: "Traveller".to_string(),
            careers: Vec::new(),
            seed: None,
            max_careers: None,
            attributes: None,
            reenlistment: None,
        }
    }
}

impl CandidatePreferences {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Try this career next; names resolve when generation starts
    pub fn with_career(mut self, choice: impl Into<CareerChoice>) -> Self {
        self.careers.push(choice.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_max_careers(mut self, max_careers: u32) -> Self {
        self.max_careers = Some(max_careers);
        self
    }

    pub fn with_reenlistment(mut self, policy: ReenlistPolicy) -> Self {
        self.reenlistment = Some(policy);
        self
    }
}

/// Seed for the `index`th member of a party generated from `base`
pub fn derive_seed(base: u64, index: u64) -> u64 {
    base ^ index.wrapping_mul(SEED_SPREAD)
}

/// Generate one character from a seed chosen by the preferences, the
/// config, or entropy, in that order
pub fn generate(
    tables: &RuleTables,
    config: &GenerationConfig,
    prefs: &CandidatePreferences,
) -> Result<FinalCharacter> {
    let mut dice = match prefs.seed.or(config.seed) {
        Some(seed) => Dice::seeded(seed),
        None => Dice::from_entropy(),
    };
    generate_with_dice(tables, config, prefs, &mut dice)
}

/// Generate one character with caller-supplied dice
///
/// On `BoundExceeded` the error carries the partial character.
pub fn generate_with_dice(
    tables: &RuleTables,
    config: &GenerationConfig,
    prefs: &CandidatePreferences,
    dice: &mut Dice,
) -> Result<FinalCharacter> {
    let mut config = config.clone();
    if let Some(max_careers) = prefs.max_careers {
        config.max_careers = max_careers;
    }
    if let Some(policy) = prefs.reenlistment {
        config.reenlistment = policy;
    }
    config.validate()?;

    // Resolve named careers before the first roll
    let choices = prefs
        .careers
        .iter()
        .map(|choice| match choice {
            CareerChoice::Named(name) => tables.resolve_career(name).map(|c| Some(c.id.clone())),
            CareerChoice::Random => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;

    let ruleset = tables.ruleset();
    let attributes = match prefs.attributes {
        Some(attributes) => check_supplied_attributes(tables, attributes)?,
        None => roll_characteristics(tables, dice),
    };
    let mut state = CharacterState::new(&prefs.name, attributes, ruleset.starting_age, dice.seed());
    tracing::info!("Generating {} ({}) from seed {}", state.name, state.attributes, state.seed);

    let engine = CareerEngine::new(tables, &config);
    while state.careers_entered() < config.max_careers
        && state.total_terms() < config.max_total_terms
    {
        let slot = state.careers_entered() as usize;
        let career = match choices.get(slot).cloned().flatten() {
            Some(id) => id,
            None => random_career(tables, dice)?,
        };

        let enlistment = match engine.enlist(&state, dice, &career) {
            Ok(enlistment) => enlistment,
            Err(ChargenError::QualificationRejected { career }) if slot > 0 => {
                tracing::info!("{} rejected by {}, no further careers", state.name, career);
                break;
            }
            Err(e) => return Err(e),
        };
        engine.begin_career(&mut state, &enlistment)?;

        match engine.run_career(&mut state, dice, config.max_total_terms)? {
            CareerOutcome::MusteredOut => continue,
            CareerOutcome::Retired | CareerOutcome::Dead => break,
            CareerOutcome::BoundReached => {
                engine.interrupt(&mut state)?;
                return Err(ChargenError::BoundExceeded {
                    limit: config.max_total_terms,
                    partial: Box::new(FinalCharacter::new(state)),
                });
            }
        }
    }

    tracing::info!(
        "{} finished {} after {} terms in {} careers",
        state.name,
        state.status.as_str(),
        state.total_terms(),
        state.careers.len()
    );
    Ok(FinalCharacter::new(state))
}

/// Generate `count` independent characters in parallel
///
/// Member `i` uses `derive_seed(base, i)`, so member 0 matches a single
/// `generate` with the base seed and the party is reproducible.
pub fn generate_party(
    tables: &RuleTables,
    config: &GenerationConfig,
    prefs: &CandidatePreferences,
    count: usize,
) -> Vec<Result<FinalCharacter>> {
    let base = prefs.seed.or(config.seed).unwrap_or_else(rand::random);
    tracing::info!("Generating party of {} from seed {}", count, base);

    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut member = prefs.clone();
            member.seed = Some(derive_seed(base, i as u64));
            if count > 1 {
                member.name = format!("{} {}", prefs.name, i + 1);
            }
            generate(tables, config, &member)
        })
        .collect()
}

/// Supplied characteristics must already sit inside the ruleset's range
fn check_supplied_attributes(tables: &RuleTables, attributes: AttributeSet) -> Result<AttributeSet> {
    let ruleset = tables.ruleset();
    for characteristic in Characteristic::ALL {
        let value = attributes.get(characteristic);
        if value < ruleset.attribute_floor || value > ruleset.attribute_max {
            return Err(ChargenError::InvalidConfig(format!(
                "supplied {} {} is outside {}..={}",
                characteristic, value, ruleset.attribute_floor, ruleset.attribute_max
            )));
        }
    }
    Ok(attributes)
}

fn roll_characteristics(tables: &RuleTables, dice: &mut Dice) -> AttributeSet {
    let ruleset = tables.ruleset();
    let mut attributes = AttributeSet::uniform(0);
    for characteristic in Characteristic::ALL {
        let value = dice
            .roll(RollKind::Characteristic, ruleset.characteristic_roll)
            .clamp(ruleset.attribute_floor as i32, ruleset.attribute_max as i32);
        attributes.set(characteristic, value as u8);
    }
    attributes
}

fn random_career(tables: &RuleTables, dice: &mut Dice) -> Result<CareerId> {
    let careers = tables.careers();
    if careers.is_empty() {
        return Err(ChargenError::InvalidRule("ruleset defines no careers".into()));
    }
    Ok(careers[dice.pick(RollKind::CareerChoice, careers.len())].id.clone())
}
