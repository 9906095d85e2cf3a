//! Ruleset-wide constants shared by every career

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{CareerId, SkillId};
use crate::dice::DiceExpr;
use crate::rules::career::AgingBracket;

/// Extra benefit rolls for reaching a rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankBonus {
    pub min_rank: u8,
    pub rolls: u32,
}

/// Global rule constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub name: String,
    /// Dice rolled for each starting characteristic
    pub characteristic_roll: DiceExpr,
    /// A characteristic below this value kills the character
    pub attribute_floor: u8,
    pub attribute_max: u8,
    pub starting_age: u32,
    pub term_years: u32,
    /// Aging throws apply once the character is at least this old
    pub aging_starts_at: u32,
    /// Education needed for the education skill table
    pub advanced_education_min: u8,
    pub fallback_career: CareerId,
    /// Careers the draft picks from, uniformly
    pub draft: Vec<CareerId>,
    /// Qualification DM per career previously entered
    pub qualification_dm_per_career: i32,
    pub max_cash_rolls: u32,
    /// Knowing this skill gives DM+1 on cash rolls
    pub cash_dm_skill: Option<SkillId>,
    /// Rank at which material rolls get DM+1
    pub material_dm_rank: u8,
    pub benefit_rank_bonus: Vec<RankBonus>,
    /// Default aging schedule
    pub aging: Vec<AgingBracket>,
    /// Cascade skill to its specialties
    pub cascades: BTreeMap<SkillId, Vec<SkillId>>,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            characteristic_roll: DiceExpr::two_d6(),
            attribute_floor: 1,
            attribute_max: 15,
            starting_age: 18,
            term_years: 4,
            aging_starts_at: 34,
            advanced_education_min: 8,
            fallback_career: CareerId::from("drifter"),
            draft: Vec::new(),
            qualification_dm_per_career: 0,
            max_cash_rolls: 3,
            cash_dm_skill: None,
            material_dm_rank: 5,
            benefit_rank_bonus: Vec::new(),
            aging: Vec::new(),
            cascades: BTreeMap::new(),
        }
    }
}

impl Ruleset {
    /// Extra benefit rolls for a final rank: the best bonus the rank reaches
    pub fn rank_bonus_rolls(&self, rank: u8) -> u32 {
        self.benefit_rank_bonus
            .iter()
            .filter(|b| rank >= b.min_rank)
            .map(|b| b.rolls)
            .max()
            .unwrap_or(0)
    }
}
