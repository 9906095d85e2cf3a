//! Skill ledger
//!
//! Maps each known skill to its level. Level 0 means known but untrained;
//! absence means unknown. Within a generation run levels only ever go up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::SkillId;

/// A skill level change recorded against a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGain {
    pub skill: SkillId,
    /// Level after the gain
    pub level: u8,
}

/// Skill identifier to level; each skill appears at most once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLedger {
    skills: BTreeMap<SkillId, u8>,
}

impl SkillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of a skill, `None` when unknown
    pub fn level(&self, skill: &SkillId) -> Option<u8> {
        self.skills.get(skill).copied()
    }

    /// Raise a skill by exactly one level; unknown skills enter at level 1
    pub fn improve(&mut self, skill: &SkillId) -> SkillGain {
        let level = self
            .skills
            .entry(skill.clone())
            .and_modify(|l| *l = l.saturating_add(1))
            .or_insert(1);
        SkillGain {
            skill: skill.clone(),
            level: *level,
        }
    }

    /// Ensure a skill is at least `level`; returns the gain if it rose
    ///
    /// Used for service and rank skills, which grant a fixed level rather
    /// than an increment. A skill already at or above `level` is unchanged.
    pub fn grant(&mut self, skill: &SkillId, level: u8) -> Option<SkillGain> {
        match self.skills.get_mut(skill) {
            Some(current) if *current >= level => None,
            Some(current) => {
                *current = level;
                Some(SkillGain {
                    skill: skill.clone(),
                    level,
                })
            }
            None => {
                self.skills.insert(skill.clone(), level);
                Some(SkillGain {
                    skill: skill.clone(),
                    level,
                })
            }
        }
    }

    /// Skills in name order
    pub fn iter(&self) -> impl Iterator<Item = (&SkillId, u8)> {
        self.skills.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Every skill in `self` is known to `later` at an equal or higher level
    pub fn is_subset_of(&self, later: &SkillLedger) -> bool {
        self.skills
            .iter()
            .all(|(skill, &level)| later.level(skill).is_some_and(|l| l >= level))
    }
}
