//! Read-only rule tables and the lookup contract the engine consumes
//!
//! `RuleTables` is built once, validated structurally, then shared by
//! reference across any number of generation runs. A lookup for a table a
//! career does not define fails with `MissingTable`; nothing is substituted.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::character::AttributeSet;
use crate::core::error::{ChargenError, Result};
use crate::core::types::{CareerId, Characteristic, SkillId};
use crate::dice::WeightedTable;
use crate::rules::career::{
    AgingBracket, BenefitEntry, CareerDefinition, Check, LifeEvent, Mishap, Qualification,
    Reenlistment, SkillEntry, SkillTier, SurvivalTable,
};
use crate::rules::ruleset::Ruleset;

/// Survival table resolved for a particular term
#[derive(Debug, Clone, Copy)]
pub struct SurvivalLookup<'a> {
    pub table: &'a SurvivalTable,
    /// Term DMs in force for the looked-up term
    pub term_dm: i32,
}

impl SurvivalLookup<'_> {
    pub fn modifier(&self, attributes: &AttributeSet, rank: u8) -> i32 {
        self.table.modifier(attributes, rank) + self.term_dm
    }
}

/// Benefit tables plus the number of rolls owed and their DMs
#[derive(Debug, Clone, Copy)]
pub struct BenefitPlan<'a> {
    pub cash: &'a [u64],
    pub material: &'a [BenefitEntry],
    /// Terms served plus the rank bonus
    pub rolls: u32,
    pub max_cash_rolls: u32,
    pub material_dm: i32,
}

/// Validated, immutable rule data
#[derive(Debug, Clone)]
pub struct RuleTables {
    ruleset: Ruleset,
    careers: Vec<CareerDefinition>,
    index: AHashMap<CareerId, usize>,
    mishap_tables: BTreeMap<String, WeightedTable<Mishap>>,
    event_tables: BTreeMap<String, WeightedTable<LifeEvent>>,
}

impl RuleTables {
    /// Build and structurally validate rule tables
    pub fn new(
        ruleset: Ruleset,
        careers: Vec<CareerDefinition>,
        mishap_tables: BTreeMap<String, Vec<Mishap>>,
        event_tables: BTreeMap<String, Vec<LifeEvent>>,
    ) -> Result<Self> {
        let mut tables = Self {
            ruleset,
            careers: Vec::new(),
            index: AHashMap::new(),
            mishap_tables: BTreeMap::new(),
            event_tables: BTreeMap::new(),
        };
        tables.add_shared_tables(mishap_tables, event_tables)?;
        for career in careers {
            tables.add_career(career)?;
        }
        tables.check_references()?;
        Ok(tables)
    }

    pub(crate) fn add_shared_tables(
        &mut self,
        mishap_tables: BTreeMap<String, Vec<Mishap>>,
        event_tables: BTreeMap<String, Vec<LifeEvent>>,
    ) -> Result<()> {
        for (name, entries) in mishap_tables {
            let table = WeightedTable::new(&format!("mishap_tables.{}", name), entries)?;
            if self.mishap_tables.insert(name.clone(), table).is_some() {
                return Err(ChargenError::InvalidRule(format!(
                    "duplicate mishap table {}",
                    name
                )));
            }
        }
        for (name, entries) in event_tables {
            let table = WeightedTable::new(&format!("event_tables.{}", name), entries)?;
            if self.event_tables.insert(name.clone(), table).is_some() {
                return Err(ChargenError::InvalidRule(format!(
                    "duplicate event table {}",
                    name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn add_career(&mut self, career: CareerDefinition) -> Result<()> {
        check_career_shape(&career)?;
        if self.index.contains_key(&career.id) {
            return Err(ChargenError::InvalidRule(format!(
                "duplicate career id {}",
                career.id
            )));
        }
        self.index.insert(career.id.clone(), self.careers.len());
        self.careers.push(career);
        Ok(())
    }

    /// Cross-references: fallback and draft careers, shared table names
    pub(crate) fn check_references(&self) -> Result<()> {
        if !self.index.contains_key(&self.ruleset.fallback_career) {
            return Err(ChargenError::InvalidRule(format!(
                "fallback career {} is not defined",
                self.ruleset.fallback_career
            )));
        }
        if let Some(id) = self.ruleset.draft.iter().find(|id| !self.index.contains_key(*id)) {
            return Err(ChargenError::InvalidRule(format!(
                "draft career {} is not defined",
                id
            )));
        }
        if self.ruleset.attribute_floor > self.ruleset.attribute_max {
            return Err(ChargenError::InvalidRule(
                "attribute_floor exceeds attribute_max".into(),
            ));
        }
        if self.ruleset.term_years == 0 {
            return Err(ChargenError::InvalidRule("term_years must be positive".into()));
        }
        for career in &self.careers {
            if let Some(name) = &career.mishaps {
                if !self.mishap_tables.contains_key(name) {
                    return Err(ChargenError::InvalidRule(format!(
                        "career {} references unknown mishap table {}",
                        career.id, name
                    )));
                }
            }
            if let Some(name) = &career.events {
                if !self.event_tables.contains_key(name) {
                    return Err(ChargenError::InvalidRule(format!(
                        "career {} references unknown event table {}",
                        career.id, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Careers in definition order
    pub fn careers(&self) -> &[CareerDefinition] {
        &self.careers
    }

    pub fn career(&self, id: &CareerId) -> Result<&CareerDefinition> {
        self.index
            .get(id)
            .map(|&i| &self.careers[i])
            .ok_or_else(|| ChargenError::UnknownCareer(id.to_string()))
    }

    /// Career by id or display name, case-insensitive
    pub fn resolve_career(&self, name: &str) -> Result<&CareerDefinition> {
        self.careers
            .iter()
            .find(|c| c.matches(name))
            .ok_or_else(|| ChargenError::UnknownCareer(name.trim().to_string()))
    }

    pub fn fallback_career(&self) -> Result<&CareerDefinition> {
        self.career(&self.ruleset.fallback_career)
    }

    // === LOOKUPS ===

    pub fn lookup_qualification(&self, career: &CareerId) -> Result<&Qualification> {
        self.career(career)?
            .qualification
            .as_ref()
            .ok_or_else(|| ChargenError::missing(career, "qualification"))
    }

    /// Survival table for `term` (career term, from 1) with its term DMs
    pub fn lookup_survival(&self, career: &CareerId, term: u32) -> Result<SurvivalLookup<'_>> {
        let table = self
            .career(career)?
            .survival
            .as_ref()
            .ok_or_else(|| ChargenError::missing(career, "survival"))?;
        Ok(SurvivalLookup {
            table,
            term_dm: table.term_dm(term),
        })
    }

    pub fn lookup_commission(&self, career: &CareerId) -> Result<Option<&Check>> {
        Ok(self.career(career)?.commission.as_ref())
    }

    pub fn lookup_promotion(&self, career: &CareerId) -> Result<Option<&Check>> {
        Ok(self.career(career)?.promotion.as_ref())
    }

    pub fn lookup_skills(&self, career: &CareerId, tier: SkillTier) -> Result<&[SkillEntry]> {
        self.career(career)?
            .skills
            .get(tier)
            .ok_or_else(|| ChargenError::missing(career, tier.table_name()))
    }

    /// Skill tables open to a character right now
    ///
    /// Personal and service are always offered, so a career missing either
    /// fails at the lookup instead of quietly narrowing the choice.
    pub fn eligible_tiers(
        &self,
        career: &CareerId,
        attributes: &AttributeSet,
        commissioned: bool,
    ) -> Result<Vec<SkillTier>> {
        let definition = self.career(career)?;
        let tiers = SkillTier::ALL
            .into_iter()
            .filter(|&tier| match tier {
                SkillTier::Personal | SkillTier::Service => true,
                SkillTier::Advanced => definition.skills.get(tier).is_some(),
                SkillTier::Education => {
                    definition.skills.get(tier).is_some()
                        && attributes.get(Characteristic::Edu) >= self.ruleset.advanced_education_min
                }
                SkillTier::Officer => commissioned && definition.skills.get(tier).is_some(),
            })
            .collect();
        Ok(tiers)
    }

    /// Benefit tables for a career ending after `terms` terms at `rank`
    pub fn lookup_benefits(&self, career: &CareerId, terms: u32, rank: u8) -> Result<BenefitPlan<'_>> {
        let definition = self.career(career)?;
        let (cash, material) = match (&definition.benefits.cash, &definition.benefits.material) {
            (None, None) => return Err(ChargenError::missing(career, "benefits")),
            (None, Some(_)) => return Err(ChargenError::missing(career, "cash benefits")),
            (Some(_), None) => return Err(ChargenError::missing(career, "material benefits")),
            (Some(cash), Some(material)) => (cash.as_slice(), material.as_slice()),
        };
        let material_dm = i32::from(rank >= self.ruleset.material_dm_rank);
        Ok(BenefitPlan {
            cash,
            material,
            rolls: terms + self.ruleset.rank_bonus_rolls(rank),
            max_cash_rolls: self.ruleset.max_cash_rolls,
            material_dm,
        })
    }

    pub fn lookup_mishaps(&self, career: &CareerId) -> Result<&WeightedTable<Mishap>> {
        self.career(career)?
            .mishaps
            .as_ref()
            .and_then(|name| self.mishap_tables.get(name))
            .ok_or_else(|| ChargenError::missing(career, "mishap"))
    }

    /// Life events are optional; `None` means the career has none
    pub fn lookup_events(&self, career: &CareerId) -> Result<Option<&WeightedTable<LifeEvent>>> {
        Ok(self
            .career(career)?
            .events
            .as_ref()
            .and_then(|name| self.event_tables.get(name)))
    }

    pub fn lookup_reenlistment(&self, career: &CareerId) -> Result<&Reenlistment> {
        self.career(career)?
            .reenlistment
            .as_ref()
            .ok_or_else(|| ChargenError::missing(career, "reenlistment"))
    }

    /// Career aging schedule, or the ruleset default
    pub fn lookup_aging(&self, career: &CareerId) -> Result<&[AgingBracket]> {
        let definition = self.career(career)?;
        Ok(definition.aging.as_deref().unwrap_or(&self.ruleset.aging))
    }

    /// Specialties of a cascade skill; `None` for an ordinary skill
    pub fn cascade(&self, skill: &SkillId) -> Option<&[SkillId]> {
        self.ruleset
            .cascades
            .get(skill)
            .map(Vec::as_slice)
            .filter(|s| !s.is_empty())
    }

    /// Every table the engine could ask for and would not find
    ///
    /// Missing tables are not load errors; this is the pre-flight report.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for career in &self.careers {
            let id = &career.id;
            let mut missing = |table: &str| issues.push(format!("{}: missing {} table", id, table));
            if career.qualification.is_none() {
                missing("qualification");
            }
            if career.survival.is_none() {
                missing("survival");
            }
            if career.reenlistment.is_none() {
                missing("reenlistment");
            }
            if career.mishaps.is_none() {
                missing("mishap");
            }
            for tier in SkillTier::ALL.into_iter().filter(|t| t.is_required()) {
                if career.skills.get(tier).is_none() {
                    missing(tier.table_name());
                }
            }
            if career.benefits.cash.is_none() {
                missing("cash benefits");
            }
            if career.benefits.material.is_none() {
                missing("material benefits");
            }
            if (career.commission.is_some() || career.promotion.is_some()) && career.ranks.len() < 2 {
                issues.push(format!("{}: advancement checks but fewer than two ranks", id));
            }
            if career.skills.officer.is_some() && !career.has_commission() {
                issues.push(format!("{}: officer skills but no commission", id));
            }
        }
        issues
    }
}

/// Structural defects detectable from one career definition alone
fn check_career_shape(career: &CareerDefinition) -> Result<()> {
    let invalid = |msg: String| Err(ChargenError::InvalidRule(format!("career {}: {}", career.id, msg)));

    if career.id.as_str().trim().is_empty() {
        return Err(ChargenError::InvalidRule("career with empty id".into()));
    }
    for tier in SkillTier::ALL {
        let Some(entries) = career.skills.get(tier) else {
            continue;
        };
        if entries.len() != 6 {
            return invalid(format!(
                "{} table has {} entries, expected 6",
                tier.table_name(),
                entries.len()
            ));
        }
        for entry in entries {
            if let SkillEntry::Characteristic(change) = entry {
                if change.amount < 0 {
                    return invalid(format!("{} table lowers a characteristic ({})", tier.table_name(), change));
                }
            }
        }
    }
    if career.benefits.cash.as_ref().is_some_and(Vec::is_empty) {
        return invalid("cash benefits table is empty".into());
    }
    if let Some(material) = &career.benefits.material {
        if material.is_empty() {
            return invalid("material benefits table is empty".into());
        }
        for entry in material {
            if let BenefitEntry::Characteristic(change) = entry {
                if change.amount < 0 {
                    return invalid(format!("material benefit lowers a characteristic ({})", change));
                }
            }
        }
    }
    if let Some(retirement) = &career.retirement {
        if retirement.max_terms.is_some_and(|max| max < retirement.min_terms) {
            return invalid("retirement max_terms below min_terms".into());
        }
    }
    Ok(())
}
