//! Career definitions: immutable rule data for one career
//!
//! Every table a career can be asked for is optional at the type level so a
//! defective definition still loads; asking for an absent table through
//! `RuleTables` is a configuration error, never a silent default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::character::{AttributeSet, CharacteristicChange, SurvivalOutcome};
use crate::core::types::{CareerId, Characteristic, SkillId};
use crate::dice::Weighted;

// ============================================================================
// Checks and modifiers
// ============================================================================

/// DM granted when a characteristic reaches a threshold (`DM+2 if End 8+`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdDm {
    pub characteristic: Characteristic,
    pub at_least: u8,
    pub dm: i32,
}

/// Hard characteristic requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    pub characteristic: Characteristic,
    pub at_least: u8,
}

fn threshold_total(dms: &[ThresholdDm], attributes: &AttributeSet) -> i32 {
    dms.iter()
        .filter(|d| attributes.get(d.characteristic) >= d.at_least)
        .map(|d| d.dm)
        .sum()
}

fn characteristic_total(characteristic: Option<Characteristic>, attributes: &AttributeSet) -> i32 {
    characteristic.map_or(0, |c| attributes.modifier(c))
}

/// A 2D6 throw against a target number with modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub target: i32,
    #[serde(default)]
    pub dms: Vec<ThresholdDm>,
    /// Adds this characteristic's modifier to the throw
    #[serde(default)]
    pub characteristic: Option<Characteristic>,
    /// DM per rank currently held
    #[serde(default)]
    pub rank_dm: i32,
}

impl Check {
    pub fn modifier(&self, attributes: &AttributeSet, rank: u8) -> i32 {
        threshold_total(&self.dms, attributes)
            + characteristic_total(self.characteristic, attributes)
            + self.rank_dm * rank as i32
    }

    pub fn passes(&self, total: i32) -> bool {
        total >= self.target
    }
}

/// Entry requirements for a career
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    /// Every minimum must be met before the throw is even attempted
    #[serde(default)]
    pub minimums: Vec<Minimum>,
    pub target: i32,
    #[serde(default)]
    pub dms: Vec<ThresholdDm>,
    #[serde(default)]
    pub characteristic: Option<Characteristic>,
}

impl Qualification {
    /// First unmet minimum, if any
    pub fn unmet_minimum(&self, attributes: &AttributeSet) -> Option<&Minimum> {
        self.minimums
            .iter()
            .find(|m| attributes.get(m.characteristic) < m.at_least)
    }

    pub fn modifier(&self, attributes: &AttributeSet) -> i32 {
        threshold_total(&self.dms, attributes) + characteristic_total(self.characteristic, attributes)
    }
}

/// DM applied to survival from a given career term onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDm {
    pub from_term: u32,
    pub dm: i32,
}

/// Survival throw for one term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalTable {
    pub target: i32,
    /// Failing by at most this much is an injury; beyond it is death.
    /// Absent means every failure is fatal.
    #[serde(default)]
    pub injury_margin: Option<i32>,
    #[serde(default)]
    pub dms: Vec<ThresholdDm>,
    #[serde(default)]
    pub characteristic: Option<Characteristic>,
    #[serde(default)]
    pub rank_dm: i32,
    #[serde(default)]
    pub term_dms: Vec<TermDm>,
}

impl SurvivalTable {
    pub fn modifier(&self, attributes: &AttributeSet, rank: u8) -> i32 {
        threshold_total(&self.dms, attributes)
            + characteristic_total(self.characteristic, attributes)
            + self.rank_dm * rank as i32
    }

    /// Sum of term DMs in force for `term`
    pub fn term_dm(&self, term: u32) -> i32 {
        self.term_dms
            .iter()
            .filter(|t| term >= t.from_term)
            .map(|t| t.dm)
            .sum()
    }

    /// Classify a modified total
    pub fn resolve(&self, total: i32) -> SurvivalOutcome {
        if total >= self.target {
            return SurvivalOutcome::Survived;
        }
        match self.injury_margin {
            Some(margin) if total >= self.target - margin => SurvivalOutcome::Injured,
            _ => SurvivalOutcome::Dead,
        }
    }
}

/// Reenlistment throw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reenlistment {
    pub target: i32,
    /// A natural total at or above this forces another term
    #[serde(default)]
    pub forced_at: Option<i32>,
    #[serde(default)]
    pub dms: Vec<ThresholdDm>,
}

impl Reenlistment {
    pub fn modifier(&self, attributes: &AttributeSet) -> i32 {
        threshold_total(&self.dms, attributes)
    }

    pub fn forces_continuation(&self, natural: i32) -> bool {
        self.forced_at.is_some_and(|f| natural >= f)
    }
}

// ============================================================================
// Ranks and skills
// ============================================================================

/// A rank in a career's rank table; index 0 is the entry rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub title: String,
    /// Skill granted on reaching this rank
    #[serde(default)]
    pub skill: Option<SkillId>,
    #[serde(default = "default_granted_level")]
    pub skill_level: u8,
    /// Characteristic change granted on reaching this rank
    #[serde(default)]
    pub bonus: Option<CharacteristicChange>,
}

fn default_granted_level() -> u8 {
    1
}

/// Skill granted at a fixed level on entering a career
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSkill {
    pub skill: SkillId,
    #[serde(default = "default_granted_level")]
    pub level: u8,
}

/// Skill rolls earned per term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRolls {
    pub first_term: u32,
    pub per_term: u32,
    /// Extra rolls for each commission or promotion this term
    pub per_advancement: u32,
    /// Education needed for `education_bonus` extra rolls
    pub education_min: Option<u8>,
    pub education_bonus: u32,
}

impl Default for SkillRolls {
    fn default() -> Self {
        Self {
            first_term: 2,
            per_term: 1,
            per_advancement: 1,
            education_min: None,
            education_bonus: 0,
        }
    }
}

impl SkillRolls {
    /// Baseline rolls for a term before advancement and event bonuses
    pub fn baseline(&self, career_term: u32, attributes: &AttributeSet) -> u32 {
        let base = if career_term == 1 {
            self.first_term
        } else {
            self.per_term
        };
        let education = match self.education_min {
            Some(min) if attributes.get(Characteristic::Edu) >= min => self.education_bonus,
            _ => 0,
        };
        base + education
    }
}

/// Skill tables a career can draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    /// Personal development
    Personal,
    /// Service skills
    Service,
    /// Advanced education, open to everyone
    Advanced,
    /// Advanced education gated on Education
    Education,
    /// Commissioned officers only
    Officer,
}

impl SkillTier {
    pub const ALL: [SkillTier; 5] = [
        SkillTier::Personal,
        SkillTier::Service,
        SkillTier::Advanced,
        SkillTier::Education,
        SkillTier::Officer,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            SkillTier::Personal => "personal skills",
            SkillTier::Service => "service skills",
            SkillTier::Advanced => "advanced education",
            SkillTier::Education => "education skills",
            SkillTier::Officer => "officer skills",
        }
    }

    /// Tables every career must carry
    pub fn is_required(self) -> bool {
        matches!(self, SkillTier::Personal | SkillTier::Service)
    }
}

/// One row of a skill table: a skill, or a characteristic change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillEntry {
    Skill(SkillId),
    Characteristic(CharacteristicChange),
}

impl fmt::Display for SkillEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillEntry::Skill(skill) => write!(f, "{}", skill),
            SkillEntry::Characteristic(change) => write!(f, "{}", change),
        }
    }
}

impl FromStr for SkillEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty skill table entry".into());
        }
        if CharacteristicChange::looks_like(s) {
            Ok(SkillEntry::Characteristic(s.parse()?))
        } else {
            Ok(SkillEntry::Skill(SkillId::new(s)))
        }
    }
}

impl TryFrom<String> for SkillEntry {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SkillEntry> for String {
    fn from(entry: SkillEntry) -> Self {
        entry.to_string()
    }
}

/// A career's skill tables, one per tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillTables {
    pub personal: Option<Vec<SkillEntry>>,
    pub service: Option<Vec<SkillEntry>>,
    pub advanced: Option<Vec<SkillEntry>>,
    pub education: Option<Vec<SkillEntry>>,
    pub officer: Option<Vec<SkillEntry>>,
}

impl SkillTables {
    pub fn get(&self, tier: SkillTier) -> Option<&[SkillEntry]> {
        match tier {
            SkillTier::Personal => self.personal.as_deref(),
            SkillTier::Service => self.service.as_deref(),
            SkillTier::Advanced => self.advanced.as_deref(),
            SkillTier::Education => self.education.as_deref(),
            SkillTier::Officer => self.officer.as_deref(),
        }
    }
}

// ============================================================================
// Mishaps, events, aging
// ============================================================================

/// Entry of a mishap table, consulted on an injury result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mishap {
    pub weight: u32,
    pub description: String,
    #[serde(default)]
    pub injuries: Vec<CharacteristicChange>,
    /// Forces the character out of the career at the end of the term
    #[serde(default)]
    pub discharge: bool,
}

impl Weighted for Mishap {
    fn weight(&self) -> u32 {
        self.weight
    }
}

/// Entry of a life event table, consulted on terms survived uninjured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub weight: u32,
    pub description: String,
    /// DM on this term's advancement throws; positive values are commendations
    #[serde(default)]
    pub advancement_dm: i32,
    #[serde(default)]
    pub extra_skill_rolls: u32,
    #[serde(default)]
    pub extra_benefit_rolls: u32,
    #[serde(default)]
    pub characteristic: Option<CharacteristicChange>,
    #[serde(default)]
    pub skill: Option<SkillId>,
}

impl Weighted for LifeEvent {
    fn weight(&self) -> u32 {
        self.weight
    }
}

/// One characteristic's aging throw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingCheck {
    pub characteristic: Characteristic,
    /// Throw this or more on 2D6 to avoid the loss
    pub target: i32,
    pub loss: i32,
}

/// Aging throws in force from an age onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingBracket {
    pub from_age: u32,
    pub checks: Vec<AgingCheck>,
}

/// Bracket in force at `age`: the one with the greatest `from_age <= age`
pub fn aging_bracket(schedule: &[AgingBracket], age: u32) -> Option<&AgingBracket> {
    schedule
        .iter()
        .filter(|b| b.from_age <= age)
        .max_by_key(|b| b.from_age)
}

// ============================================================================
// Benefits and retirement
// ============================================================================

/// One row of a material benefits table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BenefitEntry {
    Item(String),
    Characteristic(CharacteristicChange),
    Nothing,
}

impl fmt::Display for BenefitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenefitEntry::Item(name) => f.write_str(name),
            BenefitEntry::Characteristic(change) => write!(f, "{}", change),
            BenefitEntry::Nothing => f.write_str("-"),
        }
    }
}

impl FromStr for BenefitEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "-" {
            Ok(BenefitEntry::Nothing)
        } else if CharacteristicChange::looks_like(s) {
            Ok(BenefitEntry::Characteristic(s.parse()?))
        } else {
            Ok(BenefitEntry::Item(s.to_string()))
        }
    }
}

impl TryFrom<String> for BenefitEntry {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BenefitEntry> for String {
    fn from(entry: BenefitEntry) -> Self {
        entry.to_string()
    }
}

/// Mustering-out tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitTables {
    /// Credits per row
    pub cash: Option<Vec<u64>>,
    pub material: Option<Vec<BenefitEntry>>,
}

/// Retirement terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retirement {
    /// Terms needed before retiring is possible
    pub min_terms: u32,
    /// Terms after which retirement is mandatory unless forced to continue
    #[serde(default)]
    pub max_terms: Option<u32>,
    /// Annual pension at `min_terms`
    #[serde(default)]
    pub pension: u32,
    /// Additional annual pension per term beyond `min_terms`
    #[serde(default)]
    pub pension_per_term: u32,
    /// DM on cash rolls when retired
    #[serde(default)]
    pub cash_dm: i32,
    /// Extra benefit rolls when retired
    #[serde(default)]
    pub extra_rolls: u32,
}

impl Retirement {
    pub fn eligible(&self, terms: u32) -> bool {
        terms >= self.min_terms
    }

    pub fn mandatory(&self, terms: u32) -> bool {
        self.max_terms.is_some_and(|m| terms >= m)
    }

    /// Annual pension for a career of `terms` terms
    pub fn pension_for(&self, terms: u32) -> u32 {
        if !self.eligible(terms) {
            return 0;
        }
        self.pension + self.pension_per_term * (terms - self.min_terms)
    }
}

// ============================================================================
// Career definition
// ============================================================================

/// Immutable rule data for one career
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerDefinition {
    pub id: CareerId,
    pub name: String,
    #[serde(default)]
    pub qualification: Option<Qualification>,
    #[serde(default)]
    pub survival: Option<SurvivalTable>,
    #[serde(default)]
    pub commission: Option<Check>,
    #[serde(default)]
    pub promotion: Option<Check>,
    #[serde(default)]
    pub reenlistment: Option<Reenlistment>,
    #[serde(default)]
    pub ranks: Vec<Rank>,
    #[serde(default)]
    pub service_skills: Vec<ServiceSkill>,
    #[serde(default)]
    pub skill_rolls: SkillRolls,
    #[serde(default)]
    pub skills: SkillTables,
    #[serde(default)]
    pub benefits: BenefitTables,
    /// Name of the shared mishap table
    #[serde(default)]
    pub mishaps: Option<String>,
    /// Name of the shared life event table
    #[serde(default)]
    pub events: Option<String>,
    /// Career-specific aging schedule, replacing the ruleset's
    #[serde(default)]
    pub aging: Option<Vec<AgingBracket>>,
    #[serde(default)]
    pub retirement: Option<Retirement>,
}

impl CareerDefinition {
    /// Highest rank index in the rank table
    pub fn max_rank(&self) -> u8 {
        self.ranks.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    pub fn rank(&self, rank: u8) -> Option<&Rank> {
        self.ranks.get(rank as usize)
    }

    /// Title for a rank; empty for careers without a rank table
    pub fn rank_title(&self, rank: u8) -> String {
        match self.rank(rank) {
            Some(r) => r.title.clone(),
            None if self.ranks.is_empty() => String::new(),
            None => format!("Rank {}", rank),
        }
    }

    /// Whether the career has a commission track at all
    pub fn has_commission(&self) -> bool {
        self.commission.is_some()
    }

    /// Whether `name` refers to this career (id or display name, any case)
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.id.as_str().eq_ignore_ascii_case(name) || self.name.eq_ignore_ascii_case(name)
    }
}
