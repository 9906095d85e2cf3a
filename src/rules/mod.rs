//! Rule tables loaded from TOML
//!
//! Career definitions, shared mishap and event tables and the ruleset-wide
//! constants. Everything here is immutable once loaded.

pub mod career;
mod loader;
pub mod ruleset;
pub mod tables;

pub use career::{
    aging_bracket, AgingBracket, AgingCheck, BenefitEntry, BenefitTables, CareerDefinition,
    Check, LifeEvent, Minimum, Mishap, Qualification, Rank, Reenlistment, Retirement,
    ServiceSkill, SkillEntry, SkillRolls, SkillTables, SkillTier, SurvivalTable, TermDm,
    ThresholdDm,
};
pub use ruleset::{RankBonus, Ruleset};
pub use tables::{BenefitPlan, RuleTables, SurvivalLookup};
