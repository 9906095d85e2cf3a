//! Career records: one entry per term served, plus mustering-out results

use serde::{Deserialize, Serialize};

use crate::character::attributes::AppliedChange;
use crate::character::skills::SkillGain;
use crate::core::types::{CareerId, Characteristic};

/// How the candidate came to serve in a career
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRoute {
    /// Passed the career's qualification
    Qualified,
    /// Failed qualification and was drafted
    Drafted,
    /// Failed qualification and took the fallback career
    Fallback,
}

/// Result of the survival check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalOutcome {
    Survived,
    Injured,
    Dead,
}

/// What killed the character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Failed the survival check outright
    Service,
    /// A mishap injury took a characteristic below the floor
    Injury,
    /// Aging took a characteristic below the floor
    Aging,
}

/// How a term ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOutcome {
    Reenlisted,
    MusteredOut,
    Retired,
    Dead(DeathCause),
}

impl TermOutcome {
    /// Whether the career ends with this term
    pub fn ends_career(&self) -> bool {
        !matches!(self, TermOutcome::Reenlisted)
    }
}

/// Notable things that happened during a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TermEvent {
    Entered { route: EntryRoute },
    Injured { description: String },
    Discharged { description: String },
    LifeEvent { description: String },
    Commendation { description: String },
    Commissioned { rank: u8, title: String },
    CommissionDenied,
    Promoted { rank: u8, title: String },
    Aged { characteristic: Characteristic, loss: i32 },
    ForcedReenlistment,
    ReenlistmentDenied,
    MandatoryRetirement,
    Died { cause: DeathCause },
}

/// One term of service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub career: CareerId,
    /// Term number within this career, from 1
    pub career_term: u32,
    /// Term number across the whole life, from 1
    pub term: u32,
    /// Age at the end of the term
    pub age: u32,
    /// Rank held at the end of the term
    pub rank: u8,
    pub rank_title: String,
    pub survival: SurvivalOutcome,
    pub skills_gained: Vec<SkillGain>,
    pub attribute_changes: Vec<RecordedChange>,
    pub events: Vec<TermEvent>,
    pub outcome: TermOutcome,
}

/// A characteristic change as stored in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedChange {
    pub characteristic: Characteristic,
    pub before: u8,
    pub after: u8,
}

impl From<AppliedChange> for RecordedChange {
    fn from(applied: AppliedChange) -> Self {
        Self {
            characteristic: applied.characteristic,
            before: applied.before,
            after: applied.after,
        }
    }
}

/// A single mustering-out benefit received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BenefitReceived {
    Cash { credits: u64 },
    Item { name: String },
    Characteristic { change: RecordedChange },
    Nothing,
}

/// How a career ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerEnd {
    MusteredOut,
    Retired,
    Died,
    /// The run's term bound stopped the career mid-service
    Interrupted,
}

/// Summary of one career once it has ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub career: CareerId,
    pub route: EntryRoute,
    pub terms: u32,
    pub rank: u8,
    pub rank_title: String,
    pub end: CareerEnd,
    pub benefits: Vec<BenefitReceived>,
    /// Annual retirement pay in credits
    pub pension: u32,
}
