//! Character state - the aggregate mutated by the progression engine

use serde::{Deserialize, Serialize};

use crate::character::attributes::AttributeSet;
use crate::character::record::{CareerRecord, EntryRoute, ServiceSummary};
use crate::character::skills::SkillLedger;
use crate::core::types::CareerId;

/// Terminal-status flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "alive-active")]
    Active,
    #[serde(rename = "alive-retired")]
    Retired,
    #[serde(rename = "deceased")]
    Deceased,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "alive-active",
            Status::Retired => "alive-retired",
            Status::Deceased => "deceased",
        }
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self, Status::Deceased)
    }
}

/// Accumulated mustering-out benefits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefits {
    pub credits: u64,
    pub items: Vec<String>,
    /// Annual retirement pay in credits
    pub pension: u32,
}

/// The career currently being served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub career: CareerId,
    pub route: EntryRoute,
    /// Terms completed in this career
    pub terms: u32,
    pub rank: u8,
    pub commissioned: bool,
    /// A commission may be attempted once per career
    pub commission_attempted: bool,
    /// Terms whose benefit roll was forfeited by a discharge
    pub forfeited_benefit_rolls: u32,
    /// Benefit rolls earned from life events
    pub extra_benefit_rolls: u32,
}

impl Service {
    pub fn new(career: CareerId, route: EntryRoute) -> Self {
        Self {
            career,
            route,
            terms: 0,
            rank: 0,
            commissioned: false,
            commission_attempted: false,
            forfeited_benefit_rolls: 0,
            extra_benefit_rolls: 0,
        }
    }

    pub fn drafted(&self) -> bool {
        self.route == EntryRoute::Drafted
    }
}

/// The character being generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    pub name: String,
    pub seed: u64,
    pub attributes: AttributeSet,
    pub skills: SkillLedger,
    pub age: u32,
    /// Every term served, across all careers, in order
    pub history: Vec<CareerRecord>,
    /// Careers that have ended
    pub careers: Vec<ServiceSummary>,
    /// Career in progress, if any
    pub service: Option<Service>,
    pub benefits: Benefits,
    pub status: Status,
    /// The draft may be used once per character
    pub drafted: bool,
}

impl CharacterState {
    pub fn new(name: impl Into<String>, attributes: AttributeSet, age: u32, seed: u64) -> Self {
        Self {
            name: name.into(),
            seed,
            attributes,
            skills: SkillLedger::new(),
            age,
            history: Vec::new(),
            careers: Vec::new(),
            service: None,
            benefits: Benefits::default(),
            status: Status::Active,
            drafted: false,
        }
    }

    /// Terms served across all careers
    pub fn total_terms(&self) -> u32 {
        self.history.len() as u32
    }

    /// Careers entered, including the one in progress
    pub fn careers_entered(&self) -> u32 {
        self.careers.len() as u32 + u32::from(self.service.is_some())
    }

    pub fn is_deceased(&self) -> bool {
        self.status == Status::Deceased
    }

    pub fn last_record(&self) -> Option<&CareerRecord> {
        self.history.last()
    }
}
