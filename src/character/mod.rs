//! Character state and its parts
//!
//! The attribute set, skill ledger and career records are owned by a single
//! `CharacterState`, created once per generation run and mutated only by the
//! progression engine.

pub mod attributes;
pub mod record;
pub mod skills;
pub mod state;

pub use attributes::{AppliedChange, AttributeSet, CharacteristicChange};
pub use record::{
    BenefitReceived, CareerEnd, CareerRecord, DeathCause, EntryRoute, RecordedChange,
    ServiceSummary, SurvivalOutcome, TermEvent, TermOutcome,
};
pub use skills::{SkillGain, SkillLedger};
pub use state::{Benefits, CharacterState, Service, Status};
