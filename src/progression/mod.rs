//! Career progression: qualification, terms of service, mustering out
//!
//! Each term runs through survival, mishap or life event, advancement,
//! skills, aging and reenlistment. Death, discharge and retirement are
//! ordinary outcomes; only rule-data defects surface as errors.

pub mod aging;
pub mod engine;
mod mustering;
pub mod qualification;
pub mod term;

pub use aging::{age_character, AgingResult};
pub use engine::{CareerEngine, CareerOutcome};
pub use qualification::{enlist, Enlistment};
pub use term::TermPhase;
