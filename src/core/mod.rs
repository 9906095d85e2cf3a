pub mod config;
pub mod error;
pub mod types;

pub use config::{GenerationConfig, InjuryDischargePolicy, QualificationFailurePolicy, ReenlistPolicy};
pub use error::{ChargenError, Result};
pub use types::{CareerId, Characteristic, SkillId};
