use thiserror::Error;

use crate::assembler::FinalCharacter;
use crate::core::types::CareerId;

#[derive(Error, Debug)]
pub enum ChargenError {
    #[error("Unknown career: {0}")]
    UnknownCareer(String),

    #[error("Career {career} has no {table} table")]
    MissingTable {
        career: CareerId,
        table: &'static str,
    },

    #[error("Invalid rule data: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to qualify for {career} and the qualification policy rejects the candidate")]
    QualificationRejected { career: CareerId },

    #[error("Safety bound of {limit} terms reached before the character finished")]
    BoundExceeded {
        limit: u32,
        partial: Box<FinalCharacter>,
    },

    #[error("Character is deceased; no further terms can be served")]
    Deceased,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ChargenError {
    /// Data defects in the rule tables or configuration (fatal, never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ChargenError::UnknownCareer(_)
                | ChargenError::MissingTable { .. }
                | ChargenError::InvalidRule(_)
                | ChargenError::InvalidConfig(_)
                | ChargenError::TomlError(_)
        )
    }

    pub(crate) fn missing(career: &CareerId, table: &'static str) -> Self {
        ChargenError::MissingTable {
            career: career.clone(),
            table,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChargenError>;
