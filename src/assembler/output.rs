//! Finished characters and their serialization

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::character::{
    CareerRecord, CharacterState, ServiceSummary, SkillLedger, Status, TermEvent,
};
use crate::core::error::Result;

/// An immutable snapshot of a generated character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalCharacter {
    state: CharacterState,
}

impl FinalCharacter {
    pub(crate) fn new(state: CharacterState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    pub fn records(&self) -> &[CareerRecord] {
        &self.state.history
    }

    pub fn careers(&self) -> &[ServiceSummary] {
        &self.state.careers
    }

    pub fn skills(&self) -> &SkillLedger {
        &self.state.skills
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Character sheet as plain text
    pub fn summary(&self) -> String {
        let state = &self.state;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{}  {}  Age {}  [{}]",
            state.name,
            state.attributes.upp(),
            state.age,
            state.status.as_str()
        );
        let _ = writeln!(out, "Seed {}", state.seed);

        for career in &state.careers {
            let _ = write!(
                out,
                "{}: {} term{}",
                career.career,
                career.terms,
                if career.terms == 1 { "" } else { "s" }
            );
            if !career.rank_title.is_empty() {
                let _ = write!(out, ", {}", career.rank_title);
            }
            let _ = writeln!(out, " ({:?})", career.end);
        }

        let skills: Vec<String> = state
            .skills
            .iter()
            .map(|(skill, level)| format!("{}-{}", skill, level))
            .collect();
        let _ = writeln!(
            out,
            "Skills: {}",
            if skills.is_empty() { "none".to_string() } else { skills.join(", ") }
        );

        let _ = write!(out, "Cr{}", state.benefits.credits);
        if state.benefits.pension > 0 {
            let _ = write!(out, ", pension Cr{}/year", state.benefits.pension);
        }
        if !state.benefits.items.is_empty() {
            let _ = write!(out, ", {}", state.benefits.items.join(", "));
        }
        out.push('\n');

        for record in &state.history {
            let _ = writeln!(
                out,
                "  Term {} ({} {}, age {}): {:?}{}",
                record.term,
                record.career,
                record.career_term,
                record.age,
                record.outcome,
                describe_events(&record.events)
            );
        }
        out
    }
}

fn describe_events(events: &[TermEvent]) -> String {
    let notes: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            TermEvent::Injured { description } => Some(format!("injured ({})", description)),
            TermEvent::Commendation { description } => Some(description.clone()),
            TermEvent::Commissioned { title, .. } => Some(format!("commissioned {}", title)),
            TermEvent::Promoted { title, .. } => Some(format!("promoted {}", title)),
            TermEvent::Aged { characteristic, loss } => Some(format!("aged -{} {}", loss, characteristic)),
            TermEvent::MandatoryRetirement => Some("mandatory retirement".to_string()),
            _ => None,
        })
        .collect();
    if notes.is_empty() {
        String::new()
    } else {
        format!(" - {}", notes.join("; "))
    }
}
