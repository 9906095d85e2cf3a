//! Career progression engine
//!
//! Drives one career at a time through qualification, terms and mustering
//! out. Every mutating step works on a clone of the character state and
//! replaces the caller's state only when the step completes, so an error
//! (always a rule-data defect) never leaves a half-applied term behind.

use serde::{Deserialize, Serialize};

use crate::character::{CareerEnd, CharacterState, Service, ServiceSummary, TermOutcome};
use crate::core::config::GenerationConfig;
use crate::core::error::{ChargenError, Result};
use crate::core::types::CareerId;
use crate::dice::Dice;
use crate::progression::mustering::muster;
use crate::progression::qualification::{self, Enlistment};
use crate::progression::term::run_term;
use crate::rules::RuleTables;

/// How a career run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerOutcome {
    MusteredOut,
    Retired,
    Dead,
    /// The term limit stopped a career that would have continued
    BoundReached,
}

/// Stateless engine over shared rule tables and configuration
#[derive(Debug, Clone, Copy)]
pub struct CareerEngine<'a> {
    tables: &'a RuleTables,
    config: &'a GenerationConfig,
}

impl<'a> CareerEngine<'a> {
    pub fn new(tables: &'a RuleTables, config: &'a GenerationConfig) -> Self {
        Self { tables, config }
    }

    pub fn tables(&self) -> &'a RuleTables {
        self.tables
    }

    pub fn config(&self) -> &'a GenerationConfig {
        self.config
    }

    /// Qualify for a career; does not touch the state
    pub fn enlist(&self, state: &CharacterState, dice: &mut Dice, career: &CareerId) -> Result<Enlistment> {
        if state.is_deceased() {
            return Err(ChargenError::Deceased);
        }
        qualification::enlist(self.tables, self.config, state, dice, career)
    }

    /// Start serving the career an enlistment placed the character in
    pub fn begin_career(&self, state: &mut CharacterState, enlistment: &Enlistment) -> Result<()> {
        if state.is_deceased() {
            return Err(ChargenError::Deceased);
        }
        if let Some(service) = &state.service {
            return Err(ChargenError::InvalidConfig(format!(
                "{} is still serving in {}",
                state.name, service.career
            )));
        }
        let definition = self.tables.career(&enlistment.career)?;

        let service = Service::new(enlistment.career.clone(), enlistment.route);
        if service.drafted() {
            state.drafted = true;
        }
        state.service = Some(service);
        tracing::info!(
            "{} enters {} ({:?}) at age {}",
            state.name,
            definition.name,
            enlistment.route,
            state.age
        );
        Ok(())
    }

    /// Serve one term of the current career and commit it
    ///
    /// A deceased character is refused with `Deceased` and left untouched.
    pub fn serve_term(&self, state: &mut CharacterState, dice: &mut Dice) -> Result<TermOutcome> {
        if state.is_deceased() {
            return Err(ChargenError::Deceased);
        }
        let mut draft = state.clone();
        let outcome = run_term(self.tables, self.config, &mut draft, dice)?;
        *state = draft;
        Ok(outcome)
    }

    /// Roll benefits for a career whose last term ended it, and commit them
    pub fn muster_out(&self, state: &mut CharacterState, dice: &mut Dice) -> Result<ServiceSummary> {
        if state.is_deceased() {
            return Err(ChargenError::Deceased);
        }
        let mut draft = state.clone();
        let summary = muster(self.tables, &mut draft, dice)?;
        *state = draft;
        Ok(summary)
    }

    /// Close a career stopped by the term limit; no benefits are rolled
    pub fn interrupt(&self, state: &mut CharacterState) -> Result<Option<ServiceSummary>> {
        let Some(service) = state.service.take() else {
            return Ok(None);
        };
        let definition = self.tables.career(&service.career)?;
        let summary = ServiceSummary {
            career: service.career.clone(),
            route: service.route,
            terms: service.terms,
            rank: service.rank,
            rank_title: definition.rank_title(service.rank),
            end: CareerEnd::Interrupted,
            benefits: Vec::new(),
            pension: 0,
        };
        state.careers.push(summary.clone());
        Ok(Some(summary))
    }

    /// Serve terms until the career ends or `term_limit` total terms are served
    pub fn run_career(&self, state: &mut CharacterState, dice: &mut Dice, term_limit: u32) -> Result<CareerOutcome> {
        loop {
            if state.total_terms() >= term_limit {
                tracing::warn!("{} reached the limit of {} terms", state.name, term_limit);
                return Ok(CareerOutcome::BoundReached);
            }
            match self.serve_term(state, dice)? {
                TermOutcome::Reenlisted => continue,
                TermOutcome::Dead(_) => return Ok(CareerOutcome::Dead),
                TermOutcome::MusteredOut => {
                    self.muster_out(state, dice)?;
                    return Ok(CareerOutcome::MusteredOut);
                }
                TermOutcome::Retired => {
                    self.muster_out(state, dice)?;
                    return Ok(CareerOutcome::Retired);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{AttributeSet, EntryRoute, Status};
    use crate::dice::RollKind;

    fn recruit(tables: &RuleTables, career: &str, attrs: AttributeSet) -> CharacterState {
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(tables, &config);
        let mut state = CharacterState::new("Recruit", attrs, 18, 0);
        let enlistment = Enlistment {
            requested: CareerId::from(career),
            career: CareerId::from(career),
            route: EntryRoute::Qualified,
        };
        engine.begin_career(&mut state, &enlistment).unwrap();
        state
    }

    #[test]
    fn test_first_term_grants_service_skills() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "scout", AttributeSet::uniform(8));
        let mut dice = Dice::seeded(11).with_forced(RollKind::Survival, [12]);

        engine.serve_term(&mut state, &mut dice).unwrap();
        assert!(state.skills.level(&"Pilot".into()).is_some_and(|l| l >= 1));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.age, 22);
    }

    #[test]
    fn test_death_freezes_state() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "marines", AttributeSet::uniform(7));
        let mut dice = Dice::seeded(3).with_forced(RollKind::Survival, [2]);

        let outcome = engine.serve_term(&mut state, &mut dice).unwrap();
        assert_eq!(outcome, TermOutcome::Dead(crate::character::DeathCause::Service));
        assert_eq!(state.status, Status::Deceased);
        assert!(state.service.is_none());

        let frozen = state.clone();
        assert!(matches!(engine.serve_term(&mut state, &mut dice), Err(ChargenError::Deceased)));
        assert_eq!(state, frozen);
    }

    #[test]
    fn test_forced_discharge_musters_out() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "army", AttributeSet::uniform(9));
        // Army survival 5+ with DM+2: a natural 2 is an injury, not death.
        // Draw point 10 of 11 lands on "Medically discharged".
        let mut dice = Dice::seeded(3)
            .with_forced(RollKind::Survival, [2])
            .with_forced(RollKind::Mishap, [10]);

        let outcome = engine.serve_term(&mut state, &mut dice).unwrap();
        assert_eq!(outcome, TermOutcome::MusteredOut);
        assert_eq!(state.service.as_ref().map(|s| s.forfeited_benefit_rolls), Some(1));

        let summary = engine.muster_out(&mut state, &mut dice).unwrap();
        assert_eq!(summary.end, CareerEnd::MusteredOut);
        assert!(summary.benefits.is_empty());
        assert_eq!(state.status, Status::Active);
    }

    #[test]
    fn test_muster_out_before_career_ends_is_refused() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "navy", AttributeSet::uniform(8));
        let before = state.clone();
        let mut dice = Dice::seeded(3);

        assert!(engine.muster_out(&mut state, &mut dice).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_mandatory_retirement_pays_pension() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "navy", AttributeSet::uniform(10));
        // Forced survival and a reenlistment of 11 each term: never forced
        // to stay, always allowed to, until the seven-term limit.
        let mut dice = Dice::seeded(21)
            .with_forced(RollKind::Survival, [12; 7])
            .with_forced(RollKind::Reenlistment, [11; 7])
            .with_forced(RollKind::Aging, [12; 40]);

        let outcome = engine.run_career(&mut state, &mut dice, 20).unwrap();
        assert_eq!(outcome, CareerOutcome::Retired);
        assert_eq!(state.total_terms(), 7);
        assert_eq!(state.status, Status::Retired);
        assert_eq!(state.benefits.pension, 8000);
        assert_eq!(state.careers[0].end, CareerEnd::Retired);
    }

    #[test]
    fn test_term_limit_stops_a_running_career() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let engine = CareerEngine::new(&tables, &config);
        let mut state = recruit(&tables, "navy", AttributeSet::uniform(10));
        let mut dice = Dice::seeded(21)
            .with_forced(RollKind::Survival, [12; 2])
            .with_forced(RollKind::Reenlistment, [12; 2]);

        let outcome = engine.run_career(&mut state, &mut dice, 2).unwrap();
        assert_eq!(outcome, CareerOutcome::BoundReached);
        assert_eq!(state.total_terms(), 2);

        let summary = engine.interrupt(&mut state).unwrap().unwrap();
        assert_eq!(summary.end, CareerEnd::Interrupted);
        assert!(state.service.is_none());
    }
}
