//! Qualifying for a career, with the configured failure policy

use serde::{Deserialize, Serialize};

use crate::character::{CharacterState, EntryRoute};
use crate::core::config::{GenerationConfig, QualificationFailurePolicy};
use crate::core::error::{ChargenError, Result};
use crate::core::types::CareerId;
use crate::dice::{Dice, RollKind};
use crate::rules::RuleTables;

/// Where a qualification attempt placed the candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enlistment {
    /// Career the candidate asked for
    pub requested: CareerId,
    /// Career the candidate will actually serve in
    pub career: CareerId,
    pub route: EntryRoute,
}

/// Attempt to qualify for `requested`
///
/// A candidate below any hard minimum fails without a throw. Otherwise 2D6
/// plus the qualification DMs, plus the per-career DM for every career
/// already entered, must reach the target. A failure goes through
/// `config.qualification_failure`; only `Reject` produces an error.
pub fn enlist(
    tables: &RuleTables,
    config: &GenerationConfig,
    state: &CharacterState,
    dice: &mut Dice,
    requested: &CareerId,
) -> Result<Enlistment> {
    let qualification = tables.lookup_qualification(requested)?;

    let qualified = match qualification.unmet_minimum(&state.attributes) {
        Some(minimum) => {
            tracing::debug!(
                "{} below {} minimum of {} for {}",
                state.name,
                minimum.characteristic,
                minimum.at_least,
                requested
            );
            false
        }
        None => {
            let previous = state.careers_entered() as i32;
            let dm = qualification.modifier(&state.attributes)
                + tables.ruleset().qualification_dm_per_career * previous;
            let total = dice.two_d6(RollKind::Qualification) + dm;
            tracing::debug!(
                "{} qualification for {}: {} vs {}+",
                state.name,
                requested,
                total,
                qualification.target
            );
            total >= qualification.target
        }
    };

    if qualified {
        return Ok(Enlistment {
            requested: requested.clone(),
            career: requested.clone(),
            route: EntryRoute::Qualified,
        });
    }

    let draft = &tables.ruleset().draft;
    match config.qualification_failure {
        QualificationFailurePolicy::Reject => Err(ChargenError::QualificationRejected {
            career: requested.clone(),
        }),
        QualificationFailurePolicy::Draft if !state.drafted && !draft.is_empty() => {
            let career = draft[dice.pick(RollKind::Draft, draft.len())].clone();
            tracing::warn!("{} failed to qualify for {}, drafted into {}", state.name, requested, career);
            Ok(Enlistment {
                requested: requested.clone(),
                career,
                route: EntryRoute::Drafted,
            })
        }
        _ => {
            let career = tables.fallback_career()?.id.clone();
            tracing::warn!("{} failed to qualify for {}, falling back to {}", state.name, requested, career);
            Ok(Enlistment {
                requested: requested.clone(),
                career,
                route: EntryRoute::Fallback,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::AttributeSet;

    fn candidate(value: u8) -> CharacterState {
        CharacterState::new("Test", AttributeSet::uniform(value), 18, 0)
    }

    #[test]
    fn test_minimums_fail_without_a_throw() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let mut dice = Dice::seeded(42);
        let enlistment = enlist(&tables, &config, &candidate(2), &mut dice, &CareerId::from("scout")).unwrap();

        assert_eq!(enlistment.career.as_str(), "drifter");
        assert_eq!(enlistment.route, EntryRoute::Fallback);
        assert_eq!(dice.rolls_made(), 0);
    }

    #[test]
    fn test_forced_throw_qualifies() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let mut dice = Dice::seeded(1).with_forced(RollKind::Qualification, [12]);
        let enlistment = enlist(&tables, &config, &candidate(7), &mut dice, &CareerId::from("navy")).unwrap();

        assert_eq!(enlistment.career.as_str(), "navy");
        assert_eq!(enlistment.route, EntryRoute::Qualified);
    }

    #[test]
    fn test_reject_policy_errors() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig {
            qualification_failure: QualificationFailurePolicy::Reject,
            ..GenerationConfig::default()
        };
        let mut dice = Dice::seeded(1).with_forced(RollKind::Qualification, [2]);
        let err = enlist(&tables, &config, &candidate(7), &mut dice, &CareerId::from("navy")).unwrap_err();
        assert!(matches!(err, ChargenError::QualificationRejected { .. }));
    }

    #[test]
    fn test_draft_is_used_once() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig {
            qualification_failure: QualificationFailurePolicy::Draft,
            ..GenerationConfig::default()
        };
        let mut dice = Dice::seeded(1)
            .with_forced(RollKind::Qualification, [2, 2])
            .with_forced(RollKind::Draft, [3]);
        let mut state = candidate(7);

        let first = enlist(&tables, &config, &state, &mut dice, &CareerId::from("navy")).unwrap();
        assert_eq!(first.route, EntryRoute::Drafted);
        assert_eq!(first.career.as_str(), "army");

        state.drafted = true;
        let second = enlist(&tables, &config, &state, &mut dice, &CareerId::from("navy")).unwrap();
        assert_eq!(second.route, EntryRoute::Fallback);
    }

    #[test]
    fn test_unknown_career_is_configuration_error() {
        let tables = RuleTables::builtin().unwrap();
        let config = GenerationConfig::default();
        let mut dice = Dice::seeded(1);
        let err = enlist(&tables, &config, &candidate(7), &mut dice, &CareerId::from("pirate")).unwrap_err();
        assert!(err.is_configuration());
    }
}
