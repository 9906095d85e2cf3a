//! Aging throws at the end of a term

use crate::character::{AppliedChange, AttributeSet, CharacteristicChange};
use crate::dice::{Dice, RollKind};
use crate::rules::{aging_bracket, AgingBracket};

/// Losses from one round of aging throws
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgingResult {
    pub losses: Vec<AppliedChange>,
    /// A loss took a characteristic below the floor
    pub fatal: bool,
}

/// Throw the bracket in force at `age` against `attributes`
///
/// Each check is a 2D6 throw; below its target the characteristic loses
/// `loss` points. Throws stop at the first loss that breaches the floor.
pub fn age_character(
    schedule: &[AgingBracket],
    age: u32,
    attributes: &mut AttributeSet,
    dice: &mut Dice,
    floor: u8,
    max: u8,
) -> AgingResult {
    let mut result = AgingResult::default();
    let Some(bracket) = aging_bracket(schedule, age) else {
        return result;
    };

    for check in &bracket.checks {
        if check.loss <= 0 {
            continue;
        }
        let throw = dice.two_d6(RollKind::Aging);
        if throw >= check.target {
            continue;
        }
        let applied = attributes.apply(
            CharacteristicChange::new(check.characteristic, -check.loss),
            floor,
            max,
        );
        tracing::debug!(
            "Aging at {}: {} {} -> {}",
            age,
            check.characteristic,
            applied.before,
            applied.after
        );
        result.losses.push(applied);
        if applied.breached {
            result.fatal = true;
            break;
        }
    }
    result
}
