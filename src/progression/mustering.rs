//! Mustering out: benefit rolls and retirement pay

use crate::character::{
    BenefitReceived, CareerEnd, CharacterState, RecordedChange, ServiceSummary, Status,
    TermOutcome,
};
use crate::core::error::{ChargenError, Result};
use crate::dice::{clamped_row, Dice, RollKind};
use crate::rules::{BenefitEntry, RuleTables};

/// Which benefit table a roll goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Cash,
    Material,
}

/// Roll benefits for the career that just ended on `state` (a draft)
///
/// Rolls owed are the plan's rolls (terms plus rank bonus) plus life event
/// extras and retirement extras, less one per discharged term. At most
/// `max_cash_rolls` go to the cash table; the rest are material.
pub(crate) fn muster(tables: &RuleTables, state: &mut CharacterState, dice: &mut Dice) -> Result<ServiceSummary> {
    let service = state
        .service
        .clone()
        .ok_or_else(|| ChargenError::InvalidConfig("no career to muster out of".into()))?;
    let retired = match state.last_record().map(|r| (&r.career, r.outcome)) {
        Some((career, TermOutcome::Retired)) if *career == service.career => true,
        Some((career, TermOutcome::MusteredOut)) if *career == service.career => false,
        _ => {
            return Err(ChargenError::InvalidConfig(format!(
                "career {} has not ended",
                service.career
            )))
        }
    };

    let definition = tables.career(&service.career)?;
    let plan = tables.lookup_benefits(&service.career, service.terms, service.rank)?;
    let ruleset = tables.ruleset();
    let retirement = definition.retirement.as_ref().filter(|_| retired);

    let rolls = (plan.rolls + service.extra_benefit_rolls + retirement.map_or(0, |r| r.extra_rolls))
        .saturating_sub(service.forfeited_benefit_rolls);
    let gambler = ruleset
        .cash_dm_skill
        .as_ref()
        .and_then(|skill| state.skills.level(skill))
        .is_some_and(|level| level >= 1);
    let cash_dm = i32::from(gambler) + retirement.map_or(0, |r| r.cash_dm);

    let mut benefits = Vec::with_capacity(rolls as usize);
    let mut cash_rolls = 0;
    for _ in 0..rolls {
        let column = if cash_rolls < plan.max_cash_rolls && dice.pick(RollKind::BenefitColumn, 2) == 0 {
            Column::Cash
        } else {
            Column::Material
        };

        let received = match column {
            Column::Cash => {
                cash_rolls += 1;
                let credits = clamped_row(plan.cash, dice.d6(RollKind::Cash) + cash_dm)
                    .copied()
                    .unwrap_or(0);
                state.benefits.credits += credits;
                BenefitReceived::Cash { credits }
            }
            Column::Material => {
                let row = dice.d6(RollKind::Benefit) + plan.material_dm;
                match clamped_row(plan.material, row) {
                    Some(BenefitEntry::Item(name)) => {
                        state.benefits.items.push(name.clone());
                        BenefitReceived::Item { name: name.clone() }
                    }
                    Some(BenefitEntry::Characteristic(change)) => {
                        let applied = state.attributes.apply(
                            *change,
                            ruleset.attribute_floor,
                            ruleset.attribute_max,
                        );
                        BenefitReceived::Characteristic {
                            change: RecordedChange::from(applied),
                        }
                    }
                    Some(BenefitEntry::Nothing) | None => BenefitReceived::Nothing,
                }
            }
        };
        tracing::debug!("{} receives {:?}", state.name, received);
        benefits.push(received);
    }

    let pension = retirement.map_or(0, |r| r.pension_for(service.terms));
    state.benefits.pension += pension;

    let summary = ServiceSummary {
        career: service.career.clone(),
        route: service.route,
        terms: service.terms,
        rank: service.rank,
        rank_title: definition.rank_title(service.rank),
        end: if retired {
            CareerEnd::Retired
        } else {
            CareerEnd::MusteredOut
        },
        benefits,
        pension,
    };
    tracing::info!(
        "{} {} from {} after {} terms ({} benefit rolls)",
        state.name,
        if retired { "retired" } else { "mustered out" },
        definition.name,
        service.terms,
        rolls
    );

    state.careers.push(summary.clone());
    state.service = None;
    if retired {
        state.status = Status::Retired;
    }
    Ok(summary)
}
