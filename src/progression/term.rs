//! One term of service as a phase machine
//!
//! survival -> mishap | event -> advancement -> skills -> aging -> reenlistment
//!
//! The runner mutates a draft of the character state. The engine only
//! commits the draft once the machine reaches `Done`; an error in any phase
//! drops the draft and leaves the committed state as it was.

use crate::character::{
    CareerEnd, CareerRecord, CharacterState, CharacteristicChange, DeathCause, RecordedChange,
    Service, ServiceSummary, Status, SurvivalOutcome, TermEvent, TermOutcome,
};
use crate::core::config::{GenerationConfig, InjuryDischargePolicy};
use crate::core::error::{ChargenError, Result};
use crate::core::types::SkillId;
use crate::dice::{clamped_row, Dice, RollKind};
use crate::progression::aging::age_character;
use crate::rules::{CareerDefinition, Check, RuleTables, SkillEntry};

/// Term phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPhase {
    Survival,
    Mishap,         // Injured on the survival throw
    Event,          // Survived uninjured
    Advancement,
    Skills,
    Aging,
    Reenlistment,
    Done(TermOutcome),
}

/// Serve one term on `state`, which must be a draft the caller can discard
pub(crate) fn run_term(
    tables: &RuleTables,
    config: &GenerationConfig,
    state: &mut CharacterState,
    dice: &mut Dice,
) -> Result<TermOutcome> {
    let service = state
        .service
        .clone()
        .ok_or_else(|| ChargenError::InvalidConfig("no career in progress".into()))?;
    let definition = tables.career(&service.career)?;

    let mut runner = TermRunner::new(tables, config, definition, state, service);
    runner.enter();

    let mut phase = TermPhase::Survival;
    loop {
        tracing::trace!("{} term {}: {:?}", runner.state.name, runner.record.term, phase);
        phase = match phase {
            TermPhase::Survival => runner.survival(dice)?,
            TermPhase::Mishap => runner.mishap(dice)?,
            TermPhase::Event => runner.event(dice)?,
            TermPhase::Advancement => runner.advancement(dice)?,
            TermPhase::Skills => runner.skills(dice)?,
            TermPhase::Aging => runner.aging(dice)?,
            TermPhase::Reenlistment => runner.reenlistment(dice)?,
            TermPhase::Done(outcome) => {
                runner.finish(outcome);
                return Ok(outcome);
            }
        };
    }
}

struct TermRunner<'a> {
    tables: &'a RuleTables,
    config: &'a GenerationConfig,
    definition: &'a CareerDefinition,
    state: &'a mut CharacterState,
    service: Service,
    record: CareerRecord,
    discharged: bool,
    advancement_dm: i32,
    advancements: u32,
    extra_skill_rolls: u32,
}

impl<'a> TermRunner<'a> {
    fn new(
        tables: &'a RuleTables,
        config: &'a GenerationConfig,
        definition: &'a CareerDefinition,
        state: &'a mut CharacterState,
        service: Service,
    ) -> Self {
        let record = CareerRecord {
            career: service.career.clone(),
            career_term: service.terms + 1,
            term: state.total_terms() + 1,
            age: state.age,
            rank: service.rank,
            rank_title: definition.rank_title(service.rank),
            survival: SurvivalOutcome::Survived,
            skills_gained: Vec::new(),
            attribute_changes: Vec::new(),
            events: Vec::new(),
            outcome: TermOutcome::Reenlisted,
        };
        Self {
            tables,
            config,
            definition,
            state,
            service,
            record,
            discharged: false,
            advancement_dm: 0,
            advancements: 0,
            extra_skill_rolls: 0,
        }
    }

    /// First term of a career: entry event and service skills
    fn enter(&mut self) {
        if self.record.career_term != 1 {
            return;
        }
        self.record.events.push(TermEvent::Entered {
            route: self.service.route,
        });
        for granted in &self.definition.service_skills {
            if let Some(gain) = self.state.skills.grant(&granted.skill, granted.level) {
                self.record.skills_gained.push(gain);
            }
        }
    }

    fn survival(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let lookup = self
            .tables
            .lookup_survival(&self.service.career, self.record.career_term)?;
        let total = dice.two_d6(RollKind::Survival) + lookup.modifier(&self.state.attributes, self.service.rank);
        let outcome = lookup.table.resolve(total);
        tracing::debug!(
            "{} survival in {} term {}: {} vs {}+ -> {:?}",
            self.state.name,
            self.service.career,
            self.record.career_term,
            total,
            lookup.table.target,
            outcome
        );
        self.record.survival = outcome;

        Ok(match outcome {
            SurvivalOutcome::Survived => TermPhase::Event,
            SurvivalOutcome::Injured => TermPhase::Mishap,
            SurvivalOutcome::Dead => TermPhase::Done(TermOutcome::Dead(DeathCause::Service)),
        })
    }

    fn mishap(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let tables = self.tables;
        let table = tables.lookup_mishaps(&self.service.career)?;
        let mishap = dice.draw(RollKind::Mishap, table);
        self.record.events.push(TermEvent::Injured {
            description: mishap.description.clone(),
        });

        for injury in &mishap.injuries {
            if self.apply_change(*injury) {
                return Ok(TermPhase::Done(TermOutcome::Dead(DeathCause::Injury)));
            }
        }

        if !mishap.discharge {
            return Ok(TermPhase::Advancement);
        }
        self.discharged = true;
        self.record.events.push(TermEvent::Discharged {
            description: mishap.description.clone(),
        });
        Ok(match self.config.injury_discharge {
            InjuryDischargePolicy::ForfeitAdvancement => TermPhase::Skills,
            InjuryDischargePolicy::ForfeitTerm => TermPhase::Aging,
        })
    }

    fn event(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let tables = self.tables;
        let Some(table) = tables.lookup_events(&self.service.career)? else {
            return Ok(TermPhase::Advancement);
        };
        let event = dice.draw(RollKind::Event, table);

        self.advancement_dm += event.advancement_dm;
        self.extra_skill_rolls += event.extra_skill_rolls;
        self.service.extra_benefit_rolls += event.extra_benefit_rolls;
        self.record.events.push(if event.advancement_dm > 0 {
            TermEvent::Commendation {
                description: event.description.clone(),
            }
        } else {
            TermEvent::LifeEvent {
                description: event.description.clone(),
            }
        });

        if let Some(change) = event.characteristic {
            if self.apply_change(change) {
                return Ok(TermPhase::Done(TermOutcome::Dead(DeathCause::Injury)));
            }
        }
        if let Some(skill) = &event.skill {
            let gain = self.state.skills.improve(skill);
            self.record.skills_gained.push(gain);
        }
        Ok(TermPhase::Advancement)
    }

    fn advancement(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let definition = self.definition;
        let max_rank = definition.max_rank();
        let tables = self.tables;
        let commission = tables.lookup_commission(&self.service.career)?;
        let promotion = tables.lookup_promotion(&self.service.career)?;

        let may_commission = !self.service.commissioned
            && !self.service.commission_attempted
            && max_rank >= 1
            && !(self.service.drafted() && self.record.career_term == 1);
        if let (true, Some(check)) = (may_commission, commission) {
            self.service.commission_attempted = true;
            if self.throw(dice, RollKind::Commission, check) {
                self.service.commissioned = true;
                let breached = self.raise_rank(1);
                self.record.events.push(TermEvent::Commissioned {
                    rank: self.service.rank,
                    title: definition.rank_title(self.service.rank),
                });
                if breached {
                    return Ok(TermPhase::Done(TermOutcome::Dead(DeathCause::Injury)));
                }
            } else {
                self.record.events.push(TermEvent::CommissionDenied);
            }
        }

        if self.service.commissioned && self.service.rank < max_rank {
            if let Some(check) = promotion {
                if self.throw(dice, RollKind::Promotion, check) {
                    let breached = self.raise_rank(self.service.rank + 1);
                    self.record.events.push(TermEvent::Promoted {
                        rank: self.service.rank,
                        title: definition.rank_title(self.service.rank),
                    });
                    if breached {
                        return Ok(TermPhase::Done(TermOutcome::Dead(DeathCause::Injury)));
                    }
                }
            }
        }
        Ok(TermPhase::Skills)
    }

    fn skills(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let rolls = self
            .definition
            .skill_rolls
            .baseline(self.record.career_term, &self.state.attributes)
            + self.definition.skill_rolls.per_advancement * self.advancements
            + self.extra_skill_rolls;

        let tables = self.tables;
        let career = self.service.career.clone();
        for _ in 0..rolls {
            let tiers = tables.eligible_tiers(&career, &self.state.attributes, self.service.commissioned)?;
            let tier = tiers[dice.pick(RollKind::SkillTable, tiers.len())];
            let entries = tables.lookup_skills(&career, tier)?;
            let entry = clamped_row(entries, dice.d6(RollKind::Skill))
                .ok_or_else(|| ChargenError::missing(&career, tier.table_name()))?;

            match entry {
                SkillEntry::Skill(skill) => {
                    let skill = self.specialize(skill, dice);
                    let gain = self.state.skills.improve(&skill);
                    tracing::debug!("{} gains {}-{}", self.state.name, gain.skill, gain.level);
                    self.record.skills_gained.push(gain);
                }
                SkillEntry::Characteristic(change) => {
                    // Skill tables only hold gains, so this never breaches
                    self.apply_change(*change);
                }
            }
        }
        Ok(TermPhase::Aging)
    }

    fn aging(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let ruleset = self.tables.ruleset();
        self.state.age += ruleset.term_years;
        if self.state.age < ruleset.aging_starts_at {
            return Ok(self.after_aging());
        }

        let schedule = self.tables.lookup_aging(&self.service.career)?;
        let result = age_character(
            schedule,
            self.state.age,
            &mut self.state.attributes,
            dice,
            ruleset.attribute_floor,
            ruleset.attribute_max,
        );
        for loss in &result.losses {
            self.record.attribute_changes.push(RecordedChange::from(*loss));
            self.record.events.push(TermEvent::Aged {
                characteristic: loss.characteristic,
                loss: loss.before as i32 - loss.after as i32,
            });
        }
        if result.fatal {
            return Ok(TermPhase::Done(TermOutcome::Dead(DeathCause::Aging)));
        }
        Ok(self.after_aging())
    }

    fn after_aging(&self) -> TermPhase {
        if self.discharged {
            TermPhase::Done(TermOutcome::MusteredOut)
        } else {
            TermPhase::Reenlistment
        }
    }

    fn reenlistment(&mut self, dice: &mut Dice) -> Result<TermPhase> {
        let reenlistment = self.tables.lookup_reenlistment(&self.service.career)?;
        let served = self.record.career_term;
        let retirement = self.definition.retirement.as_ref();
        let eligible = retirement.is_some_and(|r| r.eligible(served));
        let mandatory = retirement.is_some_and(|r| r.mandatory(served));
        let leaving = if eligible && self.config.retire_when_eligible {
            TermOutcome::Retired
        } else {
            TermOutcome::MusteredOut
        };

        let natural = dice.two_d6(RollKind::Reenlistment);
        let outcome = if reenlistment.forces_continuation(natural) {
            self.record.events.push(TermEvent::ForcedReenlistment);
            TermOutcome::Reenlisted
        } else if mandatory {
            self.record.events.push(TermEvent::MandatoryRetirement);
            TermOutcome::Retired
        } else if !self.config.reenlistment.wants_another(served) {
            leaving
        } else if natural + reenlistment.modifier(&self.state.attributes) >= reenlistment.target {
            TermOutcome::Reenlisted
        } else {
            self.record.events.push(TermEvent::ReenlistmentDenied);
            leaving
        };
        tracing::debug!(
            "{} reenlistment after {} term {}: {} -> {:?}",
            self.state.name,
            self.service.career,
            served,
            natural,
            outcome
        );
        Ok(TermPhase::Done(outcome))
    }

    /// Write the record and the service back onto the draft
    fn finish(mut self, outcome: TermOutcome) {
        self.service.terms += 1;
        if self.discharged {
            self.service.forfeited_benefit_rolls += 1;
        }

        self.record.age = self.state.age;
        self.record.rank = self.service.rank;
        self.record.rank_title = self.definition.rank_title(self.service.rank);
        self.record.outcome = outcome;

        if let TermOutcome::Dead(cause) = outcome {
            tracing::info!(
                "{} died in {} term {} ({:?})",
                self.state.name,
                self.service.career,
                self.record.career_term,
                cause
            );
            self.record.events.push(TermEvent::Died { cause });
            self.state.status = Status::Deceased;
            self.state.careers.push(ServiceSummary {
                career: self.service.career.clone(),
                route: self.service.route,
                terms: self.service.terms,
                rank: self.service.rank,
                rank_title: self.record.rank_title.clone(),
                end: CareerEnd::Died,
                benefits: Vec::new(),
                pension: 0,
            });
            self.state.service = None;
        } else {
            self.state.service = Some(self.service);
        }
        self.state.history.push(self.record);
    }

    // === HELPERS ===

    /// 2D6 + check DMs + this term's advancement DM against the target
    fn throw(&mut self, dice: &mut Dice, kind: RollKind, check: &Check) -> bool {
        let total = dice.two_d6(kind)
            + check.modifier(&self.state.attributes, self.service.rank)
            + self.advancement_dm;
        tracing::debug!("{} {:?} throw: {} vs {}+", self.state.name, kind, total, check.target);
        check.passes(total)
    }

    /// Move to `rank`, granting the rank's skill and characteristic bonus;
    /// true when the bonus breached the floor
    fn raise_rank(&mut self, rank: u8) -> bool {
        self.service.rank = rank;
        self.advancements += 1;
        let Some(reached) = self.definition.rank(rank) else {
            return false;
        };
        if let Some(skill) = &reached.skill {
            if let Some(gain) = self.state.skills.grant(skill, reached.skill_level) {
                self.record.skills_gained.push(gain);
            }
        }
        match reached.bonus {
            Some(bonus) => self.apply_change(bonus),
            None => false,
        }
    }

    /// Apply and record a characteristic change; true when it breached the floor
    fn apply_change(&mut self, change: CharacteristicChange) -> bool {
        let ruleset = self.tables.ruleset();
        let applied = self
            .state
            .attributes
            .apply(change, ruleset.attribute_floor, ruleset.attribute_max);
        if applied.before != applied.after || applied.breached {
            self.record.attribute_changes.push(RecordedChange::from(applied));
        }
        applied.breached
    }

    /// Resolve a cascade skill to one of its specialties
    fn specialize(&self, skill: &SkillId, dice: &mut Dice) -> SkillId {
        match self.tables.cascade(skill) {
            Some(specialties) => specialties[dice.pick(RollKind::Cascade, specialties.len())].clone(),
            None => skill.clone(),
        }
    }
}

