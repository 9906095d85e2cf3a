//! Integration tests for career progression scenarios

use travgen::assembler::{generate, generate_with_dice, CandidatePreferences, FinalCharacter};
use travgen::character::{AttributeSet, CareerEnd, CharacterState, EntryRoute, Status, TermOutcome};
use travgen::core::{ChargenError, GenerationConfig, QualificationFailurePolicy};
use travgen::dice::{Dice, RollKind};
use travgen::progression::CareerEngine;
use travgen::rules::RuleTables;

/// A career that never fails survival and has no benefit tables
const NO_BENEFITS_RULES: &str = r#"
[ruleset]
name = "Couriers"
fallback_career = "drifter"

[[careers]]
id = "drifter"
name = "Drifter"

[[careers]]
id = "couriers"
name = "Couriers"

[careers.qualification]
target = 2

[careers.survival]
target = 2

[careers.reenlistment]
target = 13

[careers.skills]
personal = ["+1 Str", "+1 Dex", "+1 End", "+1 Int", "+1 Edu", "+1 Soc"]
service = ["Pilot", "Navigation", "Vacc Suit", "Streetwise", "Admin", "Computer"]
"#;

/// A career that always reenlists and never retires
const LIFER_RULES: &str = r#"
[ruleset]
name = "Lifers"
fallback_career = "lifer"

[[careers]]
id = "lifer"
name = "Lifer"

[careers.qualification]
target = 2

[careers.survival]
target = 2

[careers.reenlistment]
target = 2

[careers.skills]
personal = ["+1 Str", "+1 Dex", "+1 End", "+1 Int", "+1 Edu", "+1 Soc"]
service = ["Pilot", "Navigation", "Vacc Suit", "Streetwise", "Admin", "Computer"]

[careers.benefits]
cash = [1000, 2000, 3000]
material = ["Low Psg", "-"]
"#;

/// Finished character, or the partial one carried by a bound error
fn finished(result: Result<FinalCharacter, ChargenError>) -> FinalCharacter {
    match result {
        Ok(character) => character,
        Err(ChargenError::BoundExceeded { partial, .. }) => *partial,
        Err(e) => panic!("generation failed: {}", e),
    }
}

#[test]
fn test_scout_below_minimums_falls_back_to_drifter() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig::default();
    let prefs = CandidatePreferences::new("Minimal")
        .with_career("Scout")
        .with_seed(42)
        .with_attributes(AttributeSet::uniform(2));

    let character = finished(generate(&tables, &config, &prefs));
    let first = &character.records()[0];
    assert_eq!(first.career.as_str(), "drifter");
    assert_eq!(character.careers()[0].route, EntryRoute::Fallback);
}

#[test]
fn test_marine_dies_in_fifth_term_with_frozen_skills() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig::default();
    let engine = CareerEngine::new(&tables, &config);

    let mut state = CharacterState::new("Vasquez", AttributeSet::new([10, 10, 7, 10, 10, 10]), 18, 7);
    let mut dice = Dice::seeded(7)
        .with_forced(RollKind::Qualification, [12])
        .with_forced(RollKind::Survival, [12, 12, 12, 12, 2])
        .with_forced(RollKind::Reenlistment, [12, 12, 12, 12])
        // Service skills only, so no table raises End
        .with_forced(RollKind::SkillTable, [2; 40]);

    let marines = tables.resolve_career("Marines").unwrap().id.clone();
    let enlistment = engine.enlist(&state, &mut dice, &marines).unwrap();
    assert_eq!(enlistment.route, EntryRoute::Qualified);
    engine.begin_career(&mut state, &enlistment).unwrap();

    for _ in 0..4 {
        assert_eq!(engine.serve_term(&mut state, &mut dice).unwrap(), TermOutcome::Reenlisted);
    }
    let term_four_skills = state.skills.clone();

    let outcome = engine.serve_term(&mut state, &mut dice).unwrap();
    assert!(matches!(outcome, TermOutcome::Dead(_)));
    assert_eq!(state.status, Status::Deceased);
    assert_eq!(state.history.len(), 5);
    assert!(state.history[4].skills_gained.is_empty());
    assert_eq!(state.skills, term_four_skills);

    let frozen = state.clone();
    assert!(matches!(
        engine.serve_term(&mut state, &mut dice),
        Err(ChargenError::Deceased)
    ));
    assert_eq!(state, frozen);
}

#[test]
fn test_marine_scenario_through_the_assembler() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig::default();
    let prefs = CandidatePreferences::new("Vasquez")
        .with_career("Marines")
        .with_attributes(AttributeSet::new([10, 10, 7, 10, 10, 10]));
    let mut dice = Dice::seeded(7)
        .with_forced(RollKind::Qualification, [12])
        .with_forced(RollKind::Survival, [12, 12, 12, 12, 2])
        .with_forced(RollKind::Reenlistment, [12, 12, 12, 12])
        // Service skills only, so no table raises End
        .with_forced(RollKind::SkillTable, [2; 40]);

    let character = generate_with_dice(&tables, &config, &prefs, &mut dice).unwrap();
    assert_eq!(character.status(), Status::Deceased);
    assert_eq!(character.records().len(), 5);
    assert_eq!(character.careers().len(), 1);
    assert_eq!(character.careers()[0].end, CareerEnd::Died);
    assert!(character.careers()[0].benefits.is_empty());
}

#[test]
fn test_missing_benefits_table_leaves_last_committed_term() {
    let tables = RuleTables::from_toml_str(NO_BENEFITS_RULES).unwrap();
    let config = GenerationConfig::default();
    let engine = CareerEngine::new(&tables, &config);

    let mut state = CharacterState::new("Courier", AttributeSet::uniform(7), 18, 3);
    let mut dice = Dice::seeded(3);
    let couriers = tables.resolve_career("couriers").unwrap().id.clone();
    let enlistment = engine.enlist(&state, &mut dice, &couriers).unwrap();
    engine.begin_career(&mut state, &enlistment).unwrap();

    assert_eq!(engine.serve_term(&mut state, &mut dice).unwrap(), TermOutcome::MusteredOut);
    let committed = state.clone();

    let err = engine.muster_out(&mut state, &mut dice).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, ChargenError::MissingTable { table: "benefits", .. }));
    assert_eq!(state, committed);
}

#[test]
fn test_missing_benefits_table_fails_the_run() {
    let tables = RuleTables::from_toml_str(NO_BENEFITS_RULES).unwrap();
    let config = GenerationConfig::default();
    let prefs = CandidatePreferences::new("Courier").with_career("couriers").with_seed(3);

    let err = generate(&tables, &config, &prefs).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_always_reenlisting_career_hits_term_bound() {
    let tables = RuleTables::from_toml_str(LIFER_RULES).unwrap();
    let config = GenerationConfig {
        max_total_terms: 10,
        ..GenerationConfig::default()
    };
    let prefs = CandidatePreferences::new("Lifer").with_career("lifer").with_seed(9);

    match generate(&tables, &config, &prefs) {
        Err(ChargenError::BoundExceeded { limit, partial }) => {
            assert_eq!(limit, 10);
            assert_eq!(partial.records().len(), 10);
            assert_eq!(partial.status(), Status::Active);
            assert_eq!(partial.careers()[0].end, CareerEnd::Interrupted);
            assert!(partial.state().service.is_none());
        }
        other => panic!("expected BoundExceeded, got {:?}", other.map(|c| c.records().len())),
    }
}

#[test]
fn test_reject_policy_refuses_first_career() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig {
        qualification_failure: QualificationFailurePolicy::Reject,
        ..GenerationConfig::default()
    };
    let prefs = CandidatePreferences::new("Hopeful")
        .with_career("Navy")
        .with_seed(5)
        .with_attributes(AttributeSet::uniform(2));

    let err = generate(&tables, &config, &prefs).unwrap_err();
    assert!(matches!(err, ChargenError::QualificationRejected { .. }));
    assert!(!err.is_configuration());
}

#[test]
fn test_draft_places_candidate_in_a_draft_career() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig {
        qualification_failure: QualificationFailurePolicy::Draft,
        ..GenerationConfig::default()
    };
    let prefs = CandidatePreferences::new("Draftee")
        .with_career("Navy")
        .with_attributes(AttributeSet::uniform(7));
    let mut dice = Dice::seeded(12)
        .with_forced(RollKind::Qualification, [2])
        .with_forced(RollKind::Draft, [3]);

    let character = finished(generate_with_dice(&tables, &config, &prefs, &mut dice));
    assert_eq!(character.careers()[0].route, EntryRoute::Drafted);
    assert_eq!(character.records()[0].career.as_str(), "army");
    assert!(character.state().drafted);
}

#[test]
fn test_term_records_are_numbered_in_order() {
    let tables = RuleTables::builtin().unwrap();
    let config = GenerationConfig::default();
    for seed in 0..25 {
        let prefs = CandidatePreferences::new("Numbered").with_seed(seed);
        let character = finished(generate(&tables, &config, &prefs));

        for (i, record) in character.records().iter().enumerate() {
            assert_eq!(record.term as usize, i + 1);
        }
        let served: u32 = character.careers().iter().map(|c| c.terms).sum();
        assert_eq!(served as usize, character.records().len());
    }
}
