use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use circuit_coach::error::{WorkoutError, REFRESH_HINT};
use circuit_coach::models::*;
use circuit_coach::repository::{ExerciseRepository, TriSetRepository, WorkoutRepository};

use crate::common::{week, TestApp};

async fn generate(app: &TestApp, day: DayOfWeek) -> Workout {
    app.state.workouts.generate_day(app.user_id, day, week()).await.unwrap()
}

fn slot(station: u8, phase: Option<u8>, index: usize) -> SlotAddress {
    SlotAddress::new(station, phase, index).unwrap()
}

#[tokio::test]
async fn test_protected_station3_is_unchanged() {
    let app = TestApp::new();
    app.seed_program().await;
    let wednesday = generate(&app, DayOfWeek::Wednesday).await;
    let other = app.exercise("Battle Ropes", 3, DayType::Conditioning, None).await;

    let replaced = app
        .state
        .workouts
        .replace_slot(
            app.user_id,
            &WorkoutLocator::by_id(wednesday.id),
            slot(3, None, 1),
            SlotValue::ExerciseId(other.id),
        )
        .await;
    assert_matches!(replaced, Err(WorkoutError::BusinessRule(_)));

    let regenerated = app
        .state
        .workouts
        .regenerate_slot(app.user_id, &WorkoutLocator::by_id(wednesday.id), slot(3, None, 0))
        .await;
    assert_matches!(regenerated, Err(WorkoutError::BusinessRule(_)));

    let stored = app.store.get_workout(wednesday.id).await.unwrap().unwrap();
    assert_eq!(stored, wednesday);
}

#[tokio::test]
async fn test_regenerate_without_alternative_is_exhausted() {
    let app = TestApp::new();
    app.pool(6, 1, DayType::Conditioning, Some(Focus::Lower)).await;
    app.pool(3, 2, DayType::Conditioning, None).await;
    let wednesday = generate(&app, DayOfWeek::Wednesday).await;

    let result = app
        .state
        .workouts
        .regenerate_slot(app.user_id, &WorkoutLocator::by_id(wednesday.id), slot(2, None, 1))
        .await;
    assert_matches!(result, Err(WorkoutError::ExhaustedPool(_)));

    let stored = app.store.get_workout(wednesday.id).await.unwrap().unwrap();
    assert_eq!(stored.station2, wednesday.station2);
}

#[tokio::test]
async fn test_regenerate_picks_a_new_exercise() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;

    let updated = app
        .state
        .workouts
        .regenerate_slot(app.user_id, &WorkoutLocator::by_id(sunday.id), slot(2, None, 0))
        .await
        .unwrap();

    assert!(!sunday.exercise_ids().contains(&updated.station2[0].exercise_id));
    assert_eq!(updated.station2[1], sunday.station2[1]);
    assert_eq!(updated.station1, sunday.station1);
    assert_eq!(updated.id, sunday.id);
}

#[tokio::test]
async fn test_replace_by_name_creates_exercise() {
    let app = TestApp::new();
    app.seed_program().await;
    let tuesday = generate(&app, DayOfWeek::Tuesday).await;

    let updated = app
        .state
        .workouts
        .replace_slot(
            app.user_id,
            &WorkoutLocator::by_id(tuesday.id),
            slot(1, Some(2), 2),
            SlotValue::ExerciseName("  Band Pull Aparts ".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(updated.station1.phase2[2].name, "Band Pull Aparts");
    let created = app
        .store
        .get_exercise(app.user_id, updated.station1.phase2[2].exercise_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.station, 1);
    assert_eq!(created.day_type, DayType::Boxing);
    assert_eq!(created.focus, Some(Focus::Upper));
    assert!(created.last_used.is_some());
}

#[tokio::test]
async fn test_replace_rejects_duplicate() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;
    let already_there = sunday.station1.phase1[0].exercise_id;

    let result = app
        .state
        .workouts
        .replace_slot(
            app.user_id,
            &WorkoutLocator::by_id(sunday.id),
            slot(1, Some(2), 0),
            SlotValue::ExerciseId(already_there),
        )
        .await;

    assert_matches!(result, Err(WorkoutError::BusinessRule(_)));
}

#[tokio::test]
async fn test_saturday_apply_overwrites_both_phases() {
    let app = TestApp::new();
    app.seed_program().await;
    let saturday = generate(&app, DayOfWeek::Saturday).await;
    let fresh = app.pool(6, 1, DayType::Technique, Some(Focus::Lower)).await;
    let replacement = app.tri_set(TriSetFocus::Lower, &fresh[0..3], &fresh[3..6]).await;

    let updated = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(saturday.id), replacement.id)
        .await
        .unwrap();

    let phase1: Vec<Uuid> = updated.station1.phase1.iter().map(|s| s.exercise_id).collect();
    let phase2: Vec<Uuid> = updated.station1.phase2.iter().map(|s| s.exercise_id).collect();
    assert_eq!(phase1, fresh[0..3].iter().map(|e| e.id).collect::<Vec<_>>());
    assert_eq!(phase2, fresh[3..6].iter().map(|e| e.id).collect::<Vec<_>>());
    assert_eq!(updated.station2, saturday.station2);

    let stamped = app.store.get_tri_set(app.user_id, replacement.id).await.unwrap().unwrap();
    assert!(stamped.last_used.is_some());
}

#[tokio::test]
async fn test_apply_rejects_wrong_focus_and_shape() {
    let app = TestApp::new();
    let seeded = app.seed_program().await;
    let monday = generate(&app, DayOfWeek::Monday).await;
    let saturday = generate(&app, DayOfWeek::Saturday).await;
    let single = app.pool(3, 1, DayType::Technique, Some(Focus::Lower)).await;
    let single_lower = app.tri_set(TriSetFocus::Lower, &single, &[]).await;

    let wrong_focus = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(monday.id), seeded.lower_set.id)
        .await;
    assert_matches!(wrong_focus, Err(WorkoutError::BusinessRule(_)));

    let no_phase2 = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(saturday.id), single_lower.id)
        .await;
    assert_matches!(no_phase2, Err(WorkoutError::BusinessRule(_)));

    let sunday = generate(&app, DayOfWeek::Sunday).await;
    let not_technique = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(sunday.id), seeded.mixed_set.id)
        .await;
    assert_matches!(not_technique, Err(WorkoutError::BusinessRule(_)));

    let stored = app.store.get_workout(saturday.id).await.unwrap().unwrap();
    assert_eq!(stored.station1, saturday.station1);
}

#[tokio::test]
async fn test_foreign_workout_is_forbidden() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;

    let result = app.state.workouts.get(Uuid::new_v4(), sunday.id).await;
    assert_matches!(result, Err(WorkoutError::Ownership(_)));
}

#[tokio::test]
async fn test_locator_falls_back_to_week_and_day() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;

    let stale = WorkoutLocator::new(Some(Uuid::new_v4()), Some(week()), Some(DayOfWeek::Sunday));
    let found = app.state.workouts.locate(app.user_id, &stale).await.unwrap();
    assert_eq!(found.id, sunday.id);

    let missing = app
        .state
        .workouts
        .locate(app.user_id, &WorkoutLocator::by_day(week(), DayOfWeek::Tuesday))
        .await;
    assert_matches!(missing, Err(WorkoutError::NotFound(message)) if message.ends_with(REFRESH_HINT));
}

#[tokio::test]
async fn test_week_generation_skips_blocked_days() {
    let app = TestApp::new();
    app.seed_program().await;
    app.state
        .blocked_days
        .block(app.user_id, week(), DayOfWeek::Tuesday)
        .await
        .unwrap();

    let workouts = app.state.workouts.generate_week(app.user_id, week()).await.unwrap();

    let days: Vec<DayOfWeek> = workouts.iter().map(|w| w.day_of_week).collect();
    assert_eq!(
        days,
        vec![
            DayOfWeek::Sunday,
            DayOfWeek::Monday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Saturday,
        ]
    );
    assert!(app
        .store
        .find_workout(app.user_id, week(), DayOfWeek::Tuesday)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_week_generation_replaces_previous_week() {
    let app = TestApp::new();
    app.seed_program().await;
    let first = app.state.workouts.generate_week(app.user_id, week()).await.unwrap();
    assert_eq!(first.len(), 6);

    let second = app.state.workouts.generate_week(app.user_id, week()).await.unwrap();
    assert_eq!(second.len(), 6);
    assert_eq!(app.state.workouts.get_week(app.user_id, week()).await.unwrap().len(), 6);
    assert!(first.iter().all(|old| second.iter().all(|new| new.id != old.id)));
}

#[tokio::test]
async fn test_catalog_edits_leave_last_used_alone() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;
    let id = sunday.station2[0].exercise_id;
    let before = app.store.get_exercise(app.user_id, id).await.unwrap().unwrap();

    let renamed = app
        .state
        .catalog
        .update(
            app.user_id,
            id,
            UpdateExerciseRequest {
                name: Some("Renamed Combo".to_string()),
                ..UpdateExerciseRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(renamed.name, "Renamed Combo");
    assert_eq!(renamed.last_used, before.last_used);
}

#[tokio::test]
async fn test_monday_drill_group_rejects_second_copy_of_other_exercise() {
    let app = TestApp::new();
    app.seed_program().await;
    let monday = generate(&app, DayOfWeek::Monday).await;
    let drill_id = monday.station1.phase1[0].exercise_id;
    let footwork = app.exercise("Ladder Footwork", 1, DayType::Technique, Some(Focus::Mixed)).await;
    let locator = WorkoutLocator::by_id(monday.id);

    let first = app
        .state
        .workouts
        .replace_slot(app.user_id, &locator, slot(1, Some(1), 0), SlotValue::ExerciseId(footwork.id))
        .await
        .unwrap();
    assert_eq!(first.station1.phase1[0].exercise_id, footwork.id);

    let second = app
        .state
        .workouts
        .replace_slot(app.user_id, &locator, slot(1, Some(1), 1), SlotValue::ExerciseId(footwork.id))
        .await;
    assert_matches!(second, Err(WorkoutError::BusinessRule(_)));

    let restored = app
        .state
        .workouts
        .replace_slot(app.user_id, &locator, slot(1, Some(1), 0), SlotValue::ExerciseId(drill_id))
        .await
        .unwrap();
    assert!(restored.station1.phase1.iter().all(|s| s.exercise_id == drill_id));
}

#[tokio::test]
async fn test_monday_apply_keeps_drill_group() {
    let app = TestApp::new();
    let seeded = app.seed_program().await;
    let monday = generate(&app, DayOfWeek::Monday).await;
    let drill = monday.station1.phase1.clone();

    let updated = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(monday.id), seeded.mixed_set.id)
        .await
        .unwrap();
    assert_eq!(updated.station1.phase1, drill);
    let phase2: Vec<Uuid> = updated.station1.phase2.iter().map(|s| s.exercise_id).collect();
    assert_eq!(phase2, seeded.mixed[3..6].iter().map(|e| e.id).collect::<Vec<_>>());

    let mut single = Vec::new();
    for name in ["Parry Drill", "Catch and Pitch", "Level Change"] {
        single.push(app.exercise(name, 1, DayType::Technique, Some(Focus::Mixed)).await);
    }
    let single_set = app.tri_set(TriSetFocus::Mixed, &single, &[]).await;

    let cleared = app
        .state
        .workouts
        .apply_tri_set(app.user_id, &WorkoutLocator::by_id(monday.id), single_set.id)
        .await
        .unwrap();
    assert_eq!(cleared.station1.phase1, drill);
    assert!(cleared.station1.phase2.is_empty());
    assert_eq!(cleared.station2, monday.station2);
}

#[tokio::test]
async fn test_replace_by_id_rejects_wrong_station_or_day_type() {
    let app = TestApp::new();
    app.seed_program().await;
    let sunday = generate(&app, DayOfWeek::Sunday).await;
    let locator = WorkoutLocator::by_id(sunday.id);
    let combo = app.exercise("Jab Cross Hook", 2, DayType::Kickboxing, None).await;
    let boxing_upper = app.exercise("Shoulder Press", 1, DayType::Boxing, Some(Focus::Upper)).await;

    let wrong_station = app
        .state
        .workouts
        .replace_slot(app.user_id, &locator, slot(1, Some(1), 0), SlotValue::ExerciseId(combo.id))
        .await;
    assert_matches!(wrong_station, Err(WorkoutError::BusinessRule(_)));

    let wrong_day_type = app
        .state
        .workouts
        .replace_slot(app.user_id, &locator, slot(1, Some(1), 0), SlotValue::ExerciseId(boxing_upper.id))
        .await;
    assert_matches!(wrong_day_type, Err(WorkoutError::BusinessRule(_)));

    let stored = app.store.get_workout(sunday.id).await.unwrap().unwrap();
    assert_eq!(stored.station1, sunday.station1);
}
