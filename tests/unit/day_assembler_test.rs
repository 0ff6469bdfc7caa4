use std::collections::HashSet;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use circuit_coach::error::WorkoutError;
use circuit_coach::models::*;
use circuit_coach::repository::{ExerciseRepository, TriSetRepository, WorkoutRepository};

use crate::common::{week, TestApp};

fn ids(slots: &[Slot]) -> Vec<Uuid> {
    slots.iter().map(|slot| slot.exercise_id).collect()
}

#[tokio::test]
async fn test_sunday_slots_are_distinct_and_disjoint() {
    let app = TestApp::new();
    app.seed_program().await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Sunday, week())
        .await
        .unwrap();

    let station1: HashSet<Uuid> = ids(&workout.station1.phase1)
        .into_iter()
        .chain(ids(&workout.station1.phase2))
        .collect();
    let station2: HashSet<Uuid> = ids(&workout.station2).into_iter().collect();
    let station3: HashSet<Uuid> = ids(&workout.station3).into_iter().collect();

    assert_eq!(station1.len(), 6);
    assert_eq!(station2.len(), 3);
    assert_eq!(station3.len(), 3);
    assert!(station1.is_disjoint(&station2));
    assert!(station2.is_disjoint(&station3));
    assert!(station1.is_disjoint(&station3));

    let upper = app
        .store
        .find_exercises(
            app.user_id,
            &ExerciseQuery::station(1).day_type(DayType::Kickboxing).focus([Focus::Upper]),
        )
        .await
        .unwrap();
    let upper_ids: HashSet<Uuid> = upper.iter().map(|e| e.id).collect();
    assert!(station1.is_subset(&upper_ids));
}

#[tokio::test]
async fn test_generated_exercises_are_stamped() {
    let app = TestApp::new();
    app.seed_program().await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Tuesday, week())
        .await
        .unwrap();

    for id in workout.exercise_ids() {
        let exercise = app.store.get_exercise(app.user_id, id).await.unwrap().unwrap();
        assert!(exercise.last_used.is_some(), "{} was not stamped", exercise.name);
    }
}

#[tokio::test]
async fn test_monday_drill_then_tri_set_phase_two() {
    let app = TestApp::new();
    let seeded = app.seed_program().await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Monday, week())
        .await
        .unwrap();

    let drill = &workout.station1.phase1;
    assert_eq!(drill.len(), 3);
    assert!(drill.iter().all(|slot| slot.name == "Shadowboxing"));
    assert!(drill.iter().all(|slot| slot.exercise_id == drill[0].exercise_id));

    let expected: Vec<Uuid> = seeded.mixed[3..6].iter().map(|e| e.id).collect();
    assert_eq!(ids(&workout.station1.phase2), expected);

    let tri_set = app
        .store
        .get_tri_set(app.user_id, seeded.mixed_set.id)
        .await
        .unwrap()
        .unwrap();
    assert!(tri_set.last_used.is_some());

    let sparring: HashSet<&str> = workout.station3.iter().map(|slot| slot.name.as_str()).collect();
    assert_eq!(sparring, HashSet::from(["Non-Stop Sparring"]));
}

#[tokio::test]
async fn test_monday_single_phase_tri_set_fills_phase_two() {
    let app = TestApp::new();
    app.pool(4, 2, DayType::Technique, None).await;
    let mixed = app.pool(3, 1, DayType::Technique, Some(Focus::FullBody)).await;
    app.tri_set(TriSetFocus::Mixed, &mixed, &[]).await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Monday, week())
        .await
        .unwrap();

    assert_eq!(ids(&workout.station1.phase2), mixed.iter().map(|e| e.id).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_saturday_uses_both_tri_set_phases() {
    let app = TestApp::new();
    let seeded = app.seed_program().await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Saturday, week())
        .await
        .unwrap();

    let phase1: Vec<Uuid> = seeded.lower[0..3].iter().map(|e| e.id).collect();
    let phase2: Vec<Uuid> = seeded.lower[3..6].iter().map(|e| e.id).collect();
    assert_eq!(ids(&workout.station1.phase1), phase1);
    assert_eq!(ids(&workout.station1.phase2), phase2);
    assert_eq!(seeded.lower_set.phase1.len(), 3);
}

#[tokio::test]
async fn test_saturday_without_dual_tri_set_fails() {
    let app = TestApp::new();
    app.pool(4, 2, DayType::Technique, None).await;
    let lower = app.pool(3, 1, DayType::Technique, Some(Focus::Lower)).await;
    app.tri_set(TriSetFocus::Lower, &lower, &[]).await;

    let result = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Saturday, week())
        .await;

    assert_matches!(result, Err(WorkoutError::Generation(_)));
}

#[tokio::test]
async fn test_wednesday_station3_is_sparring() {
    let app = TestApp::new();
    app.seed_program().await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Wednesday, week())
        .await
        .unwrap();

    assert_eq!(workout.station3.len(), 3);
    assert!(workout.station3.iter().all(|slot| slot.name == "Non-Stop Sparring"));
    assert_eq!(ids(&workout.station3).into_iter().collect::<HashSet<_>>().len(), 1);
}

#[tokio::test]
async fn test_existing_sparring_entry_is_reused() {
    let app = TestApp::new();
    app.seed_program().await;
    let existing = app.exercise("nonstop sparring", 3, DayType::Conditioning, None).await;

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Wednesday, week())
        .await
        .unwrap();

    assert!(workout.station3.iter().all(|slot| slot.exercise_id == existing.id));
}

#[tokio::test]
async fn test_static_exercise_pinned_to_position_b() {
    let app = TestApp::new();
    app.seed_program().await;
    let mut pinned = Exercise::new(app.user_id, "Heavy Bag Finisher", 3, DayType::Kickboxing, None);
    pinned.is_static = true;
    pinned.static_condition = Some(StaticCondition::KickboxingStation3B);
    app.store.insert_exercise(&pinned).await.unwrap();

    let workout = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Thursday, week())
        .await
        .unwrap();

    assert_eq!(workout.station3[1].exercise_id, pinned.id);
    assert_ne!(workout.station3[0].exercise_id, pinned.id);
    assert_ne!(workout.station3[2].exercise_id, pinned.id);
}

#[tokio::test]
async fn test_short_station_pool_is_exhausted() {
    let app = TestApp::new();
    app.pool(6, 1, DayType::Boxing, Some(Focus::Upper)).await;
    app.pool(2, 2, DayType::Boxing, None).await;
    app.pool(3, 3, DayType::Boxing, None).await;

    let result = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Tuesday, week())
        .await;

    assert_matches!(result, Err(WorkoutError::ExhaustedPool(_)));
    assert!(app
        .store
        .find_workout(app.user_id, week(), DayOfWeek::Tuesday)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_friday_is_not_generated() {
    let app = TestApp::new();
    app.seed_program().await;

    let result = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Friday, week())
        .await;

    assert_matches!(result, Err(WorkoutError::Validation(_)));
}

#[tokio::test]
async fn test_regenerating_a_day_keeps_its_identity() {
    let app = TestApp::new();
    app.seed_program().await;
    let thursday = week().succ_opt().unwrap().succ_opt().unwrap().succ_opt().unwrap().succ_opt().unwrap();

    let first = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Sunday, week())
        .await
        .unwrap();
    // Any date in the week lands on the same Sunday
    let second = app
        .state
        .workouts
        .generate_day(app.user_id, DayOfWeek::Sunday, thursday)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.week_start_date, week());
    assert_eq!(app.state.workouts.get_week(app.user_id, week()).await.unwrap().len(), 1);
}
