use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    sort_workouts, BlockedDayRepository, ExerciseRepository, Store, StoreResult, TriSetRepository, UsageLedger,
    WorkoutRepository,
};
use crate::models::{BlockedDay, DayOfWeek, Exercise, ExerciseQuery, TriSet, TriSetFocus, TriSetMember, Workout};

#[derive(Debug, Default)]
struct Tables {
    exercises: HashMap<Uuid, Exercise>,
    /// Tri-sets keep member ids only; names are resolved on read.
    tri_sets: HashMap<Uuid, TriSet>,
    workouts: HashMap<Uuid, Workout>,
    blocked_days: Vec<BlockedDay>,
}

impl Tables {
    fn resolve(&self, tri_set: &TriSet) -> TriSet {
        let resolve_phase = |members: &[TriSetMember]| -> Vec<TriSetMember> {
            members
                .iter()
                .filter_map(|member| {
                    self.exercises
                        .get(&member.exercise_id)
                        .filter(|exercise| exercise.user_id == tri_set.user_id)
                        .map(|exercise| TriSetMember {
                            exercise_id: exercise.id,
                            name: exercise.name.clone(),
                        })
                })
                .collect()
        };

        TriSet {
            phase1: resolve_phase(&tri_set.phase1),
            phase2: resolve_phase(&tri_set.phase2),
            ..tri_set.clone()
        }
    }

    fn apply_ledger(&mut self, user_id: Uuid, ledger: &UsageLedger) {
        for id in &ledger.exercise_ids {
            if let Some(exercise) = self.exercises.get_mut(id).filter(|e| e.user_id == user_id) {
                exercise.last_used = Some(ledger.used_at);
            }
        }
        if let Some(tri_set) = ledger
            .tri_set_id
            .and_then(|id| self.tri_sets.get_mut(&id))
            .filter(|t| t.user_id == user_id)
        {
            tri_set.last_used = Some(ledger.used_at);
        }
    }
}

/// Process-local store for tests and `STORAGE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExerciseRepository for MemoryStore {
    async fn find_exercises(&self, user_id: Uuid, query: &ExerciseQuery) -> StoreResult<Vec<Exercise>> {
        let tables = self.tables.read().await;
        let mut exercises: Vec<Exercise> = tables
            .exercises
            .values()
            .filter(|exercise| exercise.user_id == user_id && query.matches(exercise))
            .cloned()
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(exercises)
    }

    async fn get_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Exercise>> {
        let tables = self.tables.read().await;
        Ok(tables.exercises.get(&id).filter(|e| e.user_id == user_id).cloned())
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.exercises.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn update_exercise(&self, exercise: &Exercise) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .exercises
            .get_mut(&exercise.id)
            .filter(|stored| stored.user_id == exercise.user_id)
        {
            Some(stored) => {
                let last_used = stored.last_used;
                *stored = Exercise {
                    last_used,
                    ..exercise.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.exercises.get(&id).is_some_and(|e| e.user_id == user_id) {
            tables.exercises.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl TriSetRepository for MemoryStore {
    async fn find_tri_sets(&self, user_id: Uuid, focus: Option<TriSetFocus>) -> StoreResult<Vec<TriSet>> {
        let tables = self.tables.read().await;
        let mut tri_sets: Vec<TriSet> = tables
            .tri_sets
            .values()
            .filter(|t| t.user_id == user_id && focus.map_or(true, |focus| t.focus == focus))
            .map(|t| tables.resolve(t))
            .collect();
        tri_sets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tri_sets)
    }

    async fn get_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<TriSet>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tri_sets
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .map(|t| tables.resolve(t)))
    }

    async fn insert_tri_set(&self, tri_set: &TriSet) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.tri_sets.insert(tri_set.id, tri_set.clone());
        Ok(())
    }

    async fn delete_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.tri_sets.get(&id).is_some_and(|t| t.user_id == user_id) {
            tables.tri_sets.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl WorkoutRepository for MemoryStore {
    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>> {
        let tables = self.tables.read().await;
        Ok(tables.workouts.get(&id).cloned())
    }

    async fn find_workout(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<Option<Workout>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workouts
            .values()
            .find(|w| w.user_id == user_id && w.week_start_date == week_start_date && w.day_of_week == day_of_week)
            .cloned())
    }

    async fn list_workouts(&self, user_id: Uuid, week_start_date: Option<NaiveDate>) -> StoreResult<Vec<Workout>> {
        let tables = self.tables.read().await;
        let mut workouts: Vec<Workout> = tables
            .workouts
            .values()
            .filter(|w| w.user_id == user_id && week_start_date.map_or(true, |week| w.week_start_date == week))
            .cloned()
            .collect();
        sort_workouts(&mut workouts);
        Ok(workouts)
    }

    async fn commit_workout(&self, workout: &Workout, ledger: &UsageLedger) -> StoreResult<Workout> {
        let mut tables = self.tables.write().await;

        let existing = tables
            .workouts
            .values()
            .find(|w| {
                w.user_id == workout.user_id
                    && w.week_start_date == workout.week_start_date
                    && w.day_of_week == workout.day_of_week
            })
            .map(|w| (w.id, w.created_at));

        let mut stored = workout.clone();
        if let Some((id, created_at)) = existing {
            if id != workout.id {
                tables.workouts.remove(&id);
            }
            stored.id = id;
            stored.created_at = created_at;
        }

        tables.workouts.insert(stored.id, stored.clone());
        tables.apply_ledger(workout.user_id, ledger);
        Ok(stored)
    }

    async fn record_usage(&self, user_id: Uuid, ledger: &UsageLedger) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.apply_ledger(user_id, ledger);
        Ok(())
    }

    async fn delete_workout(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.workouts.get(&id).is_some_and(|w| w.user_id == user_id) {
            tables.workouts.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_week(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.workouts.len();
        tables
            .workouts
            .retain(|_, w| !(w.user_id == user_id && w.week_start_date == week_start_date));
        Ok((before - tables.workouts.len()) as u64)
    }
}

#[async_trait]
impl BlockedDayRepository for MemoryStore {
    async fn list_blocked_days(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<Vec<BlockedDay>> {
        let tables = self.tables.read().await;
        let mut days: Vec<BlockedDay> = tables
            .blocked_days
            .iter()
            .filter(|b| b.user_id == user_id && b.week_start_date == week_start_date)
            .cloned()
            .collect();
        days.sort_by_key(|b| b.day_of_week.offset());
        Ok(days)
    }

    async fn insert_blocked_day(&self, blocked_day: &BlockedDay) -> StoreResult<BlockedDay> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.blocked_days.iter().find(|b| {
            b.user_id == blocked_day.user_id
                && b.week_start_date == blocked_day.week_start_date
                && b.day_of_week == blocked_day.day_of_week
        }) {
            return Ok(existing.clone());
        }
        tables.blocked_days.push(blocked_day.clone());
        Ok(blocked_day.clone())
    }

    async fn delete_blocked_day(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.blocked_days.len();
        tables
            .blocked_days
            .retain(|b| !(b.user_id == user_id && b.week_start_date == week_start_date && b.day_of_week == day_of_week));
        Ok(tables.blocked_days.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
