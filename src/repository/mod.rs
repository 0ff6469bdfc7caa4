// Persistence seams: one trait per aggregate, composed into `Store`

pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{BlockedDay, DayOfWeek, Exercise, ExerciseQuery, TriSet, TriSetFocus, Workout};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Exercises and tri-set to stamp with `last_used` in the same write as a workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLedger {
    pub exercise_ids: HashSet<Uuid>,
    pub tri_set_id: Option<Uuid>,
    pub used_at: DateTime<Utc>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self {
            exercise_ids: HashSet::new(),
            tri_set_id: None,
            used_at: Utc::now(),
        }
    }

    pub fn exercises(ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut ledger = Self::new();
        ledger.exercise_ids.extend(ids);
        ledger
    }

    pub fn with_tri_set(mut self, tri_set_id: Uuid) -> Self {
        self.tri_set_id = Some(tri_set_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.exercise_ids.is_empty() && self.tri_set_id.is_none()
    }
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Matching exercises ordered by name.
    async fn find_exercises(&self, user_id: Uuid, query: &ExerciseQuery) -> StoreResult<Vec<Exercise>>;
    async fn get_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Exercise>>;
    async fn insert_exercise(&self, exercise: &Exercise) -> StoreResult<()>;
    /// Writes catalog fields only; `last_used` is left as stored.
    async fn update_exercise(&self, exercise: &Exercise) -> StoreResult<bool>;
    async fn delete_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

/// Tri-sets come back with members resolved against the current catalog.
/// Members whose exercise no longer exists are dropped, which leaves the
/// tri-set malformed and out of rotation.
#[async_trait]
pub trait TriSetRepository: Send + Sync {
    async fn find_tri_sets(&self, user_id: Uuid, focus: Option<TriSetFocus>) -> StoreResult<Vec<TriSet>>;
    async fn get_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<TriSet>>;
    async fn insert_tri_set(&self, tri_set: &TriSet) -> StoreResult<()>;
    async fn delete_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Unscoped lookup; callers check ownership.
    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>>;
    async fn find_workout(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<Option<Workout>>;
    /// Newest week first, days in program order.
    async fn list_workouts(&self, user_id: Uuid, week_start_date: Option<NaiveDate>) -> StoreResult<Vec<Workout>>;
    /// Upsert by (owner, week, day) and apply the ledger atomically. An existing
    /// row keeps its id and creation time.
    async fn commit_workout(&self, workout: &Workout, ledger: &UsageLedger) -> StoreResult<Workout>;
    /// Apply a ledger on its own.
    async fn record_usage(&self, user_id: Uuid, ledger: &UsageLedger) -> StoreResult<()>;
    async fn delete_workout(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
    async fn delete_week(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<u64>;
}

#[async_trait]
pub trait BlockedDayRepository: Send + Sync {
    async fn list_blocked_days(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<Vec<BlockedDay>>;
    /// Idempotent: blocking an already blocked day returns the stored record.
    async fn insert_blocked_day(&self, blocked_day: &BlockedDay) -> StoreResult<BlockedDay>;
    async fn delete_blocked_day(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<bool>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: ExerciseRepository + TriSetRepository + WorkoutRepository + BlockedDayRepository {
    async fn ping(&self) -> StoreResult<()>;
}

/// Shared ordering for workout listings.
pub(crate) fn sort_workouts(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| {
        b.week_start_date
            .cmp(&a.week_start_date)
            .then(a.day_of_week.offset().cmp(&b.day_of_week.offset()))
    });
}
