use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{
    sort_workouts, BlockedDayRepository, ExerciseRepository, Store, StoreResult, TriSetRepository, UsageLedger,
    WorkoutRepository,
};
use crate::error::StoreError;
use crate::models::{
    BlockedDay, DayOfWeek, Exercise, ExerciseQuery, Slot, Station1, TriSet, TriSetFocus, TriSetMember, Workout,
};

const EXERCISE_COLUMNS: &str =
    "id, user_id, name, station, focus, day_type, is_static, static_condition, last_used, created_at, updated_at";
const TRI_SET_COLUMNS: &str =
    "id, user_id, focus, name, concept, phase1_ids, phase2_ids, last_used, created_at, updated_at";
const WORKOUT_COLUMNS: &str = "id, user_id, day_of_week, day_type, filter, week_start_date, station1, station2, \
     station3, created_at, updated_at";
const BLOCKED_DAY_COLUMNS: &str = "id, user_id, week_start_date, day_of_week, created_at";

fn parse<T: FromStr<Err = String>>(value: &str) -> StoreResult<T> {
    value.parse().map_err(StoreError::Corrupt)
}

#[derive(Debug, FromRow)]
struct ExerciseRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    station: i16,
    focus: Option<String>,
    day_type: String,
    is_static: bool,
    static_condition: Option<String>,
    last_used: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = StoreError;

    fn try_from(row: ExerciseRow) -> StoreResult<Self> {
        Ok(Exercise {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            station: u8::try_from(row.station)
                .map_err(|_| StoreError::Corrupt(format!("station {} out of range", row.station)))?,
            focus: row.focus.as_deref().map(parse).transpose()?,
            day_type: parse(&row.day_type)?,
            is_static: row.is_static,
            static_condition: row.static_condition.as_deref().map(parse).transpose()?,
            last_used: row.last_used,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TriSetRow {
    id: Uuid,
    user_id: Uuid,
    focus: String,
    name: String,
    concept: String,
    phase1_ids: Vec<Uuid>,
    phase2_ids: Vec<Uuid>,
    last_used: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TriSetRow {
    fn into_tri_set(self, names: &HashMap<Uuid, String>) -> StoreResult<TriSet> {
        let members = |ids: &[Uuid]| -> Vec<TriSetMember> {
            ids.iter()
                .filter_map(|id| {
                    names.get(id).map(|name| TriSetMember {
                        exercise_id: *id,
                        name: name.clone(),
                    })
                })
                .collect()
        };

        Ok(TriSet {
            id: self.id,
            user_id: self.user_id,
            focus: parse(&self.focus)?,
            phase1: members(&self.phase1_ids),
            phase2: members(&self.phase2_ids),
            name: self.name,
            concept: self.concept,
            last_used: self.last_used,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WorkoutRow {
    id: Uuid,
    user_id: Uuid,
    day_of_week: String,
    day_type: String,
    filter: String,
    week_start_date: NaiveDate,
    station1: Json<Station1>,
    station2: Json<Vec<Slot>>,
    station3: Json<Vec<Slot>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = StoreError;

    fn try_from(row: WorkoutRow) -> StoreResult<Self> {
        Ok(Workout {
            id: row.id,
            user_id: row.user_id,
            day_of_week: parse(&row.day_of_week)?,
            day_type: parse(&row.day_type)?,
            filter: parse(&row.filter)?,
            week_start_date: row.week_start_date,
            station1: row.station1.0,
            station2: row.station2.0,
            station3: row.station3.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct BlockedDayRow {
    id: Uuid,
    user_id: Uuid,
    week_start_date: NaiveDate,
    day_of_week: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BlockedDayRow> for BlockedDay {
    type Error = StoreError;

    fn try_from(row: BlockedDayRow) -> StoreResult<Self> {
        Ok(BlockedDay {
            id: row.id,
            user_id: row.user_id,
            week_start_date: row.week_start_date,
            day_of_week: parse(&row.day_of_week)?,
            created_at: row.created_at,
        })
    }
}

async fn apply_ledger(conn: &mut PgConnection, user_id: Uuid, ledger: &UsageLedger) -> StoreResult<()> {
    if !ledger.exercise_ids.is_empty() {
        let ids: Vec<Uuid> = ledger.exercise_ids.iter().copied().collect();
        sqlx::query("UPDATE exercises SET last_used = $1 WHERE user_id = $2 AND id = ANY($3)")
            .bind(ledger.used_at)
            .bind(user_id)
            .bind(ids)
            .execute(&mut *conn)
            .await?;
    }

    if let Some(tri_set_id) = ledger.tri_set_id {
        sqlx::query("UPDATE tri_sets SET last_used = $1 WHERE user_id = $2 AND id = $3")
            .bind(ledger.used_at)
            .bind(user_id)
            .bind(tri_set_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Postgres-backed store. Workout slots live in JSONB columns; tri-set
/// members are id arrays resolved against `exercises` on read.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn resolve_tri_sets(&self, user_id: Uuid, rows: Vec<TriSetRow>) -> StoreResult<Vec<TriSet>> {
        let ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|row| row.phase1_ids.iter().chain(row.phase2_ids.iter()).copied())
            .collect();

        let names: HashMap<Uuid, String> =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM exercises WHERE user_id = $1 AND id = ANY($2)")
                .bind(user_id)
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .collect();

        rows.into_iter().map(|row| row.into_tri_set(&names)).collect()
    }
}

#[async_trait]
impl ExerciseRepository for PgStore {
    async fn find_exercises(&self, user_id: Uuid, query: &ExerciseQuery) -> StoreResult<Vec<Exercise>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE user_id = "));
        builder.push_bind(user_id);

        if let Some(station) = query.station {
            builder.push(" AND station = ").push_bind(i16::from(station));
        }
        if let Some(day_type) = query.day_type {
            builder.push(" AND day_type = ").push_bind(day_type.as_str());
        }
        if !query.focus.is_empty() {
            let focus: Vec<String> = query.focus.iter().map(|f| f.as_str().to_string()).collect();
            builder.push(" AND focus = ANY(").push_bind(focus).push(")");
        }
        if let Some(is_static) = query.is_static {
            builder.push(" AND is_static = ").push_bind(is_static);
        }
        if let Some(condition) = query.static_condition {
            builder.push(" AND static_condition = ").push_bind(condition.as_str());
        }
        if let Some(only) = &query.only_ids {
            let only: Vec<Uuid> = only.iter().copied().collect();
            builder.push(" AND id = ANY(").push_bind(only).push(")");
        }
        if !query.exclude_ids.is_empty() {
            let excluded: Vec<Uuid> = query.exclude_ids.iter().copied().collect();
            builder.push(" AND NOT (id = ANY(").push_bind(excluded).push("))");
        }
        builder.push(" ORDER BY name, created_at");

        let rows: Vec<ExerciseRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "exercises matched");
        rows.into_iter().map(Exercise::try_from).collect()
    }

    async fn get_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Exercise>> {
        let row = sqlx::query_as::<_, ExerciseRow>(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Exercise::try_from).transpose()
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO exercises (
                id, user_id, name, station, focus, day_type, is_static, static_condition,
                last_used, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(exercise.id)
        .bind(exercise.user_id)
        .bind(&exercise.name)
        .bind(i16::from(exercise.station))
        .bind(exercise.focus.map(|f| f.as_str()))
        .bind(exercise.day_type.as_str())
        .bind(exercise.is_static)
        .bind(exercise.static_condition.map(|c| c.as_str()))
        .bind(exercise.last_used)
        .bind(exercise.created_at)
        .bind(exercise.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_exercise(&self, exercise: &Exercise) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE exercises
            SET name = $3, station = $4, focus = $5, day_type = $6, is_static = $7,
                static_condition = $8, updated_at = $9
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(exercise.id)
        .bind(exercise.user_id)
        .bind(&exercise.name)
        .bind(i16::from(exercise.station))
        .bind(exercise.focus.map(|f| f.as_str()))
        .bind(exercise.day_type.as_str())
        .bind(exercise.is_static)
        .bind(exercise.static_condition.map(|c| c.as_str()))
        .bind(exercise.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_exercise(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TriSetRepository for PgStore {
    async fn find_tri_sets(&self, user_id: Uuid, focus: Option<TriSetFocus>) -> StoreResult<Vec<TriSet>> {
        let rows = sqlx::query_as::<_, TriSetRow>(&format!(
            "SELECT {TRI_SET_COLUMNS} FROM tri_sets \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR focus = $2) \
             ORDER BY created_at"
        ))
        .bind(user_id)
        .bind(focus.map(|f| f.as_str()))
        .fetch_all(&self.pool)
        .await?;

        self.resolve_tri_sets(user_id, rows).await
    }

    async fn get_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<TriSet>> {
        let row = sqlx::query_as::<_, TriSetRow>(&format!(
            "SELECT {TRI_SET_COLUMNS} FROM tri_sets WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.resolve_tri_sets(user_id, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_tri_set(&self, tri_set: &TriSet) -> StoreResult<()> {
        let phase1: Vec<Uuid> = tri_set.phase1.iter().map(|m| m.exercise_id).collect();
        let phase2: Vec<Uuid> = tri_set.phase2.iter().map(|m| m.exercise_id).collect();

        sqlx::query(
            r#"
            INSERT INTO tri_sets (
                id, user_id, focus, name, concept, phase1_ids, phase2_ids, last_used, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(tri_set.id)
        .bind(tri_set.user_id)
        .bind(tri_set.focus.as_str())
        .bind(&tri_set.name)
        .bind(&tri_set.concept)
        .bind(phase1)
        .bind(phase2)
        .bind(tri_set.last_used)
        .bind(tri_set.created_at)
        .bind(tri_set.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_tri_set(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tri_sets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl WorkoutRepository for PgStore {
    async fn get_workout(&self, id: Uuid) -> StoreResult<Option<Workout>> {
        let row = sqlx::query_as::<_, WorkoutRow>(&format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Workout::try_from).transpose()
    }

    async fn find_workout(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<Option<Workout>> {
        let row = sqlx::query_as::<_, WorkoutRow>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts \
             WHERE user_id = $1 AND week_start_date = $2 AND day_of_week = $3"
        ))
        .bind(user_id)
        .bind(week_start_date)
        .bind(day_of_week.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Workout::try_from).transpose()
    }

    async fn list_workouts(&self, user_id: Uuid, week_start_date: Option<NaiveDate>) -> StoreResult<Vec<Workout>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts \
             WHERE user_id = $1 AND ($2::DATE IS NULL OR week_start_date = $2)"
        ))
        .bind(user_id)
        .bind(week_start_date)
        .fetch_all(&self.pool)
        .await?;

        let mut workouts = rows
            .into_iter()
            .map(Workout::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        sort_workouts(&mut workouts);
        Ok(workouts)
    }

    async fn commit_workout(&self, workout: &Workout, ledger: &UsageLedger) -> StoreResult<Workout> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, WorkoutRow>(&format!(
            r#"
            INSERT INTO workouts (
                id, user_id, day_of_week, day_type, filter, week_start_date,
                station1, station2, station3, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, week_start_date, day_of_week) DO UPDATE SET
                day_type = EXCLUDED.day_type,
                filter = EXCLUDED.filter,
                station1 = EXCLUDED.station1,
                station2 = EXCLUDED.station2,
                station3 = EXCLUDED.station3,
                updated_at = EXCLUDED.updated_at
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(workout.id)
        .bind(workout.user_id)
        .bind(workout.day_of_week.as_str())
        .bind(workout.day_type.as_str())
        .bind(workout.filter.as_str())
        .bind(workout.week_start_date)
        .bind(Json(&workout.station1))
        .bind(Json(&workout.station2))
        .bind(Json(&workout.station3))
        .bind(workout.created_at)
        .bind(workout.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        apply_ledger(&mut *tx, workout.user_id, ledger).await?;
        tx.commit().await?;

        Workout::try_from(row)
    }

    async fn record_usage(&self, user_id: Uuid, ledger: &UsageLedger) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        apply_ledger(&mut *tx, user_id, ledger).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_workout(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_week(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM workouts WHERE user_id = $1 AND week_start_date = $2")
            .bind(user_id)
            .bind(week_start_date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BlockedDayRepository for PgStore {
    async fn list_blocked_days(&self, user_id: Uuid, week_start_date: NaiveDate) -> StoreResult<Vec<BlockedDay>> {
        let rows = sqlx::query_as::<_, BlockedDayRow>(&format!(
            "SELECT {BLOCKED_DAY_COLUMNS} FROM blocked_days WHERE user_id = $1 AND week_start_date = $2"
        ))
        .bind(user_id)
        .bind(week_start_date)
        .fetch_all(&self.pool)
        .await?;

        let mut days = rows
            .into_iter()
            .map(BlockedDay::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        days.sort_by_key(|b| b.day_of_week.offset());
        Ok(days)
    }

    async fn insert_blocked_day(&self, blocked_day: &BlockedDay) -> StoreResult<BlockedDay> {
        let row = sqlx::query_as::<_, BlockedDayRow>(&format!(
            r#"
            INSERT INTO blocked_days (id, user_id, week_start_date, day_of_week, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, week_start_date, day_of_week)
                DO UPDATE SET day_of_week = EXCLUDED.day_of_week
            RETURNING {BLOCKED_DAY_COLUMNS}
            "#
        ))
        .bind(blocked_day.id)
        .bind(blocked_day.user_id)
        .bind(blocked_day.week_start_date)
        .bind(blocked_day.day_of_week.as_str())
        .bind(blocked_day.created_at)
        .fetch_one(&self.pool)
        .await?;

        BlockedDay::try_from(row)
    }

    async fn delete_blocked_day(
        &self,
        user_id: Uuid,
        week_start_date: NaiveDate,
        day_of_week: DayOfWeek,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM blocked_days WHERE user_id = $1 AND week_start_date = $2 AND day_of_week = $3",
        )
        .bind(user_id)
        .bind(week_start_date)
        .bind(day_of_week.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
