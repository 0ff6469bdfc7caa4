use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::ProgramConfig;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{
    dedupe_by_name, label_key, CreateExerciseRequest, DayOfWeek, DayType, Exercise, ExerciseListQuery,
    ExerciseQuery, Focus, StaticCondition, TriSetFocus, UpdateExerciseRequest,
};
use crate::repository::{Store, UsageLedger};

/// The per-user exercise pool.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    program: ProgramConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, program: ProgramConfig) -> Self {
        Self { store, program }
    }

    pub async fn find(&self, user_id: Uuid, query: &ExerciseQuery) -> WorkoutResult<Vec<Exercise>> {
        Ok(self.store.find_exercises(user_id, query).await?)
    }

    /// Catalog listing. Stations 2 and 3 only list within a day type, and the
    /// focus filter applies to Station 1 only.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid, params: ExerciseListQuery) -> WorkoutResult<Vec<Exercise>> {
        let mut query = ExerciseQuery::default();

        if let Some(station) = params.station {
            validate_station(station)?;
            query.station = Some(station);
            if station != 1 && params.day_type.is_none() {
                return Ok(Vec::new());
            }
        }
        query.day_type = params.day_type;

        if params.station == Some(1) {
            if let Some(focus) = params.focus.as_deref() {
                query.focus = parse_focus_list(focus)?;
            }
        }

        let exercises = self.store.find_exercises(user_id, &query).await?;
        Ok(if params.dedupe {
            dedupe_by_name(exercises)
        } else {
            exercises
        })
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<Exercise> {
        self.store
            .get_exercise(user_id, id)
            .await?
            .ok_or_else(|| WorkoutError::not_found("Exercise not found"))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, user_id: Uuid, request: CreateExerciseRequest) -> WorkoutResult<Exercise> {
        let mut exercise = Exercise::new(user_id, &request.name, request.station, request.day_type, request.focus);
        exercise.is_static = request.is_static;
        exercise.static_condition = request.static_condition;
        validate_exercise(&exercise)?;

        self.store.insert_exercise(&exercise).await?;
        info!(exercise_id = %exercise.id, station = exercise.station, "exercise created");
        Ok(exercise)
    }

    /// Edits catalog fields. `last_used` is never written here.
    #[instrument(skip(self, request))]
    pub async fn update(&self, user_id: Uuid, id: Uuid, request: UpdateExerciseRequest) -> WorkoutResult<Exercise> {
        let mut exercise = self.get(user_id, id).await?;

        if let Some(name) = request.name {
            exercise.name = name.trim().to_string();
        }
        if let Some(station) = request.station {
            exercise.station = station;
        }
        if let Some(focus) = request.focus {
            exercise.focus = Some(focus);
        }
        if let Some(day_type) = request.day_type {
            exercise.day_type = day_type;
        }
        if let Some(is_static) = request.is_static {
            exercise.is_static = is_static;
            if !is_static {
                exercise.static_condition = None;
            }
        }
        if let Some(condition) = request.static_condition {
            exercise.static_condition = Some(condition);
        }
        exercise.updated_at = Utc::now();
        validate_exercise(&exercise)?;

        if !self.store.update_exercise(&exercise).await? {
            return Err(WorkoutError::not_found("Exercise not found"));
        }
        Ok(exercise)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<()> {
        if !self.store.delete_exercise(user_id, id).await? {
            return Err(WorkoutError::not_found("Exercise not found"));
        }
        info!(exercise_id = %id, "exercise deleted");
        Ok(())
    }

    /// Idempotent lookup-or-create keyed by trimmed name, station and day type.
    #[instrument(skip(self))]
    pub async fn upsert_by_name(
        &self,
        user_id: Uuid,
        name: &str,
        station: u8,
        day_type: DayType,
        focus: Option<Focus>,
    ) -> WorkoutResult<Exercise> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkoutError::validation("Exercise name is required"));
        }
        validate_station(station)?;

        let existing = self
            .store
            .find_exercises(user_id, &ExerciseQuery::station(station).day_type(day_type))
            .await?
            .into_iter()
            .find(|exercise| exercise.name.trim() == name);
        if let Some(exercise) = existing {
            return Ok(exercise);
        }

        let exercise = Exercise::new(user_id, name, station, day_type, focus);
        self.store.insert_exercise(&exercise).await?;
        info!(exercise_id = %exercise.id, "exercise created from free-text name");
        Ok(exercise)
    }

    /// Stamp `last_used` through the usage ledger.
    pub async fn touch(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<()> {
        self.get(user_id, id).await?;
        self.store.record_usage(user_id, &UsageLedger::exercises([id])).await?;
        Ok(())
    }

    /// Candidates for building Monday or Saturday tri-sets: Technique Station 1
    /// exercises of the matching focus, narrowed to those already seen in that
    /// weekday's Station 1 when there are any.
    #[instrument(skip(self))]
    pub async fn station1_for_day(&self, user_id: Uuid, day: DayOfWeek) -> WorkoutResult<Vec<Exercise>> {
        let focus = match day {
            DayOfWeek::Monday => TriSetFocus::Mixed,
            DayOfWeek::Saturday => TriSetFocus::Lower,
            _ => return Err(WorkoutError::validation("Provide dayOfWeek: Monday or Saturday")),
        };

        let seen: HashSet<Uuid> = self
            .store
            .list_workouts(user_id, None)
            .await?
            .into_iter()
            .filter(|workout| workout.day_of_week == day)
            .flat_map(|workout| {
                workout
                    .station1
                    .phase1
                    .into_iter()
                    .chain(workout.station1.phase2)
                    .map(|slot| slot.exercise_id)
            })
            .collect();

        let mut query = ExerciseQuery::station(1)
            .day_type(DayType::Technique)
            .focus(focus.accepted_exercise_focus().iter().copied());
        if !seen.is_empty() {
            query = query.only(seen);
        }

        Ok(self.store.find_exercises(user_id, &query).await?)
    }

    /// The Station 3 exercise shared by every fixed-drill day, matched by name
    /// ignoring case, hyphens and spaces. Created on first use.
    pub async fn sparring_exercise(&self, user_id: Uuid, day_type: DayType) -> WorkoutResult<Exercise> {
        let key = label_key(&self.program.sparring_exercise_name);
        let found = self
            .store
            .find_exercises(user_id, &ExerciseQuery::station(3))
            .await?
            .into_iter()
            .find(|exercise| label_key(&exercise.name).contains(&key));
        if let Some(exercise) = found {
            return Ok(exercise);
        }

        let exercise = Exercise::new(user_id, &self.program.sparring_exercise_name, 3, day_type, None);
        self.create_canonical(exercise).await
    }

    /// Monday's fixed Phase 1 drill. Created on first use without a focus so it
    /// never enters the random or tri-set pools.
    pub async fn monday_drill(&self, user_id: Uuid) -> WorkoutResult<Exercise> {
        let key = label_key(&self.program.monday_drill_name);
        let found = self
            .store
            .find_exercises(user_id, &ExerciseQuery::station(1).day_type(DayType::Technique))
            .await?
            .into_iter()
            .find(|exercise| label_key(&exercise.name) == key);
        if let Some(exercise) = found {
            return Ok(exercise);
        }

        let exercise = Exercise::new(user_id, &self.program.monday_drill_name, 1, DayType::Technique, None);
        self.create_canonical(exercise).await
    }

    /// The exercise pinned to Station 3 position B for a day type, if the user has one.
    pub async fn static_exercise(&self, user_id: Uuid, condition: StaticCondition) -> WorkoutResult<Option<Exercise>> {
        let query = ExerciseQuery::station(3).is_static(true).static_condition(condition);
        Ok(self.store.find_exercises(user_id, &query).await?.into_iter().next())
    }

    async fn create_canonical(&self, exercise: Exercise) -> WorkoutResult<Exercise> {
        match self.store.insert_exercise(&exercise).await {
            Ok(()) => {
                info!(exercise_id = %exercise.id, name = %exercise.name, "canonical exercise created");
                Ok(exercise)
            }
            Err(err) => {
                warn!(error = %err, name = %exercise.name, "canonical exercise could not be created");
                Err(WorkoutError::Generation(format!(
                    "Station {} needs \"{}\". Add it to your exercises and try again.",
                    exercise.station, exercise.name
                )))
            }
        }
    }
}

fn validate_station(station: u8) -> WorkoutResult<()> {
    if !(1..=3).contains(&station) {
        return Err(WorkoutError::validation("Invalid station (1, 2, or 3)"));
    }
    Ok(())
}

fn validate_exercise(exercise: &Exercise) -> WorkoutResult<()> {
    if exercise.name.trim().is_empty() {
        return Err(WorkoutError::validation("Exercise name is required"));
    }
    validate_station(exercise.station)?;
    if exercise.is_static && exercise.static_condition.is_none() {
        return Err(WorkoutError::validation("Static exercises need a staticCondition"));
    }
    if exercise.static_condition.is_some() && exercise.station != 3 {
        return Err(WorkoutError::validation("Static conditions apply to Station 3 only"));
    }
    Ok(())
}

fn parse_focus_list(raw: &str) -> WorkoutResult<Vec<Focus>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Focus>().map_err(WorkoutError::Validation))
        .collect()
}
