use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::catalog_service::CatalogService;
use super::day_assembler::{slot_query, DayAssembler};
use super::slot_selector::Selection;
use super::tri_set_service::TriSetService;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{
    day_config, is_fixed_station3_day, week_start, DayConfig, DayOfWeek, Slot, SlotAddress, SlotGroup, SlotValue,
    Station1, TechniqueDay, TriSetFocus, SLOTS_PER_GROUP, TriSetShape, Workout, WorkoutLocator,
};
use crate::repository::{Store, UsageLedger};

const PROTECTED_STATION3: &str = "Station 3 on Monday, Wednesday, and Saturday is always Non-Stop Sparring";

/// Persisted daily plans and their partial edits.
#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn Store>,
    catalog: CatalogService,
    tri_sets: TriSetService,
    assembler: DayAssembler,
}

impl WorkoutService {
    pub fn new(
        store: Arc<dyn Store>,
        catalog: CatalogService,
        tri_sets: TriSetService,
        assembler: DayAssembler,
    ) -> Self {
        Self {
            store,
            catalog,
            tri_sets,
            assembler,
        }
    }

    /// Assemble and upsert one day. The workout and its usage ledger land in one write.
    #[instrument(skip(self))]
    pub async fn generate_day(
        &self,
        user_id: Uuid,
        day: DayOfWeek,
        week_start_date: NaiveDate,
    ) -> WorkoutResult<Workout> {
        let config = training_day(day)?;
        let week = week_start(week_start_date);

        let assembled = self.assembler.assemble(user_id, &config, week).await?;
        let workout = self.store.commit_workout(&assembled.workout, &assembled.ledger).await?;

        info!(workout_id = %workout.id, %day, %week, "workout generated");
        Ok(workout)
    }

    /// Replace the whole week. Blocked days are skipped and failed days are
    /// logged and left out.
    #[instrument(skip(self))]
    pub async fn generate_week(&self, user_id: Uuid, week_start_date: NaiveDate) -> WorkoutResult<Vec<Workout>> {
        let week = week_start(week_start_date);
        let removed = self.store.delete_week(user_id, week).await?;
        let blocked: HashSet<DayOfWeek> = self
            .store
            .list_blocked_days(user_id, week)
            .await?
            .into_iter()
            .map(|b| b.day_of_week)
            .collect();

        let mut workouts = Vec::new();
        for day in DayOfWeek::training_days() {
            if blocked.contains(&day) {
                info!(%day, "day blocked, skipping");
                continue;
            }
            match self.generate_day(user_id, day, week).await {
                Ok(workout) => workouts.push(workout),
                Err(err) => warn!(%day, error = %err, "day generation failed"),
            }
        }

        info!(%week, removed, generated = workouts.len(), "week generated");
        Ok(workouts)
    }

    pub async fn get_week(&self, user_id: Uuid, week_start_date: NaiveDate) -> WorkoutResult<Vec<Workout>> {
        Ok(self
            .store
            .list_workouts(user_id, Some(week_start(week_start_date)))
            .await?)
    }

    pub async fn list(&self, user_id: Uuid) -> WorkoutResult<Vec<Workout>> {
        Ok(self.store.list_workouts(user_id, None).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<Workout> {
        self.locate(user_id, &WorkoutLocator::by_id(id)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<()> {
        let workout = self.get(user_id, id).await?;
        self.store.delete_workout(user_id, workout.id).await?;
        info!(workout_id = %id, "workout deleted");
        Ok(())
    }

    /// Resolve a locator: the id first, then the (week, day) pair.
    /// A workout found by id but owned by someone else is an ownership error.
    pub async fn locate(&self, user_id: Uuid, locator: &WorkoutLocator) -> WorkoutResult<Workout> {
        if let Some(id) = locator.id {
            if let Some(workout) = self.store.get_workout(id).await? {
                if workout.user_id != user_id {
                    warn!(workout_id = %id, %user_id, "workout owned by another user");
                    return Err(WorkoutError::forbidden());
                }
                return Ok(workout);
            }
        }

        if let (Some(week), Some(day)) = (locator.week_start_date, locator.day_of_week) {
            if let Some(workout) = self.store.find_workout(user_id, week_start(week), day).await? {
                return Ok(workout);
            }
        }

        Err(WorkoutError::workout_not_found())
    }

    /// Put a chosen exercise (by id, or by name with create-if-absent) into one slot.
    #[instrument(skip(self, locator))]
    pub async fn replace_slot(
        &self,
        user_id: Uuid,
        locator: &WorkoutLocator,
        address: SlotAddress,
        value: SlotValue,
    ) -> WorkoutResult<Workout> {
        let mut workout = self.locate(user_id, locator).await?;
        ensure_editable(&workout, address)?;

        let exercise = match value {
            SlotValue::ExerciseId(id) => {
                let exercise = self.catalog.get(user_id, id).await?;
                if exercise.station != address.station() || exercise.day_type != workout.day_type {
                    return Err(WorkoutError::business_rule(format!(
                        "\"{}\" is a Station {} {} exercise, this slot needs Station {} {}",
                        exercise.name,
                        exercise.station,
                        exercise.day_type,
                        address.station(),
                        workout.day_type
                    )));
                }
                exercise
            }
            SlotValue::ExerciseName(name) => {
                let focus = (address.station() == 1).then(|| workout.filter.station1_focus());
                self.catalog
                    .upsert_by_name(user_id, &name, address.station(), workout.day_type, focus)
                    .await?
            }
        };

        let drill_id = if is_drill_group(&workout, address.group) {
            Some(self.catalog.monday_drill(user_id).await?.id)
        } else {
            None
        };
        if taken_ids(&workout, address, drill_id).contains(&exercise.id) {
            return Err(WorkoutError::business_rule(format!(
                "\"{}\" is already in this workout",
                exercise.name
            )));
        }

        workout.group_mut(address.group)[address.index] = Slot::from(&exercise);
        workout.updated_at = Utc::now();

        let saved = self
            .store
            .commit_workout(&workout, &UsageLedger::exercises([exercise.id]))
            .await?;
        info!(workout_id = %saved.id, exercise_id = %exercise.id, "slot replaced");
        Ok(saved)
    }

    /// Draw a new exercise for one slot from the slot's assembly-time pool,
    /// excluding everything already in the workout.
    #[instrument(skip(self, locator))]
    pub async fn regenerate_slot(
        &self,
        user_id: Uuid,
        locator: &WorkoutLocator,
        address: SlotAddress,
    ) -> WorkoutResult<Workout> {
        let mut workout = self.locate(user_id, locator).await?;
        ensure_editable(&workout, address)?;
        let config = training_day(workout.day_of_week)?;

        let candidates = self.catalog.find(user_id, &slot_query(&config, address.group)).await?;
        let exclude = workout.exercise_ids();
        let exercise = match self.assembler.selector().pick_exercises(candidates, 1, &exclude) {
            Selection::Picked { mut items, .. } if !items.is_empty() => items.remove(0),
            _ => {
                return Err(WorkoutError::ExhaustedPool(
                    "No alternative exercise for this slot".to_string(),
                ))
            }
        };

        workout.group_mut(address.group)[address.index] = Slot::from(&exercise);
        workout.updated_at = Utc::now();

        let saved = self
            .store
            .commit_workout(&workout, &UsageLedger::exercises([exercise.id]))
            .await?;
        info!(workout_id = %saved.id, exercise_id = %exercise.id, "slot regenerated");
        Ok(saved)
    }

    /// Overwrite Station 1 of a technique day from a tri-set in one write.
    #[instrument(skip(self, locator))]
    pub async fn apply_tri_set(
        &self,
        user_id: Uuid,
        locator: &WorkoutLocator,
        tri_set_id: Uuid,
    ) -> WorkoutResult<Workout> {
        let mut workout = self.locate(user_id, locator).await?;
        let day = training_day(workout.day_of_week)?
            .kind
            .technique_day()
            .ok_or_else(|| WorkoutError::business_rule("Tri-sets apply to Monday and Saturday workouts only"))?;

        let tri_set = self.tri_sets.get(user_id, tri_set_id).await?;
        let expected = TriSetFocus::for_day(day);
        if tri_set.focus != expected {
            return Err(WorkoutError::business_rule(format!(
                "{} needs a {expected} tri-set, got {}",
                workout.day_of_week, tri_set.focus
            )));
        }

        match (day, tri_set.shape()) {
            (_, None) => return Err(WorkoutError::business_rule("Tri-set is incomplete")),
            (TechniqueDay::Saturday, Some(TriSetShape::SinglePhase)) => {
                return Err(WorkoutError::business_rule("Tri-set must have Phase 2 for Saturday"))
            }
            _ => {}
        }

        // Monday keeps its drill group; the tri-set's Phase 2 replaces Phase 2 and an empty one clears it.
        let station1 = match day {
            TechniqueDay::Monday => {
                let drill = self.catalog.monday_drill(user_id).await?;
                Station1 {
                    phase1: vec![Slot::from(&drill); SLOTS_PER_GROUP],
                    phase2: tri_set.phase2.iter().map(Slot::from).collect(),
                }
            }
            TechniqueDay::Saturday => Station1 {
                phase1: tri_set.phase1.iter().map(Slot::from).collect(),
                phase2: tri_set.phase2.iter().map(Slot::from).collect(),
            },
        };

        let incoming: Vec<Uuid> = match day {
            TechniqueDay::Monday => station1.phase2.iter().map(|slot| slot.exercise_id).collect(),
            TechniqueDay::Saturday => tri_set.exercise_ids().collect(),
        };
        let mut elsewhere: HashSet<Uuid> = workout
            .station2
            .iter()
            .chain(workout.station3.iter())
            .map(|slot| slot.exercise_id)
            .collect();
        if day == TechniqueDay::Monday {
            elsewhere.extend(station1.phase1.iter().map(|slot| slot.exercise_id));
        }
        if incoming.iter().any(|id| elsewhere.contains(id)) {
            return Err(WorkoutError::business_rule(
                "Tri-set shares an exercise with another slot of this workout",
            ));
        }

        let ledger = UsageLedger::exercises(
            station1
                .phase1
                .iter()
                .chain(station1.phase2.iter())
                .map(|slot| slot.exercise_id),
        )
        .with_tri_set(tri_set.id);
        workout.station1 = station1;
        workout.updated_at = Utc::now();

        let saved = self.store.commit_workout(&workout, &ledger).await?;
        info!(workout_id = %saved.id, tri_set_id = %tri_set.id, "tri-set applied");
        Ok(saved)
    }
}

fn training_day(day: DayOfWeek) -> WorkoutResult<DayConfig> {
    day_config(day).ok_or_else(|| WorkoutError::validation(format!("{day} has no workout in the program")))
}

fn ensure_editable(workout: &Workout, address: SlotAddress) -> WorkoutResult<()> {
    if address.group == SlotGroup::Station3 && is_fixed_station3_day(workout.day_of_week) {
        return Err(WorkoutError::business_rule(PROTECTED_STATION3));
    }
    if workout.slot(address).is_none() {
        return Err(WorkoutError::business_rule(format!(
            "Station {} has no slot {} in this workout",
            address.station(),
            address.index
        )));
    }
    Ok(())
}

fn is_drill_group(workout: &Workout, group: SlotGroup) -> bool {
    workout.day_of_week == DayOfWeek::Monday && group == SlotGroup::Station1Phase1
}

/// Ids a replacement may not reuse. Within Monday's drill group only the
/// drill itself may repeat.
fn taken_ids(workout: &Workout, address: SlotAddress, drill_id: Option<Uuid>) -> HashSet<Uuid> {
    let mut taken = workout.exercise_ids_except(address);
    if let Some(drill_id) = drill_id {
        let outside_group = SlotGroup::ALL
            .iter()
            .filter(|group| **group != address.group)
            .any(|group| workout.group(*group).iter().any(|slot| slot.exercise_id == drill_id));
        if !outside_group {
            taken.remove(&drill_id);
        }
    }
    taken
}
