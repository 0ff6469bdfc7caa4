use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::catalog_service::CatalogService;
use super::slot_selector::{Selection, SlotSelector};
use super::tri_set_service::TriSetService;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{
    DayConfig, DayKind, Exercise, ExerciseQuery, ShapeRequirement, Slot, SlotGroup, Station1, TechniqueDay,
    TriSetFocus, Workout, SLOTS_PER_GROUP,
};
use crate::repository::UsageLedger;

/// A built day, not yet persisted.
#[derive(Debug, Clone)]
pub struct AssembledDay {
    pub workout: Workout,
    pub ledger: UsageLedger,
}

/// The structural filter a slot is filled from, shared by assembly and
/// single-slot regeneration.
pub fn slot_query(config: &DayConfig, group: SlotGroup) -> ExerciseQuery {
    match (group, config.kind) {
        (SlotGroup::Station1Phase1 | SlotGroup::Station1Phase2, DayKind::Technique(day)) => ExerciseQuery::station(1)
            .day_type(config.day_type)
            .focus(TriSetFocus::for_day(day).accepted_exercise_focus().iter().copied()),
        (SlotGroup::Station1Phase1 | SlotGroup::Station1Phase2, _) => ExerciseQuery::station(1)
            .day_type(config.day_type)
            .focus([config.filter.station1_focus()]),
        (SlotGroup::Station2, _) => ExerciseQuery::station(2).day_type(config.day_type),
        (SlotGroup::Station3, _) => ExerciseQuery::station(3).day_type(config.day_type).is_static(false),
    }
}

/// Builds one day's workout from the static schedule.
#[derive(Clone)]
pub struct DayAssembler {
    catalog: CatalogService,
    tri_sets: TriSetService,
    selector: Arc<SlotSelector>,
}

impl DayAssembler {
    pub fn new(catalog: CatalogService, tri_sets: TriSetService, selector: Arc<SlotSelector>) -> Self {
        Self {
            catalog,
            tri_sets,
            selector,
        }
    }

    pub fn selector(&self) -> &SlotSelector {
        &self.selector
    }

    #[instrument(skip(self, config), fields(day = %config.day))]
    pub async fn assemble(
        &self,
        user_id: Uuid,
        config: &DayConfig,
        week_start_date: NaiveDate,
    ) -> WorkoutResult<AssembledDay> {
        let mut workout = Workout::new(user_id, config, week_start_date);
        let mut used: HashSet<Uuid> = HashSet::new();
        let mut ledger = UsageLedger::new();

        // Station 1
        match config.kind.technique_day() {
            Some(TechniqueDay::Monday) => {
                let drill = self.catalog.monday_drill(user_id).await?;
                used.insert(drill.id);
                workout.station1.phase1 = vec![Slot::from(&drill); SLOTS_PER_GROUP];

                let candidates = self
                    .tri_sets
                    .find_candidates(user_id, TriSetFocus::Mixed, &used, ShapeRequirement::Any)
                    .await?;
                let tri_set = self
                    .selector
                    .pick_tri_set(candidates, &HashSet::new())
                    .ok_or_else(|| missing_tri_sets(TechniqueDay::Monday))?;

                workout.station1.phase2 = tri_set.technique_group().iter().map(Slot::from).collect();
                ledger = ledger.with_tri_set(tri_set.id);
                debug!(tri_set_id = %tri_set.id, "monday tri-set chosen");
            }
            Some(TechniqueDay::Saturday) => {
                let candidates = self
                    .tri_sets
                    .find_candidates(user_id, TriSetFocus::Lower, &used, ShapeRequirement::DualPhase)
                    .await?;
                let tri_set = self
                    .selector
                    .pick_tri_set(candidates, &HashSet::new())
                    .ok_or_else(|| missing_tri_sets(TechniqueDay::Saturday))?;

                workout.station1 = Station1 {
                    phase1: tri_set.phase1.iter().map(Slot::from).collect(),
                    phase2: tri_set.phase2.iter().map(Slot::from).collect(),
                };
                ledger = ledger.with_tri_set(tri_set.id);
                debug!(tri_set_id = %tri_set.id, "saturday tri-set chosen");
            }
            None => {
                let query = slot_query(config, SlotGroup::Station1Phase1);
                let candidates = self.catalog.find(user_id, &query).await?;

                let phase1 = self.pick_group(candidates.clone(), SLOTS_PER_GROUP, &used, "Station 1", config)?;
                used.extend(phase1.iter().map(|e| e.id));
                let phase2 = self.pick_group(candidates, SLOTS_PER_GROUP, &used, "Station 1", config)?;
                used.extend(phase2.iter().map(|e| e.id));

                workout.station1 = Station1 {
                    phase1: phase1.iter().map(Slot::from).collect(),
                    phase2: phase2.iter().map(Slot::from).collect(),
                };
            }
        }
        used.extend(workout.station1.phase1.iter().map(|s| s.exercise_id));
        used.extend(workout.station1.phase2.iter().map(|s| s.exercise_id));

        // Station 2
        let candidates = self.catalog.find(user_id, &slot_query(config, SlotGroup::Station2)).await?;
        let station2 = self.pick_group(candidates, SLOTS_PER_GROUP, &used, "Station 2", config)?;
        used.extend(station2.iter().map(|e| e.id));
        workout.station2 = station2.iter().map(Slot::from).collect();

        // Station 3
        workout.station3 = if config.kind.station3_is_fixed() {
            let sparring = self.catalog.sparring_exercise(user_id, config.day_type).await?;
            vec![Slot::from(&sparring); SLOTS_PER_GROUP]
        } else {
            self.random_station3(user_id, config, &used).await?
        };

        ledger.exercise_ids.extend(workout.slots().map(|slot| slot.exercise_id));
        Ok(AssembledDay { workout, ledger })
    }

    async fn random_station3(
        &self,
        user_id: Uuid,
        config: &DayConfig,
        used: &HashSet<Uuid>,
    ) -> WorkoutResult<Vec<Slot>> {
        let query = slot_query(config, SlotGroup::Station3);

        let pinned = match config.day_type.station3_position_b_condition() {
            Some(condition) => self.catalog.static_exercise(user_id, condition).await?,
            None => None,
        }
        .filter(|exercise| !used.contains(&exercise.id));

        let candidates = self.catalog.find(user_id, &query).await?;
        match pinned {
            Some(pinned) => {
                let mut exclude = used.clone();
                exclude.insert(pinned.id);
                let others = self.pick_group(candidates, 2, &exclude, "Station 3", config)?;
                Ok(vec![Slot::from(&others[0]), Slot::from(&pinned), Slot::from(&others[1])])
            }
            None => {
                let picked = self.pick_group(candidates, SLOTS_PER_GROUP, used, "Station 3", config)?;
                Ok(picked.iter().map(Slot::from).collect())
            }
        }
    }

    /// Pick exactly `count`, failing when the pool cannot fill the group.
    fn pick_group(
        &self,
        candidates: Vec<Exercise>,
        count: usize,
        exclude: &HashSet<Uuid>,
        station: &str,
        config: &DayConfig,
    ) -> WorkoutResult<Vec<Exercise>> {
        match self.selector.pick_exercises(candidates, count, exclude) {
            Selection::Picked { items, .. } if items.len() == count => Ok(items),
            Selection::Picked { items, .. } => Err(WorkoutError::ExhaustedPool(format!(
                "{station} on {} needs {count} {} exercises, only {} available",
                config.day,
                config.day_type,
                items.len()
            ))),
            Selection::Exhausted => Err(WorkoutError::ExhaustedPool(format!(
                "No {} exercises left for {station} on {}",
                config.day_type, config.day
            ))),
        }
    }
}

fn missing_tri_sets(day: TechniqueDay) -> WorkoutError {
    let focus = TriSetFocus::for_day(day);
    let shape = match day {
        TechniqueDay::Monday => "",
        TechniqueDay::Saturday => " with a Phase 2",
    };
    WorkoutError::Generation(format!(
        "No {focus} tri-sets{shape} for {}. Create tri-sets first.",
        focus.day()
    ))
}
