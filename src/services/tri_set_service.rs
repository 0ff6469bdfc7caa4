use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{
    CreateTriSetRequest, DayType, Exercise, ExerciseQuery, ShapeRequirement, TriSet, TriSetFocus, TriSetMember,
    TRI_SET_SIZE,
};
use crate::repository::{Store, UsageLedger};

/// Registry of linked exercise groups for the technique days.
#[derive(Clone)]
pub struct TriSetService {
    store: Arc<dyn Store>,
}

impl TriSetService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: Uuid, focus: Option<TriSetFocus>) -> WorkoutResult<Vec<TriSet>> {
        Ok(self.store.find_tri_sets(user_id, focus).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<TriSet> {
        self.store
            .get_tri_set(user_id, id)
            .await?
            .ok_or_else(|| WorkoutError::not_found("Tri-set not found"))
    }

    /// Well-formed tri-sets of `focus` with the requested shape and no member in `exclude_ids`.
    pub async fn find_candidates(
        &self,
        user_id: Uuid,
        focus: TriSetFocus,
        exclude_ids: &HashSet<Uuid>,
        shape: ShapeRequirement,
    ) -> WorkoutResult<Vec<TriSet>> {
        let candidates = self
            .store
            .find_tri_sets(user_id, Some(focus))
            .await?
            .into_iter()
            .filter(|tri_set| tri_set.shape().is_some_and(|s| shape.accepts(s)))
            .filter(|tri_set| tri_set.exercise_ids().all(|id| !exclude_ids.contains(&id)))
            .collect();
        Ok(candidates)
    }

    #[instrument(skip(self, request), fields(focus = %request.focus))]
    pub async fn create(&self, user_id: Uuid, request: CreateTriSetRequest) -> WorkoutResult<TriSet> {
        if request.exercise_ids.len() != TRI_SET_SIZE {
            return Err(WorkoutError::validation("Phase 1 needs exactly 3 exercises"));
        }
        if !request.phase2_exercise_ids.is_empty() && request.phase2_exercise_ids.len() != TRI_SET_SIZE {
            return Err(WorkoutError::validation("Phase 2 needs exactly 0 or 3 exercises"));
        }

        let all_ids: Vec<Uuid> = request
            .exercise_ids
            .iter()
            .chain(request.phase2_exercise_ids.iter())
            .copied()
            .collect();
        let distinct: HashSet<Uuid> = all_ids.iter().copied().collect();
        if distinct.len() != all_ids.len() {
            return Err(WorkoutError::validation("An exercise can appear only once in a tri-set"));
        }

        let exercises = self
            .store
            .find_exercises(user_id, &ExerciseQuery::default().only(distinct))
            .await?;
        let phase1 = members(&request.exercise_ids, &exercises, request.focus)?;
        let phase2 = members(&request.phase2_exercise_ids, &exercises, request.focus)?;

        let now = Utc::now();
        let tri_set = TriSet {
            id: Uuid::new_v4(),
            user_id,
            focus: request.focus,
            name: request.name.trim().to_string(),
            concept: request.concept.trim().to_string(),
            phase1,
            phase2,
            last_used: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_tri_set(&tri_set).await?;
        info!(tri_set_id = %tri_set.id, "tri-set created");
        Ok(tri_set)
    }

    pub async fn mark_used(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<()> {
        self.get(user_id, id).await?;
        self.store
            .record_usage(user_id, &UsageLedger::new().with_tri_set(id))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> WorkoutResult<()> {
        if !self.store.delete_tri_set(user_id, id).await? {
            return Err(WorkoutError::not_found("Tri-set not found"));
        }
        Ok(())
    }
}

/// Resolve ids in order, checking every member fits a technique tri-set of `focus`.
fn members(ids: &[Uuid], exercises: &[Exercise], focus: TriSetFocus) -> WorkoutResult<Vec<TriSetMember>> {
    ids.iter()
        .map(|id| {
            let exercise = exercises
                .iter()
                .find(|exercise| exercise.id == *id)
                .ok_or_else(|| WorkoutError::validation(format!("Exercise {id} not found")))?;

            if exercise.station != 1 || exercise.day_type != DayType::Technique {
                return Err(WorkoutError::validation(format!(
                    "\"{}\" must be a Station 1 Technique exercise",
                    exercise.name
                )));
            }
            if !exercise
                .focus
                .is_some_and(|f| focus.accepted_exercise_focus().contains(&f))
            {
                return Err(WorkoutError::validation(format!(
                    "\"{}\" does not fit a {} tri-set",
                    exercise.name, focus
                )));
            }

            Ok(TriSetMember {
                exercise_id: exercise.id,
                name: exercise.name.clone(),
            })
        })
        .collect()
}
