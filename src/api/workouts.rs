use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{
    ApplyTriSetRequest, GenerateDayRequest, GenerateWeekRequest, RegenerateSlotRequest, ReplaceSlotRequest,
    SlotAddress, SlotValue, WeekQuery, Workout, WorkoutLocator,
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workouts))
        .route("/generate", post(generate_day))
        .route("/generate-week", post(generate_week))
        .route("/week", get(get_week))
        .route("/:id", get(get_workout).delete(delete_workout))
        .route("/:id/exercise", patch(replace_slot))
        .route("/:id/regenerate-slot", patch(regenerate_slot))
        .route("/:id/station1-set", patch(apply_tri_set))
}

/// Generate (or regenerate) one day of the week
pub async fn generate_day(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<GenerateDayRequest>, WorkoutError>,
) -> WorkoutResult<Json<Workout>> {
    let workout = state
        .workouts
        .generate_day(user.user_id, request.day_of_week, request.week_start_date)
        .await?;
    Ok(Json(workout))
}

/// Replace every workout of the week
pub async fn generate_week(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<GenerateWeekRequest>, WorkoutError>,
) -> WorkoutResult<Json<Vec<Workout>>> {
    let workouts = state.workouts.generate_week(user.user_id, request.week_start_date).await?;
    Ok(Json(workouts))
}

pub async fn get_week(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<WeekQuery>, WorkoutError>,
) -> WorkoutResult<Json<Vec<Workout>>> {
    let workouts = state.workouts.get_week(user.user_id, query.week_start_date).await?;
    Ok(Json(workouts))
}

pub async fn list_workouts(State(state): State<AppState>, user: AuthUser) -> WorkoutResult<Json<Vec<Workout>>> {
    Ok(Json(state.workouts.list(user.user_id).await?))
}

pub async fn get_workout(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
) -> WorkoutResult<Json<Workout>> {
    Ok(Json(state.workouts.get(user.user_id, id).await?))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
) -> WorkoutResult<StatusCode> {
    state.workouts.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a chosen exercise into one slot. `exerciseId` wins over `exerciseName`.
pub async fn replace_slot(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
    WithRejection(Json(request), _): WithRejection<Json<ReplaceSlotRequest>, WorkoutError>,
) -> WorkoutResult<Json<Workout>> {
    let address = SlotAddress::new(request.station, request.phase, request.slot_index).map_err(WorkoutError::Validation)?;
    let value = match (request.exercise_id, request.exercise_name) {
        (Some(exercise_id), _) => SlotValue::ExerciseId(exercise_id),
        (None, Some(name)) if !name.trim().is_empty() => SlotValue::ExerciseName(name),
        _ => return Err(WorkoutError::validation("Provide exerciseId or exerciseName")),
    };
    let locator = WorkoutLocator::new(path_id(&id), request.week_start_date, request.day_of_week);

    let workout = state
        .workouts
        .replace_slot(user.user_id, &locator, address, value)
        .await?;
    Ok(Json(workout))
}

pub async fn regenerate_slot(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
    WithRejection(Json(request), _): WithRejection<Json<RegenerateSlotRequest>, WorkoutError>,
) -> WorkoutResult<Json<Workout>> {
    let address = SlotAddress::new(request.station, request.phase, request.slot_index).map_err(WorkoutError::Validation)?;
    let locator = WorkoutLocator::new(path_id(&id), request.week_start_date, request.day_of_week);

    let workout = state.workouts.regenerate_slot(user.user_id, &locator, address).await?;
    Ok(Json(workout))
}

/// Overwrite Station 1 of a Monday or Saturday workout with a tri-set
pub async fn apply_tri_set(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
    WithRejection(Json(request), _): WithRejection<Json<ApplyTriSetRequest>, WorkoutError>,
) -> WorkoutResult<Json<Workout>> {
    let locator = WorkoutLocator::new(path_id(&id), request.week_start_date, request.day_of_week);

    let workout = state
        .workouts
        .apply_tri_set(user.user_id, &locator, request.tri_set_id)
        .await?;
    Ok(Json(workout))
}

/// Mutation paths may carry a placeholder such as `undefined` when the client
/// only knows the week and day; the locator then falls back to those.
fn path_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
