use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{CreateExerciseRequest, DayOfWeek, Exercise, ExerciseListQuery, UpdateExerciseRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station1ForDayQuery {
    pub day_of_week: DayOfWeek,
}

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exercises).post(create_exercise))
        .route("/station1-for-day", get(station1_for_day))
        .route("/:id", get(get_exercise).put(update_exercise).delete(delete_exercise))
}

pub async fn list_exercises(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<ExerciseListQuery>, WorkoutError>,
) -> WorkoutResult<Json<Vec<Exercise>>> {
    Ok(Json(state.catalog.list(user.user_id, query).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateExerciseRequest>, WorkoutError>,
) -> WorkoutResult<(StatusCode, Json<Exercise>)> {
    let exercise = state.catalog.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

/// Candidates for building Monday or Saturday tri-sets
pub async fn station1_for_day(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<Station1ForDayQuery>, WorkoutError>,
) -> WorkoutResult<Json<Vec<Exercise>>> {
    Ok(Json(state.catalog.station1_for_day(user.user_id, query.day_of_week).await?))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
) -> WorkoutResult<Json<Exercise>> {
    Ok(Json(state.catalog.get(user.user_id, id).await?))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateExerciseRequest>, WorkoutError>,
) -> WorkoutResult<Json<Exercise>> {
    Ok(Json(state.catalog.update(user.user_id, id, request).await?))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
) -> WorkoutResult<StatusCode> {
    state.catalog.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
