use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{CreateTriSetRequest, TriSet, TriSetFocus};

#[derive(Debug, Default, Deserialize)]
pub struct TriSetListQuery {
    pub focus: Option<TriSetFocus>,
}

pub fn tri_set_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tri_sets).post(create_tri_set))
        .route("/:id", delete(delete_tri_set))
}

pub async fn list_tri_sets(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<TriSetListQuery>, WorkoutError>,
) -> WorkoutResult<Json<Vec<TriSet>>> {
    Ok(Json(state.tri_sets.list(user.user_id, query.focus).await?))
}

pub async fn create_tri_set(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateTriSetRequest>, WorkoutError>,
) -> WorkoutResult<(StatusCode, Json<TriSet>)> {
    let tri_set = state.tri_sets.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(tri_set)))
}

pub async fn delete_tri_set(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WorkoutError>,
) -> WorkoutResult<StatusCode> {
    state.tri_sets.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
