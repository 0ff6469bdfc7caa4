use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{BlockedDay, BlockedDayRequest, WeekQuery};

pub fn blocked_day_routes() -> Router<AppState> {
    Router::new().route("/", get(list_blocked_days).post(block_day).delete(unblock_day))
}

pub async fn list_blocked_days(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<WeekQuery>, WorkoutError>,
) -> WorkoutResult<Json<Vec<BlockedDay>>> {
    Ok(Json(state.blocked_days.list(user.user_id, query.week_start_date).await?))
}

pub async fn block_day(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<BlockedDayRequest>, WorkoutError>,
) -> WorkoutResult<(StatusCode, Json<BlockedDay>)> {
    let blocked = state
        .blocked_days
        .block(user.user_id, request.week_start_date, request.day_of_week)
        .await?;
    Ok((StatusCode::CREATED, Json(blocked)))
}

/// `DELETE /api/blocked-days?weekStartDate=&dayOfWeek=`
pub async fn unblock_day(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(request), _): WithRejection<Query<BlockedDayRequest>, WorkoutError>,
) -> WorkoutResult<StatusCode> {
    state
        .blocked_days
        .unblock(user.user_id, request.week_start_date, request.day_of_week)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
