use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::blocked_days::blocked_day_routes;
use super::exercises::exercise_routes;
use super::health::health_check;
use super::tri_sets::tri_set_routes;
use super::workouts::workout_routes;
use crate::auth::{cors_layer, JwtService};
use crate::config::ProgramConfig;
use crate::repository::Store;
use crate::services::{BlockedDayService, CatalogService, DayAssembler, SlotSelector, TriSetService, WorkoutService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtService,
    pub catalog: CatalogService,
    pub tri_sets: TriSetService,
    pub workouts: WorkoutService,
    pub blocked_days: BlockedDayService,
}

impl AppState {
    /// Wire every service over one store.
    pub fn new(store: Arc<dyn Store>, jwt: JwtService, program: ProgramConfig, selector: Arc<SlotSelector>) -> Self {
        let catalog = CatalogService::new(store.clone(), program);
        let tri_sets = TriSetService::new(store.clone());
        let assembler = DayAssembler::new(catalog.clone(), tri_sets.clone(), selector);
        let workouts = WorkoutService::new(store.clone(), catalog.clone(), tri_sets.clone(), assembler);
        let blocked_days = BlockedDayService::new(store.clone());

        Self {
            store,
            jwt,
            catalog,
            tri_sets,
            workouts,
            blocked_days,
        }
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/workouts", workout_routes())
        .nest("/api/exercises", exercise_routes())
        .nest("/api/trisets", tri_set_routes())
        .nest("/api/blocked-days", blocked_day_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}
