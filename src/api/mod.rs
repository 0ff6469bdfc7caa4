// API routes and handlers

pub mod blocked_days;
pub mod exercises;
pub mod health;
pub mod routes;
pub mod tri_sets;
pub mod workouts;

pub use routes::{create_routes, AppState};
