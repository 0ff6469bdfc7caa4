// Domain models: catalog, tri-sets, workouts and the weekly schedule

pub mod blocked_day;
pub mod exercise;
pub mod schedule;
pub mod tri_set;
pub mod workout;

pub use blocked_day::*;
pub use exercise::*;
pub use schedule::*;
pub use tri_set::*;
pub use workout::*;
