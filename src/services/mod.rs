// Business logic services

pub mod blocked_day_service;
pub mod catalog_service;
pub mod day_assembler;
pub mod slot_selector;
pub mod tri_set_service;
pub mod workout_service;

pub use blocked_day_service::BlockedDayService;
pub use catalog_service::CatalogService;
pub use day_assembler::{slot_query, AssembledDay, DayAssembler};
pub use slot_selector::{is_fresh, Rotating, Selection, SlotSelector, FRESHNESS_WINDOW_DAYS, TRI_SET_MIN_FRESH};
pub use tri_set_service::TriSetService;
pub use workout_service::WorkoutService;
