// Environment-driven configuration

pub mod app;
pub mod database;
pub mod program;

pub use app::AppConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use program::ProgramConfig;
