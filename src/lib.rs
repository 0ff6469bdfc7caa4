//! Station-rotation workout service: exercise catalog, tri-set registry,
//! freshness-aware slot selection, daily assembly and partial edits.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
