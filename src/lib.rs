// src/lib.rs

//! Invest Calendar Library
//!
//! Read-only access to investment calendar events published as JSON
//! partitions: one rolling snapshot per platform plus immutable monthly
//! archives.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{Config, Event, Period, Platform, PlatformSnapshot};
pub use services::QueryEngine;
