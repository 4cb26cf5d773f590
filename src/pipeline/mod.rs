//! CLI-facing flows built on the query engine.
//!
//! - `run_load`: load the current snapshots or one archived month
//! - `run_summary`: dataset metadata, daily change report and per-platform counts
//! - `run_validate`: configuration and data source health check

pub mod load;
pub mod render;
pub mod summary;
pub mod validate;

pub use load::run_load;
pub use render::{EVENT_TEMPLATE, render_events};
pub use summary::{Summary, run_summary};
pub use validate::run_validate;
