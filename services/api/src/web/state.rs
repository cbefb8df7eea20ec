//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_planner_core::domain::Id;
use study_planner_core::pipeline::SchedulePlanner;
use study_planner_core::ports::StorageService;

/// The user seeded at startup. Stands in for a real identity boundary, which
/// this service does not have.
pub const DEFAULT_USER_ID: Id = 1;

/// The shared application state, created once at startup and passed to all
/// handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorageService>,
    pub planner: SchedulePlanner,
    pub config: Arc<Config>,
}
