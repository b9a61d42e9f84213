//! Application state management
//!
//! The state is built once at startup and shared read-only by every
//! request through an `Arc`.
//!
//! Author: hephaex@gmail.com

use crate::auth::jwt::JwtConfig;
use gradebook_core::{AppConfig, ConfigError, RecordStore};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Session token signing settings
    pub jwt: JwtConfig,
    /// Record persistence
    pub store: Arc<dyn RecordStore>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state, failing if the signing secret is missing
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Result<Self, ConfigError> {
        let jwt = JwtConfig::from_config(&config.auth)?;

        Ok(Self {
            config,
            jwt,
            store,
            start_time: Instant::now(),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
