//! Purpose: Deployment configuration for the simulation server.
//! Exports: `ServerConfig` and its defaults.
//! Role: Explicitly constructed at startup and handed to the tool layer; there
//! Role: is no module-level global.
//! Invariants: Defaults change only per-deployment (CLI flags); the one per-call
//! Invariants: override is `max_points` on result retrieval.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_SESSIONS: usize = 100;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_MAX_RESULT_POINTS: usize = 10_000;
pub const DEFAULT_TDS_END_TIME: f64 = 20.0;
pub const DEFAULT_TDS_STEP: f64 = 1.0 / 30.0;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Directory scanned for case files; relative case paths resolve against it.
    pub cases_dir: PathBuf,
    /// Maximum concurrently live sessions before eviction kicks in.
    pub max_sessions: usize,
    /// Idle duration after which a session silently expires.
    pub session_ttl: Duration,
    /// Default bound on returned time-series points (0 disables the bound).
    pub max_result_points: usize,
    /// Simulation end time applied when a run gives no override.
    pub default_tds_end_time: f64,
    /// Integration step applied when a run gives no override.
    pub default_tds_step: f64,
}

impl ServerConfig {
    pub fn new(cases_dir: PathBuf) -> Self {
        Self {
            cases_dir,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_ttl: DEFAULT_SESSION_TTL,
            max_result_points: DEFAULT_MAX_RESULT_POINTS,
            default_tds_end_time: DEFAULT_TDS_END_TIME,
            default_tds_step: DEFAULT_TDS_STEP,
        }
    }

    pub fn server_name(&self) -> &'static str {
        env!("CARGO_PKG_NAME")
    }

    pub fn server_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
