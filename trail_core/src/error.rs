//! Error types for the trail engine.
//!
//! The geometry pipeline itself never fails; errors only come from
//! configuration and from the host render target.

use thiserror::Error;
use trail_env::EnvError;

#[derive(Debug, Error)]
pub enum TrailError {
    #[error("Invalid life time: {0} (must be finite and > 0)")]
    InvalidLifeTime(f64),
    
    #[error("Too many subdivisions: {0} (max {max})", max = crate::trail_runtime::MAX_SUBDIVISIONS)]
    TooManySubdivisions(usize),
    
    #[error("History too large: {0} slots (max {max})", max = crate::trail_runtime::MAX_HISTORY_CAPACITY)]
    HistoryTooLarge(usize),
    
    #[error("Config error: {0}")]
    Config(String),
    
    #[error("Render target error: {0}")]
    Env(#[from] EnvError),
}
