//! Deterministic host simulation for the arc trail
//!
//! This crate plays the part of a render host: it moves a two-point anchor
//! through scripted motions, samples it at a fixed tick rate and drives a
//! [`trail_core::Trail`] against an in-memory render target.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   ScenarioRunner                     │
//! │                                                      │
//! │  ┌──────────┐   (base, tip)   ┌──────────────────┐   │
//! │  │  Oracle  │────────────────►│ Trail<MemoryTgt> │   │
//! │  │ (motion) │      now        └────────┬─────────┘   │
//! │  └────▲─────┘                          │             │
//! │       │ dt                    invariant checks       │
//! │  ┌────┴─────┐                          │             │
//! │  │ SimClock │                 ┌────────▼─────────┐   │
//! │  └──────────┘                 │   TrailExport    │   │
//! │                               └──────────────────┘   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! All randomness (position jitter) comes from a single 64-bit seed, so a
//! run is reproducible from `(scenario, seed)`.
//!
//! # Usage
//!
//! ```ignore
//! use trail_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42)
//!     .with_duration(3.0)
//!     .run(ScenarioId::Slash);
//! assert!(result.passed);
//! ```

mod context;
mod oracle;
mod runner;
mod exporter;
pub mod scenarios;

pub use context::SimClock;
pub use oracle::{AnchorMotion, Oracle};
pub use runner::{ExportOptions, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use exporter::{TrailExport, TrailFrame};
pub use scenarios::{ScenarioId, ScenarioSpec};
