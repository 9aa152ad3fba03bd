//! Arc Trail Core - Fading ribbon trails for a moving two-point anchor
//!
//! Turns per-frame samples of an anchor (a blade's hilt and point, say) into
//! a smoothly curved ribbon mesh instead of a jagged polyline:
//! 1. **History**: bounded ring buffer of samples with age-based expiry
//! 2. **Arc**: circumcircle-fitted subdivision between consecutive samples
//! 3. **Ribbon**: triangle strip with UVs and an alpha fade by age
//!
//! [`Trail`] wires the three stages to a host [`trail_env::RenderTarget`].

pub mod circumcircle;
pub mod segment_history;
pub mod arc_smoother;
pub mod ribbon_mesh;
pub mod trail_runtime;
pub mod error;

// Re-export key types for convenience
pub use circumcircle::circumcenter;
pub use segment_history::{Segment, SegmentHistory};
pub use arc_smoother::{ArcSmoother, SmoothedSequence};
pub use ribbon_mesh::RibbonMeshBuilder;
pub use trail_runtime::{Trail, TrailConfig};
pub use error::TrailError;
