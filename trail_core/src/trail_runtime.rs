//! Trail Runtime - Wires the trail engines to a host render target.
//!
//! The host owns the frame loop. It calls [`Trail::initialize`] when the
//! trail becomes active, [`Trail::tick`] on every frame it wants sampled, and
//! [`Trail::shutdown`] (or simply drops the trail) when it goes inactive.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Trail                              │
//! │                                                             │
//! │  tick(now, base, tip)                                       │
//! │     │                                                       │
//! │  ┌──▼──────────┐  ┌─────────────┐  ┌───────────────────┐    │
//! │  │  HISTORY    │─►│    ARC      │─►│      RIBBON       │    │
//! │  │ sample +    │  │  smoother   │  │   mesh builder    │    │
//! │  │ expire      │  │             │  │                   │    │
//! │  └─────────────┘  └─────────────┘  └─────────┬─────────┘    │
//! │                                              │              │
//! │                            ┌─────────────────▼──────────┐   │
//! │                            │ RenderTarget: upload/clear │   │
//! │                            └────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use trail_core::{Trail, TrailConfig};
//! use trail_env::MemoryTarget;
//!
//! let mut trail = Trail::initialize(TrailConfig::default(), MemoryTarget::new())?;
//! let mesh = trail.tick(now, hilt, point)?;
//! let target = trail.shutdown()?;
//! ```

use crate::arc_smoother::{ArcSmoother, SmoothedSequence};
use crate::error::TrailError;
use crate::ribbon_mesh::RibbonMeshBuilder;
use crate::segment_history::{capacity_for, SegmentHistory};
pub use crate::segment_history::MAX_HISTORY_CAPACITY;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, trace};
use trail_env::{EnvError, MeshBuffers, RenderTarget, TargetId};

/// Upper bound on interior points per interval.
pub const MAX_SUBDIVISIONS: usize = 64;

/// Configuration for a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Trail name (the render target is named "<name>TrailMesh")
    pub name: String,
    
    /// Seconds a sample stays on the trail (default: 1.0)
    pub life_time: f64,
    
    /// Interior arc points per sample interval (default: 4)
    pub subdivisions: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            name: "Trail".to_string(),
            life_time: 1.0,
            subdivisions: 4,
        }
    }
}

impl TrailConfig {
    /// Checks the config, returning the first problem found.
    pub fn validate(&self) -> Result<(), TrailError> {
        if !self.life_time.is_finite() || self.life_time <= 0.0 {
            return Err(TrailError::InvalidLifeTime(self.life_time));
        }
        if self.subdivisions > MAX_SUBDIVISIONS {
            return Err(TrailError::TooManySubdivisions(self.subdivisions));
        }
        let capacity = self.history_capacity();
        if capacity > MAX_HISTORY_CAPACITY {
            return Err(TrailError::HistoryTooLarge(capacity));
        }
        Ok(())
    }
    
    /// Slots in the sample history: `floor(60 / life_time) + 1`, at least 2.
    pub fn history_capacity(&self) -> usize {
        capacity_for(self.life_time)
    }
    
    /// Maximum length of the smoothed sequence.
    pub fn smoothed_capacity(&self) -> usize {
        self.history_capacity() * (1 + self.subdivisions)
    }
    
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TrailError> {
        serde_json::from_str(json).map_err(|e| TrailError::Config(e.to_string()))
    }
    
    /// Reads a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrailError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TrailError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}

/// A live trail bound to a render target.
///
/// Every buffer is allocated once in `initialize()` at its maximum size and
/// refilled in place by `tick()`.
pub struct Trail<T: RenderTarget> {
    /// Configuration
    config: TrailConfig,
    
    /// Raw anchor samples
    history: SegmentHistory,
    
    /// Arc engine
    smoother: ArcSmoother,
    
    /// Smoothed scratch, rebuilt every tick
    smoothed: SmoothedSequence,
    
    /// Ribbon engine
    builder: RibbonMeshBuilder,
    
    /// Mesh scratch, rebuilt every tick
    mesh: MeshBuffers,
    
    /// Host renderable, held from initialize() until shutdown()/drop
    target: Option<T>,
    
    /// Identity of the acquired renderable
    target_id: TargetId,
    
    /// Number of completed ticks
    tick_count: u64,
}

impl<T: RenderTarget> Trail<T> {
    /// Validates `config`, allocates every buffer and acquires `target`.
    pub fn initialize(config: TrailConfig, mut target: T) -> Result<Self, TrailError> {
        config.validate()?;
        
        let history = SegmentHistory::new(config.history_capacity());
        let smoothed_capacity = config.smoothed_capacity();
        let target_id = target.acquire(&config.name)?;
        
        info!(
            "Trail '{}' initialized: life_time={}s subdivisions={} history={} slots target={}",
            config.name,
            config.life_time,
            config.subdivisions,
            history.capacity(),
            target_id
        );
        
        Ok(Self {
            smoother: ArcSmoother::new(config.subdivisions),
            smoothed: SmoothedSequence::with_capacity(smoothed_capacity),
            builder: RibbonMeshBuilder::new(config.life_time),
            mesh: MeshBuffers::with_capacity(smoothed_capacity),
            history,
            target: Some(target),
            target_id,
            config,
            tick_count: 0,
        })
    }
    
    /// Samples the anchor at `now` and rebuilds the trail geometry.
    ///
    /// Runs `sample -> expire -> smooth -> build`, then uploads the mesh to
    /// the render target (or clears it when there is nothing to draw).
    pub fn tick(
        &mut self,
        now: f64,
        base_position: Vector3<f64>,
        tip_position: Vector3<f64>,
    ) -> Result<&MeshBuffers, TrailError> {
        self.history.sample(base_position, tip_position, now);
        let expired = self.history.expire(now, self.config.life_time);
        
        self.smoother.smooth_into(&self.history, &mut self.smoothed);
        self.builder.build_into(self.smoothed.as_slice(), now, &mut self.mesh);
        
        let target = self.target.as_mut().ok_or(EnvError::NotAcquired)?;
        if self.mesh.is_empty() {
            target.clear()?;
        } else {
            target.upload(&self.mesh)?;
        }
        
        self.tick_count += 1;
        if expired > 0 {
            debug!("Trail '{}' expired {} samples at t={:.3}", self.config.name, expired, now);
        }
        trace!(
            "Trail '{}' tick {}: live={} smoothed={} triangles={}",
            self.config.name,
            self.tick_count,
            self.history.len(),
            self.smoothed.len(),
            self.mesh.triangle_count()
        );
        
        Ok(&self.mesh)
    }
    
    /// Releases the render target and hands it back to the host.
    pub fn shutdown(mut self) -> Result<T, TrailError> {
        let mut target = self.target.take().ok_or(EnvError::NotAcquired)?;
        target.release();
        info!("Trail '{}' shut down after {} ticks", self.config.name, self.tick_count);
        Ok(target)
    }
    
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }
    
    pub fn history(&self) -> &SegmentHistory {
        &self.history
    }
    
    /// Smoothed sequence from the last tick.
    pub fn smoothed(&self) -> &SmoothedSequence {
        &self.smoothed
    }
    
    /// Mesh from the last tick.
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }
    
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }
    
    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }
    
    pub fn target_id(&self) -> TargetId {
        self.target_id
    }
    
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl<T: RenderTarget> Drop for Trail<T> {
    fn drop(&mut self) {
        if let Some(mut target) = self.target.take() {
            target.release();
            debug!("Trail '{}' dropped, render target released", self.config.name);
        }
    }
}
