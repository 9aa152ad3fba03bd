//! Arc Trail Environment Abstraction Layer
//!
//! This crate provides the host-side seam that lets the trail engine hand its
//! geometry to whatever renderer owns the screen, in both **Production**
//! (an engine mesh object) and **Simulation** (an in-memory recorder).
//!
//! # Core Concept: The Render Target
//!
//! The trail engine never touches GPU resources. Once per tick it produces a
//! [`MeshBuffers`] payload and pushes it through a [`RenderTarget`]:
//! - `acquire()` when the trail is activated
//! - `upload()` / `clear()` every tick
//! - `release()` when the trail is deactivated
//!
//! # Example
//!
//! ```ignore
//! use trail_env::{MemoryTarget, RenderTarget};
//!
//! let mut target = MemoryTarget::new();
//! let id = target.acquire("Sword")?;
//! target.upload(&mesh)?;
//! target.release();
//! ```

mod target;
mod types;
mod error;
mod memory_impl;

pub use target::RenderTarget;
pub use types::{MeshBuffers, TargetId, WHITE};
pub use error::EnvError;
pub use memory_impl::MemoryTarget;
