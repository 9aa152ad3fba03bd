//! Render target abstraction for the trail engine.

use crate::error::EnvError;
use crate::types::{MeshBuffers, TargetId};

/// The host renderer interface.
///
/// This trait abstracts the renderable object that displays the trail so
/// the engine can run inside a game engine, a headless test, or the
/// deterministic simulator.
///
/// # Implementations
///
/// - **Production**: wraps the host engine's mesh object and material
/// - **Simulation**: `MemoryTarget` - records the last uploaded geometry
///
/// # Lifecycle
///
/// ```text
/// Trail                      RenderTarget
///   |-- acquire(name) -------->|  create renderable
///   |-- upload(mesh) --------->|  every tick with >= 2 segments
///   |-- clear() -------------->|  every tick with < 2 segments
///   |-- release() ------------>|  on deactivation, unconditionally
/// ```
pub trait RenderTarget {
    /// Creates the backing renderable.
    ///
    /// # Returns
    /// * `Ok(TargetId)` - The renderable is ready for geometry
    /// * `Err(EnvError::AlreadyAcquired)` - Acquired twice without `release()`
    fn acquire(&mut self, name: &str) -> Result<TargetId, EnvError>;
    
    /// Replaces the renderable's geometry with `mesh`.
    fn upload(&mut self, mesh: &MeshBuffers) -> Result<(), EnvError>;
    
    /// Removes all geometry from the renderable.
    fn clear(&mut self) -> Result<(), EnvError>;
    
    /// Destroys the backing renderable.
    ///
    /// Must be safe to call on a target that was never acquired.
    fn release(&mut self);
    
    /// Returns true between `acquire()` and `release()`.
    fn is_acquired(&self) -> bool;
}
