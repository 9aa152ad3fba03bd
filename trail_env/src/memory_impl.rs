//! In-memory implementation of RenderTarget.

use crate::error::EnvError;
use crate::target::RenderTarget;
use crate::types::{MeshBuffers, TargetId};
use tracing::debug;

/// Render target that keeps the last uploaded geometry in memory.
///
/// This is the implementation used by tests and the simulator. It also
/// validates every payload the way a strict host would, so malformed
/// geometry surfaces as `EnvError::Rejected`.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    /// Renderable name, set while acquired
    object_name: Option<String>,
    
    /// Identity handed out by the last `acquire()`
    id: Option<TargetId>,
    
    /// Seed for deterministic ids (None = random)
    seed: Option<u64>,
    
    /// Geometry currently displayed
    mesh: MeshBuffers,
    
    /// Number of successful uploads
    upload_count: u64,
    
    /// Number of clears
    clear_count: u64,
    
    /// Number of releases of an acquired renderable
    release_count: u64,
    
    /// Failure injection for uploads
    fail_uploads: bool,
}

impl MemoryTarget {
    /// Creates a new MemoryTarget with random ids.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Creates a MemoryTarget whose ids derive from `seed` (for simulation).
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
    
    /// Makes every subsequent `upload()` fail.
    pub fn fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }
    
    /// Returns the geometry currently displayed.
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }
    
    /// Returns the renderable name while acquired.
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }
    
    /// Returns the id of the current renderable.
    pub fn id(&self) -> Option<TargetId> {
        self.id
    }
    
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }
    
    pub fn clear_count(&self) -> u64 {
        self.clear_count
    }
    
    pub fn release_count(&self) -> u64 {
        self.release_count
    }
    
    fn validate(mesh: &MeshBuffers) -> Result<(), EnvError> {
        let n = mesh.vertices.len();
        if mesh.uvs.len() != n || mesh.colors.len() != n {
            return Err(EnvError::rejected(format!(
                "attribute length mismatch: {} vertices, {} uvs, {} colors",
                n,
                mesh.uvs.len(),
                mesh.colors.len()
            )));
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(EnvError::rejected(format!(
                "index count {} is not a multiple of 3",
                mesh.indices.len()
            )));
        }
        if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= n) {
            return Err(EnvError::rejected(format!(
                "index {} out of range for {} vertices",
                bad, n
            )));
        }
        Ok(())
    }
}

impl RenderTarget for MemoryTarget {
    fn acquire(&mut self, name: &str) -> Result<TargetId, EnvError> {
        if let Some(existing) = &self.object_name {
            return Err(EnvError::AlreadyAcquired(existing.clone()));
        }
        
        let id = match self.seed {
            Some(seed) => TargetId::from_seed(seed.wrapping_add(self.release_count)),
            None => TargetId::new(),
        };
        let object_name = format!("{}TrailMesh", name);
        debug!("Acquired render target {} ({})", object_name, id);
        
        self.object_name = Some(object_name);
        self.id = Some(id);
        self.mesh.clear();
        Ok(id)
    }
    
    fn upload(&mut self, mesh: &MeshBuffers) -> Result<(), EnvError> {
        if self.object_name.is_none() {
            return Err(EnvError::NotAcquired);
        }
        if self.fail_uploads {
            return Err(EnvError::upload("injected upload failure"));
        }
        Self::validate(mesh)?;
        
        self.mesh.clone_from(mesh);
        self.upload_count += 1;
        Ok(())
    }
    
    fn clear(&mut self) -> Result<(), EnvError> {
        if self.object_name.is_none() {
            return Err(EnvError::NotAcquired);
        }
        self.mesh.clear();
        self.clear_count += 1;
        Ok(())
    }
    
    fn release(&mut self) {
        if let Some(name) = self.object_name.take() {
            debug!("Released render target {}", name);
            self.id = None;
            self.mesh.clear();
            self.release_count += 1;
        }
    }
    
    fn is_acquired(&self) -> bool {
        self.object_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WHITE;
    use nalgebra::{Vector2, Vector3};
    
    fn quad() -> MeshBuffers {
        MeshBuffers {
            vertices: vec![Vector3::zeros(), Vector3::y(), Vector3::x(), Vector3::new(1.0, 1.0, 0.0)],
            uvs: vec![Vector2::zeros(), Vector2::y(), Vector2::new(0.5, 0.0), Vector2::new(0.5, 1.0)],
            colors: vec![WHITE; 4],
            indices: vec![0, 1, 2, 3, 2, 1],
        }
    }
    
    #[test]
    fn test_acquire_upload_release() {
        let mut target = MemoryTarget::new();
        assert!(!target.is_acquired());
        
        target.acquire("Sword").unwrap();
        assert_eq!(target.object_name(), Some("SwordTrailMesh"));
        
        target.upload(&quad()).unwrap();
        assert_eq!(target.upload_count(), 1);
        assert_eq!(target.mesh().triangle_count(), 2);
        
        target.release();
        assert!(!target.is_acquired());
        assert!(target.mesh().is_empty());
        assert_eq!(target.release_count(), 1);
        
        // Idempotent
        target.release();
        assert_eq!(target.release_count(), 1);
    }
    
    #[test]
    fn test_double_acquire_rejected() {
        let mut target = MemoryTarget::new();
        target.acquire("A").unwrap();
        assert!(matches!(target.acquire("B"), Err(EnvError::AlreadyAcquired(_))));
    }
    
    #[test]
    fn test_upload_requires_acquire() {
        let mut target = MemoryTarget::new();
        assert!(matches!(target.upload(&quad()), Err(EnvError::NotAcquired)));
        assert!(matches!(target.clear(), Err(EnvError::NotAcquired)));
    }
    
    #[test]
    fn test_malformed_geometry_rejected() {
        let mut target = MemoryTarget::new();
        target.acquire("A").unwrap();
        
        let mut mesh = quad();
        mesh.indices.push(9);
        assert!(matches!(target.upload(&mesh), Err(EnvError::Rejected(_))));
        
        let mut mesh = quad();
        mesh.colors.pop();
        assert!(matches!(target.upload(&mesh), Err(EnvError::Rejected(_))));
        
        let mut mesh = quad();
        mesh.indices.extend_from_slice(&[0, 1, 2]);
        assert!(target.upload(&mesh).is_ok());
    }
    
    #[test]
    fn test_injected_failure() {
        let mut target = MemoryTarget::new();
        target.acquire("A").unwrap();
        target.fail_uploads(true);
        assert!(matches!(target.upload(&quad()), Err(EnvError::Upload(_))));
        assert_eq!(target.upload_count(), 0);
    }
    
    #[test]
    fn test_seeded_ids_are_deterministic() {
        let mut a = MemoryTarget::seeded(42);
        let mut b = MemoryTarget::seeded(42);
        assert_eq!(a.acquire("T").unwrap(), b.acquire("T").unwrap());
    }
}
