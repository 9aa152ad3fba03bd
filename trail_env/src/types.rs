//! Common types for the trail environment abstraction.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque white, the base tint of every trail vertex.
pub const WHITE: [f64; 4] = [1.0, 1.0, 1.0, 1.0];

/// Unique identifier for an acquired render target.
///
/// Uses UUID v4 for global uniqueness without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    /// Creates a new random TargetId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
    
    /// Creates a deterministic TargetId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Indexed triangle mesh payload handed to the host renderer.
///
/// Two vertices per trail segment (base, tip), so `vertices`, `uvs` and
/// `colors` always have the same even length. `indices` holds triangles,
/// three entries each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// Vertex positions in world space
    pub vertices: Vec<Vector3<f64>>,
    
    /// Texture coordinates (u = progress from head, v = 0 base / 1 tip)
    pub uvs: Vec<Vector2<f64>>,
    
    /// RGBA vertex colors, alpha carries the fade
    pub colors: Vec<[f64; 4]>,
    
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates empty buffers with room for a strip of `segments` segments.
    pub fn with_capacity(segments: usize) -> Self {
        let vertex_count = segments * 2;
        let index_count = segments.saturating_sub(1) * 6;
        Self {
            vertices: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            colors: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(index_count),
        }
    }
    
    /// Empties every array, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
    }
    
    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
    
    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
    
    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_target_id_from_seed_is_deterministic() {
        assert_eq!(TargetId::from_seed(7), TargetId::from_seed(7));
        assert_ne!(TargetId::from_seed(7), TargetId::from_seed(8));
        assert_eq!(TargetId::from_seed(7).to_string().len(), 8);
    }
    
    #[test]
    fn test_mesh_buffers_capacity_and_clear() {
        let mut mesh = MeshBuffers::with_capacity(10);
        assert!(mesh.vertices.capacity() >= 20);
        assert!(mesh.indices.capacity() >= 54);
        
        mesh.vertices.push(Vector3::zeros());
        mesh.indices.extend_from_slice(&[0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());
        
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.vertices.capacity() >= 20);
    }
    
    #[test]
    fn test_mesh_buffers_zero_segments() {
        let mesh = MeshBuffers::with_capacity(0);
        assert!(mesh.is_empty());
    }
}
