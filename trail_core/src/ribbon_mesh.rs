//! Ribbon strip geometry for a smoothed trail.
//!
//! Every segment contributes a vertex pair (base, tip); consecutive pairs are
//! joined into a quad of two triangles. Alpha fades linearly with age so the
//! tail of the ribbon dissolves as its samples approach expiry.

use crate::segment_history::Segment;
use nalgebra::Vector2;
use trail_env::{MeshBuffers, WHITE};

/// Builds indexed triangle-strip geometry from a newest-first segment list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonMeshBuilder {
    life_time: f64,
}

impl RibbonMeshBuilder {
    pub fn new(life_time: f64) -> Self {
        Self { life_time }
    }
    
    pub fn life_time(&self) -> f64 {
        self.life_time
    }
    
    /// Alpha of a vertex whose sample is `age` seconds old.
    ///
    /// 1 at age 0, 0 at `life_time` and beyond.
    pub fn fade_alpha(&self, age: f64) -> f64 {
        1.0 - (age / self.life_time).clamp(0.0, 1.0)
    }
    
    /// Builds geometry into freshly allocated buffers.
    pub fn build(&self, segments: &[Segment], now: f64) -> MeshBuffers {
        let mut mesh = MeshBuffers::with_capacity(segments.len());
        self.build_into(segments, now, &mut mesh);
        mesh
    }
    
    /// Rebuilds `mesh` from scratch, reusing its allocation.
    ///
    /// Fewer than two segments leave `mesh` empty. The head segment is always
    /// fully opaque.
    pub fn build_into(&self, segments: &[Segment], now: f64, mesh: &mut MeshBuffers) {
        mesh.clear();
        
        let count = segments.len();
        if count <= 1 {
            return;
        }
        
        for (k, segment) in segments.iter().enumerate() {
            let u = k as f64 / count as f64;
            let alpha = if k == 0 {
                1.0
            } else {
                self.fade_alpha(segment.age(now))
            };
            let color = [WHITE[0], WHITE[1], WHITE[2], alpha];
            
            mesh.vertices.push(segment.base_position);
            mesh.vertices.push(segment.tip_position);
            mesh.uvs.push(Vector2::new(u, 0.0));
            mesh.uvs.push(Vector2::new(u, 1.0));
            mesh.colors.push(color);
            mesh.colors.push(color);
            
            if k + 1 < count {
                let v0 = (2 * k) as u32;
                let (v1, v2, v3) = (v0 + 1, v0 + 2, v0 + 3);
                mesh.indices.extend_from_slice(&[v0, v1, v2, v3, v2, v1]);
            }
        }
    }
}
