//! JSON exporter for offline inspection of trail runs.
//!
//! Exports sampled frames (and optionally the full mesh) as JSON.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use trail_env::MeshBuffers;

/// A single exported frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailFrame {
    /// Simulation time in seconds
    pub time_sec: f64,
    
    /// Live raw samples in the history
    pub live_samples: usize,
    
    /// Length of the smoothed sequence
    pub smoothed_len: usize,
    
    /// Vertices in the ribbon mesh
    pub vertex_count: usize,
    
    /// Triangles in the ribbon mesh
    pub triangle_count: usize,
    
    /// Ribbon width at the head (0 when the trail is empty)
    pub head_width: f64,
    
    /// Full geometry, when requested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mesh: Option<MeshBuffers>,
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailExport {
    /// Scenario name
    pub scenario: String,
    
    /// Seed used
    pub seed: u64,
    
    /// Trail life time in seconds
    pub life_time: f64,
    
    /// Interior arc points per interval
    pub subdivisions: usize,
    
    /// Duration in seconds
    pub duration_sec: f64,
    
    /// All frames
    pub frames: Vec<TrailFrame>,
    
    /// Final results
    pub passed: bool,
    
    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_reason: Option<String>,
}

impl TrailExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, life_time: f64, subdivisions: usize) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            life_time,
            subdivisions,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }
    
    /// Adds a frame.
    pub fn add_frame(&mut self, frame: TrailFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }
    
    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
