//! Scenario runner - drives a trail the way a host frame loop would.
//!
//! Every tick the runner re-checks the trail's guarantees against the live
//! state (bounded history, exact expiry, smoothed length law, endpoint
//! preservation, mesh sizing, head opacity). The first violation fails the
//! scenario.

use crate::context::SimClock;
use crate::exporter::{TrailExport, TrailFrame};
use crate::oracle::Oracle;
use crate::scenarios::{ScenarioId, ScenarioSpec};

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use trail_core::{ArcSmoother, Segment, Trail, TrailConfig};
use trail_env::{MemoryTarget, RenderTarget};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,
    
    /// Seed used
    pub seed: u64,
    
    /// Whether scenario passed all assertions
    pub passed: bool,
    
    /// Ticks where the host sampled the anchor
    pub total_ticks: u64,
    
    /// Ticks the host skipped (camera gap)
    pub skipped_ticks: u64,
    
    /// Final simulation time in seconds
    pub final_time_secs: f64,
    
    /// Live samples at the end
    pub final_live_samples: usize,
    
    /// Failure message if any
    pub failure_reason: Option<String>,
    
    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Meshes uploaded to the render target
    pub uploads: u64,
    
    /// Times the render target was cleared
    pub clears: u64,
    
    /// Ticks whose sample landed in a stalled write slot
    pub stalled_ticks: u64,
    
    /// Times the trail collapsed to a single sample after a sampling gap
    pub gap_resets: u64,
    
    /// Peak live samples
    pub max_live_samples: usize,
    
    /// Peak smoothed sequence length
    pub max_smoothed_len: usize,
    
    /// Peak triangle count
    pub max_triangles: usize,
}

/// Frame export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Export every N sampled ticks
    pub interval: u64,
    
    /// Include full geometry in each frame
    pub include_mesh: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            interval: 10,
            include_mesh: false,
        }
    }
}

/// Runs trail scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,
    
    /// Maximum duration in seconds
    max_duration_secs: f64,
    
    /// Tick rate override
    tick_rate_hz: Option<u32>,
    
    /// Trail name override
    name: Option<String>,
    
    /// Life time override
    life_time: Option<f64>,
    
    /// Subdivisions override
    subdivisions: Option<usize>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_duration_secs: 5.0,
            tick_rate_hz: None,
            name: None,
            life_time: None,
            subdivisions: None,
        }
    }
    
    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }
    
    /// Overrides the scenario's tick rate.
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = Some(hz);
        self
    }
    
    /// Overrides the scenario's trail life time.
    pub fn with_life_time(mut self, secs: f64) -> Self {
        self.life_time = Some(secs);
        self
    }
    
    /// Overrides the scenario's subdivisions.
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = Some(subdivisions);
        self
    }
    
    /// Overrides the whole trail config.
    pub fn with_config(mut self, config: TrailConfig) -> Self {
        self.name = Some(config.name);
        self.life_time = Some(config.life_time);
        self.subdivisions = Some(config.subdivisions);
        self
    }
    
    /// Trail config a scenario runs with, after overrides.
    pub fn trail_config(&self, scenario: ScenarioId, spec: &ScenarioSpec) -> TrailConfig {
        TrailConfig {
            name: self.name.clone().unwrap_or_else(|| scenario.name().to_string()),
            life_time: self.life_time.unwrap_or(spec.life_time),
            subdivisions: self.subdivisions.unwrap_or(spec.subdivisions),
        }
    }
    
    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.execute(scenario, None)
    }
    
    /// Runs a scenario, recording frames for export.
    pub fn run_with_export(
        &self,
        scenario: ScenarioId,
        options: &ExportOptions,
    ) -> (ScenarioResult, TrailExport) {
        let spec = scenario.spec();
        let config = self.trail_config(scenario, &spec);
        let mut export = TrailExport::new(scenario.name(), self.seed, config.life_time, config.subdivisions);
        
        let result = self.execute(scenario, Some((&mut export, options)));
        export.finalize(result.passed, result.failure_reason.clone());
        (result, export)
    }
    
    fn execute(
        &self,
        scenario: ScenarioId,
        mut export: Option<(&mut TrailExport, &ExportOptions)>,
    ) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        
        let spec = scenario.spec();
        let config = self.trail_config(scenario, &spec);
        let tick_rate_hz = self.tick_rate_hz.unwrap_or(spec.tick_rate_hz).max(1);
        let dt = 1.0 / tick_rate_hz as f64;
        let target_ticks = (self.max_duration_secs * tick_rate_hz as f64) as u64;
        
        let physics_seed = self.seed.wrapping_mul(0x9e3779b97f4a7c15);
        let mut oracle = Oracle::new(physics_seed, spec.motion);
        oracle.set_position_noise(spec.noise_std);
        let mut clock = SimClock::new();
        
        let mut result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed: false,
            total_ticks: 0,
            skipped_ticks: 0,
            final_time_secs: 0.0,
            final_live_samples: 0,
            failure_reason: None,
            metrics: ScenarioMetrics::default(),
        };
        
        let mut trail = match Trail::initialize(config.clone(), MemoryTarget::seeded(self.seed)) {
            Ok(trail) => trail,
            Err(e) => {
                warn!("Scenario {} could not start: {}", scenario.name(), e);
                result.failure_reason = Some(format!("initialize failed: {}", e));
                return result;
            }
        };
        
        let mut resumed_after_gap = false;
        
        for tick in 0..target_ticks {
            clock.advance(Duration::from_secs_f64(dt));
            oracle.step(dt);
            let now = clock.now_secs();
            
            if spec.gap.map_or(false, |(start, end)| now >= start && now < end) {
                result.skipped_ticks += 1;
                resumed_after_gap = true;
                continue;
            }
            
            let (base, tip) = oracle.sample();
            if let Err(e) = trail.tick(now, base, tip) {
                result.failure_reason = Some(format!("tick {} failed: {}", tick, e));
                break;
            }
            result.total_ticks += 1;
            
            let metrics = &mut result.metrics;
            if resumed_after_gap {
                if trail.history().len() == 1 && trail.mesh().is_empty() {
                    metrics.gap_resets += 1;
                }
                resumed_after_gap = false;
            }
            if trail.history().newest().map_or(false, |s| s.time_created < now) {
                metrics.stalled_ticks += 1;
            }
            metrics.max_live_samples = metrics.max_live_samples.max(trail.history().len());
            metrics.max_smoothed_len = metrics.max_smoothed_len.max(trail.smoothed().len());
            metrics.max_triangles = metrics.max_triangles.max(trail.mesh().triangle_count());
            
            if let Err(reason) = check_invariants(&trail, now) {
                result.failure_reason = Some(format!("t={:.3}s: {}", now, reason));
                break;
            }
            
            if let Some((export, options)) = export.as_mut() {
                if result.total_ticks % options.interval.max(1) == 0 {
                    export.add_frame(TrailFrame {
                        time_sec: now,
                        live_samples: trail.history().len(),
                        smoothed_len: trail.smoothed().len(),
                        vertex_count: trail.mesh().vertex_count(),
                        triangle_count: trail.mesh().triangle_count(),
                        head_width: trail.history().newest().map_or(0.0, Segment::width),
                        mesh: options.include_mesh.then(|| trail.mesh().clone()),
                    });
                }
            }
            
            if tick % tick_rate_hz as u64 == 0 {
                debug!(
                    "  t={:.1}s | live={} | smoothed={} | triangles={}",
                    now,
                    trail.history().len(),
                    trail.smoothed().len(),
                    trail.mesh().triangle_count()
                );
            }
        }
        
        result.final_time_secs = clock.now_secs();
        result.final_live_samples = trail.history().len();
        
        if result.failure_reason.is_none() {
            result.failure_reason = check_expectations(&spec, &config, tick_rate_hz, &result);
        }
        
        if let Some(target) = trail.target() {
            result.metrics.uploads = target.upload_count();
            result.metrics.clears = target.clear_count();
        }
        let shutdown = match trail.shutdown() {
            Ok(target) if target.is_acquired() => Some("render target still acquired after shutdown".to_string()),
            Ok(_) => None,
            Err(e) => Some(format!("shutdown failed: {}", e)),
        };
        if result.failure_reason.is_none() {
            result.failure_reason = shutdown;
        }
        
        result.passed = result.failure_reason.is_none();
        if let Some(reason) = &result.failure_reason {
            warn!("Scenario {} failed: {}", scenario.name(), reason);
        }
        result
    }
}

/// Checks the per-tick guarantees of a trail.
fn check_invariants(trail: &Trail<MemoryTarget>, now: f64) -> Result<(), String> {
    let config = trail.config();
    let history = trail.history();
    
    if history.len() >= history.capacity() {
        return Err(format!("history holds {} of {} slots", history.len(), history.capacity()));
    }
    if let Some(stale) = history.iter().find(|s| now - s.time_created > config.life_time) {
        return Err(format!("live sample from t={:.3}s outlived its life time", stale.time_created));
    }
    
    let smoothed = trail.smoothed().as_slice();
    let expected = ArcSmoother::new(config.subdivisions).output_len(history.len());
    if smoothed.len() != expected {
        return Err(format!("smoothed length {} != {} for {} samples", smoothed.len(), expected, history.len()));
    }
    let stride = config.subdivisions + 1;
    for (k, raw) in history.iter().enumerate() {
        if smoothed[k * stride] != *raw {
            return Err(format!("raw sample {} moved by smoothing", k));
        }
    }
    
    let mesh = trail.mesh();
    let count = smoothed.len();
    if count <= 1 {
        if !mesh.vertices.is_empty() || !mesh.indices.is_empty() {
            return Err(format!("{} smoothed segments produced geometry", count));
        }
        return Ok(());
    }
    if mesh.vertices.len() != 2 * count || mesh.colors.len() != 2 * count || mesh.uvs.len() != 2 * count {
        return Err(format!("{} vertices for {} segments", mesh.vertices.len(), count));
    }
    if mesh.indices.len() != 6 * (count - 1) {
        return Err(format!("{} indices for {} segments", mesh.indices.len(), count));
    }
    if mesh.colors[0][3] != 1.0 {
        return Err(format!("head alpha {} != 1", mesh.colors[0][3]));
    }
    if mesh.vertices.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
        return Err("non-finite vertex".to_string());
    }
    Ok(())
}

/// Checks what a whole run should have exercised.
fn check_expectations(
    spec: &ScenarioSpec,
    config: &TrailConfig,
    tick_rate_hz: u32,
    result: &ScenarioResult,
) -> Option<String> {
    let usable = (config.history_capacity() - 1) as f64;
    let saturates = tick_rate_hz as f64 * config.life_time > usable + 1.0;
    let saturation_time = (usable + 2.0) / tick_rate_hz as f64;
    if saturates && spec.gap.is_none() && result.final_time_secs > saturation_time && result.metrics.stalled_ticks == 0 {
        return Some("history saturated but no write ever stalled".to_string());
    }
    
    if let Some((start, end)) = spec.gap {
        if end - start > config.life_time && end < result.final_time_secs && result.metrics.gap_resets == 0 {
            return Some("trail did not collapse after the sampling gap".to_string());
        }
    }
    
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    
    #[test]
    fn test_all_scenarios_pass() {
        let runner = ScenarioRunner::new(42).with_duration(4.0);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
            assert!(result.total_ticks > 0);
            assert!(result.metrics.uploads > 0);
        }
    }
    
    #[test]
    fn test_slash_metrics() {
        let result = ScenarioRunner::new(42).with_duration(2.0).run(ScenarioId::Slash);
        assert!(result.passed);
        assert_eq!(result.total_ticks, 120);
        // 0.3s at 60 Hz keeps about 18 samples alive
        assert!(result.metrics.max_live_samples >= 17 && result.metrics.max_live_samples <= 19);
        assert_eq!(result.metrics.max_smoothed_len, result.metrics.max_live_samples * 5 - 4);
        // Only the very first tick has a single sample
        assert_eq!(result.metrics.clears, 1);
        assert_eq!(result.metrics.stalled_ticks, 0);
    }
    
    #[test]
    fn test_overflow_stalls() {
        let result = ScenarioRunner::new(42).with_duration(3.0).run(ScenarioId::Overflow);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.stalled_ticks > 0);
        assert_eq!(result.metrics.max_live_samples, 60);
    }
    
    #[test]
    fn test_camera_gap_collapses_and_regrows() {
        let result = ScenarioRunner::new(42).with_duration(4.0).run(ScenarioId::CameraGap);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.gap_resets, 1);
        assert!(result.skipped_ticks > 80);
        assert!(result.final_live_samples > 1);
    }
    
    #[test]
    fn test_invalid_override_fails_cleanly() {
        let result = ScenarioRunner::new(42).with_life_time(0.0).run(ScenarioId::Slash);
        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("initialize"));
    }
    
    #[test]
    fn test_config_override() {
        let config = TrailConfig {
            name: "Blade".to_string(),
            life_time: 0.5,
            subdivisions: 0,
        };
        let runner = ScenarioRunner::new(1).with_config(config.clone());
        let spec = ScenarioId::Slash.spec();
        assert_eq!(runner.trail_config(ScenarioId::Slash, &spec), config);
        
        let result = runner.with_duration(1.0).run(ScenarioId::Slash);
        assert!(result.passed);
        assert_eq!(result.metrics.max_smoothed_len, result.metrics.max_live_samples);
    }
    
    #[test]
    fn test_export_is_deterministic() {
        let options = ExportOptions {
            interval: 5,
            include_mesh: true,
        };
        let runner = ScenarioRunner::new(7).with_duration(1.0);
        let (r1, e1) = runner.run_with_export(ScenarioId::Jitter, &options);
        let (r2, e2) = runner.run_with_export(ScenarioId::Jitter, &options);
        
        assert!(r1.passed && r2.passed);
        assert_eq!(e1.frames.len(), 12);
        assert_eq!(e1.frames, e2.frames);
        assert!(e1.frames.iter().all(|f| f.mesh.is_some()));
        assert!(e1.passed);
    }
    
    #[test]
    fn test_export_records_head_width() {
        let options = ExportOptions {
            interval: 7,
            include_mesh: false,
        };
        let (_, export) = ScenarioRunner::new(3).with_duration(1.0).run_with_export(ScenarioId::Slash, &options);
        
        // Rigid 1.2m blade
        assert!(!export.frames.is_empty());
        for frame in &export.frames {
            assert_relative_eq!(frame.head_width, 1.2, epsilon = 1e-9);
        }
    }
    
    #[test]
    fn test_different_seeds_differ_under_jitter() {
        let options = ExportOptions {
            interval: 1,
            include_mesh: true,
        };
        let (_, e1) = ScenarioRunner::new(1).with_duration(0.5).run_with_export(ScenarioId::Jitter, &options);
        let (_, e2) = ScenarioRunner::new(2).with_duration(0.5).run_with_export(ScenarioId::Jitter, &options);
        assert_ne!(e1.frames.last().unwrap().mesh, e2.frames.last().unwrap().mesh);
    }
    
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        
        #[test]
        fn prop_slash_holds_for_any_setup(
            seed in any::<u64>(),
            life_time in 0.05f64..1.5,
            subdivisions in 0usize..8,
            tick_rate in 10u32..240,
        ) {
            let result = ScenarioRunner::new(seed)
                .with_duration(1.5)
                .with_life_time(life_time)
                .with_subdivisions(subdivisions)
                .with_tick_rate(tick_rate)
                .run(ScenarioId::Jitter);
            prop_assert!(result.passed, "{:?}", result.failure_reason);
        }
    }
}
