//! Ground truth oracle for the simulated anchor.
//!
//! The Oracle plays the tracked transforms of the host scene:
//! - True pose of the two-point anchor over time (kinematics)
//! - Sample generation with optional Gaussian jitter

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Analytic motion of a base/tip anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnchorMotion {
    /// Anchor at rest
    Still {
        base: Vector3<f64>,
        tip: Vector3<f64>,
    },
    
    /// Anchor translating at constant velocity, pointing along `axis`
    Linear {
        origin: Vector3<f64>,
        velocity: Vector3<f64>,
        axis: Vector3<f64>,
    },
    
    /// Blade swinging back and forth about a pivot in the XY plane.
    ///
    /// Angle is `sweep * sin(2π * frequency * t)`; the base sits at
    /// `inner_radius` and the tip at `outer_radius` from the pivot.
    Swing {
        pivot: Vector3<f64>,
        inner_radius: f64,
        outer_radius: f64,
        sweep: f64,
        frequency: f64,
    },
    
    /// Lissajous figure-eight in the XY plane, anchor pointing +Z
    FigureEight {
        center: Vector3<f64>,
        scale: f64,
        frequency: f64,
        length: f64,
    },
}

impl AnchorMotion {
    /// A sword slash: 1.2m blade on a 0.3m arm, ±75° at 1.5 Hz.
    pub fn slash() -> Self {
        AnchorMotion::Swing {
            pivot: Vector3::zeros(),
            inner_radius: 0.3,
            outer_radius: 1.5,
            sweep: 75f64.to_radians(),
            frequency: 1.5,
        }
    }
    
    /// Returns the true `(base, tip)` pose at time `t`.
    pub fn pose(&self, t: f64) -> (Vector3<f64>, Vector3<f64>) {
        match *self {
            AnchorMotion::Still { base, tip } => (base, tip),
            
            AnchorMotion::Linear { origin, velocity, axis } => {
                let base = origin + velocity * t;
                (base, base + axis)
            }
            
            AnchorMotion::Swing { pivot, inner_radius, outer_radius, sweep, frequency } => {
                let angle = sweep * (TAU * frequency * t).sin();
                let dir = Vector3::new(angle.cos(), angle.sin(), 0.0);
                (pivot + dir * inner_radius, pivot + dir * outer_radius)
            }
            
            AnchorMotion::FigureEight { center, scale, frequency, length } => {
                let phase = TAU * frequency * t;
                let base = center + Vector3::new(phase.sin(), (2.0 * phase).sin() * 0.5, 0.0) * scale;
                (base, base + Vector3::z() * length)
            }
        }
    }
}

/// The Oracle - maintains the true anchor pose and generates samples.
pub struct Oracle {
    /// RNG for jitter
    physics_rng: ChaCha8Rng,
    
    /// Motion model
    motion: AnchorMotion,
    
    /// Current simulation time (seconds)
    current_time: f64,
    
    /// Position jitter standard deviation (meters), 0 = exact
    position_noise_std: f64,
}

impl Oracle {
    /// Creates a new Oracle with the given physics seed.
    pub fn new(physics_seed: u64, motion: AnchorMotion) -> Self {
        Self {
            physics_rng: ChaCha8Rng::seed_from_u64(physics_seed),
            motion,
            current_time: 0.0,
            position_noise_std: 0.0,
        }
    }
    
    /// Sets the position jitter standard deviation.
    pub fn set_position_noise(&mut self, std_dev: f64) {
        self.position_noise_std = std_dev;
    }
    
    /// Advances time by dt seconds.
    pub fn step(&mut self, dt: f64) {
        self.current_time += dt;
    }
    
    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.current_time
    }
    
    pub fn motion(&self) -> &AnchorMotion {
        &self.motion
    }
    
    /// Returns the exact pose at the current time.
    pub fn ground_truth(&self) -> (Vector3<f64>, Vector3<f64>) {
        self.motion.pose(self.current_time)
    }
    
    /// Samples the anchor, adding independent jitter to base and tip.
    pub fn sample(&mut self) -> (Vector3<f64>, Vector3<f64>) {
        let (base, tip) = self.ground_truth();
        
        // A non-positive or non-finite std dev means exact samples
        let normal = match Normal::new(0.0, self.position_noise_std) {
            Ok(normal) if self.position_noise_std > 0.0 => normal,
            _ => return (base, tip),
        };
        
        let mut noise = || {
            Vector3::new(
                normal.sample(&mut self.physics_rng),
                normal.sample(&mut self.physics_rng),
                normal.sample(&mut self.physics_rng),
            )
        };
        let base_noise = noise();
        let tip_noise = noise();
        (base + base_noise, tip + tip_noise)
    }
}
