//! Host-behaviour scenarios for the trail simulation.

use crate::oracle::AnchorMotion;
use nalgebra::Vector3;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: Sword slash at 60 Hz, short-lived trail
    Slash,
    
    /// SIM-002: Straight constant-velocity motion (collinear samples)
    Linear,
    
    /// SIM-003: Figure-eight sweep, long trail
    FigureEight,
    
    /// SIM-004: 240 Hz sampling saturates the history (stalling write)
    Overflow,
    
    /// SIM-005: Host stops sampling for a while, then resumes
    CameraGap,
    
    /// SIM-006: Noisy anchor tracking
    Jitter,
}

/// Parameters a scenario runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSpec {
    /// Anchor motion
    pub motion: AnchorMotion,
    
    /// Host frame rate
    pub tick_rate_hz: u32,
    
    /// Trail life time (seconds)
    pub life_time: f64,
    
    /// Interior arc points per interval
    pub subdivisions: usize,
    
    /// Anchor jitter standard deviation (meters)
    pub noise_std: f64,
    
    /// Window `[start, end)` in seconds during which the host skips ticks
    pub gap: Option<(f64, f64)>,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Slash,
            ScenarioId::Linear,
            ScenarioId::FigureEight,
            ScenarioId::Overflow,
            ScenarioId::CameraGap,
            ScenarioId::Jitter,
        ]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Slash => "slash",
            ScenarioId::Linear => "linear",
            ScenarioId::FigureEight => "figure_eight",
            ScenarioId::Overflow => "overflow",
            ScenarioId::CameraGap => "camera_gap",
            ScenarioId::Jitter => "jitter",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Slash => "±75° sword swing at 60 Hz, 0.3s trail, 4 subdivisions",
            ScenarioId::Linear => "Constant-velocity anchor, every sample triple collinear",
            ScenarioId::FigureEight => "Figure-eight sweep with a 2s trail",
            ScenarioId::Overflow => "240 Hz for a 1s trail: history saturates and the write slot stalls",
            ScenarioId::CameraGap => "No sampling for 1.5s mid-swing, trail must collapse and regrow",
            ScenarioId::Jitter => "Slash with 2cm Gaussian tracking noise",
        }
    }
    
    /// Returns the parameters this scenario runs with.
    pub fn spec(&self) -> ScenarioSpec {
        let slash = ScenarioSpec {
            motion: AnchorMotion::slash(),
            tick_rate_hz: 60,
            life_time: 0.3,
            subdivisions: 4,
            noise_std: 0.0,
            gap: None,
        };
        
        match self {
            ScenarioId::Slash => slash,
            ScenarioId::Linear => ScenarioSpec {
                motion: AnchorMotion::Linear {
                    origin: Vector3::zeros(),
                    velocity: Vector3::new(3.0, 0.0, 0.0),
                    axis: Vector3::y(),
                },
                tick_rate_hz: 30,
                life_time: 1.0,
                subdivisions: 2,
                ..slash
            },
            ScenarioId::FigureEight => ScenarioSpec {
                motion: AnchorMotion::FigureEight {
                    center: Vector3::new(0.0, 0.0, 1.0),
                    scale: 2.0,
                    frequency: 0.5,
                    length: 0.8,
                },
                life_time: 2.0,
                subdivisions: 3,
                ..slash
            },
            ScenarioId::Overflow => ScenarioSpec {
                tick_rate_hz: 240,
                life_time: 1.0,
                subdivisions: 1,
                ..slash
            },
            ScenarioId::CameraGap => ScenarioSpec {
                life_time: 0.5,
                gap: Some((1.0, 2.5)),
                ..slash
            },
            ScenarioId::Jitter => ScenarioSpec {
                noise_std: 0.02,
                ..slash
            },
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slash" | "sim-001" => Ok(ScenarioId::Slash),
            "linear" | "sim-002" => Ok(ScenarioId::Linear),
            "figure_eight" | "figureeight" | "sim-003" => Ok(ScenarioId::FigureEight),
            "overflow" | "sim-004" => Ok(ScenarioId::Overflow),
            "camera_gap" | "cameragap" | "sim-005" => Ok(ScenarioId::CameraGap),
            "jitter" | "sim-006" => Ok(ScenarioId::Jitter),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
