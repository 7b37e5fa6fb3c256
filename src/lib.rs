//! Procedural alpine landscape.
//!
//! Synthesizes a mountain height field from layered gradient noise and drives
//! a smooth day ↔ night lighting transition for an external renderer.

pub mod config;
pub mod export;
pub mod fractal;
pub mod input;
pub mod lighting;
pub mod noise;
pub mod terrain;
pub mod transition;

pub use config::{ConfigError, LandscapeConfig};
pub use fractal::{AlpineProfile, FractalComposer, FractalParams, WarpParams};
pub use input::ToggleKey;
pub use lighting::LightingState;
pub use crate::noise::NoiseField;
pub use terrain::{GeometryEngine, HeightField, HeightFieldGenerator, PlaneGrid, TerrainConfig};
pub use transition::{
    DayPhase, LightingConfig, LightingStateMachine, SceneStateSink, TransitionState,
    ease_in_out_cubic,
};
