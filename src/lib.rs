//! Tumble Dice - a physically animated die with a settle-detecting roll lifecycle
//!
//! Core modules:
//! - `sim`: Roll lifecycle (motion monitor, outcome resolver, recenter animation)
//! - `tuning`: Data-driven thresholds, durations and impulse ranges
//! - `settings`: Player preferences
//! - `platform`: Browser bindings
//! - `error`: Error types

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{DiceError, GeometryError, Result};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity (m/s²)
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    /// Face counts the geometry factory knows how to build
    pub const MIN_FACE_COUNT: u32 = 2;
    pub const MAX_FACE_COUNT: u32 = 12;
    pub const DEFAULT_FACE_COUNT: u32 = 6;

    /// World up, used for face readout
    pub const WORLD_UP: Vec3 = Vec3::Y;
}

/// Smoothstep ease `t²(3 - 2t)`, with `t` clamped to [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Drop the vertical component
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }

    #[test]
    fn test_horizontal() {
        assert_eq!(horizontal(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 0.0, 3.0));
    }
}
