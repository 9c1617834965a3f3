//! Data-driven tuning for the roll lifecycle
//!
//! Thresholds are configuration, not structure. Every settle threshold must
//! stay strictly below its moving counterpart so a measured speed always
//! lands in a definite class.

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, Result};

/// Motion classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionThresholds {
    /// Linear speed below which the die may be settled (m/s)
    pub settle_linear: f32,
    /// Angular speed below which the die may be settled (rad/s)
    pub settle_angular: f32,
    /// Vertical speed below which the die may be settled (m/s)
    pub settle_vertical: f32,
    /// Linear speed above which the die is moving (m/s)
    pub moving_linear: f32,
    /// Angular speed above which the die is moving (rad/s)
    pub moving_angular: f32,
    /// Allowed distance from the variant's resting height
    pub floor_band: f32,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            settle_linear: 0.02,
            settle_angular: 0.10,
            settle_vertical: 0.02,
            moving_linear: 0.03,
            moving_angular: 0.15,
            floor_band: 0.05,
        }
    }
}

/// Launch impulse ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpulseRanges {
    /// Horizontal components drawn from [-h, h]
    pub linear_horizontal: f32,
    /// Vertical component drawn from [min, max]
    pub linear_vertical_min: f32,
    pub linear_vertical_max: f32,
    /// Angular components drawn from [-a, a] on every axis
    pub angular: f32,
}

impl Default for ImpulseRanges {
    fn default() -> Self {
        Self {
            linear_horizontal: 1.5,
            linear_vertical_min: 4.0,
            linear_vertical_max: 6.0,
            angular: 8.0,
        }
    }
}

/// Complete lifecycle tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub motion: MotionThresholds,
    pub impulse: ImpulseRanges,

    // === Timers (seconds) ===
    /// Time the die must stay settled before recentering
    pub settle_duration: f32,
    /// Liveness bound: not-moving this long forces recentering
    pub still_timeout: f32,
    /// Guard period after a settle event
    pub cooldown: f32,
    /// Delay before the automatic roll after a variant change
    pub auto_roll_delay: f32,

    // === Recenter animation ===
    pub recenter_duration: f32,
    /// Fixed interpolation step
    pub recenter_step: f32,
    pub pulse_duration: f32,
    pub pulse_scale: f32,

    // === Arena ===
    /// Fixed playfield depth; width follows the viewport aspect ratio
    pub arena_depth: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Minimum drop height above rest when the die is first released
    pub spawn_clearance: f32,

    /// Weakest collision forwarded as feedback
    pub impact_min_strength: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            motion: MotionThresholds::default(),
            impulse: ImpulseRanges::default(),
            settle_duration: 0.5,
            still_timeout: 2.0,
            cooldown: 5.0,
            auto_roll_delay: 0.35,
            recenter_duration: 0.6,
            recenter_step: 1.0 / 60.0,
            pulse_duration: 0.18,
            pulse_scale: 1.08,
            arena_depth: 6.0,
            wall_height: 4.0,
            wall_thickness: 0.5,
            spawn_clearance: 1.0,
            impact_min_strength: 0.5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tunings that would leave a speed unclassifiable or a timer inert
    pub fn validate(&self) -> Result<()> {
        let m = &self.motion;
        let i = &self.impulse;
        let fields = [
            ("settle_linear", m.settle_linear),
            ("settle_angular", m.settle_angular),
            ("settle_vertical", m.settle_vertical),
            ("moving_linear", m.moving_linear),
            ("moving_angular", m.moving_angular),
            ("floor_band", m.floor_band),
            ("linear_horizontal", i.linear_horizontal),
            ("linear_vertical_min", i.linear_vertical_min),
            ("linear_vertical_max", i.linear_vertical_max),
            ("angular", i.angular),
            ("settle_duration", self.settle_duration),
            ("still_timeout", self.still_timeout),
            ("cooldown", self.cooldown),
            ("auto_roll_delay", self.auto_roll_delay),
            ("recenter_duration", self.recenter_duration),
            ("recenter_step", self.recenter_step),
            ("pulse_duration", self.pulse_duration),
            ("pulse_scale", self.pulse_scale),
            ("arena_depth", self.arena_depth),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("spawn_clearance", self.spawn_clearance),
            ("impact_min_strength", self.impact_min_strength),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(DiceError::InvalidTuning(format!("{name} must be finite")));
            }
        }

        if m.settle_linear >= m.moving_linear {
            return Err(DiceError::InvalidTuning(format!(
                "settle_linear {} must be below moving_linear {}",
                m.settle_linear, m.moving_linear
            )));
        }
        if m.settle_angular >= m.moving_angular {
            return Err(DiceError::InvalidTuning(format!(
                "settle_angular {} must be below moving_angular {}",
                m.settle_angular, m.moving_angular
            )));
        }
        if m.settle_vertical > m.moving_linear {
            return Err(DiceError::InvalidTuning(format!(
                "settle_vertical {} must not exceed moving_linear {}",
                m.settle_vertical, m.moving_linear
            )));
        }
        if m.floor_band < 0.0 {
            return Err(DiceError::InvalidTuning("floor_band is negative".into()));
        }

        let positive = [
            ("settle_duration", self.settle_duration),
            ("still_timeout", self.still_timeout),
            ("recenter_duration", self.recenter_duration),
            ("recenter_step", self.recenter_step),
            ("arena_depth", self.arena_depth),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(DiceError::InvalidTuning(format!("{name} must be positive")));
            }
        }

        if i.linear_vertical_min > i.linear_vertical_max || i.linear_vertical_min <= 0.0 {
            return Err(DiceError::InvalidTuning(
                "vertical impulse range must be positive and ordered".into(),
            ));
        }
        if i.linear_horizontal < 0.0 || i.angular < 0.0 {
            return Err(DiceError::InvalidTuning("impulse ranges are negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_settle_must_be_below_moving() {
        let mut tuning = Tuning::default();
        tuning.motion.settle_linear = tuning.motion.moving_linear;
        assert!(matches!(tuning.validate(), Err(DiceError::InvalidTuning(_))));

        let mut tuning = Tuning::default();
        tuning.motion.settle_angular = 1.0;
        assert!(matches!(tuning.validate(), Err(DiceError::InvalidTuning(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let tuning = Tuning {
            still_timeout: 0.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut tuning = Tuning::default();
        tuning.impulse.linear_horizontal = f32::NAN;
        assert!(matches!(tuning.validate(), Err(DiceError::InvalidTuning(_))));

        let mut tuning = Tuning::default();
        tuning.impulse.linear_vertical_max = f32::INFINITY;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.motion.settle_angular = f32::NAN;
        assert!(tuning.validate().is_err());

        let tuning = Tuning {
            cooldown: f32::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_overrides() {
        let tuning = Tuning {
            settle_duration: 0.4,
            ..Default::default()
        };
        let json = tuning.to_json().unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.settle_duration, 0.4);
        assert_eq!(parsed, tuning);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(DiceError::Config(_))));
    }
}
