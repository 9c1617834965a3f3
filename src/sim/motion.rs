//! Per-tick motion measurement and settle classification
//!
//! Speeds come straight from the engine when it reports velocities, otherwise
//! from finite differences against the previous tick's pose.

use super::world::{Pose, Velocity};
use crate::tuning::MotionThresholds;

/// Speeds measured for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub linear_speed: f32,
    pub angular_speed: f32,
    pub vertical_speed: f32,
    pub near_floor: bool,
}

impl MotionSample {
    /// Nothing to difference against yet; counts as moving
    pub const UNKNOWN: Self = Self {
        linear_speed: f32::INFINITY,
        angular_speed: f32::INFINITY,
        vertical_speed: f32::INFINITY,
        near_floor: false,
    };
}

/// Result of classifying a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    /// Above a moving threshold
    Moving,
    /// Below every settle threshold and resting on the floor
    Settled,
    /// Neither: slow, but not provably at rest
    Still,
}

impl MotionClass {
    #[inline]
    pub fn is_moving(self) -> bool {
        self == MotionClass::Moving
    }

    #[inline]
    pub fn is_settled(self) -> bool {
        self == MotionClass::Settled
    }
}

impl MotionThresholds {
    /// Either moving threshold is sufficient for `Moving`; all settle
    /// predicates are required for `Settled`.
    pub fn classify(&self, sample: &MotionSample) -> MotionClass {
        if sample.linear_speed > self.moving_linear || sample.angular_speed > self.moving_angular {
            MotionClass::Moving
        } else if sample.linear_speed < self.settle_linear
            && sample.angular_speed < self.settle_angular
            && sample.vertical_speed < self.settle_vertical
            && sample.near_floor
        {
            MotionClass::Settled
        } else {
            MotionClass::Still
        }
    }
}

/// Measures the die once per tick
#[derive(Debug, Clone)]
pub struct MotionMonitor {
    rest_height: f32,
    floor_band: f32,
    previous: Option<Pose>,
    last: MotionSample,
}

impl MotionMonitor {
    pub fn new(rest_height: f32, floor_band: f32) -> Self {
        Self {
            rest_height,
            floor_band,
            previous: None,
            last: MotionSample::UNKNOWN,
        }
    }

    /// Forget pose history (after teleports or a new throw)
    pub fn reset(&mut self) {
        self.previous = None;
        self.last = MotionSample::UNKNOWN;
    }

    pub fn near_floor(&self, pose: &Pose) -> bool {
        (pose.position.y - self.rest_height).abs() <= self.floor_band
    }

    /// Measure this tick. The pose is always recorded for the next fallback.
    pub fn sample(&mut self, pose: Pose, velocity: Option<Velocity>, dt: f32) -> MotionSample {
        if dt <= 0.0 {
            return self.last;
        }

        let near_floor = self.near_floor(&pose);
        let sample = match (velocity, self.previous) {
            (Some(v), _) => MotionSample {
                linear_speed: v.linear.length(),
                angular_speed: v.angular.length(),
                vertical_speed: v.linear.y.abs(),
                near_floor,
            },
            (None, Some(prev)) => {
                let delta = pose.position - prev.position;
                let dq = pose.orientation * prev.orientation.inverse();
                // 2·acos(|w|) in its atan2 form, which stays accurate near
                // identity. |w| because q and -q are the same rotation.
                let angle = 2.0 * dq.xyz().length().atan2(dq.w.abs());
                MotionSample {
                    linear_speed: delta.length() / dt,
                    angular_speed: angle / dt,
                    vertical_speed: delta.y.abs() / dt,
                    near_floor,
                }
            }
            (None, None) => MotionSample {
                near_floor,
                ..MotionSample::UNKNOWN
            },
        };

        self.previous = Some(pose);
        self.last = sample;
        sample
    }
}
