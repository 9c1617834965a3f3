//! Physics world seam
//!
//! The rigid-body engine and the die geometry builder live outside the roll
//! lifecycle. The controller only ever holds a [`PhysicsWorld::Handle`]; the
//! world owns the body itself.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::boundary::BoundaryVolume;
use super::variant::DieVariant;
use crate::error::GeometryError;

/// Position + orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear + angular velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        angular: Vec3::ZERO,
    };
}

/// Who drives the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyMode {
    /// Integrated by the physics engine
    #[default]
    Dynamic,
    /// Moved by explicit pose writes only
    Kinematic,
    /// Immovable
    Static,
}

/// Collision shape requested from the geometry factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionShape {
    /// Convex hull of the render mesh
    ConvexHull,
    /// Axis-aligned box around the mesh, used when hull generation fails
    BoundingBox,
}

/// Rigid-body engine as seen by the roll lifecycle
pub trait PhysicsWorld {
    type Handle: Copy + PartialEq + std::fmt::Debug;

    fn pose(&self, body: Self::Handle) -> Pose;

    /// `None` when the engine does not expose velocities; the motion monitor
    /// then falls back to finite differences.
    fn velocity(&self, body: Self::Handle) -> Option<Velocity>;

    fn set_pose(&mut self, body: Self::Handle, pose: Pose);
    fn set_velocity(&mut self, body: Self::Handle, velocity: Velocity);
    fn set_body_mode(&mut self, body: Self::Handle, mode: BodyMode);
    fn apply_linear_impulse(&mut self, body: Self::Handle, impulse: Vec3);
    fn apply_angular_impulse(&mut self, body: Self::Handle, impulse: Vec3);

    /// Remove every previously installed boundary volume and add these
    fn replace_boundaries(&mut self, volumes: &[BoundaryVolume]);
}

/// Builds die bodies (mesh, collision shape) inside the world
pub trait GeometryFactory: PhysicsWorld {
    /// Build a die at `pose`. The caller sets its body mode afterwards.
    fn build_die(
        &mut self,
        variant: &DieVariant,
        shape: CollisionShape,
        pose: Pose,
    ) -> Result<Self::Handle, GeometryError>;

    fn discard_die(&mut self, body: Self::Handle);
}
