//! Minimal rigid-body world
//!
//! Good enough to throw a die around a box and let it come to rest: gravity,
//! sphere-vs-box contact against the installed boundary volumes, restitution,
//! Coulomb-style friction, rolling damping and sleep snapping. Contact uses
//! the variant's resting height as the sphere radius, so a sleeping die sits
//! exactly at its rest height. Not physically exact for any polyhedron.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::boundary::BoundaryVolume;
use super::variant::DieVariant;
use super::world::{BodyMode, CollisionShape, GeometryFactory, PhysicsWorld, Pose, Velocity};
use crate::consts::GRAVITY;
use crate::error::GeometryError;
use crate::horizontal;

/// Handle to a body in a [`BoxWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

/// A contact that started this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub body: BodyId,
    /// Closing speed along the contact normal
    pub strength: f32,
}

#[derive(Debug, Clone)]
struct Body {
    pose: Pose,
    velocity: Velocity,
    mode: BodyMode,
    radius: f32,
}

/// Surface response
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub restitution: f32,
    /// Friction coefficient (horizontal deceleration = mu * g)
    pub friction: f32,
    /// Angular deceleration while touching the floor (rad/s²)
    pub rolling_resistance: f32,
    /// Normal speed below which a bounce is absorbed
    pub rest_speed: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.35,
            friction: 0.4,
            rolling_resistance: 8.0,
            rest_speed: 0.3,
        }
    }
}

const SLEEP_LINEAR: f32 = 0.05;
const SLEEP_ANGULAR: f32 = 0.08;
// Above the per-tick gravity gain so resting contact stays quiet
const MIN_IMPACT: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct BoxWorld {
    bodies: BTreeMap<BodyId, Body>,
    boundaries: Vec<BoundaryVolume>,
    next_id: u32,
    pub gravity: Vec3,
    pub material: Material,
    report_velocity: bool,
}

impl Default for BoxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxWorld {
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            boundaries: Vec::new(),
            next_id: 1,
            gravity: GRAVITY,
            material: Material::default(),
            report_velocity: true,
        }
    }

    /// A world whose `velocity()` reports nothing, like engines that only
    /// expose poses
    pub fn without_velocity_reporting() -> Self {
        Self {
            report_velocity: false,
            ..Self::new()
        }
    }

    pub fn contains(&self, body: BodyId) -> bool {
        self.bodies.contains_key(&body)
    }

    pub fn body_mode(&self, body: BodyId) -> Option<BodyMode> {
        self.bodies.get(&body).map(|b| b.mode)
    }

    /// Velocity regardless of the reporting setting
    pub fn true_velocity(&self, body: BodyId) -> Option<Velocity> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    pub fn boundaries(&self) -> &[BoundaryVolume] {
        &self.boundaries
    }

    /// Advance every dynamic body by `dt`
    pub fn step(&mut self, dt: f32) -> Vec<Impact> {
        let mut impacts = Vec::new();
        if dt <= 0.0 {
            return impacts;
        }

        for (&id, body) in self.bodies.iter_mut() {
            if body.mode != BodyMode::Dynamic {
                continue;
            }

            body.velocity.linear += self.gravity * dt;
            body.pose.position += body.velocity.linear * dt;
            body.pose.orientation =
                (Quat::from_scaled_axis(body.velocity.angular * dt) * body.pose.orientation).normalize();

            let mut grounded = false;
            for volume in &self.boundaries {
                if let Some(strength) = resolve_contact(body, volume, &self.material) {
                    if strength > MIN_IMPACT {
                        impacts.push(Impact { body: id, strength });
                    }
                }
                if touching_from_above(body, volume) {
                    grounded = true;
                }
            }

            if grounded {
                apply_ground_friction(body, &self.material, self.gravity.length(), dt);
            }
        }

        impacts
    }
}

/// Push the sphere out of the box and bounce. Returns the closing speed if
/// the sphere was approaching the surface.
fn resolve_contact(body: &mut Body, volume: &BoundaryVolume, material: &Material) -> Option<f32> {
    let min = volume.center - volume.half_extents;
    let max = volume.center + volume.half_extents;
    let p = body.pose.position;
    let closest = p.clamp(min, max);
    let offset = p - closest;
    let dist = offset.length();
    if dist >= body.radius {
        return None;
    }

    let normal = if dist > 1e-6 {
        offset / dist
    } else {
        // Center inside the slab; push out along the thinnest axis toward the body
        exit_normal(p, volume)
    };
    body.pose.position += normal * (body.radius - dist);

    let vn = body.velocity.linear.dot(normal);
    if vn >= 0.0 {
        return None;
    }
    body.velocity.linear -= normal * vn * (1.0 + material.restitution);
    let rebound = body.velocity.linear.dot(normal);
    if rebound < material.rest_speed {
        body.velocity.linear -= normal * rebound;
    }
    Some(-vn)
}

fn exit_normal(p: Vec3, volume: &BoundaryVolume) -> Vec3 {
    let local = p - volume.center;
    let room = volume.half_extents - local.abs();
    if room.x <= room.y && room.x <= room.z {
        Vec3::X * local.x.signum()
    } else if room.y <= room.z {
        Vec3::Y * local.y.signum()
    } else {
        Vec3::Z * local.z.signum()
    }
}

fn touching_from_above(body: &Body, volume: &BoundaryVolume) -> bool {
    let top = volume.center.y + volume.half_extents.y;
    let p = body.pose.position;
    let within = (p.x - volume.center.x).abs() <= volume.half_extents.x
        && (p.z - volume.center.z).abs() <= volume.half_extents.z;
    within && p.y >= top && p.y - top <= body.radius + 1e-3
}

fn apply_ground_friction(body: &mut Body, material: &Material, g: f32, dt: f32) {
    let v = body.velocity.linear;
    let h = horizontal(v);
    let speed = h.length();
    let slowed = (speed - material.friction * g * dt).max(0.0);
    let h = if speed > 0.0 { h * (slowed / speed) } else { h };
    body.velocity.linear = Vec3::new(h.x, v.y, h.z);

    let w = body.velocity.angular;
    let spin = w.length();
    let spun_down = (spin - material.rolling_resistance * dt).max(0.0);
    body.velocity.angular = if spin > 0.0 { w * (spun_down / spin) } else { w };

    if body.velocity.linear.length() < SLEEP_LINEAR && body.velocity.angular.length() < SLEEP_ANGULAR {
        body.velocity = Velocity::ZERO;
    }
}

impl PhysicsWorld for BoxWorld {
    type Handle = BodyId;

    fn pose(&self, body: BodyId) -> Pose {
        self.bodies.get(&body).map(|b| b.pose).unwrap_or_default()
    }

    fn velocity(&self, body: BodyId) -> Option<Velocity> {
        if !self.report_velocity {
            return None;
        }
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_pose(&mut self, body: BodyId, pose: Pose) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.pose = pose;
        }
    }

    fn set_velocity(&mut self, body: BodyId, velocity: Velocity) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.velocity = velocity;
        }
    }

    fn set_body_mode(&mut self, body: BodyId, mode: BodyMode) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.mode = mode;
        }
    }

    fn apply_linear_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if b.mode == BodyMode::Dynamic {
                // Unit mass
                b.velocity.linear += impulse;
            }
        }
    }

    fn apply_angular_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if b.mode == BodyMode::Dynamic {
                // Unit inertia
                b.velocity.angular += impulse;
            }
        }
    }

    fn replace_boundaries(&mut self, volumes: &[BoundaryVolume]) {
        self.boundaries.clear();
        self.boundaries.extend_from_slice(volumes);
    }
}

impl GeometryFactory for BoxWorld {
    fn build_die(
        &mut self,
        variant: &DieVariant,
        shape: CollisionShape,
        pose: Pose,
    ) -> Result<BodyId, GeometryError> {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            id,
            Body {
                pose,
                velocity: Velocity::ZERO,
                mode: BodyMode::Kinematic,
                radius: variant.rest_height,
            },
        );
        log::debug!("Built d{} as {:?} ({:?})", variant.face_count, id, shape);
        Ok(id)
    }

    fn discard_die(&mut self, body: BodyId) {
        self.bodies.remove(&body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::boundary::Boundary;
    use crate::tuning::Tuning;

    fn arena() -> BoxWorld {
        let mut world = BoxWorld::new();
        let boundary = Boundary::from_viewport(800.0, 600.0, &Tuning::default()).unwrap();
        world.replace_boundaries(&boundary.volumes());
        world
    }

    fn spawn(world: &mut BoxWorld, y: f32) -> BodyId {
        let variant = DieVariant::cube();
        let id = world
            .build_die(&variant, CollisionShape::ConvexHull, Pose::new(Vec3::Y * y, Quat::IDENTITY))
            .unwrap();
        world.set_body_mode(id, BodyMode::Dynamic);
        id
    }

    #[test]
    fn test_new_bodies_are_staged_kinematic() {
        let mut world = arena();
        let id = world
            .build_die(&DieVariant::coin(), CollisionShape::BoundingBox, Pose::IDENTITY)
            .unwrap();
        assert_eq!(world.body_mode(id), Some(BodyMode::Kinematic));
        world.apply_linear_impulse(id, Vec3::Y);
        assert_eq!(world.true_velocity(id), Some(Velocity::ZERO));
        world.discard_die(id);
        assert!(!world.contains(id));
    }

    #[test]
    fn test_drop_comes_to_rest_on_floor() {
        let mut world = arena();
        let id = spawn(&mut world, 2.0);
        world.apply_linear_impulse(id, Vec3::new(1.0, 3.0, -0.5));
        world.apply_angular_impulse(id, Vec3::new(5.0, -3.0, 2.0));

        let mut impacts = 0;
        for _ in 0..(10.0 / SIM_DT) as usize {
            impacts += world.step(SIM_DT).len();
        }
        let pose = world.pose(id);
        assert!(impacts > 0);
        assert!((pose.position.y - 0.5).abs() < 1e-3, "y = {}", pose.position.y);
        assert_eq!(world.velocity(id), Some(Velocity::ZERO));
    }

    #[test]
    fn test_walls_contain_body() {
        let mut world = arena();
        let id = spawn(&mut world, 0.5);
        world.apply_linear_impulse(id, Vec3::new(30.0, 0.0, 30.0));
        for _ in 0..600 {
            world.step(SIM_DT);
            let p = world.pose(id).position;
            assert!(p.x.abs() < 5.0 && p.z.abs() < 4.0, "escaped to {p:?}");
        }
    }

    #[test]
    fn test_kinematic_bodies_do_not_fall() {
        let mut world = arena();
        let id = spawn(&mut world, 2.0);
        world.set_body_mode(id, BodyMode::Kinematic);
        world.step(SIM_DT);
        assert_eq!(world.pose(id).position.y, 2.0);
    }

    #[test]
    fn test_velocity_reporting_can_be_disabled() {
        let mut world = BoxWorld::without_velocity_reporting();
        let id = spawn(&mut world, 2.0);
        world.step(SIM_DT);
        assert_eq!(world.velocity(id), None);
        assert!(world.true_velocity(id).is_some());
    }
}
