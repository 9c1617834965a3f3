//! Roll lifecycle controller
//!
//! Owns the die's session, motion monitor and scripted animations, and drives
//! them from the physics tick:
//!
//! ```text
//! roll_dice ─▶ Rolling ─settled─▶ WaitingToSettle ─held─▶ Recentering ─▶ Announced ─▶ Idle
//!                 ▲  ◀──moving───────────┘                    │
//!                 └───────────── roll_dice (any phase) ◀──────┘
//! ```
//!
//! A failsafe forces Recentering when the die has not been moving for the
//! still timeout, whatever the settle classifier says.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::animate::{Delay, RecenterAnimator, ScalePulse, TaskSlot, TaskToken};
use super::boundary::Boundary;
use super::motion::MotionMonitor;
use super::outcome::resolve_outcome;
use super::session::{RollPhase, RollSession};
use super::variant::{DieShape, DieVariant};
use super::world::{BodyMode, CollisionShape, GeometryFactory, Pose, Velocity};
use crate::error::{DiceError, GeometryError, Result};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Receives the two lifecycle events (plus optional impact feedback)
pub trait RollObserver {
    /// A throw started; clear any displayed result
    fn on_roll_start(&mut self);
    /// The throw's result, exactly once per completed throw
    fn on_result(&mut self, number: u32);
    /// A collision during a throw, for haptics/sound only
    fn on_impact(&mut self, _strength: f32) {}
}

/// Recorded lifecycle event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollEvent {
    RollStart,
    Result(u32),
    Impact(f32),
}

impl RollObserver for Vec<RollEvent> {
    fn on_roll_start(&mut self) {
        self.push(RollEvent::RollStart);
    }

    fn on_result(&mut self, number: u32) {
        self.push(RollEvent::Result(number));
    }

    fn on_impact(&mut self, strength: f32) {
        self.push(RollEvent::Impact(strength));
    }
}

/// The die, its world and its throw lifecycle
pub struct DiceRoller<W: GeometryFactory, O: RollObserver> {
    world: W,
    observer: O,
    tuning: Tuning,
    variant: DieVariant,
    body: W::Handle,
    session: RollSession,
    monitor: MotionMonitor,
    rng: Pcg32,
    boundary: Option<Boundary>,
    recenter: TaskSlot<RecenterAnimator>,
    pulse: TaskSlot<ScalePulse>,
    auto_roll: TaskSlot<Delay>,
    display_scale: f32,
    reduced_motion: bool,
    /// A throw requested before the arena existed
    throw_deferred: bool,
    throws: u64,
}

impl<W: GeometryFactory, O: RollObserver> DiceRoller<W, O> {
    /// Build the die in `world`, staged kinematic until boundaries exist
    pub fn new(mut world: W, observer: O, face_count: u32, tuning: Tuning, seed: u64) -> Result<Self> {
        tuning.validate()?;
        let requested = DieVariant::for_face_count(face_count)?;
        let staging = Pose::new(
            Vec3::new(0.0, requested.rest_height + tuning.spawn_clearance, 0.0),
            glam::Quat::IDENTITY,
        );
        let (variant, body) = build_with_fallback(&mut world, requested, staging)?;
        world.set_body_mode(body, BodyMode::Kinematic);

        log::info!("Dice roller ready: d{} ({}), seed {}", variant.face_count, variant.shape.as_str(), seed);

        Ok(Self {
            monitor: MotionMonitor::new(variant.rest_height, tuning.motion.floor_band),
            world,
            observer,
            tuning,
            variant,
            body,
            session: RollSession::new(),
            rng: Pcg32::seed_from_u64(seed),
            boundary: None,
            recenter: TaskSlot::new(),
            pulse: TaskSlot::new(),
            auto_roll: TaskSlot::new(),
            display_scale: 1.0,
            reduced_motion: false,
            throw_deferred: false,
            throws: 0,
        })
    }

    /// Build from player settings
    pub fn from_settings(world: W, observer: O, settings: &Settings, tuning: Tuning) -> Result<Self> {
        let mut roller = Self::new(
            world,
            observer,
            settings.effective_face_count(),
            tuning,
            settings.effective_seed(),
        )?;
        roller.reduced_motion = settings.reduced_motion;
        Ok(roller)
    }

    // === Accessors ===

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn body(&self) -> W::Handle {
        self.body
    }

    pub fn variant(&self) -> &DieVariant {
        &self.variant
    }

    pub fn session(&self) -> &RollSession {
        &self.session
    }

    pub fn phase(&self) -> RollPhase {
        self.session.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    /// Presentation-only scale of the die (1.0 outside pulses)
    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced && self.pulse.cancel() {
            self.display_scale = 1.0;
        }
    }

    pub fn is_recentering(&self) -> bool {
        self.recenter.is_active()
    }

    pub fn auto_roll_pending(&self) -> bool {
        self.auto_roll.is_active()
    }

    /// Where a settled die is presented
    pub fn play_position(&self) -> Vec3 {
        Vec3::new(0.0, self.variant.rest_height, 0.0)
    }

    // === Triggers ===

    /// Throw the die. Safe in any phase: in-flight recentering is dropped
    /// without ever completing. Before the arena is installed the throw is
    /// held and happens on the first install.
    pub fn roll_dice(&mut self) {
        if self.boundary.is_none() {
            log::debug!("Throw deferred until the arena is installed");
            self.auto_roll.cancel();
            self.throw_deferred = true;
            return;
        }
        if self.recenter.cancel() {
            log::debug!("Roll interrupted recentering");
        }
        self.auto_roll.cancel();
        if self.pulse.cancel() {
            self.display_scale = 1.0;
        }

        self.session.begin_throw();
        self.monitor.reset();
        self.throws += 1;
        self.world.set_body_mode(self.body, BodyMode::Dynamic);

        self.observer.on_roll_start();

        let (linear, angular) = self.launch_impulses();
        self.world.apply_linear_impulse(self.body, linear);
        self.world.apply_angular_impulse(self.body, angular);
        log::info!("Throw #{} (d{}): impulse {:?}, spin {:?}", self.throws, self.variant.face_count, linear, angular);
    }

    /// Swap the die for another variant, then re-roll after a short delay.
    ///
    /// An unsupported count is refused before any geometry is built and the
    /// current die is kept.
    pub fn on_face_count_changed(&mut self, face_count: u32) -> Result<()> {
        if face_count == self.variant.face_count {
            return Ok(());
        }
        let requested = DieVariant::for_face_count(face_count)?;

        let mut pose = self.world.pose(self.body);
        pose.position.y = pose.position.y.max(requested.rest_height);
        // Build first so a total geometry failure leaves the old die in place
        let (variant, body) = build_with_fallback(&mut self.world, requested, pose)?;

        self.recenter.cancel();
        self.auto_roll.cancel();

        let old = std::mem::replace(&mut self.body, body);
        self.world.discard_die(old);

        log::info!("Die changed: d{} -> d{} ({})", self.variant.face_count, variant.face_count, variant.shape.as_str());
        self.monitor = MotionMonitor::new(variant.rest_height, self.tuning.motion.floor_band);
        self.variant = variant;
        self.session.reset();

        let mode = if self.boundary.is_some() {
            BodyMode::Dynamic
        } else {
            BodyMode::Kinematic
        };
        self.world.set_velocity(self.body, Velocity::ZERO);
        self.world.set_body_mode(self.body, mode);

        self.start_pulse();
        self.auto_roll.schedule(Delay::new(self.tuning.auto_roll_delay));
        Ok(())
    }

    /// Rebuild the arena for a viewport size. Returns false (and changes
    /// nothing) for a degenerate size.
    pub fn install_or_update_boundaries(&mut self, viewport_width: f32, viewport_height: f32) -> bool {
        let Some(boundary) = Boundary::from_viewport(viewport_width, viewport_height, &self.tuning) else {
            log::debug!("Ignoring degenerate viewport {}x{}", viewport_width, viewport_height);
            return false;
        };

        self.world.replace_boundaries(&boundary.volumes());
        let first_install = self.boundary.is_none();
        self.boundary = Some(boundary);

        let margin = self.variant.bounding_radius();
        let mut pose = self.world.pose(self.body);
        let mut position = boundary.clamp_inside(pose.position, margin);

        if first_install {
            position.y = position.y.max(self.variant.rest_height + self.tuning.spawn_clearance);
            pose.position = position;
            self.world.set_pose(self.body, pose);
            if !self.recenter.is_active() {
                self.world.set_body_mode(self.body, BodyMode::Dynamic);
            }
            log::info!("Arena installed: {:.2} x {:.2}", boundary.width, boundary.depth);
            if std::mem::take(&mut self.throw_deferred) {
                self.roll_dice();
            }
        } else {
            if position != pose.position {
                log::debug!("Die pulled inside resized arena: {:?} -> {:?}", pose.position, position);
                pose.position = position;
                self.world.set_pose(self.body, pose);
            }
            log::debug!("Arena resized: {:.2} x {:.2}", boundary.width, boundary.depth);
        }
        true
    }

    /// Collision feedback from the physics engine. Outcome logic ignores it.
    pub fn collision_began(&mut self, strength: f32) {
        if self.session.awaiting_result() && strength >= self.tuning.impact_min_strength {
            self.observer.on_impact(strength);
        }
    }

    // === Tick ===

    /// Per-tick callback, after the physics world advanced by `dt`
    pub fn update(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }

        self.session.tick_cooldown(dt);
        self.advance_pulse(dt);

        if let RollPhase::Announced { number } = self.session.phase {
            self.session.phase = RollPhase::Idle {
                last_result: Some(number),
            };
        }

        if let Some((token, delay)) = self.auto_roll.current_mut() {
            if delay.tick(dt) {
                self.auto_roll.complete(token);
                log::debug!("Automatic re-roll after die change");
                self.roll_dice();
            }
        }

        match self.session.phase {
            RollPhase::Idle { .. } | RollPhase::Announced { .. } => {}
            RollPhase::Rolling { .. } | RollPhase::WaitingToSettle { .. } => self.track_motion(dt),
            RollPhase::Recentering { number, token } => self.advance_recenter(number, token, dt),
        }
    }

    /// Classify this tick's motion, then transition
    fn track_motion(&mut self, dt: f32) {
        let pose = self.world.pose(self.body);
        let velocity = self.world.velocity(self.body);
        let sample = self.monitor.sample(pose, velocity, dt);
        let class = self.tuning.motion.classify(&sample);

        let next = match self.session.phase {
            RollPhase::Rolling { still } => {
                if class.is_moving() {
                    RollPhase::Rolling { still: 0.0 }
                } else if class.is_settled() && self.session.cooldown <= 0.0 {
                    log::debug!("Settle candidate at {:?}", pose.position);
                    RollPhase::WaitingToSettle {
                        settle: dt,
                        still: still + dt,
                    }
                } else {
                    RollPhase::Rolling { still: still + dt }
                }
            }
            RollPhase::WaitingToSettle { settle, still } => {
                if class.is_moving() {
                    log::debug!("Motion resumed after {:.2}s settled", settle);
                    RollPhase::Rolling { still: 0.0 }
                } else if class.is_settled() {
                    RollPhase::WaitingToSettle {
                        settle: settle + dt,
                        still: still + dt,
                    }
                } else {
                    RollPhase::WaitingToSettle {
                        settle,
                        still: still + dt,
                    }
                }
            }
            other => other,
        };
        self.session.phase = next;

        match next {
            RollPhase::WaitingToSettle { settle, .. } if settle >= self.tuning.settle_duration => {
                log::debug!("Settled for {:.2}s", settle);
                self.begin_recenter();
            }
            RollPhase::Rolling { still } | RollPhase::WaitingToSettle { still, .. }
                if still >= self.tuning.still_timeout =>
            {
                log::warn!(
                    "Die never classified settled ({:?}); forcing result after {:.2}s still",
                    sample,
                    still
                );
                self.begin_recenter();
            }
            _ => {}
        }
    }

    fn begin_recenter(&mut self) {
        let start = self.world.pose(self.body);
        let outcome = resolve_outcome(&self.variant, start.orientation, &mut self.rng);
        let target = Pose::new(self.play_position(), outcome.orientation);

        self.world.set_body_mode(self.body, BodyMode::Kinematic);
        self.world.set_velocity(self.body, Velocity::ZERO);

        let animator = RecenterAnimator::new(start, target, self.tuning.recenter_duration, self.tuning.recenter_step);
        let token = self.recenter.schedule(animator);
        self.session.phase = RollPhase::Recentering {
            number: outcome.number,
            token,
        };
        self.session.cooldown = self.tuning.cooldown;

        log::info!(
            "Throw #{} landed on {} ({})",
            self.throws,
            outcome.number,
            if outcome.deterministic { "read" } else { "drawn" }
        );
    }

    fn advance_recenter(&mut self, number: u32, token: TaskToken, dt: f32) {
        debug_assert!(
            self.recenter.is_current(token),
            "recentering phase without its animation task"
        );
        let Some(animator) = self.recenter.get_mut(token) else {
            log::error!("Recentering phase lost its animation task; abandoning the throw");
            self.session.phase = RollPhase::Idle { last_result: None };
            return;
        };
        if let Some(pose) = animator.advance(dt) {
            self.world.set_pose(self.body, pose);
        }
        if !animator.is_finished() {
            return;
        }
        if let Some(animator) = self.recenter.complete(token) {
            self.finish_recenter(&animator, number);
        }
    }

    fn finish_recenter(&mut self, animator: &RecenterAnimator, number: u32) {
        let mut pose = animator.pose_at(1.0);
        pose.orientation = animator.target().orientation;
        pose.position.y = self.variant.rest_height;

        self.world.set_pose(self.body, pose);
        self.world.set_velocity(self.body, Velocity::ZERO);
        self.world.set_body_mode(self.body, BodyMode::Dynamic);
        self.monitor.reset();

        self.start_pulse();
        self.announce(number);
    }

    fn announce(&mut self, number: u32) {
        if !self.session.awaiting_result() || self.session.has_announced() {
            return;
        }
        self.session.phase = RollPhase::Announced { number };
        log::info!("Result: {}", number);
        self.observer.on_result(number);
    }

    fn start_pulse(&mut self) {
        if self.reduced_motion {
            return;
        }
        self.pulse
            .schedule(ScalePulse::new(self.tuning.pulse_duration, self.tuning.pulse_scale));
    }

    fn advance_pulse(&mut self, dt: f32) {
        let Some((token, pulse)) = self.pulse.current_mut() else {
            return;
        };
        self.display_scale = pulse.advance(dt);
        if pulse.is_finished() {
            self.pulse.complete(token);
            self.display_scale = 1.0;
        }
    }

    fn launch_impulses(&mut self) -> (Vec3, Vec3) {
        let r = self.tuning.impulse;
        let h = r.linear_horizontal;
        let linear = Vec3::new(
            self.rng.random_range(-h..=h),
            self.rng.random_range(r.linear_vertical_min..=r.linear_vertical_max),
            self.rng.random_range(-h..=h),
        );
        let a = r.angular;
        let angular = Vec3::new(
            self.rng.random_range(-a..=a),
            self.rng.random_range(-a..=a),
            self.rng.random_range(-a..=a),
        );
        (linear, angular)
    }
}

/// Convex hull first, bounding box if the hull fails
fn build_variant<W: GeometryFactory>(
    world: &mut W,
    variant: &DieVariant,
    pose: Pose,
) -> std::result::Result<W::Handle, GeometryError> {
    match world.build_die(variant, CollisionShape::ConvexHull, pose) {
        Err(err @ GeometryError::ConvexHull { .. }) => {
            log::warn!("{err}; using bounding box collider");
            world.build_die(variant, CollisionShape::BoundingBox, pose)
        }
        other => other,
    }
}

/// Build `variant`, substituting the cube if its geometry cannot be made
fn build_with_fallback<W: GeometryFactory>(
    world: &mut W,
    variant: DieVariant,
    pose: Pose,
) -> Result<(DieVariant, W::Handle)> {
    match build_variant(world, &variant, pose) {
        Ok(body) => Ok((variant, body)),
        Err(err) if variant.shape != DieShape::Cube => {
            log::warn!("{err}; substituting the d6 cube");
            let cube = DieVariant::cube();
            let body = build_variant(world, &cube, pose).map_err(DiceError::Geometry)?;
            Ok((cube, body))
        }
        Err(err) => Err(DiceError::Geometry(err)),
    }
}
