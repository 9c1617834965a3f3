//! Scripted motion: cancellable task slots, the recenter animation, the
//! presentation scale pulse and simple delays
//!
//! Everything here is advanced by the controller's tick with the `dt` it is
//! handed. Nothing owns a wall clock.

use super::world::Pose;
use crate::smoothstep;

/// Identifies one scheduling of a [`TaskSlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

/// Holds at most one scheduled task of a kind.
///
/// Scheduling replaces (and thereby invalidates) whatever was there; a token
/// from an earlier scheduling never matches again.
#[derive(Debug)]
pub struct TaskSlot<T> {
    generation: u64,
    task: Option<(TaskToken, T)>,
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            task: None,
        }
    }
}

impl<T> TaskSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: T) -> TaskToken {
        self.generation += 1;
        let token = TaskToken(self.generation);
        self.task = Some((token, task));
        token
    }

    /// Drop the pending task, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.task.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_current(&self, token: TaskToken) -> bool {
        matches!(&self.task, Some((t, _)) if *t == token)
    }

    /// Task for `token`, or `None` if it was cancelled or superseded
    pub fn get_mut(&mut self, token: TaskToken) -> Option<&mut T> {
        match &mut self.task {
            Some((t, task)) if *t == token => Some(task),
            _ => None,
        }
    }

    pub fn current_mut(&mut self) -> Option<(TaskToken, &mut T)> {
        self.task.as_mut().map(|(t, task)| (*t, task))
    }

    /// Remove and return the task if `token` is still current
    pub fn complete(&mut self, token: TaskToken) -> Option<T> {
        if self.is_current(token) {
            self.task.take().map(|(_, task)| task)
        } else {
            None
        }
    }
}

/// Fixed-duration, fixed-step interpolation from a captured pose to a target
#[derive(Debug, Clone)]
pub struct RecenterAnimator {
    start: Pose,
    target: Pose,
    step: f32,
    total_steps: u32,
    steps_taken: u32,
    accumulator: f32,
}

impl RecenterAnimator {
    pub fn new(start: Pose, target: Pose, duration: f32, step: f32) -> Self {
        let total_steps = ((duration / step) - 1e-3).ceil().max(1.0) as u32;
        Self {
            start,
            target,
            step,
            total_steps,
            steps_taken: 0,
            accumulator: 0.0,
        }
    }

    pub fn target(&self) -> Pose {
        self.target
    }

    /// Interpolation parameter in [0, 1]
    pub fn progress(&self) -> f32 {
        self.steps_taken as f32 / self.total_steps as f32
    }

    pub fn is_finished(&self) -> bool {
        self.steps_taken >= self.total_steps
    }

    /// Eased pose at parameter `t`; exactly the target at `t >= 1`
    pub fn pose_at(&self, t: f32) -> Pose {
        if t >= 1.0 {
            return self.target;
        }
        let p = smoothstep(t);
        Pose {
            position: self.start.position.lerp(self.target.position, p),
            orientation: self.start.orientation.slerp(self.target.orientation, p),
        }
    }

    /// Advance by `dt`, consuming whole fixed steps. Returns the new pose if
    /// at least one step was taken.
    pub fn advance(&mut self, dt: f32) -> Option<Pose> {
        if self.is_finished() {
            return None;
        }
        self.accumulator += dt.max(0.0);
        let mut stepped = false;
        while self.accumulator >= self.step && !self.is_finished() {
            self.accumulator -= self.step;
            self.steps_taken += 1;
            stepped = true;
        }
        stepped.then(|| self.pose_at(self.progress()))
    }
}

/// Two-phase grow-then-shrink scale cue; no physical effect
#[derive(Debug, Clone, Copy)]
pub struct ScalePulse {
    duration: f32,
    peak: f32,
    elapsed: f32,
}

impl ScalePulse {
    pub fn new(duration: f32, peak: f32) -> Self {
        Self {
            duration: duration.max(f32::EPSILON),
            peak,
            elapsed: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn scale(&self) -> f32 {
        if self.is_finished() {
            return 1.0;
        }
        let half = self.duration / 2.0;
        let amplitude = self.peak - 1.0;
        if self.elapsed < half {
            1.0 + amplitude * smoothstep(self.elapsed / half)
        } else {
            self.peak - amplitude * smoothstep((self.elapsed - half) / half)
        }
    }

    /// Advance and return the current scale
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.scale()
    }
}

/// One-shot countdown
#[derive(Debug, Clone, Copy)]
pub struct Delay {
    remaining: f32,
}

impl Delay {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Returns true on the tick the delay elapses
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
