//! Fixed-timestep driver: one die on the reference world
//!
//! Frames of any length are fed in; the world and the roller only ever see
//! `SIM_DT` ticks.

use super::box_world::BoxWorld;
use super::roller::{DiceRoller, RollObserver};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Longest frame accepted; anything longer is treated as a stall
const MAX_FRAME: f32 = 0.1;

pub struct DiceTable<O: RollObserver> {
    roller: DiceRoller<BoxWorld, O>,
    accumulator: f32,
    ticks: u64,
}

impl<O: RollObserver> DiceTable<O> {
    pub fn new(observer: O, settings: &Settings, tuning: Tuning) -> Result<Self> {
        Ok(Self::from_roller(DiceRoller::from_settings(
            BoxWorld::new(),
            observer,
            settings,
            tuning,
        )?))
    }

    pub fn from_roller(roller: DiceRoller<BoxWorld, O>) -> Self {
        Self {
            roller,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn roller(&self) -> &DiceRoller<BoxWorld, O> {
        &self.roller
    }

    pub fn roller_mut(&mut self) -> &mut DiceRoller<BoxWorld, O> {
        &mut self.roller
    }

    /// Fixed ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds of simulated time
    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * SIM_DT
    }

    /// Run one fixed tick: physics, impact feedback, lifecycle
    pub fn step(&mut self) {
        let impacts = self.roller.world_mut().step(SIM_DT);
        for impact in impacts {
            self.roller.collision_began(impact.strength);
        }
        self.roller.update(SIM_DT);
        self.ticks += 1;
    }

    /// Consume a frame's worth of time. Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        if dt.is_nan() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::roller::RollEvent;

    fn table() -> DiceTable<Vec<RollEvent>> {
        let settings = Settings {
            seed: Some(77),
            ..Settings::default()
        };
        let mut table = DiceTable::new(Vec::new(), &settings, Tuning::default()).unwrap();
        assert!(table.roller_mut().install_or_update_boundaries(1280.0, 720.0));
        table
    }

    #[test]
    fn test_frame_runs_whole_ticks() {
        let mut table = table();
        assert_eq!(table.frame(1.0 / 60.0 + 1e-4), 2);
        assert_eq!(table.frame(SIM_DT / 2.0), 0);
        assert_eq!(table.ticks(), 2);
    }

    #[test]
    fn test_frame_caps_substeps() {
        let mut table = table();
        assert_eq!(table.frame(5.0), MAX_SUBSTEPS);
        // Backlog was dropped rather than replayed
        assert!(table.frame(SIM_DT / 2.0) <= 1);
    }

    #[test]
    fn test_ignores_bad_frames() {
        let mut table = table();
        assert_eq!(table.frame(0.0), 0);
        assert_eq!(table.frame(-1.0), 0);
        assert_eq!(table.frame(f32::NAN), 0);
    }

    #[test]
    fn test_throw_through_frames() {
        let mut table = table();
        table.roller_mut().roll_dice();
        for _ in 0..(60 * 15) {
            table.frame(1.0 / 60.0);
        }
        let results: Vec<_> = table
            .roller()
            .observer()
            .iter()
            .filter(|e| matches!(e, RollEvent::Result(_)))
            .collect();
        assert_eq!(results.len(), 1);
        assert!(table.elapsed() > 14.0);
    }
}
