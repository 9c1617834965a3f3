//! Browser binding
//!
//! The page owns rendering and the animation frame loop; it hands frame
//! times to [`WebDice::frame`] and reads the die pose back out. Lifecycle
//! events reach JS through registered callbacks.

use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::{DiceTable, PhysicsWorld, RollObserver};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Tumble Dice starting...");
}

/// Forwards lifecycle events to JS functions
#[derive(Default)]
struct JsObserver {
    on_roll_start: Option<js_sys::Function>,
    on_result: Option<js_sys::Function>,
    on_impact: Option<js_sys::Function>,
}

fn call(callback: &Option<js_sys::Function>, arg: JsValue) {
    if let Some(f) = callback {
        if let Err(err) = f.call1(&JsValue::NULL, &arg) {
            log::warn!("Callback threw: {:?}", err);
        }
    }
}

impl RollObserver for JsObserver {
    fn on_roll_start(&mut self) {
        call(&self.on_roll_start, JsValue::UNDEFINED);
    }

    fn on_result(&mut self, number: u32) {
        call(&self.on_result, JsValue::from(number));
    }

    fn on_impact(&mut self, strength: f32) {
        call(&self.on_impact, JsValue::from(strength));
    }
}

#[wasm_bindgen]
pub struct WebDice {
    table: DiceTable<JsObserver>,
    settings: Settings,
}

#[wasm_bindgen]
impl WebDice {
    /// Build from stored settings; the seed comes from the clock unless one
    /// was saved
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebDice, JsError> {
        let mut settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let session = Settings {
            seed: Some(seed),
            ..settings.clone()
        };
        let table = DiceTable::new(JsObserver::default(), &session, Tuning::default())?;
        settings.face_count = table.roller().variant().face_count;
        log::info!("Dice initialized with seed: {}", seed);
        Ok(Self { table, settings })
    }

    pub fn set_on_roll_start(&mut self, f: js_sys::Function) {
        self.table.roller_mut().observer_mut().on_roll_start = Some(f);
    }

    pub fn set_on_result(&mut self, f: js_sys::Function) {
        self.table.roller_mut().observer_mut().on_result = Some(f);
    }

    pub fn set_on_impact(&mut self, f: js_sys::Function) {
        self.table.roller_mut().observer_mut().on_impact = Some(f);
    }

    pub fn roll(&mut self) {
        self.table.roller_mut().roll_dice();
    }

    /// Switch dice; persisted on success
    pub fn set_face_count(&mut self, face_count: u32) -> Result<(), JsError> {
        self.table.roller_mut().on_face_count_changed(face_count)?;
        self.settings.face_count = self.table.roller().variant().face_count;
        self.settings.save();
        Ok(())
    }

    pub fn face_count(&self) -> u32 {
        self.table.roller().variant().face_count
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.table.roller_mut().set_reduced_motion(reduced);
        self.settings.reduced_motion = reduced;
        self.settings.save();
    }

    /// Viewport size in CSS pixels. Returns false for a zero-sized viewport.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.table.roller_mut().install_or_update_boundaries(width, height)
    }

    /// Advance by a frame's elapsed seconds
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.table.frame(dt)
    }

    /// Die position as [x, y, z]
    pub fn position(&self) -> Vec<f32> {
        let roller = self.table.roller();
        roller.world().pose(roller.body()).position.to_array().to_vec()
    }

    /// Die orientation as [x, y, z, w]
    pub fn orientation(&self) -> Vec<f32> {
        let roller = self.table.roller();
        roller.world().pose(roller.body()).orientation.to_array().to_vec()
    }

    pub fn display_scale(&self) -> f32 {
        self.table.roller().display_scale()
    }

    /// Current phase name
    pub fn phase(&self) -> String {
        format!("{:?}", self.table.roller().phase().kind())
    }

    pub fn last_result(&self) -> Option<u32> {
        self.table.roller().session().last_result()
    }

    /// Die shape name for the renderer
    pub fn shape(&self) -> String {
        self.table.roller().variant().shape.as_str().to_string()
    }
}
