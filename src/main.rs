//! Tumble Dice entry point
//!
//! The web build is driven from JS through `platform::web`. Natively this
//! runs a headless table: `tumble-dice [face_count] [rolls] [seed]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use tumble_dice::sim::{DiceTable, RollEvent};
    use tumble_dice::{DiceError, Result, Settings, Tuning};

    /// Frame length fed to the table, as a 60 Hz display would
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a throw after this much simulated time
    const THROW_TIMEOUT: f32 = 30.0;
    /// Headless viewport
    const VIEWPORT: (f32, f32) = (1280.0, 720.0);

    fn arg<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> Result<Option<T>> {
        match args.get(index) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| DiceError::InvalidArgument(format!("{name}: {raw:?}"))),
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        log::info!("Tumble Dice (native) starting...");

        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut settings = Settings::load();
        if let Some(face_count) = arg(&args, 0, "face_count")? {
            settings.face_count = face_count;
        }
        let rolls: u32 = arg(&args, 1, "rolls")?.unwrap_or(3);
        if let Some(seed) = arg(&args, 2, "seed")? {
            settings.seed = Some(seed);
        }

        let mut table = DiceTable::new(Vec::<RollEvent>::new(), &settings, Tuning::default())?;
        table.roller_mut().install_or_update_boundaries(VIEWPORT.0, VIEWPORT.1);
        let variant = table.roller().variant().clone();
        println!("Rolling a d{} ({}) {} time(s)", variant.face_count, variant.shape.as_str(), rolls);

        for throw in 1..=rolls {
            table.roller_mut().roll_dice();
            let started = table.elapsed();
            let mut impacts = 0;

            let number = loop {
                table.frame(FRAME_DT);
                let events = std::mem::take(table.roller_mut().observer_mut());
                let mut result = None;
                for event in events {
                    match event {
                        RollEvent::Impact(_) => impacts += 1,
                        RollEvent::Result(n) => result = Some(n),
                        RollEvent::RollStart => {}
                    }
                }
                if let Some(n) = result {
                    break Some(n);
                }
                if table.elapsed() - started > THROW_TIMEOUT {
                    break None;
                }
            };

            match number {
                Some(n) => println!(
                    "#{throw}: {n}  ({:.2}s, {impacts} impacts)",
                    table.elapsed() - started
                ),
                None => println!("#{throw}: no result after {THROW_TIMEOUT}s"),
            }
        }
        Ok(())
    }
}
