//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web build.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FACE_COUNT;
use crate::sim::DieVariant;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected die (number of faces)
    pub face_count: u32,

    // === Accessibility ===
    /// Reduced motion (skips the scale pulse cues)
    pub reduced_motion: bool,

    /// Fixed RNG seed for reproducible rolls (None = fresh entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            face_count: DEFAULT_FACE_COUNT,
            reduced_motion: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Face count to build, falling back to the default for stale values
    pub fn effective_face_count(&self) -> u32 {
        if DieVariant::is_supported(self.face_count) {
            self.face_count
        } else {
            log::warn!(
                "Stored face count {} is unsupported, using d{}",
                self.face_count,
                DEFAULT_FACE_COUNT
            );
            DEFAULT_FACE_COUNT
        }
    }

    /// Seed for this session's RNG
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tumble_dice_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_face_count_falls_back() {
        let settings = Settings {
            face_count: 40,
            ..Default::default()
        };
        assert_eq!(settings.effective_face_count(), DEFAULT_FACE_COUNT);

        let settings = Settings {
            face_count: 12,
            ..Default::default()
        };
        assert_eq!(settings.effective_face_count(), 12);
    }

    #[test]
    fn test_fixed_seed_is_used() {
        let settings = Settings {
            seed: Some(42),
            ..Default::default()
        };
        assert_eq!(settings.effective_seed(), 42);
    }

    #[test]
    fn test_missing_seed_field_deserializes() {
        let settings: Settings =
            serde_json::from_str(r#"{"face_count":4,"reduced_motion":true}"#).unwrap();
        assert_eq!(settings.face_count, 4);
        assert!(settings.reduced_motion);
        assert_eq!(settings.seed, None);
    }
}
