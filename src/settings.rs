//! Grid presets and editor preferences
//!
//! Persisted separately from saved levels in LocalStorage.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PusherBrush;

/// Grid size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridPreset {
    ExtraSmall,
    Small,
    #[default]
    Medium,
}

impl GridPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridPreset::ExtraSmall => "extraSmall",
            GridPreset::Small => "small",
            GridPreset::Medium => "medium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extrasmall" | "xs" => Some(GridPreset::ExtraSmall),
            "small" | "s" => Some(GridPreset::Small),
            "medium" | "med" | "m" => Some(GridPreset::Medium),
            _ => None,
        }
    }

    /// Side length of one cell in pixels
    pub fn cell_size(&self) -> f64 {
        match self {
            GridPreset::ExtraSmall => 20.0,
            GridPreset::Small => 16.0,
            GridPreset::Medium => 14.0,
        }
    }

    /// Nominal grid dimensions in cells (columns, rows); sets the aspect ratio
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            GridPreset::ExtraSmall => (9, 16),
            GridPreset::Small => (18, 32),
            GridPreset::Medium => (27, 48),
        }
    }

    /// Largest canvas with this preset's aspect ratio that fits the container,
    /// rounded down to whole cells
    pub fn fit_canvas(&self, container: DVec2) -> DVec2 {
        let (cols, rows) = self.dimensions();
        let aspect = cols as f64 / rows as f64;

        let (width, height) = if container.y > 0.0 && container.x / container.y > aspect {
            (container.y * aspect, container.y)
        } else {
            (container.x, container.x / aspect)
        };

        let cell = self.cell_size();
        DVec2::new((width / cell).floor() * cell, (height / cell).floor() * cell)
    }
}

/// Editor preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Grid preset used for new levels
    pub grid: GridPreset,
    /// Number of player slots (1-6)
    pub player_count: usize,
    /// Template for newly placed pushers
    pub brush: PusherBrush,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridPreset::Medium,
            player_count: 1,
            brush: PusherBrush::default(),
        }
    }
}

impl Settings {
    /// Clamp loaded values into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.player_count = self.player_count.clamp(1, MAX_PLAYERS);
        self.brush.length = self.brush.length.clamp(MIN_PUSHER_LENGTH, MAX_PUSHER_LENGTH);
        if !self.brush.speed.is_finite() || self.brush.speed < 0.0 {
            self.brush.speed = DEFAULT_PUSHER_SPEED;
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "blocks_sandbox_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
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
    fn test_fit_canvas_tall_container() {
        // Wide container: height limits, width follows the 18:32 aspect
        let canvas = GridPreset::Small.fit_canvas(DVec2::new(1920.0, 1080.0));
        assert_eq!(canvas, DVec2::new(592.0, 1072.0));
    }

    #[test]
    fn test_fit_canvas_narrow_container() {
        let canvas = GridPreset::ExtraSmall.fit_canvas(DVec2::new(180.0, 1000.0));
        assert_eq!(canvas, DVec2::new(180.0, 320.0));
    }

    #[test]
    fn test_fit_canvas_is_whole_cells() {
        for preset in [GridPreset::ExtraSmall, GridPreset::Small, GridPreset::Medium] {
            let canvas = preset.fit_canvas(DVec2::new(777.0, 555.0));
            let cell = preset.cell_size();
            assert_eq!(canvas.x % cell, 0.0);
            assert_eq!(canvas.y % cell, 0.0);
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in [GridPreset::ExtraSmall, GridPreset::Small, GridPreset::Medium] {
            assert_eq!(GridPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(GridPreset::from_str("huge"), None);
    }

    #[test]
    fn test_sanitized_clamps_values() {
        let mut settings = Settings::default();
        settings.player_count = 40;
        settings.brush.length = 0;
        settings.brush.speed = f64::NAN;
        let settings = settings.sanitized();
        assert_eq!(settings.player_count, MAX_PLAYERS);
        assert_eq!(settings.brush.length, MIN_PUSHER_LENGTH);
        assert_eq!(settings.brush.speed, DEFAULT_PUSHER_SPEED);
    }
}
