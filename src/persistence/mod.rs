//! Level save/load
//!
//! Levels are stored as a single JSON blob under [`LEVEL_STORAGE_KEY`] in the
//! browser's LocalStorage. Native builds have no storage; saving is a no-op
//! and loading always reports that nothing was saved.

pub mod level;

use std::fmt;

pub use level::{LevelData, PlayerData, PusherData, TileData};

/// LocalStorage key for the saved level
pub const LEVEL_STORAGE_KEY: &str = "savedLevel";

/// Why a level could not be saved or loaded
#[derive(Debug)]
pub enum LevelError {
    /// Nothing has been saved yet
    NotFound,
    /// The saved blob is not a level
    Malformed(serde_json::Error),
    /// LocalStorage is unavailable or refused the write
    Storage,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NotFound => write!(f, "no saved level"),
            LevelError::Malformed(err) => write!(f, "saved level is malformed: {}", err),
            LevelError::Storage => write!(f, "local storage is unavailable"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Malformed(err) => Some(err),
            LevelError::NotFound | LevelError::Storage => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Malformed(err)
    }
}

impl LevelData {
    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), LevelError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(LevelError::Storage)?;

        let json = self.to_json()?;
        storage
            .set_item(LEVEL_STORAGE_KEY, &json)
            .map_err(|_| LevelError::Storage)?;
        log::info!("Level saved ({} bytes)", json.len());
        Ok(())
    }

    /// Load from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self, LevelError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(LevelError::Storage)?;

        match storage.get_item(LEVEL_STORAGE_KEY) {
            Ok(Some(json)) => Self::from_json(&json),
            Ok(None) => Err(LevelError::NotFound),
            Err(_) => Err(LevelError::Storage),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), LevelError> {
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, LevelError> {
        Err(LevelError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_blob() {
        let err = LevelData::from_json("{\"walls\": 3}").unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("saved level is malformed"));
    }

    #[test]
    fn test_json_round_trip() {
        let level = LevelData {
            walls: vec![TileData {
                x: 16.0,
                y: 32.0,
                color: Some("gray".into()),
            }],
            player_positions: Some(vec![None]),
            ..Default::default()
        };
        let json = level.to_json().unwrap();
        assert_eq!(LevelData::from_json(&json).unwrap(), level);
    }

    #[test]
    fn test_native_storage_is_empty() {
        assert!(LevelData::default().save().is_ok());
        assert!(matches!(LevelData::load(), Err(LevelError::NotFound)));
    }
}
