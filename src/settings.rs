//! Game settings and preferences
//!
//! Persisted separately from the leaderboard as `settings`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::DEFAULT_NAME;
use crate::persistence::{self, PersistError, Store};
use crate::theme::Theme;

/// Rejected settings change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("theme {theme:?} unlocks at {required} points (best is {best})")]
    ThemeLocked { theme: Theme, required: u64, best: u64 },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected theme; sessions start from it
    pub theme: Theme,
    /// Name pre-filled in the high score prompt
    pub last_name: String,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no death flash, fewer particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            last_name: DEFAULT_NAME.to_string(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key of the settings document
    pub const STORAGE_KEY: &'static str = "settings";

    /// Select a theme if the best score has unlocked it
    pub fn select_theme(&mut self, theme: Theme, best_score: u64) -> Result<(), SettingsError> {
        if !theme.is_unlocked(best_score) {
            return Err(SettingsError::ThemeLocked {
                theme,
                required: theme.unlock_score(),
                best: best_score,
            });
        }
        self.theme = theme;
        log::info!("Theme set to {}", theme.as_str());
        Ok(())
    }

    /// Set the three volume sliders, each clamped to 0.0 - 1.0
    pub fn set_volumes(&mut self, master: f32, sfx: f32, music: f32) {
        let level = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        self.master_volume = level(master);
        self.sfx_volume = level(sfx);
        self.music_volume = level(music);
    }

    /// Effective volume for sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective volume for music
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Load settings; missing or malformed data gives the defaults
    pub fn load(store: &Store) -> Self {
        persistence::load_or_default(store, Self::STORAGE_KEY)
    }

    pub fn save(&self, store: &Store) -> Result<(), PersistError> {
        persistence::save(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_theme_rejected() {
        let mut settings = Settings::default();
        let err = settings.select_theme(Theme::Cyberpunk, 39).unwrap_err();
        assert_eq!(
            err,
            SettingsError::ThemeLocked {
                theme: Theme::Cyberpunk,
                required: 40,
                best: 39
            }
        );
        assert_eq!(settings.theme, Theme::DarkBlueGlow);

        settings.select_theme(Theme::Cyberpunk, 40).unwrap();
        assert_eq!(settings.theme, Theme::Cyberpunk);
    }

    #[test]
    fn test_effective_volume() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.25);
    }

    #[test]
    fn test_volumes_clamped() {
        let mut settings = Settings::default();
        settings.set_volumes(1.5, -0.2, f32::NAN);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.music_volume, 0.0);

        settings.set_volumes(0.5, 1.0, 0.4);
        assert_eq!(settings.effective_sfx_volume(), 0.5);
        assert_eq!(settings.effective_music_volume(), 0.2);
    }

    #[test]
    fn test_old_settings_file_fills_defaults() {
        // Older files only stored the theme
        let settings: Settings = serde_json::from_str(r#"{ "theme": "Retro" }"#).unwrap();
        assert_eq!(settings.theme, Theme::Retro);
        assert_eq!(settings.last_name, DEFAULT_NAME);
        assert_eq!(settings.music_volume, Settings::default().music_volume);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_save() {
        let store = Store::temp("settings");
        assert_eq!(Settings::load(&store), Settings::default());

        let mut settings = Settings::default();
        settings.select_theme(Theme::Minimal, 0).unwrap();
        settings.last_name = "Ada".into();
        settings.save(&store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }
}
