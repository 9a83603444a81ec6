//! Cosmetic themes and their score unlocks

use serde::{Deserialize, Serialize};

/// RGB colour
pub type Rgb = [u8; 3];

/// Colours a theme hands to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bg_top: Rgb,
    pub bg_bottom: Rgb,
    pub accent: Rgb,
    pub accent2: Rgb,
    pub ui_panel: Rgb,
    pub player: Rgb,
}

/// Visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    DarkBlueGlow,
    Neon,
    Cyberpunk,
    Minimal,
    Retro,
}

impl Theme {
    /// Menu order
    pub const ALL: [Theme; 5] = [
        Theme::DarkBlueGlow,
        Theme::Neon,
        Theme::Cyberpunk,
        Theme::Minimal,
        Theme::Retro,
    ];

    /// Themes a session upgrades through as its score climbs, lowest first
    pub const LADDER: [Theme; 3] = [Theme::Neon, Theme::Retro, Theme::Cyberpunk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::DarkBlueGlow => "DarkBlueGlow",
            Theme::Neon => "Neon",
            Theme::Cyberpunk => "Cyberpunk",
            Theme::Minimal => "Minimal",
            Theme::Retro => "Retro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Score needed to unlock this theme
    pub fn unlock_score(&self) -> u64 {
        match self {
            Theme::DarkBlueGlow | Theme::Minimal => 0,
            Theme::Neon => 15,
            Theme::Retro => 25,
            Theme::Cyberpunk => 40,
        }
    }

    pub fn is_unlocked(&self, best_score: u64) -> bool {
        best_score >= self.unlock_score()
    }

    /// Themes selectable with the given best score, in menu order
    pub fn unlocked_for(best_score: u64) -> Vec<Theme> {
        Self::ALL
            .into_iter()
            .filter(|t| t.is_unlocked(best_score))
            .collect()
    }

    /// The theme a session at `score` should show, starting from `current`.
    /// Only moves up the unlock ladder.
    pub fn upgrade_for_score(current: Theme, score: u64) -> Theme {
        Self::LADDER
            .into_iter()
            .filter(|t| t.unlock_score() > current.unlock_score() && t.is_unlocked(score))
            .last()
            .unwrap_or(current)
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::DarkBlueGlow => Palette {
                bg_top: [18, 24, 37],
                bg_bottom: [15, 35, 60],
                accent: [94, 230, 182],
                accent2: [118, 199, 255],
                ui_panel: [22, 30, 45],
                player: [94, 230, 182],
            },
            Theme::Neon => Palette {
                bg_top: [10, 10, 20],
                bg_bottom: [5, 2, 20],
                accent: [255, 85, 255],
                accent2: [0, 255, 170],
                ui_panel: [18, 16, 30],
                player: [255, 85, 255],
            },
            Theme::Cyberpunk => Palette {
                bg_top: [12, 6, 20],
                bg_bottom: [28, 6, 40],
                accent: [255, 120, 60],
                accent2: [200, 40, 200],
                ui_panel: [30, 16, 36],
                player: [255, 120, 60],
            },
            Theme::Minimal => Palette {
                bg_top: [245, 245, 245],
                bg_bottom: [230, 230, 230],
                accent: [40, 40, 40],
                accent2: [80, 80, 80],
                ui_panel: [250, 250, 250],
                player: [40, 40, 40],
            },
            Theme::Retro => Palette {
                bg_top: [6, 10, 24],
                bg_bottom: [2, 6, 20],
                accent: [120, 200, 100],
                accent2: [180, 140, 80],
                ui_panel: [14, 18, 28],
                player: [120, 200, 100],
            },
        }
    }
}
