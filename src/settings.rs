//! Game settings and preferences
//!
//! Persisted separately from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Number of background stars for this preset
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 80,
            QualityPreset::High => 200,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Render the background starfield
    pub starfield: bool,
    /// Reduced motion (stars hold still)
    pub reduced_motion: bool,
    /// Steering speed multiplier (0.25 - 2.0)
    pub sensitivity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            starfield: true,
            reduced_motion: false,
            sensitivity: 1.0,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    pub const MIN_SENSITIVITY: f32 = 0.25;
    pub const MAX_SENSITIVITY: f32 = 2.0;

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        // Low preset drops the starfield for performance
        if preset == QualityPreset::Low {
            self.starfield = false;
        }
    }

    /// Effective star count (0 when the starfield is off)
    pub fn star_count(&self) -> usize {
        if !self.starfield {
            0
        } else {
            self.quality.star_count()
        }
    }

    /// Effective star scrolling (respects reduced_motion)
    pub fn effective_parallax(&self) -> bool {
        self.starfield && !self.reduced_motion
    }

    /// Sensitivity clamped to its allowed range
    pub fn effective_sensitivity(&self) -> f32 {
        if self.sensitivity.is_nan() {
            return 1.0;
        }
        self.sensitivity
            .clamp(Self::MIN_SENSITIVITY, Self::MAX_SENSITIVITY)
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &Storage) -> Self {
        match storage.load::<Settings>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", storage.root().display());
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not load settings, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &Storage) -> persistence::Result<()> {
        storage.save(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
