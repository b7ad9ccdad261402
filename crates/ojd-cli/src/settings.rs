//! Render settings file.
//!
//! ```toml
//! drive = 6.5
//! tone = 4.0
//! volume = 8.0
//! mode = "hp"
//! bypass = false
//! block_size = 512
//! bit_depth = 24
//! ```
//!
//! Every key is optional. Knob values use the pedal's 0 to 10 scale and are
//! clamped to it on load.

use std::path::{Path, PathBuf};

use ojd_pedal::params::switch_raw;
use ojd_pedal::{OjdParam, PedalParams, ToneMode};
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read a file
    #[error("failed to read settings '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse settings: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Tone stack mode as spelled in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// HP voicing.
    Hp,
    /// LP voicing.
    #[default]
    Lp,
}

impl From<ModeSetting> for ToneMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Hp => ToneMode::Hp,
            ModeSetting::Lp => ToneMode::Lp,
        }
    }
}

/// Knob and switch positions plus render options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Drive knob, 0..10.
    pub drive: f32,
    /// Tone knob, 0..10.
    pub tone: f32,
    /// Volume knob, 0..10.
    pub volume: f32,
    /// Tone stack mode.
    pub mode: ModeSetting,
    /// Pedal switched off.
    pub bypass: bool,
    /// Samples per processing block.
    pub block_size: usize,
    /// Output bit depth.
    pub bit_depth: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drive: OjdParam::Drive.descriptor().default,
            tone: OjdParam::Tone.descriptor().default,
            volume: OjdParam::Volume.descriptor().default,
            mode: ModeSetting::Lp,
            bypass: false,
            block_size: 512,
            bit_depth: 32,
        }
    }
}

impl Settings {
    /// Loads and clamps a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Parses and clamps settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(toml_str)?;
        Ok(settings.clamped())
    }

    /// Knob values clamped to their parameter ranges.
    pub fn clamped(mut self) -> Self {
        self.drive = OjdParam::Drive.descriptor().clamp(self.drive);
        self.tone = OjdParam::Tone.descriptor().clamp(self.tone);
        self.volume = OjdParam::Volume.descriptor().clamp(self.volume);
        self
    }

    /// Writes every value into `params`.
    pub fn apply(&self, params: &PedalParams) {
        params.set(OjdParam::Drive, self.drive);
        params.set(OjdParam::Tone, self.tone);
        params.set(OjdParam::Volume, self.volume);
        params.set(OjdParam::HpLp, switch_raw(self.mode == ModeSetting::Hp));
        params.set(OjdParam::Bypass, switch_raw(self.bypass));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn full_file() {
        let settings = Settings::from_toml(
            r#"
            drive = 6.5
            tone = 4.0
            volume = 8.0
            mode = "hp"
            bypass = true
            block_size = 128
            bit_depth = 24
            "#,
        )
        .unwrap();
        assert_eq!(settings.drive, 6.5);
        assert_eq!(settings.mode, ModeSetting::Hp);
        assert!(settings.bypass);
        assert_eq!(settings.block_size, 128);
        assert_eq!(settings.bit_depth, 24);
    }

    #[test]
    fn out_of_range_knobs_are_clamped() {
        let settings = Settings::from_toml("drive = 42.0\nvolume = -3.0").unwrap();
        assert_eq!(settings.drive, 10.0);
        assert_eq!(settings.volume, 0.0);
    }

    #[test]
    fn bad_mode_is_an_error() {
        assert!(matches!(
            Settings::from_toml("mode = \"mid\""),
            Err(SettingsError::TomlParse(_))
        ));
        assert!(Settings::from_toml("gain = 3.0").is_err());
    }

    #[test]
    fn apply_sets_params() {
        let params = PedalParams::new();
        let settings = Settings {
            mode: ModeSetting::Hp,
            bypass: true,
            drive: 2.0,
            ..Settings::default()
        };
        settings.apply(&params);
        assert_eq!(params.get(OjdParam::Drive), 2.0);
        assert_eq!(params.get(OjdParam::HpLp), 1.0);
        assert_eq!(params.get(OjdParam::Bypass), 1.0);
        assert_eq!(ToneMode::from(settings.mode), ToneMode::Hp);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load("/nonexistent/ojd.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ojd.toml"));
    }
}
