use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::analysis::BinSpec;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Dashboard settings. Every field has a default, so a settings file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Catalog to open when none is given on the command line.
    pub data_path: Option<PathBuf>,
    /// Lower and upper end of the minimum-magnitude slider.
    pub magnitude_bounds: [f64; 2],
    pub default_min_magnitude: f64,
    /// Lower edge of the first magnitude-frequency bin.
    pub bin_origin: f64,
    pub bin_width: f64,
    /// Magnitude at or above which an event counts as strong in the KPIs.
    pub strong_threshold: f64,
    /// Rows in the strongest-events table.
    pub strongest_events: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: None,
            magnitude_bounds: [4.0, 7.0],
            default_min_magnitude: 4.0,
            bin_origin: 4.0,
            bin_width: 0.5,
            strong_threshold: 6.0,
            strongest_events: 10,
        }
    }
}

impl Settings {
    /// Read a JSON settings file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let [lo, hi] = self.magnitude_bounds;
        ensure!(
            lo.is_finite() && hi.is_finite() && lo < hi,
            "magnitude_bounds must be finite and increasing, got [{lo}, {hi}]"
        );
        ensure!(
            (lo..=hi).contains(&self.default_min_magnitude),
            "default_min_magnitude {} is outside magnitude_bounds [{lo}, {hi}]",
            self.default_min_magnitude
        );
        ensure!(
            self.bin_origin.is_finite(),
            "bin_origin must be finite, got {}",
            self.bin_origin
        );
        ensure!(
            self.bin_width.is_finite() && self.bin_width > 0.0,
            "bin_width must be positive, got {}",
            self.bin_width
        );
        Ok(())
    }

    pub fn bin_spec(&self) -> BinSpec {
        BinSpec {
            origin: self.bin_origin,
            width: self.bin_width,
        }
    }

    /// Clamp a requested threshold into the slider range.
    pub fn clamp_magnitude(&self, value: f64) -> f64 {
        let [lo, hi] = self.magnitude_bounds;
        value.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_match_the_dashboard_controls() {
        let s = Settings::default();
        assert_eq!(s.magnitude_bounds, [4.0, 7.0]);
        assert_eq!(s.default_min_magnitude, 4.0);
        assert_eq!(s.bin_spec(), BinSpec::default());
        assert_eq!(s.strong_threshold, 6.0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = settings_file(r#"{ "data_path": "data/quakes.csv", "strongest_events": 5 }"#);
        let s = Settings::from_file(file.path()).unwrap();
        assert_eq!(s.data_path, Some(PathBuf::from("data/quakes.csv")));
        assert_eq!(s.strongest_events, 5);
        assert_eq!(s.bin_width, 0.5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = settings_file(r#"{ "bin_widht": 0.25 }"#);
        assert!(Settings::from_file(file.path()).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = settings_file(r#"{ "bin_width": 0 }"#);
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("bin_width must be positive"));

        let s = Settings {
            default_min_magnitude: 8.0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            magnitude_bounds: [7.0, 4.0],
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn clamp_to_slider_range() {
        let s = Settings::default();
        assert_eq!(s.clamp_magnitude(3.0), 4.0);
        assert_eq!(s.clamp_magnitude(5.5), 5.5);
        assert_eq!(s.clamp_magnitude(9.0), 7.0);
    }
}
