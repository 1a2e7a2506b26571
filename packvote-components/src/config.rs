//! Tunables for every widget, loadable from TOML.
//!
//! Every field has a default matching the stock stylesheet, so an empty file
//! (or no file at all) is a valid configuration.
//!
//! ```toml
//! [popover]
//! padding = 16
//! gap = 12
//!
//! [date_picker]
//! year_span = 20
//! placeholder = "Select date"
//!
//! [autocomplete]
//! debounce_ms = 300
//! ```

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use derive_builder::Builder;
use packvote_ui::{Px, PxSize};
use serde::Deserialize;
use tracing::debug;

/// Largest accepted [`DatePickerConfig::year_span`].
pub const MAX_YEAR_SPAN: i32 = 200;
/// Largest accepted [`AutocompleteConfig::debounce_ms`].
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has fields of the wrong type.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    /// The values parsed but make no sense together.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Placement tunables for floating surfaces anchored to a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(pattern = "owned")]
#[serde(default)]
pub struct PopoverConfig {
    /// Minimum distance kept between the popover and the viewport edges.
    #[builder(default = "16")]
    pub padding: i32,
    /// Vertical gap between the trigger and the popover.
    #[builder(default = "12")]
    pub gap: i32,
    /// Extra room required below the trigger before preferring "above".
    #[builder(default = "24")]
    pub safety_margin: i32,
    /// Width assumed when the popover has not been laid out yet.
    #[builder(default = "320")]
    pub fallback_width: i32,
    /// Height assumed when the popover has not been laid out yet.
    #[builder(default = "320")]
    pub fallback_height: i32,
    /// Stacking order while lifted into the overlay layer.
    #[builder(default = "2000")]
    pub z_index: i32,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            padding: 16,
            gap: 12,
            safety_margin: 24,
            fallback_width: 320,
            fallback_height: 320,
            z_index: 2000,
        }
    }
}

impl PopoverConfig {
    /// [`Self::padding`] as pixels.
    pub fn padding_px(&self) -> Px {
        Px(self.padding)
    }

    /// [`Self::gap`] as pixels.
    pub fn gap_px(&self) -> Px {
        Px(self.gap)
    }

    /// [`Self::safety_margin`] as pixels.
    pub fn safety_margin_px(&self) -> Px {
        Px(self.safety_margin)
    }

    /// The fallback size as pixels.
    pub fn fallback_size(&self) -> PxSize {
        PxSize::new(Px(self.fallback_width), Px(self.fallback_height))
    }
}

/// Date picker tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatePickerConfig {
    /// How many years past the current one the year selector offers.
    pub year_span: i32,
    /// Label shown while nothing is selected.
    pub placeholder: String,
    /// Whether Escape closes an open calendar.
    pub close_on_escape: bool,
}

impl Default for DatePickerConfig {
    fn default() -> Self {
        Self {
            year_span: 20,
            placeholder: "Select date".to_string(),
            close_on_escape: true,
        }
    }
}

/// Location autocomplete tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Queries shorter than this (in characters) are not looked up.
    pub min_query_len: usize,
    /// Quiet period after the last keystroke before a lookup runs.
    pub debounce_ms: u64,
}

impl AutocompleteConfig {
    /// [`Self::debounce_ms`] as a clock delta, saturating at
    /// [`TimeDelta::MAX`] for values chrono cannot represent.
    pub fn debounce(&self) -> TimeDelta {
        i64::try_from(self.debounce_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce_ms: 300,
        }
    }
}

/// Duration stepper tunables, used when the field has no `min`/`max`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    /// Lower bound.
    pub default_min: i64,
    /// Upper bound.
    pub default_max: i64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            default_min: 1,
            default_max: 60,
        }
    }
}

/// Project modal tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Trip length (days) pre-filled when the modal opens.
    pub default_duration: u32,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            default_duration: 3,
        }
    }
}

/// All widget tunables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Floating surface placement.
    pub popover: PopoverConfig,
    /// Date picker behaviour.
    pub date_picker: DatePickerConfig,
    /// Location autocomplete behaviour.
    pub autocomplete: AutocompleteConfig,
    /// Duration stepper bounds.
    pub stepper: StepperConfig,
    /// Project modal defaults.
    pub modal: ModalConfig,
}

impl ComponentsConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), "loaded components config");
        Ok(config)
    }

    /// Rejects values the widgets cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let popover = &self.popover;
        if popover.padding < 0 || popover.gap < 0 || popover.safety_margin < 0 {
            return Err(ConfigError::Invalid(
                "popover padding, gap and safety_margin must not be negative".to_string(),
            ));
        }
        if popover.fallback_width <= 0 || popover.fallback_height <= 0 {
            return Err(ConfigError::Invalid(
                "popover fallback size must be positive".to_string(),
            ));
        }
        if !(0..=MAX_YEAR_SPAN).contains(&self.date_picker.year_span) {
            return Err(ConfigError::Invalid(format!(
                "date_picker.year_span must be between 0 and {MAX_YEAR_SPAN}"
            )));
        }
        if self.autocomplete.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "autocomplete.debounce_ms must be at most {MAX_DEBOUNCE_MS}"
            )));
        }
        if self.stepper.default_min > self.stepper.default_max {
            return Err(ConfigError::Invalid(format!(
                "stepper.default_min ({}) exceeds stepper.default_max ({})",
                self.stepper.default_min, self.stepper.default_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ComponentsConfig::from_toml_str("").expect("parse");
        assert_eq!(config, ComponentsConfig::default());
        assert_eq!(config.popover.padding_px(), Px(16));
        assert_eq!(config.date_picker.placeholder, "Select date");
        assert_eq!(config.autocomplete.debounce_ms, 300);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ComponentsConfig::from_toml_str(
            r#"
            [popover]
            padding = 8

            [date_picker]
            year_span = 5
            "#,
        )
        .expect("parse");
        assert_eq!(config.popover.padding, 8);
        assert_eq!(config.popover.gap, 12);
        assert_eq!(config.date_picker.year_span, 5);
        assert!(config.date_picker.close_on_escape);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ComponentsConfig::from_toml_str("[stepper]\ndefault_min = 10\ndefault_max = 2")
            .expect_err("min above max");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ComponentsConfig::from_toml_str("[popover]\npadding = \"wide\"")
            .expect_err("wrong type");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        let source = "[autocomplete]\ndebounce_ms = 9223372036854775807";
        let err = ComponentsConfig::from_toml_str(source).expect_err("debounce too long");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ComponentsConfig::from_toml_str("[date_picker]\nyear_span = 2000000000")
            .expect_err("year span too long");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = ComponentsConfig::from_toml_str("[autocomplete]\ndebounce_ms = 60000")
            .expect("upper bound is inclusive");
        assert_eq!(config.autocomplete.debounce(), TimeDelta::seconds(60));
    }

    #[test]
    fn unrepresentable_debounce_saturates() {
        let config = AutocompleteConfig {
            debounce_ms: u64::MAX,
            ..AutocompleteConfig::default()
        };
        assert_eq!(config.debounce(), TimeDelta::MAX);
    }

    #[test]
    fn builder_defaults_match_default_impl() {
        let built = PopoverConfigBuilder::default()
            .gap(4)
            .build()
            .expect("builder construction failed");
        assert_eq!(
            built,
            PopoverConfig {
                gap: 4,
                ..PopoverConfig::default()
            }
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ComponentsConfig::load("/definitely/not/here.toml").expect_err("missing");
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("here.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
