#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! Groups every tunable of the canvas into a single [`CanvasConfig`] that can
//! be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # cardspace.toml
//! [zoom]
//! min_scale = 0.25
//! max_scale = 2.5
//!
//! [view]
//! initial_pan_x = -1200.0
//! ```
//!
//! ```rust,ignore
//! let config = CanvasConfig::load_toml_file("cardspace.toml")?;
//! ```
//!
//! # Defaults
//!
//! `CanvasConfig::default()` reproduces the constants in
//! [`crate::geometry`], so an engine built without a config file behaves
//! exactly like one built with an empty file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{
    MAX_SCALE, MIN_CARD_HEIGHT, MIN_CARD_WIDTH, MIN_SCALE, MINIMAP_HEIGHT, MINIMAP_WIDTH, Point,
    ScaleBounds, Size, SizeFloor, VIEWPORT_CHROME_HEIGHT, WORLD_HEIGHT, WORLD_WIDTH,
    ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};

// ---------------------------------------------------------------------------
// Top-level CanvasConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for the canvas engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Logical world extent (minimap proportions).
    pub world: WorldConfig,
    /// Scale bounds and wheel step factors.
    pub zoom: ZoomConfig,
    /// Card size floor and z counters.
    pub cards: CardConfig,
    /// Initial view for a fresh layout.
    pub view: ViewConfig,
    /// Minimap geometry.
    pub minimap: MinimapConfig,
    /// Workspace label and count policy.
    pub workspaces: WorkspacePolicyConfig,
}

impl CanvasConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a TOML file and reject it if [`validate`](Self::validate) fails.
    pub fn load_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)?.validated()
    }

    /// Load a JSON file and reject it if [`validate`](Self::validate) fails.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_file(path)?.validated()
    }

    /// Consume the config, returning it only if it validates.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.world.width > 0.0 && self.world.width.is_finite()) {
            errors.push(format!("world.width must be > 0, got {}", self.world.width));
        }
        if !(self.world.height > 0.0 && self.world.height.is_finite()) {
            errors.push(format!(
                "world.height must be > 0, got {}",
                self.world.height
            ));
        }

        if !(self.zoom.min_scale > 0.0 && self.zoom.min_scale.is_finite()) {
            errors.push(format!(
                "zoom.min_scale must be > 0, got {}",
                self.zoom.min_scale
            ));
        }
        if !(self.zoom.max_scale >= self.zoom.min_scale && self.zoom.max_scale.is_finite()) {
            errors.push(format!(
                "zoom.max_scale ({}) must be >= zoom.min_scale ({})",
                self.zoom.max_scale, self.zoom.min_scale
            ));
        }
        if !(self.zoom.zoom_in_factor > 1.0 && self.zoom.zoom_in_factor.is_finite()) {
            errors.push(format!(
                "zoom.zoom_in_factor must be > 1, got {}",
                self.zoom.zoom_in_factor
            ));
        }
        if !(self.zoom.zoom_out_factor > 0.0 && self.zoom.zoom_out_factor < 1.0) {
            errors.push(format!(
                "zoom.zoom_out_factor must be in (0, 1), got {}",
                self.zoom.zoom_out_factor
            ));
        }

        if !(self.cards.min_width > 0.0 && self.cards.min_width.is_finite()) {
            errors.push(format!(
                "cards.min_width must be > 0, got {}",
                self.cards.min_width
            ));
        }
        if !(self.cards.min_height > 0.0 && self.cards.min_height.is_finite()) {
            errors.push(format!(
                "cards.min_height must be > 0, got {}",
                self.cards.min_height
            ));
        }
        let last_default_z = self
            .cards
            .default_z_base
            .checked_add(crate::card::CardId::COUNT as i64 - 1)
            .filter(|&z| z_in_range(z) && z_in_range(self.cards.default_z_base));
        match last_default_z {
            Some(last) if self.cards.initial_next_z <= last => errors.push(format!(
                "cards.initial_next_z ({}) must exceed the highest default z ({last})",
                self.cards.initial_next_z
            )),
            Some(_) => {}
            None => errors.push(format!(
                "cards.default_z_base ({}) too large, default z values must stay within +/-{MAX_Z}",
                self.cards.default_z_base
            )),
        }
        if !z_in_range(self.cards.initial_next_z) {
            errors.push(format!(
                "cards.initial_next_z ({}) must be within +/-{MAX_Z}",
                self.cards.initial_next_z
            ));
        }

        if !(self.view.initial_pan_x.is_finite() && self.view.initial_pan_y.is_finite()) {
            errors.push("view.initial_pan must be finite".to_string());
        }
        if !(self.view.initial_scale >= self.zoom.min_scale
            && self.view.initial_scale <= self.zoom.max_scale)
        {
            errors.push(format!(
                "view.initial_scale ({}) must be within [{}, {}]",
                self.view.initial_scale, self.zoom.min_scale, self.zoom.max_scale
            ));
        }

        if !(self.minimap.width > 0.0 && self.minimap.height > 0.0) {
            errors.push(format!(
                "minimap size must be > 0, got {}x{}",
                self.minimap.width, self.minimap.height
            ));
        }
        if !(self.minimap.chrome_height >= 0.0 && self.minimap.chrome_height.is_finite()) {
            errors.push(format!(
                "minimap.chrome_height must be >= 0, got {}",
                self.minimap.chrome_height
            ));
        }

        if self.workspaces.label_max_chars == 0 {
            errors.push("workspaces.label_max_chars must be > 0".to_string());
        }
        if self.workspaces.default_label.trim().is_empty() {
            errors.push("workspaces.default_label must not be blank".to_string());
        }
        if self.workspaces.max_saved == 0 {
            errors.push("workspaces.max_saved must be > 0".to_string());
        }

        errors
    }

    /// Scale bounds derived from [`ZoomConfig`].
    #[must_use]
    pub fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds::new(self.zoom.min_scale, self.zoom.max_scale)
    }

    /// Card size floor derived from [`CardConfig`].
    #[must_use]
    pub fn size_floor(&self) -> SizeFloor {
        SizeFloor::new(self.cards.min_width, self.cards.min_height)
    }

    /// Pan offset of a fresh layout.
    #[must_use]
    pub fn initial_pan(&self) -> Point {
        Point::new(self.view.initial_pan_x, self.view.initial_pan_y)
    }

    /// World extent.
    #[must_use]
    pub fn world_size(&self) -> Size {
        Size::new(self.world.width, self.world.height)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// World extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

/// Zoom behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Applied when the wheel delta is zero or negative.
    pub zoom_in_factor: f64,
    /// Applied when the wheel delta is positive.
    pub zoom_out_factor: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
        }
    }
}

/// Largest magnitude a stacking value may take.
///
/// Persisted z values beyond it are treated as malformed. The focus counter
/// renumbers every card once it reaches it.
pub const MAX_Z: i64 = 1 << 53;

/// Whether `z` is a usable stacking value.
#[must_use]
pub const fn z_in_range(z: i64) -> bool {
    z >= -MAX_Z && z <= MAX_Z
}

/// Card sizing and stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub min_width: f64,
    pub min_height: f64,
    /// z of the first catalog card in a fresh layout; later cards count up.
    pub default_z_base: i64,
    /// Focus counter of a fresh layout.
    pub initial_next_z: i64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_CARD_WIDTH,
            min_height: MIN_CARD_HEIGHT,
            default_z_base: 10,
            initial_next_z: 100,
        }
    }
}

/// Initial view of a fresh layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub initial_pan_x: f64,
    pub initial_pan_y: f64,
    pub initial_scale: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_pan_x: -1600.0,
            initial_pan_y: -600.0,
            initial_scale: 1.0,
        }
    }
}

/// Minimap geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub width: f64,
    pub height: f64,
    /// Vertical chrome excluded from the visible canvas height.
    pub chrome_height: f64,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: MINIMAP_WIDTH,
            height: MINIMAP_HEIGHT,
            chrome_height: VIEWPORT_CHROME_HEIGHT,
        }
    }
}

/// Workspace label and count policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspacePolicyConfig {
    /// Labels are truncated to this many characters after upper-casing.
    pub label_max_chars: usize,
    /// Substituted for a blank label.
    pub default_label: String,
    /// Advisory cap checked by `can_save_more`; the manager itself accepts any count.
    pub max_saved: usize,
}

impl Default for WorkspacePolicyConfig {
    fn default() -> Self {
        Self {
            label_max_chars: 6,
            default_label: "WS".to_string(),
            max_saved: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a canvas configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_matches_geometry_constants() {
        let config = CanvasConfig::default();
        assert_eq!(config.scale_bounds(), ScaleBounds::default());
        assert_eq!(config.size_floor(), SizeFloor::default());
        assert_eq!(config.world_size(), Size::new(WORLD_WIDTH, WORLD_HEIGHT));
        assert_eq!(config.initial_pan(), Point::new(-1600.0, -600.0));
        assert_eq!(config.minimap.chrome_height, 58.0);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = CanvasConfig::from_toml_str("").unwrap();
        assert_eq!(config, CanvasConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = CanvasConfig::from_toml_str(
            r#"
            [zoom]
            max_scale = 4.0

            [workspaces]
            default_label = "HOME"
            "#,
        )
        .unwrap();
        assert_eq!(config.zoom.max_scale, 4.0);
        assert_eq!(config.zoom.min_scale, MIN_SCALE);
        assert_eq!(config.workspaces.default_label, "HOME");
        assert_eq!(config.workspaces.label_max_chars, 6);
    }

    #[test]
    fn json_round_trip() {
        let mut config = CanvasConfig::default();
        config.view.initial_scale = 0.5;
        let json = serde_json::to_string(&config).unwrap();
        let back = CanvasConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn validate_reports_huge_z_base_instead_of_overflowing() {
        let config = CanvasConfig::from_toml_str("[cards]\ndefault_z_base = 9223372036854775807")
            .unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("default_z_base") && e.contains("too large")));

        let mut config = CanvasConfig::default();
        config.cards.initial_next_z = i64::MAX;
        assert!(config.validate().iter().any(|e| e.contains("initial_next_z")));
    }

    #[test]
    fn z_range_is_symmetric() {
        assert!(z_in_range(0));
        assert!(z_in_range(MAX_Z));
        assert!(z_in_range(-MAX_Z));
        assert!(!z_in_range(MAX_Z + 1));
        assert!(!z_in_range(i64::MIN));
    }

    #[test]
    fn validate_reports_each_violation() {
        let mut config = CanvasConfig::default();
        config.zoom.min_scale = 2.0;
        config.zoom.max_scale = 1.0;
        config.zoom.zoom_out_factor = 1.5;
        config.cards.initial_next_z = 5;
        config.workspaces.default_label = "   ".into();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("max_scale")));
        assert!(errors.iter().any(|e| e.contains("zoom_out_factor")));
        assert!(errors.iter().any(|e| e.contains("initial_next_z")));
        assert!(errors.iter().any(|e| e.contains("default_label")));
        assert!(errors.iter().any(|e| e.contains("initial_scale")));
    }

    #[test]
    fn load_toml_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cards]\nmin_width = -1.0").unwrap();
        match CanvasConfig::load_toml_file(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("cards.min_width"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn load_json_file_accepts_valid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"minimap": {{"width": 320.0}}}}"#).unwrap();
        let config = CanvasConfig::load_json_file(file.path()).unwrap();
        assert_eq!(config.minimap.width, 320.0);
        assert_eq!(config.minimap.height, MINIMAP_HEIGHT);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CanvasConfig::from_toml_file("/nonexistent/cardspace.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
