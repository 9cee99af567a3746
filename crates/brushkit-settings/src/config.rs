//! Configuration and settings management for brushkit
//!
//! A painter configuration has two parts:
//! - The global record: canvas geometry, brush, Z heights, replenishment
//!   behaviour, feeds and accelerations, plus pipeline tunables
//! - One record per layer (one paint color): station position, infill
//!   choice and optional overrides of global values
//!
//! Files are JSON or TOML, chosen by extension. Field aliases accept the key
//! names used by the browser front end (`brush_w`, `dip_x`, `min_dist`, ...).

use brushkit_core::{ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Stroke pattern used to cover a layer's ink region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InfillStrategy {
    /// Parallel raster lines at the layer's infill angle
    #[default]
    #[serde(alias = "parallel")]
    Lines,
    /// Concentric shells following the outline inward
    Concentric,
}

impl fmt::Display for InfillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines => write!(f, "lines"),
            Self::Concentric => write!(f, "concentric"),
        }
    }
}

impl FromStr for InfillStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" | "parallel" => Ok(Self::Lines),
            "concentric" => Ok(Self::Concentric),
            _ => Err(format!("Unknown infill strategy: {}", s)),
        }
    }
}

/// What happens to the machine state when a layer finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateHandoff {
    /// Each layer starts fresh at its own station
    #[default]
    Reset,
    /// The next layer inherits position and distance bookkeeping
    Carry,
}

fn default_threshold() -> u8 {
    140
}
fn default_working_scale() -> f64 {
    2.0
}
fn default_z_feed() -> f64 {
    3000.0
}
fn default_spiral_feed() -> f64 {
    2500.0
}
fn default_plunge_feed() -> f64 {
    2500.0
}
fn default_iteration_cap() -> usize {
    2000
}
fn default_fallback_threshold() -> usize {
    5000
}
fn default_band_width() -> f64 {
    20.0
}

/// Global painter settings
///
/// Machine-wide values. Layers may override the brush, overlap and infill
/// fields; everything else applies to every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Physical width of the painted artwork (mm)
    pub target_width: f64,
    /// Brush contact width (mm)
    #[serde(alias = "brush_w")]
    pub brush_width: f64,
    /// Fraction of the brush width shared by neighbouring strokes
    pub overlap: f64,
    /// Canvas origin X in machine space (mm)
    #[serde(alias = "x_off")]
    pub x_offset: f64,
    /// Canvas origin Y in machine space (mm)
    #[serde(alias = "y_off")]
    pub y_offset: f64,

    /// Brush on canvas
    pub z_paint: f64,
    /// Low clearance used between strokes
    pub z_low: f64,
    /// Safe travel height
    pub z_high: f64,
    /// Height for the wipe move after dipping
    pub z_wipe_exit: f64,
    /// Depth inside the paint well
    pub dip_z: f64,

    /// Lower bound of the paint distance between dips (mm)
    #[serde(alias = "min_dist")]
    pub min_distance: f64,
    /// Upper bound of the paint distance between dips (mm)
    #[serde(alias = "max_dist")]
    pub max_distance: f64,
    /// Random offset applied to the dip position on both axes (mm)
    #[serde(alias = "dip_jitter")]
    pub jitter_radius: f64,
    /// Number of full turns of the agitation spiral
    #[serde(alias = "dip_spiral_loops")]
    pub spiral_loops: f64,
    /// Final radius of the agitation spiral (mm)
    #[serde(alias = "dip_spiral_r")]
    pub spiral_radius: f64,
    /// Distance from the station to the wipe point (mm)
    #[serde(alias = "wipe_r")]
    pub wipe_radius: f64,

    /// Travel feed rate (mm/min)
    #[serde(alias = "feed")]
    pub feed_travel: f64,
    /// Painting feed rate (mm/min)
    pub feed_paint: f64,
    /// Travel acceleration (mm/s^2)
    pub accel_travel: f64,
    /// Painting acceleration (mm/s^2)
    pub accel_paint: f64,

    /// Luminance below which a pixel is ink
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Working pixels per millimeter
    #[serde(default = "default_working_scale")]
    pub working_scale: f64,
    /// Feed for pure Z moves (mm/min)
    #[serde(default = "default_z_feed")]
    pub z_feed: f64,
    /// Feed along the agitation spiral (mm/min)
    #[serde(default = "default_spiral_feed")]
    pub spiral_feed: f64,
    /// Feed when lowering onto the canvas (mm/min)
    #[serde(default = "default_plunge_feed")]
    pub plunge_feed: f64,
    /// Upper bound on erosion rounds for concentric infill
    #[serde(default = "default_iteration_cap")]
    pub concentric_iteration_cap: usize,
    /// Stroke count above which the serpentine ordering replaces nearest-neighbor
    #[serde(default = "default_fallback_threshold")]
    pub sequencer_fallback_threshold: usize,
    /// Band width of the serpentine ordering (mm)
    #[serde(default = "default_band_width")]
    pub serpentine_band_width: f64,
    /// Default infill for layers that do not choose one
    #[serde(default)]
    pub infill_strategy: InfillStrategy,
    /// Default infill angle in degrees
    #[serde(default)]
    pub infill_angle: f64,
    /// Seed for jitter and threshold draws; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Machine state handling between layers
    #[serde(default)]
    pub state_handoff: StateHandoff,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            target_width: 1070.0,
            brush_width: 1.6,
            overlap: 0.15,
            x_offset: 263.0,
            y_offset: 266.0,
            z_paint: 0.0,
            z_low: 4.6,
            z_high: 31.0,
            z_wipe_exit: 16.0,
            dip_z: 0.0,
            min_distance: 240.0,
            max_distance: 280.0,
            jitter_radius: 20.0,
            spiral_loops: 1.0,
            spiral_radius: 50.0,
            wipe_radius: 70.0,
            feed_travel: 12000.0,
            feed_paint: 400.0,
            accel_travel: 12000.0,
            accel_paint: 200.0,
            threshold: default_threshold(),
            working_scale: default_working_scale(),
            z_feed: default_z_feed(),
            spiral_feed: default_spiral_feed(),
            plunge_feed: default_plunge_feed(),
            concentric_iteration_cap: default_iteration_cap(),
            sequencer_fallback_threshold: default_fallback_threshold(),
            serpentine_band_width: default_band_width(),
            infill_strategy: InfillStrategy::default(),
            infill_angle: 0.0,
            seed: None,
            state_handoff: StateHandoff::default(),
        }
    }
}

impl GlobalSettings {
    /// Validate ranges and consistency of the global record
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        const SCOPE: &str = "global";

        let finite = [
            ("target_width", self.target_width),
            ("brush_width", self.brush_width),
            ("overlap", self.overlap),
            ("x_offset", self.x_offset),
            ("y_offset", self.y_offset),
            ("z_paint", self.z_paint),
            ("z_low", self.z_low),
            ("z_high", self.z_high),
            ("z_wipe_exit", self.z_wipe_exit),
            ("dip_z", self.dip_z),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("jitter_radius", self.jitter_radius),
            ("spiral_loops", self.spiral_loops),
            ("spiral_radius", self.spiral_radius),
            ("wipe_radius", self.wipe_radius),
            ("infill_angle", self.infill_angle),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(SCOPE, key, "must be a finite number"));
            }
        }

        let positive = [
            ("target_width", self.target_width),
            ("brush_width", self.brush_width),
            ("working_scale", self.working_scale),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("feed_travel", self.feed_travel),
            ("feed_paint", self.feed_paint),
            ("accel_travel", self.accel_travel),
            ("accel_paint", self.accel_paint),
            ("z_feed", self.z_feed),
            ("spiral_feed", self.spiral_feed),
            ("plunge_feed", self.plunge_feed),
            ("serpentine_band_width", self.serpentine_band_width),
        ];
        for (key, value) in positive {
            // NaN fails this comparison as well
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::invalid(SCOPE, key, "must be > 0"));
            }
        }

        let non_negative = [
            ("jitter_radius", self.jitter_radius),
            ("spiral_loops", self.spiral_loops),
            ("spiral_radius", self.spiral_radius),
            ("wipe_radius", self.wipe_radius),
        ];
        for (key, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::invalid(SCOPE, key, "must be >= 0"));
            }
        }

        validate_overlap(SCOPE, self.overlap)?;

        if self.min_distance > self.max_distance {
            return Err(ConfigError::invalid(
                SCOPE,
                "min_distance",
                format!(
                    "{} exceeds max_distance {}",
                    self.min_distance, self.max_distance
                ),
            ));
        }

        if self.concentric_iteration_cap == 0 {
            return Err(ConfigError::invalid(
                SCOPE,
                "concentric_iteration_cap",
                "must be > 0",
            ));
        }

        if self.sequencer_fallback_threshold == 0 {
            return Err(ConfigError::invalid(
                SCOPE,
                "sequencer_fallback_threshold",
                "must be > 0",
            ));
        }

        Ok(())
    }
}

pub(crate) fn validate_overlap(scope: &str, overlap: f64) -> std::result::Result<(), ConfigError> {
    if !(0.0..1.0).contains(&overlap) {
        return Err(ConfigError::invalid(
            scope,
            "overlap",
            format!("{} is outside [0, 1)", overlap),
        ));
    }
    Ok(())
}

fn default_enabled() -> bool {
    true
}

/// Per-layer settings
///
/// Every `Option` field falls back to the global value (or a fixed default)
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayerSettings {
    /// Display name, e.g. the paint color
    #[serde(default)]
    pub name: Option<String>,
    /// Disabled layers are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Source artwork; relative paths resolve against the config file
    #[serde(default, alias = "image_path")]
    pub image: Option<PathBuf>,
    /// Paint station X (mm)
    #[serde(default, alias = "dip_x")]
    pub station_x: Option<f64>,
    /// Paint station Y (mm)
    #[serde(default, alias = "dip_y")]
    pub station_y: Option<f64>,
    #[serde(default, alias = "infill_type")]
    pub infill_strategy: Option<InfillStrategy>,
    /// Infill angle in degrees
    #[serde(default)]
    pub infill_angle: Option<f64>,
    #[serde(default, alias = "brush_w")]
    pub brush_width: Option<f64>,
    #[serde(default)]
    pub overlap: Option<f64>,
}

impl LayerSettings {
    /// A named, enabled layer with a station and no overrides
    pub fn new(name: impl Into<String>, station_x: f64, station_y: f64) -> Self {
        Self {
            name: Some(name.into()),
            enabled: true,
            station_x: Some(station_x),
            station_y: Some(station_y),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Display name, falling back to `Color N`
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Color {}", index + 1))
    }

    /// Identifier used in error messages and logs
    pub fn label(&self, index: usize) -> String {
        format!("layer {} \"{}\"", index + 1, self.display_name(index))
    }
}

/// Complete painter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainterConfig {
    pub global: GlobalSettings,
    #[serde(default)]
    pub layers: Vec<LayerSettings>,
}

impl Default for PainterConfig {
    /// Four color layers with stations stacked along the left edge
    fn default() -> Self {
        const NAMES: [&str; 4] = [
            "Color 1 - Red",
            "Color 2 - Teal",
            "Color 3 - Yellow",
            "Color 4 - Purple",
        ];
        const STATIONS: [(f64, f64); 4] = [
            (66.0, 862.0),
            (66.0, 700.0),
            (66.0, 538.0),
            (66.0, 376.0),
        ];

        let layers = NAMES
            .iter()
            .zip(STATIONS)
            .enumerate()
            .map(|(i, (name, (x, y)))| LayerSettings {
                infill_strategy: Some(InfillStrategy::Lines),
                infill_angle: Some(i as f64 * 45.0),
                ..LayerSettings::new(*name, x, y)
            })
            .collect();

        Self {
            global: GlobalSettings::default(),
            layers,
        }
    }
}

impl PainterConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Invalid TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    ///
    /// Relative layer image paths are resolved against the file's directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut config = match extension(path).as_deref() {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        if let Some(base) = path.parent() {
            config.resolve_image_paths(base);
        }

        tracing::debug!(
            "Loaded painter config from {} with {} layers",
            path.display(),
            config.layers.len()
        );
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?,
            Some("toml") => self.to_toml_string()?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        std::fs::write(path, content).map_err(Error::from)
    }

    /// Render as a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)).into())
    }

    /// Validate the global record and every layer's overrides
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.global.validate()?;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.enabled {
                crate::layer::LayerConfigBuilder::new(&self.global)
                    .layer(index, layer)
                    .build()?;
            }
        }
        Ok(())
    }

    /// Enabled layers in configuration order
    pub fn enabled_layers(&self) -> impl Iterator<Item = (usize, &LayerSettings)> {
        self.layers.iter().enumerate().filter(|(_, l)| l.enabled)
    }

    fn resolve_image_paths(&mut self, base: &Path) {
        for layer in &mut self.layers {
            if let Some(image) = layer.image.as_mut() {
                if image.is_relative() {
                    *image = base.join(&*image);
                }
            }
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
