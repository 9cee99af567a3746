//! Resolved per-layer configuration
//!
//! [`LayerConfigBuilder`] merges the global record with one layer's
//! overrides. The overridable fields are listed explicitly; for each of them
//! the layer value wins when present and the global value is used otherwise.

use crate::config::{validate_overlap, GlobalSettings, InfillStrategy, LayerSettings, StateHandoff};
use brushkit_core::{ConfigError, Point};

/// Z heights used by the painter (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZHeights {
    pub paint: f64,
    pub low: f64,
    pub high: f64,
    pub wipe_exit: f64,
    pub dip: f64,
}

/// Feed rates (mm/min)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feeds {
    pub travel: f64,
    pub paint: f64,
    pub z: f64,
    pub spiral: f64,
    pub plunge: f64,
}

/// Accelerations (mm/s^2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accelerations {
    pub travel: f64,
    pub paint: f64,
}

/// Replenishment cycle parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipSettings {
    pub min_distance: f64,
    pub max_distance: f64,
    pub jitter_radius: f64,
    pub spiral_loops: f64,
    pub spiral_radius: f64,
    pub wipe_radius: f64,
}

/// Fully resolved configuration for one layer
///
/// Immutable for the duration of the layer's synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    /// Zero-based position in the configured layer list
    pub index: usize,
    pub name: String,
    pub station: Point,
    pub infill_strategy: InfillStrategy,
    pub infill_angle: f64,
    pub brush_width: f64,
    pub overlap: f64,
    pub target_width: f64,
    pub working_scale: f64,
    pub threshold: u8,
    /// Canvas origin in machine space
    pub offset: Point,
    pub z: ZHeights,
    pub feeds: Feeds,
    pub accelerations: Accelerations,
    pub dip: DipSettings,
    pub concentric_iteration_cap: usize,
    pub sequencer_fallback_threshold: usize,
    pub serpentine_band_width: f64,
    pub state_handoff: StateHandoff,
}

impl LayerConfig {
    /// Identifier used in logs and error messages
    pub fn label(&self) -> String {
        format!("layer {} \"{}\"", self.index + 1, self.name)
    }

    /// Scan line / erosion spacing in working pixels, never below one
    pub fn stroke_spacing_px(&self) -> usize {
        let spacing = (self.brush_width * (1.0 - self.overlap) * self.working_scale).floor();
        (spacing as usize).max(1)
    }
}

/// Builds a [`LayerConfig`] from global defaults and layer overrides
#[derive(Debug, Clone)]
pub struct LayerConfigBuilder<'a> {
    global: &'a GlobalSettings,
    index: usize,
    layer: Option<&'a LayerSettings>,
}

impl<'a> LayerConfigBuilder<'a> {
    pub fn new(global: &'a GlobalSettings) -> Self {
        Self {
            global,
            index: 0,
            layer: None,
        }
    }

    /// Select the layer whose overrides apply
    pub fn layer(mut self, index: usize, layer: &'a LayerSettings) -> Self {
        self.index = index;
        self.layer = Some(layer);
        self
    }

    pub fn build(self) -> Result<LayerConfig, ConfigError> {
        let g = self.global;
        let default_layer = LayerSettings::default();
        let layer = self.layer.unwrap_or(&default_layer);
        let scope = layer.label(self.index);

        let station_x = layer.station_x.ok_or_else(|| ConfigError::MissingField {
            scope: scope.clone(),
            field: "station_x".to_string(),
        })?;
        let station_y = layer.station_y.ok_or_else(|| ConfigError::MissingField {
            scope: scope.clone(),
            field: "station_y".to_string(),
        })?;
        if !station_x.is_finite() || !station_y.is_finite() {
            return Err(ConfigError::invalid(&scope, "station", "must be finite"));
        }

        let brush_width = layer.brush_width.unwrap_or(g.brush_width);
        if !(brush_width > 0.0 && brush_width.is_finite()) {
            return Err(ConfigError::invalid(&scope, "brush_width", "must be > 0"));
        }

        let overlap = layer.overlap.unwrap_or(g.overlap);
        validate_overlap(&scope, overlap)?;

        let infill_angle = layer.infill_angle.unwrap_or(g.infill_angle);
        if !infill_angle.is_finite() {
            return Err(ConfigError::invalid(&scope, "infill_angle", "must be finite"));
        }

        Ok(LayerConfig {
            index: self.index,
            name: layer.display_name(self.index),
            station: Point::new(station_x, station_y),
            infill_strategy: layer.infill_strategy.unwrap_or(g.infill_strategy),
            infill_angle,
            brush_width,
            overlap,
            target_width: g.target_width,
            working_scale: g.working_scale,
            threshold: g.threshold,
            offset: Point::new(g.x_offset, g.y_offset),
            z: ZHeights {
                paint: g.z_paint,
                low: g.z_low,
                high: g.z_high,
                wipe_exit: g.z_wipe_exit,
                dip: g.dip_z,
            },
            feeds: Feeds {
                travel: g.feed_travel,
                paint: g.feed_paint,
                z: g.z_feed,
                spiral: g.spiral_feed,
                plunge: g.plunge_feed,
            },
            accelerations: Accelerations {
                travel: g.accel_travel,
                paint: g.accel_paint,
            },
            dip: DipSettings {
                min_distance: g.min_distance,
                max_distance: g.max_distance,
                jitter_radius: g.jitter_radius,
                spiral_loops: g.spiral_loops,
                spiral_radius: g.spiral_radius,
                wipe_radius: g.wipe_radius,
            },
            concentric_iteration_cap: g.concentric_iteration_cap,
            sequencer_fallback_threshold: g.sequencer_fallback_threshold,
            serpentine_band_width: g.serpentine_band_width,
            state_handoff: g.state_handoff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_values_win() {
        let global = GlobalSettings::default();
        let layer = LayerSettings {
            brush_width: Some(3.0),
            infill_strategy: Some(InfillStrategy::Concentric),
            infill_angle: Some(30.0),
            ..LayerSettings::new("Red", 10.0, 20.0)
        };

        let cfg = LayerConfigBuilder::new(&global)
            .layer(0, &layer)
            .build()
            .unwrap();

        assert_eq!(cfg.brush_width, 3.0);
        assert_eq!(cfg.infill_strategy, InfillStrategy::Concentric);
        assert_eq!(cfg.infill_angle, 30.0);
        assert_eq!(cfg.station, Point::new(10.0, 20.0));
        assert_eq!(cfg.name, "Red");
    }

    #[test]
    fn test_global_fallback() {
        let global = GlobalSettings {
            infill_angle: 15.0,
            ..GlobalSettings::default()
        };
        let layer = LayerSettings::new("Teal", 0.0, 0.0);

        let cfg = LayerConfigBuilder::new(&global)
            .layer(1, &layer)
            .build()
            .unwrap();

        assert_eq!(cfg.brush_width, global.brush_width);
        assert_eq!(cfg.overlap, global.overlap);
        assert_eq!(cfg.infill_angle, 15.0);
        assert_eq!(cfg.infill_strategy, InfillStrategy::Lines);
        assert_eq!(cfg.offset, Point::new(263.0, 266.0));
        assert_eq!(cfg.label(), "layer 2 \"Teal\"");
    }

    #[test]
    fn test_missing_station_reports_layer() {
        let global = GlobalSettings::default();
        let layer = LayerSettings {
            name: Some("Yellow".to_string()),
            enabled: true,
            station_x: Some(1.0),
            ..LayerSettings::default()
        };

        let err = LayerConfigBuilder::new(&global)
            .layer(2, &layer)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::MissingField {
                scope: "layer 3 \"Yellow\"".to_string(),
                field: "station_y".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_brush_override() {
        let global = GlobalSettings::default();
        let layer = LayerSettings {
            brush_width: Some(-1.0),
            ..LayerSettings::new("Red", 0.0, 0.0)
        };
        let err = LayerConfigBuilder::new(&global)
            .layer(0, &layer)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { ref key, .. } if key == "brush_width"));
    }

    #[test]
    fn test_stroke_spacing() {
        let global = GlobalSettings {
            brush_width: 2.0,
            overlap: 0.0,
            working_scale: 2.0,
            ..GlobalSettings::default()
        };
        let layer = LayerSettings::new("Red", 0.0, 0.0);
        let cfg = LayerConfigBuilder::new(&global).layer(0, &layer).build().unwrap();
        assert_eq!(cfg.stroke_spacing_px(), 4);

        // 1.6 * 0.85 * 2.0 = 2.72 -> 2
        let cfg = LayerConfigBuilder::new(&GlobalSettings::default())
            .layer(0, &layer)
            .build()
            .unwrap();
        assert_eq!(cfg.stroke_spacing_px(), 2);

        let tiny = LayerSettings {
            brush_width: Some(0.1),
            ..layer
        };
        let cfg = LayerConfigBuilder::new(&global).layer(0, &tiny).build().unwrap();
        assert_eq!(cfg.stroke_spacing_px(), 1);
    }
}
