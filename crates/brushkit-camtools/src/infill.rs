//! Infill path extraction
//!
//! Covers the ink of a [`Mask`] with brush strokes using one of two
//! strategies:
//! - **Lines**: parallel scan lines at a configurable angle
//! - **Concentric**: outlines of the ink, peeled inward by erosion
//!
//! Pixel coordinates are mapped to machine space as
//! `pixel / working_scale + offset`.

mod concentric;
pub mod marching_squares;
mod parallel;

use crate::mask::Mask;
use brushkit_core::{PathSet, Point};
use brushkit_settings::{InfillStrategy, LayerConfig};

/// Converts working pixels to machine millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelToMachine {
    scale: f64,
    offset: Point,
}

impl PixelToMachine {
    pub fn new(scale: f64, offset: Point) -> Self {
        Self { scale, offset }
    }

    pub fn map(&self, px: f64, py: f64) -> Point {
        Point::new(px / self.scale + self.offset.x, py / self.scale + self.offset.y)
    }
}

/// Outcome counters of a concentric extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellStats {
    /// Trace/erode rounds performed
    pub rounds: usize,
    /// Ink was still left when the round limit stopped extraction
    pub cap_reached: bool,
}

/// Extracts strokes from a mask
#[derive(Debug, Clone, PartialEq)]
pub struct InfillExtractor {
    pub strategy: InfillStrategy,
    /// Scan direction in degrees; lines strategy only
    pub angle: f64,
    /// Line spacing / erosion depth in working pixels
    pub spacing_px: usize,
    /// Upper bound on concentric rounds
    pub iteration_cap: usize,
    pub to_machine: PixelToMachine,
}

impl InfillExtractor {
    pub fn from_layer(config: &LayerConfig) -> Self {
        Self {
            strategy: config.infill_strategy,
            angle: config.infill_angle,
            spacing_px: config.stroke_spacing_px(),
            iteration_cap: config.concentric_iteration_cap,
            to_machine: PixelToMachine::new(config.working_scale, config.offset),
        }
    }

    /// Extract strokes. Shell statistics are returned for the concentric
    /// strategy only.
    pub fn extract(&self, mask: &Mask) -> (PathSet, Option<ShellStats>) {
        match self.strategy {
            InfillStrategy::Lines => {
                let paths =
                    parallel::scan_lines(mask, self.angle, self.spacing_px, &self.to_machine);
                tracing::debug!(
                    "Scan lines at {:.1} deg, spacing {} px: {} strokes",
                    self.angle,
                    self.spacing_px,
                    paths.len()
                );
                (paths, None)
            }
            InfillStrategy::Concentric => {
                let (paths, stats) = concentric::shells(
                    mask,
                    self.spacing_px,
                    self.iteration_cap,
                    &self.to_machine,
                );
                if stats.cap_reached {
                    tracing::warn!(
                        "Concentric infill stopped after {} rounds with ink remaining",
                        stats.rounds
                    );
                }
                tracing::debug!(
                    "Concentric shells, {} rounds: {} strokes",
                    stats.rounds,
                    paths.len()
                );
                (paths, Some(stats))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brushkit_settings::{GlobalSettings, LayerConfigBuilder, LayerSettings};

    fn config(strategy: InfillStrategy) -> LayerConfig {
        let global = GlobalSettings {
            target_width: 20.0,
            brush_width: 2.0,
            overlap: 0.0,
            x_offset: 10.0,
            y_offset: 20.0,
            infill_strategy: strategy,
            ..GlobalSettings::default()
        };
        LayerConfigBuilder::new(&global)
            .layer(0, &LayerSettings::new("Red", 0.0, 0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_pixel_mapping() {
        let map = PixelToMachine::new(2.0, Point::new(263.0, 266.0));
        assert_eq!(map.map(0.0, 0.0), Point::new(263.0, 266.0));
        assert_eq!(map.map(10.0, 3.0), Point::new(268.0, 267.5));
    }

    #[test]
    fn test_strokes_stay_on_canvas() {
        let mask = Mask::from_fn(40, 40, |x, y| {
            (x as i64 - 20).pow(2) + (y as i64 - 20).pow(2) < 225
        });

        for strategy in [InfillStrategy::Lines, InfillStrategy::Concentric] {
            let extractor = InfillExtractor::from_layer(&config(strategy));
            assert_eq!(extractor.spacing_px, 4);

            let (paths, stats) = extractor.extract(&mask);
            assert!(!paths.is_empty());
            assert_eq!(stats.is_some(), strategy == InfillStrategy::Concentric);
            for p in paths.iter().flat_map(|p| p.points()) {
                assert!((10.0..=30.0).contains(&p.x), "x out of canvas: {p:?}");
                assert!((20.0..=40.0).contains(&p.y), "y out of canvas: {p:?}");
            }
        }
    }

    #[test]
    fn test_scan_coverage_within_half_spacing() {
        let mask = Mask::from_fn(40, 40, |_, _| true);
        let extractor = InfillExtractor {
            strategy: InfillStrategy::Lines,
            angle: 0.0,
            spacing_px: 4,
            iteration_cap: 1,
            to_machine: PixelToMachine::new(1.0, Point::new(0.0, 0.0)),
        };
        let (paths, _) = extractor.extract(&mask);
        let points: Vec<Point> = paths.iter().flat_map(|p| p.points().iter().copied()).collect();

        for y in 0..40 {
            for x in 0..40 {
                let cell = Point::new(x as f64, y as f64);
                let nearest = points
                    .iter()
                    .map(|p| p.distance_to(&cell))
                    .fold(f64::MAX, f64::min);
                assert!(nearest <= 2.0, "cell ({x}, {y}) is {nearest} px from a stroke");
            }
        }
    }

    #[test]
    fn test_angled_scan_covers_interior() {
        let mask = Mask::from_fn(40, 40, |_, _| true);
        let extractor = InfillExtractor {
            strategy: InfillStrategy::Lines,
            angle: 45.0,
            spacing_px: 4,
            iteration_cap: 1,
            to_machine: PixelToMachine::new(1.0, Point::new(0.0, 0.0)),
        };
        let (paths, _) = extractor.extract(&mask);
        let points: Vec<Point> = paths.iter().flat_map(|p| p.points().iter().copied()).collect();

        for y in 4..36 {
            for x in 4..36 {
                let cell = Point::new(x as f64, y as f64);
                let nearest = points
                    .iter()
                    .map(|p| p.distance_to(&cell))
                    .fold(f64::MAX, f64::min);
                assert!(nearest <= 4.0, "cell ({x}, {y}) is {nearest} px from a stroke");
            }
        }
    }
}
