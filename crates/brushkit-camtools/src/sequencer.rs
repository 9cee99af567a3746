//! Stroke ordering
//!
//! Orders a layer's strokes so that brush travel between them stays short.
//!
//! # Algorithms
//!
//! 1. **Nearest Neighbor**: starting at the replenishment station, repeatedly
//!    take the remaining stroke whose first point is closest to the current
//!    position, then continue from that stroke's last point. Ties go to the
//!    stroke that came first.
//! 2. **Serpentine bands**: above the fallback threshold the quadratic search
//!    is replaced by bucketing strokes into vertical bands by the X of their
//!    first point, ordering by Y inside a band and alternating direction from
//!    one band to the next.
//!
//! Strokes are never reversed here; direction is decided during motion
//! synthesis.

use brushkit_core::{Path, PathSet, Point};
use brushkit_settings::LayerConfig;

/// Orders strokes for painting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSequencer {
    /// Stroke count above which serpentine ordering is used
    pub fallback_threshold: usize,
    /// Width of a serpentine band (mm)
    pub band_width: f64,
}

impl Default for PathSequencer {
    fn default() -> Self {
        Self {
            fallback_threshold: 5000,
            band_width: 20.0,
        }
    }
}

impl PathSequencer {
    pub fn new(fallback_threshold: usize, band_width: f64) -> Self {
        Self {
            fallback_threshold,
            band_width,
        }
    }

    pub fn from_layer(config: &LayerConfig) -> Self {
        Self::new(
            config.sequencer_fallback_threshold,
            config.serpentine_band_width,
        )
    }

    /// Produce a permutation of `paths`
    pub fn sequence(&self, paths: PathSet, start: Point) -> Vec<Path> {
        let paths = paths.into_vec();
        if paths.len() > self.fallback_threshold {
            tracing::debug!(
                "{} strokes exceed {}, using serpentine bands",
                paths.len(),
                self.fallback_threshold
            );
            serpentine(paths, self.band_width)
        } else {
            nearest_neighbor(paths, start)
        }
    }
}

fn nearest_neighbor(mut remaining: Vec<Path>, start: Point) -> Vec<Path> {
    let mut order = Vec::with_capacity(remaining.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_dist = f64::MAX;
        for (i, path) in remaining.iter().enumerate() {
            let dist = current.distance_to(&path.first());
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        let next = remaining.remove(best_idx);
        current = next.last();
        order.push(next);
    }
    order
}

fn serpentine(mut paths: Vec<Path>, band_width: f64) -> Vec<Path> {
    let band_width = if band_width > 0.0 { band_width } else { 1.0 };
    let band_key = |p: &Path| -> (i64, f64) {
        let first = p.first();
        let band = (first.x / band_width).floor() as i64;
        let along = if band.rem_euclid(2) == 0 { first.y } else { -first.y };
        (band, along)
    };

    // stable: equal keys keep extraction order
    paths.sort_by(|a, b| {
        let (band_a, along_a) = band_key(a);
        let (band_b, along_b) = band_key(b);
        band_a.cmp(&band_b).then(along_a.total_cmp(&along_b))
    });
    paths
}

/// Rapid travel needed to visit `paths` in order from `start`, entering each
/// stroke at its first point
pub fn travel_distance(paths: &[Path], start: Point) -> f64 {
    let mut current = start;
    let mut total = 0.0;
    for path in paths {
        total += current.distance_to(&path.first());
        current = path.last();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        Path::new(vec![Point::new(x0, y0), Point::new(x1, y1)]).unwrap()
    }

    #[test]
    fn test_nearest_neighbor_order() {
        let a = seg(10.0, 0.0, 11.0, 0.0);
        let b = seg(0.0, 1.0, 0.0, 2.0);
        let c = seg(11.0, 5.0, 20.0, 5.0);
        let d = seg(0.0, 3.0, 9.0, 3.0);
        let set = PathSet::from(vec![a.clone(), b.clone(), c.clone(), d.clone()]);

        // origin -> b, (0,2) -> d, (9,3) -> c (2.83 vs 3.16), then a
        let order = PathSequencer::default().sequence(set, Point::new(0.0, 0.0));
        assert_eq!(order, vec![b, d, c, a]);
    }

    #[test]
    fn test_ties_keep_earlier_path() {
        let first = seg(1.0, 0.0, 2.0, 0.0);
        let second = seg(-1.0, 0.0, -2.0, 0.0);
        let set = PathSet::from(vec![first.clone(), second.clone()]);
        let order = PathSequencer::default().sequence(set, Point::new(0.0, 0.0));
        assert_eq!(order[0], first);
    }

    #[test]
    fn test_nearest_neighbor_beats_input_order() {
        let paths: Vec<Path> = [50.0, 0.0, 40.0, 10.0, 30.0, 20.0]
            .iter()
            .map(|&x| seg(x, 0.0, x, 5.0))
            .collect();
        let start = Point::new(0.0, 0.0);
        let before = travel_distance(&paths, start);
        let order = PathSequencer::default().sequence(PathSet::from(paths), start);
        assert!(travel_distance(&order, start) < before);
    }

    #[test]
    fn test_serpentine_bands() {
        let set = PathSet::from(vec![
            seg(25.0, 1.0, 26.0, 1.0),
            seg(5.0, 9.0, 6.0, 9.0),
            seg(25.0, 8.0, 26.0, 8.0),
            seg(5.0, 2.0, 6.0, 2.0),
        ]);
        let order = PathSequencer::new(2, 20.0).sequence(set, Point::new(0.0, 0.0));
        let firsts: Vec<(f64, f64)> = order.iter().map(|p| (p.first().x, p.first().y)).collect();
        // band 0 ascending in y, band 1 descending
        assert_eq!(firsts, vec![(5.0, 2.0), (5.0, 9.0), (25.0, 8.0), (25.0, 1.0)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(PathSequencer::default()
            .sequence(PathSet::new(), Point::new(0.0, 0.0))
            .is_empty());
    }
}
