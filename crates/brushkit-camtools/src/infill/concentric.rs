//! Concentric shell infill
//!
//! Repeatedly traces the outline of the remaining ink and erodes the mask by
//! one stroke spacing until nothing is left or the round limit is hit.

use super::{marching_squares, PixelToMachine, ShellStats};
use crate::mask::Mask;
use brushkit_core::{PathSet, Point};

pub(crate) fn shells(
    mask: &Mask,
    spacing_px: usize,
    iteration_cap: usize,
    to_machine: &PixelToMachine,
) -> (PathSet, ShellStats) {
    let erosion_steps = spacing_px.max(1);
    let mut current = mask.clone();
    let mut paths = PathSet::new();
    let mut stats = ShellStats::default();

    while current.has_ink() && stats.rounds < iteration_cap {
        stats.rounds += 1;

        for contour in marching_squares::find_contours(&current) {
            if contour.len() > 2 {
                let points: Vec<Point> = contour
                    .into_iter()
                    .map(|(x, y)| to_machine.map(x, y))
                    .collect();
                paths.push_points(points);
            }
        }

        current = current.eroded(erosion_steps);
    }

    stats.cap_reached = current.has_ink();
    (paths, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PixelToMachine {
        PixelToMachine::new(1.0, Point::new(0.0, 0.0))
    }

    /// Solid block with a one cell margin so every outline closes
    fn block(size: usize) -> Mask {
        Mask::from_fn(size + 2, size + 2, |x, y| {
            (1..=size).contains(&x) && (1..=size).contains(&y)
        })
    }

    #[test]
    fn test_nested_shells() {
        let (paths, stats) = shells(&block(9), 1, 100, &identity());

        // 9x9 -> 7x7 -> 5x5 -> 3x3 -> 1x1
        assert_eq!(stats.rounds, 5);
        assert!(!stats.cap_reached);
        assert_eq!(paths.len(), 5);
        assert!(paths.iter().all(|p| p.is_closed()));

        let lengths: Vec<f64> = paths.iter().map(|p| p.length()).collect();
        assert!(lengths.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_wider_spacing_fewer_shells() {
        let (_, stats) = shells(&block(9), 2, 100, &identity());
        // 9x9 -> 5x5 -> 1x1
        assert_eq!(stats.rounds, 3);
    }

    #[test]
    fn test_cap_stops_early() {
        let mask = Mask::from_fn(60, 60, |_, _| true);
        let (paths, stats) = shells(&mask, 1, 3, &identity());
        assert_eq!(stats.rounds, 3);
        assert!(stats.cap_reached);
        assert!(!paths.is_empty());
    }

    #[test]
    fn test_empty_mask() {
        let (paths, stats) = shells(&Mask::new(8, 8), 1, 10, &identity());
        assert!(paths.is_empty());
        assert_eq!(stats.rounds, 0);
        assert!(!stats.cap_reached);
    }
}
