//! Parallel scan-line infill
//!
//! Lines are swept across a rotated frame centered on the mask. Each sample
//! is mapped back to the unrotated grid by truncation toward zero and every
//! maximal run of ink samples becomes one stroke.

use super::PixelToMachine;
use crate::mask::Mask;
use brushkit_core::{PathSet, Point};

pub(crate) fn scan_lines(
    mask: &Mask,
    angle_deg: f64,
    spacing_px: usize,
    to_machine: &PixelToMachine,
) -> PathSet {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let width = mask.width() as f64;
    let height = mask.height() as f64;
    let cx = width / 2.0;
    let cy = height / 2.0;
    let diag = width.hypot(height) as i64 + 10;

    let mut paths = PathSet::new();
    let mut run: Vec<Point> = Vec::new();

    for y_rot in (-diag..diag).step_by(spacing_px.max(1)) {
        let yr = y_rot as f64;
        for x_rot in -diag..diag {
            let xr = x_rot as f64;
            let px = (cx + xr * cos_a - yr * sin_a) as i64;
            let py = (cy + xr * sin_a + yr * cos_a) as i64;

            if mask.get_signed(px, py) {
                run.push(to_machine.map(px as f64, py as f64));
            } else {
                flush(&mut paths, &mut run);
            }
        }
        flush(&mut paths, &mut run);
    }
    paths
}

fn flush(paths: &mut PathSet, run: &mut Vec<Point>) {
    if run.len() > 1 {
        paths.push_points(std::mem::take(run));
    } else {
        run.clear();
    }
}
