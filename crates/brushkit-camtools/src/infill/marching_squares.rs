//! Iso-contour tracing at the 0.5 level of a binary mask
//!
//! Grid samples sit at cell centers, so every crossing lands halfway between
//! two neighboring cells. Saddle cells keep the background connected and split
//! diagonal ink. Contours that touch the grid border stay open; closed loops
//! repeat their first point at the end.

use crate::mask::Mask;
use std::collections::HashMap;

/// Crossing point on a cell edge in pixel coordinates
type Vertex = (f64, f64);

/// Doubled coordinates; every crossing is on the half-pixel lattice
type VertexKey = (i64, i64);

fn key(v: Vertex) -> VertexKey {
    ((v.0 * 2.0).round() as i64, (v.1 * 2.0).round() as i64)
}

/// Trace all contours of `mask`.
///
/// Output points are `(x, y)` in pixel units. Order is deterministic: open
/// chains come first, then closed loops, each in scan order of their first
/// segment.
pub fn find_contours(mask: &Mask) -> Vec<Vec<Vertex>> {
    let segments = collect_segments(mask);
    assemble(&segments)
}

/// Emit one or two segments per cell whose corners disagree
fn collect_segments(mask: &Mask) -> Vec<[Vertex; 2]> {
    let mut segments = Vec::new();
    if mask.width() < 2 || mask.height() < 2 {
        return segments;
    }

    for cy in 0..mask.height() - 1 {
        for cx in 0..mask.width() - 1 {
            // a=(cx,cy) b=(cx+1,cy) c=(cx+1,cy+1) d=(cx,cy+1)
            let a = mask.get(cx, cy);
            let b = mask.get(cx + 1, cy);
            let c = mask.get(cx + 1, cy + 1);
            let d = mask.get(cx, cy + 1);

            let (x, y) = (cx as f64, cy as f64);
            let edge = |e: usize| -> Vertex {
                match e {
                    0 => (x + 0.5, y),
                    1 => (x + 1.0, y + 0.5),
                    2 => (x + 0.5, y + 1.0),
                    _ => (x, y + 0.5),
                }
            };

            let crossings: Vec<usize> = [(a, b), (b, c), (c, d), (d, a)]
                .iter()
                .enumerate()
                .filter(|(_, (p, q))| p != q)
                .map(|(i, _)| i)
                .collect();

            match crossings.len() {
                2 => segments.push([edge(crossings[0]), edge(crossings[1])]),
                4 => {
                    // saddle: cut each ink corner off on its own
                    if a {
                        segments.push([edge(3), edge(0)]);
                        segments.push([edge(1), edge(2)]);
                    } else {
                        segments.push([edge(0), edge(1)]);
                        segments.push([edge(2), edge(3)]);
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

fn assemble(segments: &[[Vertex; 2]]) -> Vec<Vec<Vertex>> {
    let mut adjacency: HashMap<VertexKey, Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        adjacency.entry(key(seg[0])).or_default().push(i);
        adjacency.entry(key(seg[1])).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    // open chains start at a vertex owned by a single segment
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        for end in segments[i] {
            if !used[i] && adjacency.get(&key(end)).map_or(0, Vec::len) == 1 {
                contours.push(walk(segments, &adjacency, &mut used, i, end));
            }
        }
    }

    for i in 0..segments.len() {
        if !used[i] {
            contours.push(walk(segments, &adjacency, &mut used, i, segments[i][0]));
        }
    }
    contours
}

fn walk(
    segments: &[[Vertex; 2]],
    adjacency: &HashMap<VertexKey, Vec<usize>>,
    used: &mut [bool],
    start_segment: usize,
    start: Vertex,
) -> Vec<Vertex> {
    let mut contour = vec![start];
    let mut segment = start_segment;
    let mut at = start;

    loop {
        used[segment] = true;
        let [p, q] = segments[segment];
        at = if key(p) == key(at) { q } else { p };
        contour.push(at);

        let next = adjacency
            .get(&key(at))
            .and_then(|ids| ids.iter().copied().find(|&id| !used[id]));
        match next {
            Some(id) => segment = id,
            None => break,
        }
    }
    contour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel_diamond() {
        let mask = Mask::from_ascii(&["...", ".#.", "..."]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);

        let loop_pts = &contours[0];
        assert_eq!(loop_pts.len(), 5);
        assert_eq!(loop_pts.first(), loop_pts.last());
        for p in loop_pts {
            let d = (p.0 - 1.0).abs() + (p.1 - 1.0).abs();
            assert!((d - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_border_contour_is_open() {
        let mask = Mask::from_ascii(&["##..", "##..", "##.."]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);

        let line = &contours[0];
        assert_ne!(line.first(), line.last());
        assert!(line.iter().all(|p| (p.0 - 1.5).abs() < 1e-9));
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn test_diagonal_ink_stays_separate() {
        let mask = Mask::from_ascii(&["....", ".#..", "..#.", "...."]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.len() == 5 && c.first() == c.last()));
    }

    #[test]
    fn test_ring_produces_two_loops() {
        let mask = Mask::from_ascii(&[
            ".......", //
            ".#####.",
            ".#...#.",
            ".#...#.",
            ".#...#.",
            ".#####.",
            ".......",
        ]);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.first() == c.last()));
    }

    #[test]
    fn test_solid_and_empty_masks() {
        assert!(find_contours(&Mask::new(5, 5)).is_empty());
        assert!(find_contours(&Mask::from_fn(5, 5, |_, _| true)).is_empty());
        assert!(find_contours(&Mask::new(1, 1)).is_empty());
    }
}
