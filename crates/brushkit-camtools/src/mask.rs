//! Binary ink mask at working resolution
//!
//! Cell `(0, 0)` is the bottom-left corner so that rows grow in the same
//! direction as machine Y.

/// A two-dimensional grid of ink/no-ink cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// An all-background mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a mask from text art, `#` marking ink.
    ///
    /// The first string is the top row, as it reads on screen.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut mask = Self::new(width, height);
        for (i, row) in rows.iter().enumerate() {
            let y = height - 1 - i;
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Ink at `(x, y)`; cells outside the grid are background
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Like [`Mask::get`] for signed coordinates
    pub fn get_signed(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && self.get(x as usize, y as usize)
    }

    pub fn set(&mut self, x: usize, y: usize, ink: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = ink;
        }
    }

    pub fn ink_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn has_ink(&self) -> bool {
        self.cells.iter().any(|&c| c)
    }

    /// Share of cells that carry ink, 0-100
    pub fn coverage_percent(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.ink_count() as f64 * 100.0 / self.cells.len() as f64
    }

    /// Binary erosion with a 4-connected cross, applied `iterations` times.
    ///
    /// A cell survives a pass only when it and its four neighbors carry ink.
    /// Cells beyond the border count as background.
    pub fn eroded(&self, iterations: usize) -> Mask {
        let mut current = self.clone();
        for _ in 0..iterations {
            if !current.has_ink() {
                break;
            }
            let prev = &current;
            let next = Mask::from_fn(self.width, self.height, |x, y| {
                prev.get(x, y)
                    && x > 0
                    && y > 0
                    && prev.get(x - 1, y)
                    && prev.get(x + 1, y)
                    && prev.get(x, y - 1)
                    && prev.get(x, y + 1)
            });
            current = next;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_orientation() {
        let mask = Mask::from_ascii(&["#..", "...", "..#"]);
        // top-left on screen is the last row
        assert!(mask.get(0, 2));
        assert!(mask.get(2, 0));
        assert!(!mask.get(0, 0));
        assert_eq!(mask.ink_count(), 2);
    }

    #[test]
    fn test_out_of_bounds_is_background() {
        let mask = Mask::from_fn(2, 2, |_, _| true);
        assert!(!mask.get(2, 0));
        assert!(!mask.get_signed(-1, 0));
        assert!(mask.get_signed(1, 1));
    }

    #[test]
    fn test_coverage() {
        let mask = Mask::from_ascii(&["##", ".."]);
        assert_eq!(mask.coverage_percent(), 50.0);
        assert_eq!(Mask::new(0, 0).coverage_percent(), 0.0);
    }

    #[test]
    fn test_erosion_cross() {
        let mask = Mask::from_ascii(&[
            ".....", //
            ".###.",
            ".###.",
            ".###.",
            ".....",
        ]);
        let eroded = mask.eroded(1);
        assert_eq!(eroded.ink_count(), 1);
        assert!(eroded.get(2, 2));
        assert!(!mask.eroded(2).has_ink());
    }

    #[test]
    fn test_erosion_border_is_background() {
        let full = Mask::from_fn(3, 3, |_, _| true);
        let eroded = full.eroded(1);
        assert_eq!(eroded.ink_count(), 1);
        assert!(eroded.get(1, 1));
    }
}
