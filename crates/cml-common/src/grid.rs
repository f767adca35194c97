//! Dense rainfall grid and point observations.

/// A rain reading at a pixel position.
///
/// Assembled per time step by joining cached link coordinates against
/// time-sliced readings. Transient: lives for one map computation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Rain rate in mm/hr.
    pub value: f64,
    /// Pixel x (column) coordinate.
    pub x: f64,
    /// Pixel y (row) coordinate.
    pub y: f64,
}

impl Observation {
    pub fn new(value: f64, x: f64, y: f64) -> Self {
        Self { value, x, y }
    }

    /// Euclidean pixel distance to another point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A dense 2D rainfall-rate grid, row-major by (row = y, col = x).
///
/// Cells hold `f32::NAN` where no reliable estimate exists. Created fresh
/// per time step and handed to the exporter once filled.
#[derive(Debug, Clone)]
pub struct RainGrid {
    data: Vec<f32>,
    n_rows: usize,
    n_cols: usize,
}

impl RainGrid {
    /// Create a grid filled with the missing-data sentinel.
    pub fn filled_with_nan(n_rows: usize, n_cols: usize) -> Self {
        Self {
            data: vec![f32::NAN; n_rows * n_cols],
            n_rows,
            n_cols,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Get the value at (col, row). None if out of bounds.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.n_cols || row >= self.n_rows {
            return None;
        }
        Some(self.data[row * self.n_cols + col])
    }

    /// Set the value at (col, row). Out-of-bounds writes are ignored.
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        if col < self.n_cols && row < self.n_rows {
            self.data[row * self.n_cols + col] = value;
        }
    }

    /// Row-major view of the cell values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Number of cells holding the missing-data sentinel.
    pub fn missing_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_starts_missing() {
        let grid = RainGrid::filled_with_nan(4, 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.missing_count(), 12);
        assert!(grid.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_grid_row_major_indexing() {
        let mut grid = RainGrid::filled_with_nan(2, 3);
        grid.set(2, 1, 7.5);
        assert_eq!(grid.get(2, 1), Some(7.5));
        // row 1, col 2 => index 1 * 3 + 2
        assert_eq!(grid.as_slice()[5], 7.5);
    }

    #[test]
    fn test_grid_out_of_bounds() {
        let mut grid = RainGrid::filled_with_nan(2, 2);
        grid.set(5, 5, 1.0);
        assert_eq!(grid.get(5, 5), None);
        assert_eq!(grid.missing_count(), 4);
    }

    #[test]
    fn test_observation_distance() {
        let obs = Observation::new(1.0, 3.0, 4.0);
        assert!((obs.distance_to(0.0, 0.0) - 5.0).abs() < 1e-12);
    }
}
