//! Affine georeferencing for rasters

use serde::{Deserialize, Serialize};

/// Cell-to-world mapping for a north-up raster.
///
/// ```text
/// x = origin_x + col * cell_width
/// y = origin_y + row * cell_height     (cell_height is usually negative)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in the X direction
    pub cell_width: f64,
    /// Cell size in the Y direction, usually negative
    pub cell_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
        }
    }

    /// Geographic coordinates of the center of cell (row, col)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.cell_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.cell_height;
        (x, y)
    }

    /// Fractional (col, row) for geographic coordinates (x, y)
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.cell_width;
        let row = (y - self.origin_y) / self.cell_height;
        (col, row)
    }

    /// Grid resolution (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.cell_width.abs()
    }

    /// Bounding box (min_x, min_y, max_x, max_y) for a raster of the given size
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let x0 = self.origin_x;
        let y0 = self.origin_y;
        let x1 = self.origin_x + cols as f64 * self.cell_width;
        let y1 = self.origin_y + rows as f64 * self.cell_height;
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
