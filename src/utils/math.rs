//! # Game Mathematics
//!
//! Slope and distance helpers for octant-based visibility.

/// Inverse slope of an octant cell: `col / row`, or 0 on the axis.
///
/// ```
/// use caverns::inverse_slope;
///
/// assert_eq!(inverse_slope(1, 2), 0.5);
/// assert_eq!(inverse_slope(0, 3), 0.0);
/// ```
pub fn inverse_slope(col: i32, row: i32) -> f64 {
    if col <= 0 || row == 0 {
        0.0
    } else {
        col as f64 / row as f64
    }
}

/// Slope of the far edge of a cell, used to close a shadow.
pub fn edge_slope(col: i32, row: i32) -> f64 {
    (col as f64 + 0.5) / row as f64
}

/// Straight-line distance of an octant offset from the origin.
pub fn octant_distance(col: i32, row: i32) -> f64 {
    ((col * col + row * row) as f64).sqrt()
}
