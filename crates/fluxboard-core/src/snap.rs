//! Grid snapping for node and group dragging.

use kurbo::Point;

/// Grid size for snapping, in world units (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Snap a value to the nearest grid multiple.
pub fn snap_value(value: f64) -> f64 {
    (value / GRID_SIZE).round() * GRID_SIZE
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point) -> Point {
    Point::new(snap_value(point.x), snap_value(point.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest_multiple() {
        assert_eq!(snap_value(0.0), 0.0);
        assert_eq!(snap_value(9.9), 0.0);
        assert_eq!(snap_value(10.0), 20.0);
        assert_eq!(snap_value(29.0), 20.0);
        assert_eq!(snap_value(-13.0), -20.0);
    }

    #[test]
    fn test_snap_point() {
        let snapped = snap_to_grid(Point::new(33.0, 47.0));
        assert_eq!(snapped, Point::new(40.0, 40.0));
    }
}
