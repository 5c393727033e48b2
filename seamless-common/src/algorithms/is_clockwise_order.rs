use super::signed_polygon_area;
use crate::structures::Point2D;

/// Checks whether a sequence of Point2D are in clockwise order. The
/// sequence may repeat its first point at the end. Degenerate rings with
/// fewer than three distinct vertices are reported as not clockwise.
pub fn is_clockwise_order(points: &[Point2D]) -> bool {
    if points.len() < 3 {
        return false;
    }
    signed_polygon_area(points) < 0f64
}
