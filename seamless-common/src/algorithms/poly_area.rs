/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use crate::structures::Point2D;

/// Shoelace area of a ring. Positive for counter-clockwise rings. The ring
/// may be open or closed.
pub fn signed_polygon_area(vertices: &[Point2D]) -> f64 {
    let num_vertices = vertices.len();
    if num_vertices < 3 {
        return 0f64;
    }
    let mut area = 0f64;
    for i in 0..num_vertices - 1 {
        area += vertices[i].x * vertices[i + 1].y - vertices[i + 1].x * vertices[i].y;
    }
    area +=
        vertices[num_vertices - 1].x * vertices[0].y - vertices[0].x * vertices[num_vertices - 1].y;
    area / 2.0f64
}

/// Calculates the area of a polygon defined by a series of vertices.
pub fn polygon_area(vertices: &[Point2D]) -> f64 {
    signed_polygon_area(vertices).abs()
}

#[cfg(test)]
mod test {
    use super::{polygon_area, signed_polygon_area};
    use crate::structures::Point2D;

    #[test]
    fn test_closed_polygon_area() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert_eq!(polygon_area(&poly), 25f64);
        assert_eq!(signed_polygon_area(&poly), 25f64);
    }

    #[test]
    fn test_clockwise_ring_is_negative() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 4.0),
            Point2D::new(2.0, 4.0),
            Point2D::new(2.0, 0.0),
        ];
        assert_eq!(signed_polygon_area(&poly), -8f64);
        assert_eq!(polygon_area(&poly), 8f64);
        assert_eq!(polygon_area(&poly[0..2]), 0f64);
    }
}
