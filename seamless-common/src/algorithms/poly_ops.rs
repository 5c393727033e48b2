/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use crate::structures::Point2D;

/// Tests if a point is Left|On|Right of an infinite line,
/// based on http://geomalgorithms.com/a03-_inclusion.html.
///
/// Return: > 0 for p2 left of the line through p0 and p1
///         = 0 for p2 on the line through p0 and p1
///         < 0 for p2 right of the line through p0 and p1
fn is_left(p0: &Point2D, p1: &Point2D, p2: &Point2D) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Tests whether a point is within in a polygon ring using the winding number.
/// Points on the edge of the ring will be deemed outside.
pub fn point_in_poly(p: &Point2D, poly: &[Point2D]) -> bool {
    winding_number(p, poly) % 2 != 0i32
}

/// Winding number of a ring around a point. An open ring is treated as
/// if its last vertex connects back to the first.
pub fn winding_number(p: &Point2D, poly: &[Point2D]) -> i32 {
    let n = poly.len();
    if n < 3 {
        return 0i32;
    }
    let mut wn = 0i32;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        if a.nearly_equals(b) {
            continue;
        }
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0f64 {
                // upward crossing, p left of edge
                wn += 1i32;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0f64 {
            // downward crossing, p right of edge
            wn -= 1i32;
        }
    }
    wn
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Point2D;

    #[test]
    fn test_point_in_poly() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert!(point_in_poly(&Point2D::new(4.0, 2.0), &poly));
        assert_eq!(point_in_poly(&Point2D::new(12.0, 12.0), &poly), false);
    }

    #[test]
    fn test_winding_number() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert_eq!(winding_number(&Point2D::new(5.0, 2.0), &poly), 0i32);
        assert_eq!(winding_number(&Point2D::new(4.0, 2.0), &poly), 1i32);
        assert_eq!(winding_number(&Point2D::new(6.0, 2.0), &poly), 0i32);
    }
}
