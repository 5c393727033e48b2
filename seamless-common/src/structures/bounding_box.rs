/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use super::Point2D;

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        let (x1, x2) = if min_x < max_x {
            (min_x, max_x)
        } else {
            (max_x, min_x)
        };
        let (y1, y2) = if min_y < max_y {
            (min_y, max_y)
        } else {
            (max_y, min_y)
        };
        BoundingBox {
            min_x: x1,
            min_y: y1,
            max_x: x2,
            max_y: y2,
        }
    }

    pub fn from_two_points(p1: Point2D, p2: Point2D) -> BoundingBox {
        BoundingBox::new(p1.x, p2.x, p1.y, p2.y)
    }

    /// Returns None for an empty point set.
    pub fn from_points(points: &[Point2D]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bb = BoundingBox::from_two_points(*first, *first);
        for p in &points[1..] {
            bb.expand_to_point(*p);
        }
        Some(bb)
    }

    pub fn get_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn get_width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn overlaps(&self, other: BoundingBox) -> bool {
        !(self.max_y < other.min_y
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.min_x > other.max_x)
    }

    pub fn contains(&self, other: BoundingBox) -> bool {
        other.max_y <= self.max_y
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.min_x >= self.min_x
    }

    pub fn is_point_in_box(&self, x: f64, y: f64) -> bool {
        !(self.max_y < y || self.max_x < x || self.min_y > y || self.min_x > x)
    }

    pub fn expand_to(&mut self, other: BoundingBox) {
        self.max_y = self.max_y.max(other.max_y);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.min_x = self.min_x.min(other.min_x);
    }

    pub fn expand_to_point(&mut self, p: Point2D) {
        self.max_y = self.max_y.max(p.y);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.min_x = self.min_x.min(p.x);
    }

    pub fn expand_by(&mut self, value: f64) {
        self.max_y += value;
        self.max_x += value;
        self.min_y -= value;
        self.min_x -= value;
    }

    /// Smallest gap between the two boxes; zero when they overlap.
    pub fn distance_to(&self, other: BoundingBox) -> f64 {
        let dx = (other.min_x - self.max_x).max(self.min_x - other.max_x).max(0f64);
        let dy = (other.min_y - self.max_y).max(self.min_y - other.max_y).max(0f64);
        (dx * dx + dy * dy).sqrt()
    }

    /// The four corners, counter-clockwise from the lower-left.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.min_x, self.min_y),
            Point2D::new(self.max_x, self.min_y),
            Point2D::new(self.max_x, self.max_y),
            Point2D::new(self.min_x, self.max_y),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::BoundingBox;
    use crate::structures::Point2D;

    #[test]
    fn test_from_points_and_distance() {
        let pts = vec![Point2D::new(3.0, 1.0), Point2D::new(0.0, 4.0), Point2D::new(1.0, 2.0)];
        let bb = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bb, BoundingBox::new(0.0, 3.0, 1.0, 4.0));
        let other = BoundingBox::new(6.0, 7.0, 8.0, 9.0);
        assert!(!bb.overlaps(other));
        assert!((bb.distance_to(other) - 5.0).abs() < 1e-12);
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
