/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use std::f64::EPSILON;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 2-D point, with x and y fields.
#[derive(Default, Copy, Clone, Debug)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl Point2D {
    /// Creates a new Point2D,
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    /// Calculates the midpoint between two Point2Ds.
    pub fn midpoint(p1: &Point2D, p2: &Point2D) -> Point2D {
        Point2D::new((p1.x + p2.x) / 2f64, (p1.y + p2.y) / 2f64)
    }

    /// Calculates the centre point of a set of Point2Ds.
    pub fn centre_point(points: &[Point2D]) -> Point2D {
        if points.is_empty() {
            return Point2D::default();
        }
        let mut x = 0f64;
        let mut y = 0f64;
        for p in points {
            x += p.x;
            y += p.y;
        }
        x /= points.len() as f64;
        y /= points.len() as f64;
        Point2D::new(x, y)
    }

    /// Calculate Euclidean distance between the point and another.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Cross product of the vectors (p1 - self) and (p2 - self). Positive when
    /// the three points turn counter-clockwise.
    pub fn cross(&self, p1: &Self, p2: &Self) -> f64 {
        (p1.x - self.x) * (p2.y - self.y) - (p1.y - self.y) * (p2.x - self.x)
    }

    /// True when self, q, r turn counter-clockwise (y axis up). Used by the
    /// triangulation hull walk.
    pub fn orient(&self, q: &Self, r: &Self) -> bool {
        (q.y - self.y) * (r.x - q.x) - (q.x - self.x) * (r.y - q.y) < 0.0
    }

    /// Squared radius of the circle passing through self, b and c.
    pub fn circumradius2(&self, b: &Self, c: &Self) -> f64 {
        let (x, y) = self.circumdelta(b, c);
        x * x + y * y
    }

    pub fn circumcenter(&self, b: &Self, c: &Self) -> Point2D {
        let (x, y) = self.circumdelta(b, c);
        Point2D::new(self.x + x, self.y + y)
    }

    fn circumdelta(&self, b: &Self, c: &Self) -> (f64, f64) {
        let dx = b.x - self.x;
        let dy = b.y - self.y;
        let ex = c.x - self.x;
        let ey = c.y - self.y;

        let bl = dx * dx + dy * dy;
        let cl = ex * ex + ey * ey;
        let d = 0.5 / (dx * ey - dy * ex);

        let x = (ey * bl - dy * cl) * d;
        let y = (dx * cl - ex * bl) * d;
        (x, y)
    }

    /// True when p lies inside the circumcircle of self, b, c, with the
    /// triangle wound the way the triangulation emits it.
    pub fn in_circle(&self, b: &Self, c: &Self, p: &Self) -> bool {
        let dx = self.x - p.x;
        let dy = self.y - p.y;
        let ex = b.x - p.x;
        let ey = b.y - p.y;
        let fx = c.x - p.x;
        let fy = c.y - p.y;

        let ap = dx * dx + dy * dy;
        let bp = ex * ex + ey * ey;
        let cp = fx * fx + fy * fy;

        dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) < 0.0
    }

    pub fn nearly_equals(&self, other: &Self) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    pub fn translate(&self, delta_x: f64, delta_y: f64) -> Point2D {
        Point2D::new(self.x + delta_x, self.y + delta_y)
    }
}

impl Eq for Point2D {}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Self) -> Point2D {
        Point2D {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

// dot product
impl Mul for Point2D {
    type Output = f64;
    fn mul(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }
}

#[cfg(test)]
mod test {
    use super::Point2D;

    #[test]
    fn test_circumcenter() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, 0.0);
        let c = Point2D::new(0.0, 2.0);
        let cc = a.circumcenter(&b, &c);
        assert!((cc.x - 1.0).abs() < 1e-12);
        assert!((cc.y - 1.0).abs() < 1e-12);
        assert!((a.circumradius2(&b, &c) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_in_circle() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, 0.0);
        let c = Point2D::new(0.0, 2.0);
        // triangulation winding (clockwise, y up)
        assert!(a.in_circle(&c, &b, &Point2D::new(1.0, 1.0)));
        assert!(!a.in_circle(&c, &b, &Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn test_cross_and_orient() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(1.0, 0.0);
        let c = Point2D::new(0.0, 1.0);
        assert!(a.cross(&b, &c) > 0.0);
        assert!(a.orient(&b, &c));
        assert!(!a.orient(&c, &b));
    }
}
