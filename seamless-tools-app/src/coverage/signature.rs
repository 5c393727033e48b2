/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Content signatures of polygon geometry.
//!
//! Two geometries receive the same signature when their canonical text is
//! identical. The canonical form rounds coordinates to a fixed number of
//! decimals, drops closing and repeated vertices, orients exterior rings
//! counter-clockwise and holes clockwise, starts every ring at its smallest
//! vertex (x, then y) and sorts holes and polygons.

use geo::{LineString, MultiPolygon, Polygon};
use seamless_common::algorithms::signed_polygon_area;
use seamless_common::structures::Point2D;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a geometry's canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature([u8; 32]);

impl Signature {
    pub fn of(geom: &MultiPolygon<f64>, precision: usize) -> Signature {
        Signature::of_text(&canonical_text(geom, precision))
    }

    pub fn of_polygon(poly: &Polygon<f64>, precision: usize) -> Signature {
        Signature::of_text(&canonical_text(
            &MultiPolygon::new(vec![poly.clone()]),
            precision,
        ))
    }

    pub fn of_text(text: &str) -> Signature {
        let digest = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Signature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// WKT-like canonical text, e.g. `MULTIPOLYGON(((0 0,1 0,1 1,0 0)))`.
pub fn canonical_text(geom: &MultiPolygon<f64>, precision: usize) -> String {
    let mut polys: Vec<String> = geom
        .0
        .iter()
        .filter_map(|p| canonical_polygon(p, precision))
        .collect();
    polys.sort();
    format!("MULTIPOLYGON({})", polys.join(","))
}

fn canonical_polygon(poly: &Polygon<f64>, precision: usize) -> Option<String> {
    let exterior = canonical_ring(poly.exterior(), precision, true)?;
    let mut holes: Vec<String> = poly
        .interiors()
        .iter()
        .filter_map(|r| canonical_ring(r, precision, false))
        .collect();
    holes.sort();
    let mut rings = vec![exterior];
    rings.extend(holes);
    Some(format!("({})", rings.join(",")))
}

fn canonical_ring(ring: &LineString<f64>, precision: usize, exterior: bool) -> Option<String> {
    let scale = 10f64.powi(precision as i32);
    let mut pts: Vec<Point2D> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        let p = Point2D::new(round_to(c.x, scale), round_to(c.y, scale));
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return None;
    }

    let ccw = signed_polygon_area(&pts) > 0f64;
    if ccw != exterior {
        pts.reverse();
    }

    let start = pts
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    pts.rotate_left(start);
    pts.push(pts[0]);

    let coords: Vec<String> = pts
        .iter()
        .map(|p| format!("{:.*} {:.*}", precision, p.x, precision, p.y))
        .collect();
    Some(format!("({})", coords.join(",")))
}

fn round_to(v: f64, scale: f64) -> f64 {
    let r = (v * scale).round() / scale;
    if r == 0f64 {
        0f64 // no negative zero
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::{canonical_text, Signature};
    use geo::{polygon, MultiPolygon};

    #[test]
    fn test_canonical_text() {
        let mp = MultiPolygon::new(vec![polygon![
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ]]);
        assert_eq!(
            canonical_text(&mp, 1),
            "MULTIPOLYGON(((0.0 0.0,1.0 0.0,1.0 1.0,0.0 1.0,0.0 0.0)))"
        );
    }

    #[test]
    fn test_equivalent_rings_match() {
        // clockwise, different start vertex, repeated vertex, tiny noise
        let a = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ]]);
        let b = MultiPolygon::new(vec![polygon![
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0000000000001),
            (x: 0.0, y: 0.0),
            (x: -0.0, y: 2.0),
        ]]);
        assert_eq!(Signature::of(&a, 9), Signature::of(&b, 9));
        let c = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.1),
            (x: 0.0, y: 2.0),
        ]]);
        assert_ne!(Signature::of(&a, 9), Signature::of(&c, 9));
    }

    #[test]
    fn test_hex_display() {
        let s = Signature::of_text("");
        assert_eq!(
            s.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
