/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! The geometry kernel used by the pipeline stages.
//!
//! `GeometryEngine` is the seam between the pipeline and the computational
//! geometry it relies on. `GeoEngine` binds the boolean overlay and area
//! algorithms of the `geo` crate, plus the Voronoi construction of
//! `seamless_common`.

use super::config::AreaMethod;
use super::error::{CoverageError, CoverageResult, Stage};
use super::signature::Signature;
use geo::{
    Area, BooleanOps, BoundingRect, Coord, EuclideanDistance, GeodesicArea, Intersects,
    LineString, MultiPolygon, Point, Polygon, Rect,
};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use seamless_common::algorithms::voronoi_cells;
use seamless_common::structures::{BoundingBox, Point2D};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

pub trait GeometryEngine {
    /// Union of all inputs.
    fn union(&self, geoms: &[MultiPolygon<f64>]) -> MultiPolygon<f64>;

    /// The part of `base` not covered by `subtract`.
    fn erase(&self, base: &MultiPolygon<f64>, subtract: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// The part of `a` covered by `clip`.
    fn clip(&self, a: &MultiPolygon<f64>, clip: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// Bounding envelope of all inputs, grouped as one rectangle.
    fn envelope(&self, geoms: &[MultiPolygon<f64>]) -> Option<Rect<f64>>;

    /// Single-part polygons; holes stay with their shell.
    fn split_multipart(&self, geom: MultiPolygon<f64>) -> Vec<Polygon<f64>>;

    fn area(&self, geom: &MultiPolygon<f64>, method: AreaMethod) -> f64;

    /// Ring vertices without closing points or exact repeats, in first-seen order.
    fn extract_vertices(&self, parts: &[Polygon<f64>]) -> Vec<Coord<f64>>;

    /// One Thiessen cell per site, bounded by `extent`. Repeated sites
    /// after the first receive an empty polygon.
    fn voronoi(&self, sites: &[Coord<f64>], extent: Rect<f64>) -> Vec<Polygon<f64>>;

    /// Boundary-to-boundary distance, zero when the geometries intersect.
    fn distance(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64;

    fn intersects(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool;

    fn equals(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool;
}

/// The production engine.
#[derive(Debug, Clone, Copy)]
pub struct GeoEngine {
    /// Decimal places kept when comparing geometries for equality.
    pub precision: usize,
}

impl Default for GeoEngine {
    fn default() -> GeoEngine {
        GeoEngine { precision: 9 }
    }
}

impl GeoEngine {
    pub fn new(precision: usize) -> GeoEngine {
        GeoEngine { precision }
    }
}

impl GeometryEngine for GeoEngine {
    fn union(&self, geoms: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
        // cascaded: union neighbouring pairs until one geometry is left
        let mut layer: Vec<MultiPolygon<f64>> =
            geoms.iter().filter(|g| !g.0.is_empty()).cloned().collect();
        while layer.len() > 1 {
            let mut next = Vec::with_capacity((layer.len() + 1) / 2);
            let mut it = layer.into_iter();
            while let Some(a) = it.next() {
                match it.next() {
                    Some(b) => next.push(a.union(&b)),
                    None => next.push(a),
                }
            }
            layer = next;
        }
        layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
    }

    fn erase(&self, base: &MultiPolygon<f64>, subtract: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if subtract.0.is_empty() || !bounds_overlap(base, subtract) {
            return base.clone();
        }
        base.difference(subtract)
    }

    fn clip(&self, a: &MultiPolygon<f64>, clip: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if !bounds_overlap(a, clip) {
            return MultiPolygon::new(vec![]);
        }
        a.intersection(clip)
    }

    fn envelope(&self, geoms: &[MultiPolygon<f64>]) -> Option<Rect<f64>> {
        let mut env: Option<Rect<f64>> = None;
        for r in geoms.iter().filter_map(|g| g.bounding_rect()) {
            env = Some(match env {
                None => r,
                Some(e) => Rect::new(
                    Coord {
                        x: e.min().x.min(r.min().x),
                        y: e.min().y.min(r.min().y),
                    },
                    Coord {
                        x: e.max().x.max(r.max().x),
                        y: e.max().y.max(r.max().y),
                    },
                ),
            });
        }
        env
    }

    fn split_multipart(&self, geom: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
        geom.0
            .into_iter()
            .filter(|p| p.exterior().0.len() >= 4)
            .collect()
    }

    fn area(&self, geom: &MultiPolygon<f64>, method: AreaMethod) -> f64 {
        match method {
            AreaMethod::Geodesic => geom.geodesic_area_unsigned(),
            AreaMethod::Planar | AreaMethod::Auto => geom.unsigned_area(),
        }
    }

    fn extract_vertices(&self, parts: &[Polygon<f64>]) -> Vec<Coord<f64>> {
        let mut seen: HashSet<(u64, u64)> = HashSet::new();
        let mut vertices = vec![];
        for poly in parts {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
                let n = ring.0.len();
                let open = if n > 1 && ring.0[0] == ring.0[n - 1] {
                    &ring.0[..n - 1]
                } else {
                    &ring.0[..]
                };
                for c in open {
                    if seen.insert((c.x.to_bits(), c.y.to_bits())) {
                        vertices.push(*c);
                    }
                }
            }
        }
        vertices
    }

    fn voronoi(&self, sites: &[Coord<f64>], extent: Rect<f64>) -> Vec<Polygon<f64>> {
        let points: Vec<Point2D> = sites.iter().map(|c| Point2D::new(c.x, c.y)).collect();
        let bb = BoundingBox::new(extent.min().x, extent.max().x, extent.min().y, extent.max().y);
        voronoi_cells(&points, bb)
            .into_iter()
            .map(|ring| {
                if ring.len() < 3 {
                    Polygon::new(LineString::new(vec![]), vec![])
                } else {
                    let coords: Vec<Coord<f64>> =
                        ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
                    Polygon::new(LineString::new(coords), vec![])
                }
            })
            .collect()
    }

    fn distance(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
        if a.0.is_empty() || b.0.is_empty() {
            return f64::INFINITY;
        }
        if self.intersects(a, b) {
            return 0f64;
        }
        a.0.iter()
            .flat_map(|p| b.0.iter().map(move |q| p.euclidean_distance(q)))
            .fold(f64::INFINITY, f64::min)
    }

    fn intersects(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
        if !bounds_overlap(a, b) {
            return false;
        }
        a.0.iter()
            .any(|p| b.0.iter().any(|q| p.intersects(q)))
    }

    fn equals(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
        Signature::of(a, self.precision) == Signature::of(b, self.precision)
    }
}

/// Runs a kernel call, turning a panic raised inside the overlay library
/// into a stage failure.
pub fn guarded<T, F: FnOnce() -> T>(stage: Stage, f: F) -> CoverageResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "geometry kernel panicked".to_string()
        };
        CoverageError::engine(stage, message)
    })
}

/// Closed bounding-box overlap test; false when either side is empty.
pub fn bounds_overlap(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => {
            ra.min().x <= rb.max().x
                && rb.min().x <= ra.max().x
                && ra.min().y <= rb.max().y
                && rb.min().y <= ra.max().y
        }
        _ => false,
    }
}

/// Distance from a point to a polygon's area; zero inside it.
pub fn distance_to_point(geom: &MultiPolygon<f64>, c: Coord<f64>) -> f64 {
    let p = Point::from(c);
    geom.0
        .iter()
        .map(|poly| p.euclidean_distance(poly))
        .fold(f64::INFINITY, f64::min)
}

/// An envelope in the R-tree, tagged with the index of its geometry.
pub type IndexedEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Bulk-loads the envelopes of `geoms`. Empty geometries are left out.
pub fn envelope_index<'a, I>(geoms: I) -> RTree<IndexedEnvelope>
where
    I: IntoIterator<Item = (usize, &'a MultiPolygon<f64>)>,
{
    let entries: Vec<IndexedEnvelope> = geoms
        .into_iter()
        .filter_map(|(i, g)| {
            g.bounding_rect().map(|r| {
                GeomWithData::new(
                    Rectangle::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]),
                    i,
                )
            })
        })
        .collect();
    RTree::bulk_load(entries)
}

/// The R-tree envelope of a rectangle, grown by `margin` on every side.
pub fn aabb(rect: &Rect<f64>, margin: f64) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [rect.min().x - margin, rect.min().y - margin],
        [rect.max().x + margin, rect.max().y + margin],
    )
}

/// Axis-aligned rectangle as a multipolygon.
pub fn rect_to_multipolygon(rect: &Rect<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![rect.to_polygon()])
}

/// Area of a rectangle's polygon under `method`.
pub fn rect_area<E: GeometryEngine + ?Sized>(engine: &E, rect: &Rect<f64>, method: AreaMethod) -> f64 {
    engine.area(&rect_to_multipolygon(rect), method)
}

#[cfg(test)]
pub(crate) mod test {
    use super::{GeoEngine, GeometryEngine};
    use crate::coverage::config::AreaMethod;
    use geo::{polygon, Coord, MultiPolygon, Polygon, Rect};

    pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn test_union_and_erase() {
        let e = GeoEngine::default();
        let u = e.union(&[square(0., 0., 2., 2.), square(1., 0., 3., 2.), square(5., 0., 6., 1.)]);
        assert!((e.area(&u, AreaMethod::Planar) - 7.0).abs() < 1e-9);
        assert_eq!(u.0.len(), 2);

        let frame = square(0., 0., 10., 10.);
        let gaps = e.erase(&frame, &u);
        assert!((e.area(&gaps, AreaMethod::Planar) - 93.0).abs() < 1e-9);
        assert!(e.union(&[]).0.is_empty());
    }

    #[test]
    fn test_envelope_and_split() {
        let e = GeoEngine::default();
        assert!(e.envelope(&[]).is_none());
        let env = e
            .envelope(&[square(1., 2., 3., 4.), square(-1., 0., 0., 1.)])
            .unwrap();
        assert_eq!(env.min(), Coord { x: -1., y: 0. });
        assert_eq!(env.max(), Coord { x: 3., y: 4. });

        let mut mp = square(0., 0., 1., 1.);
        mp.0.extend(square(2., 2., 3., 3.).0);
        let parts: Vec<Polygon<f64>> = e.split_multipart(mp);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_distance() {
        let e = GeoEngine::default();
        let a = square(0., 0., 1., 1.);
        assert_eq!(e.distance(&a, &square(1., 0., 2., 1.)), 0.0);
        assert!((e.distance(&a, &square(4., 0., 5., 1.)) - 3.0).abs() < 1e-12);
        assert!((e.distance(&a, &square(4., 5., 5., 6.)) - 5.0).abs() < 1e-12);
        // containment counts as intersecting
        assert_eq!(e.distance(&square(0., 0., 10., 10.), &square(4., 4., 5., 5.)), 0.0);
    }

    #[test]
    fn test_distance_to_point() {
        let a = square(0., 0., 2., 2.);
        assert_eq!(super::distance_to_point(&a, Coord { x: 1., y: 1. }), 0.0);
        assert!((super::distance_to_point(&a, Coord { x: 5., y: 1. }) - 3.0).abs() < 1e-12);
        // inside a hole the distance is to the hole's ring
        let ring = MultiPolygon::new(vec![polygon![
            exterior: [(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.)],
            interiors: [[(x: 2., y: 2.), (x: 8., y: 2.), (x: 8., y: 8.), (x: 2., y: 8.), (x: 2., y: 2.)]],
        ]]);
        assert!((super::distance_to_point(&ring, Coord { x: 5., y: 5. }) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extract_vertices() {
        let e = GeoEngine::default();
        let mut parts = e.split_multipart(square(0., 0., 1., 1.));
        parts.extend(e.split_multipart(square(1., 0., 2., 1.)));
        let v = e.extract_vertices(&parts);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], Coord { x: 0., y: 0. });
    }

    #[test]
    fn test_voronoi_alignment() {
        let e = GeoEngine::default();
        let sites = vec![
            Coord { x: 2., y: 5. },
            Coord { x: 8., y: 5. },
            Coord { x: 2., y: 5. },
        ];
        let rect = Rect::new(Coord { x: 0., y: 0. }, Coord { x: 10., y: 10. });
        let cells = e.voronoi(&sites, rect);
        assert_eq!(cells.len(), 3);
        let a0 = e.area(&MultiPolygon::new(vec![cells[0].clone()]), AreaMethod::Planar);
        assert!((a0 - 50.0).abs() < 1e-9);
        assert!(cells[2].exterior().0.is_empty());
    }

    #[test]
    fn test_equals() {
        let e = GeoEngine::default();
        let a = square(0., 0., 1., 1.);
        let mut b = square(0., 0., 1., 1.);
        b.0[0].exterior_mut(|r| r.0.reverse());
        assert!(e.equals(&a, &b));
        assert!(!e.equals(&a, &square(0., 0., 1., 2.)));
    }
}
