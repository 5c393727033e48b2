/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use super::{polygon_area, triangulate};
use crate::structures::{BoundingBox, Point2D};
use std::collections::BTreeSet;

/// Relative tolerance on the total cell area before falling back to the
/// exhaustive construction.
const AREA_TOLERANCE: f64 = 1e-7;

/// Builds the Voronoi cell of every site, clipped to `extent`.
///
/// The returned vector is aligned with `sites`. Each cell is an open,
/// counter-clockwise ring. Repeated sites share one cell: the first
/// occurrence receives it and later copies get an empty ring. A site that
/// falls outside the extent may also yield an empty ring.
///
/// Cells are formed by cutting the extent rectangle with the perpendicular
/// bisector between a site and each of its Delaunay neighbours. When the
/// triangulation is unavailable (fewer than three distinct sites, or all
/// sites collinear) or the cells fail to tile the extent, every other site
/// is used as a neighbour instead.
pub fn voronoi_cells(sites: &[Point2D], extent: BoundingBox) -> Vec<Vec<Point2D>> {
    let mut cells = vec![vec![]; sites.len()];
    if sites.is_empty() {
        return cells;
    }

    // unique sites, in first-seen order
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        sites[a]
            .x
            .total_cmp(&sites[b].x)
            .then(sites[a].y.total_cmp(&sites[b].y))
            .then(a.cmp(&b))
    });
    let mut unique: Vec<usize> = Vec::with_capacity(sites.len());
    let mut prev: Option<usize> = None;
    for i in order {
        if let Some(p) = prev {
            if sites[p] == sites[i] {
                continue;
            }
        }
        unique.push(i);
        prev = Some(i);
    }
    unique.sort_unstable();
    let points: Vec<Point2D> = unique.iter().map(|&i| sites[i]).collect();

    let rect: Vec<Point2D> = extent.corners().to_vec();
    let extent_area = extent.get_width() * extent.get_height();

    let mut built = match triangulate(&points) {
        Some(t) => {
            let neighbours = t.point_neighbours(points.len());
            build_cells(&points, &rect, |i| neighbours[i].clone())
        }
        None => vec![],
    };

    let total: f64 = built.iter().map(|c| polygon_area(c)).sum();
    let all_inside = points.iter().all(|p| extent.is_point_in_box(p.x, p.y));
    if built.len() != points.len()
        || (all_inside && (total - extent_area).abs() > AREA_TOLERANCE * extent_area.max(1f64))
    {
        let n = points.len();
        built = build_cells(&points, &rect, |i| (0..n).filter(|&j| j != i).collect());
    }

    for (k, cell) in built.into_iter().enumerate() {
        cells[unique[k]] = cell;
    }
    cells
}

fn build_cells<F>(points: &[Point2D], rect: &[Point2D], neighbours_of: F) -> Vec<Vec<Point2D>>
where
    F: Fn(usize) -> BTreeSet<usize>,
{
    let mut cells = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let mut cell = rect.to_vec();
        for j in neighbours_of(i) {
            cell = clip_to_bisector(&cell, &points[i], &points[j]);
            if cell.is_empty() {
                break;
            }
        }
        cells.push(cell);
    }
    cells
}

/// Keeps the part of a convex ring that is at least as close to `site` as
/// to `other` (Sutherland-Hodgman against one half-plane).
fn clip_to_bisector(ring: &[Point2D], site: &Point2D, other: &Point2D) -> Vec<Point2D> {
    let m = Point2D::midpoint(site, other);
    let d = *other - *site;
    let side = |p: &Point2D| (p.x - m.x) * d.x + (p.y - m.y) * d.y;

    let n = ring.len();
    let mut output = Vec::with_capacity(n + 1);
    for k in 0..n {
        let cur = ring[k];
        let next = ring[(k + 1) % n];
        let s_cur = side(&cur);
        let s_next = side(&next);
        if s_cur <= 0f64 {
            output.push(cur);
        }
        if (s_cur < 0f64 && s_next > 0f64) || (s_cur > 0f64 && s_next < 0f64) {
            let t = s_cur / (s_cur - s_next);
            output.push(Point2D::new(
                cur.x + t * (next.x - cur.x),
                cur.y + t * (next.y - cur.y),
            ));
        }
    }
    output.dedup();
    if output.len() > 1 && output[0] == output[output.len() - 1] {
        output.pop();
    }
    if output.len() < 3 {
        output.clear();
    }
    output
}
