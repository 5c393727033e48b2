/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::config::{AreaMethod, GapFilter, PipelineConfig};
use super::error::{CoverageError, CoverageResult, Stage};
use super::feature::FeatureCollection;
use super::kernel::{aabb, envelope_index, guarded, rect_to_multipolygon, GeometryEngine};
use super::workspace::Workspace;
use geo::{BoundingRect, Coord, MultiPolygon, Polygon};
use log::{debug, info};

/// Cells at or below this planar area are clipping slivers.
const MIN_CELL_AREA: f64 = 1e-12;

/// A piece of uncovered area, ready to be attributed to a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct GapCell {
    pub geometry: Polygon<f64>,
    /// The vertex that generated the Thiessen cell.
    pub site: Coord<f64>,
    /// Index of the gap part the cell was clipped to.
    pub part: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TessellationReport {
    pub envelope_area: f64,
    pub uncovered_parts: usize,
    pub discarded_parts: usize,
    pub discarded_area: f64,
    pub vertices: usize,
    pub thiessen_cells: usize,
    pub gap_cells: usize,
    pub gap_area: f64,
}

/// Partitions the uncovered area inside the envelope of `resolved` into
/// Thiessen cells built on the vertices of the gaps.
///
/// Areas used by the gap filter are square metres: geodesic for geographic
/// layers, map units squared otherwise. An empty result means the features
/// already cover their envelope.
pub fn tessellate_gaps<E: GeometryEngine + ?Sized>(
    engine: &E,
    resolved: &FeatureCollection,
    config: &PipelineConfig,
    workspace: Option<&Workspace>,
) -> CoverageResult<(Vec<GapCell>, TessellationReport)> {
    let mut report = TessellationReport::default();
    let geoms: Vec<MultiPolygon<f64>> = resolved
        .features
        .iter()
        .map(|f| f.geometry.clone())
        .collect();
    let method = config.area_method.resolve(resolved.is_geographic());
    let projection = resolved.projection.as_str();

    // Step 1: envelope
    let envelope = engine
        .envelope(&geoms)
        .ok_or(CoverageError::NoInputGeometry {
            stage: Stage::GapTessellation,
        })?;
    let frame = rect_to_multipolygon(&envelope);
    report.envelope_area = engine.area(&frame, method);
    if let Some(ws) = workspace {
        ws.store_polygons("envelope", &frame.0, projection)?;
    }

    // Steps 2 and 3: erase the coverage, split into single parts
    let parts = guarded(Stage::GapTessellation, || {
        let coverage = engine.union(&geoms);
        engine.split_multipart(engine.erase(&frame, &coverage))
    })?;
    report.uncovered_parts = parts.len();
    if let Some(ws) = workspace {
        ws.store_polygons("uncovered_parts", &parts, projection)?;
    }

    // Step 4: area filter
    let areas: Vec<f64> = parts
        .iter()
        .map(|p| engine.area(&MultiPolygon::new(vec![p.clone()]), method))
        .collect();
    let discard = discarded_parts(&areas, config.gap_filter);
    let mut kept: Vec<Polygon<f64>> = vec![];
    for (i, p) in parts.into_iter().enumerate() {
        if discard[i] {
            report.discarded_parts += 1;
            report.discarded_area += areas[i];
            debug!("gap part {} discarded ({} m²)", i, areas[i]);
        } else {
            kept.push(p);
        }
    }
    if kept.is_empty() {
        info!(
            "Gap tessellation: no gaps to fill ({} part(s) discarded)",
            report.discarded_parts
        );
        return Ok((vec![], report));
    }
    if let Some(ws) = workspace {
        ws.store_polygons("gap_parts", &kept, projection)?;
    }

    // Step 5: vertices
    let sites = engine.extract_vertices(&kept);
    report.vertices = sites.len();
    if let Some(ws) = workspace {
        ws.store_points("gap_vertices", &sites, projection)?;
    }

    // Steps 6 and 7: Thiessen cells clipped to the gap parts
    let clipped = guarded(Stage::GapTessellation, || {
        let thiessen = engine.voronoi(&sites, envelope);
        let kept_mp: Vec<MultiPolygon<f64>> = kept
            .iter()
            .map(|p| MultiPolygon::new(vec![p.clone()]))
            .collect();
        let tree = envelope_index(kept_mp.iter().enumerate());
        let mut cells = vec![];
        let mut non_empty = vec![];
        for (i, cell) in thiessen.into_iter().enumerate() {
            let rect = match cell.bounding_rect() {
                Some(r) => r,
                None => continue,
            };
            let cell = MultiPolygon::new(vec![cell]);
            let mut candidates: Vec<usize> = tree
                .locate_in_envelope_intersecting(&aabb(&rect, 0f64))
                .map(|e| e.data)
                .collect();
            candidates.sort_unstable();
            for p in candidates {
                for piece in engine.split_multipart(engine.clip(&cell, &kept_mp[p])) {
                    let mp = MultiPolygon::new(vec![piece]);
                    if engine.area(&mp, AreaMethod::Planar) > MIN_CELL_AREA {
                        if let Some(piece) = mp.0.into_iter().next() {
                            cells.push(GapCell {
                                geometry: piece,
                                site: sites[i],
                                part: p,
                            });
                        }
                    }
                }
            }
            non_empty.push(cell);
        }
        (cells, non_empty)
    })?;
    let (cells, thiessen) = clipped;
    report.thiessen_cells = thiessen.len();
    report.gap_cells = cells.len();
    report.gap_area = cells
        .iter()
        .map(|c| engine.area(&MultiPolygon::new(vec![c.geometry.clone()]), method))
        .sum();
    if let Some(ws) = workspace {
        let polys: Vec<Polygon<f64>> = thiessen.into_iter().flat_map(|m| m.0).collect();
        ws.store_polygons("thiessen_cells", &polys, projection)?;
        let polys: Vec<Polygon<f64>> = cells.iter().map(|c| c.geometry.clone()).collect();
        ws.store_polygons("gap_cells", &polys, projection)?;
    }

    info!(
        "Gap tessellation: {} uncovered part(s), {} discarded, {} vertices, {} gap cell(s)",
        report.uncovered_parts, report.discarded_parts, report.vertices, report.gap_cells
    );
    Ok((cells, report))
}

/// Which parts the filter removes. `LargestPart` removes only the first
/// part of maximal area.
pub fn discarded_parts(areas: &[f64], filter: GapFilter) -> Vec<bool> {
    match filter {
        GapFilter::None => vec![false; areas.len()],
        GapFilter::MaxAreaKm2(km2) => {
            let threshold = km2 * 1_000_000f64;
            areas.iter().map(|&a| a > threshold).collect()
        }
        GapFilter::LargestPart => {
            let mut discard = vec![false; areas.len()];
            let mut largest: Option<usize> = None;
            for (i, &a) in areas.iter().enumerate() {
                match largest {
                    Some(l) if areas[l] >= a => {}
                    _ => largest = Some(i),
                }
            }
            if let Some(l) = largest {
                discard[l] = true;
            }
            discard
        }
    }
}
