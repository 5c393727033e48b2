/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::config::PipelineConfig;
use super::error::{Anomaly, AnomalyKind, Stage};
use super::feature::{Feature, FeatureCollection};
use super::kernel::{aabb, distance_to_point, envelope_index, GeometryEngine};
use super::tessellation::GapCell;
use geo::{BoundingRect, MultiPolygon};
use log::{debug, info, warn};
use seamless_vector::{AttributeField, FieldData, FieldDataType};

/// Number of features intersecting a joined cell.
pub const JOIN_COUNT_FIELD: &str = "Join_Count";

#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinReport {
    pub cells: usize,
    pub joined: usize,
    pub multiple_matches: usize,
    pub unmatched: usize,
    pub assigned_to_nearest: usize,
    pub unassigned: usize,
    pub output_records: usize,
    pub anomalies: Vec<Anomaly>,
}

/// One-to-one spatial join of gap cells onto features with an intersects
/// predicate.
///
/// Each joined cell carries the key and attributes of its feature plus a
/// `Join_Count` field. When several features intersect a cell, the one
/// nearest to the cell's site is kept (ties go to the smaller key). A cell
/// that intersects nothing goes to the nearest feature when
/// `assign_unmatched_to_nearest` is set; otherwise it is left out of the
/// result. Both cases are recorded as anomalies.
pub fn spatial_join<E: GeometryEngine + ?Sized>(
    engine: &E,
    cells: &[GapCell],
    resolved: &FeatureCollection,
    config: &PipelineConfig,
) -> (FeatureCollection, JoinReport) {
    let mut report = JoinReport {
        cells: cells.len(),
        ..Default::default()
    };
    let mut joined = resolved.empty_like();
    joined.add_field(AttributeField::new(JOIN_COUNT_FIELD, FieldDataType::Int, 10, 0));

    let tree = envelope_index(
        resolved
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| (i, &f.geometry)),
    );

    for cell in cells {
        let geom = MultiPolygon::new(vec![cell.geometry.clone()]);
        let rect = match geom.bounding_rect() {
            Some(r) => r,
            None => continue,
        };
        let mut matches: Vec<usize> = tree
            .locate_in_envelope_intersecting(&aabb(&rect, 0f64))
            .map(|e| e.data)
            .filter(|&j| engine.intersects(&geom, &resolved.features[j].geometry))
            .collect();
        matches.sort_unstable();

        let owner = match matches.len() {
            0 => {
                report.unmatched += 1;
                if config.assign_unmatched_to_nearest {
                    let nearest = nearest_feature(engine, &geom, resolved);
                    if let Some(j) = nearest {
                        report.assigned_to_nearest += 1;
                        report.anomalies.push(Anomaly::new(
                            Stage::JoinAndAggregate,
                            AnomalyKind::UnmatchedGapCell,
                            Some(resolved.features[j].key),
                            "gap cell intersects no feature; assigned to the nearest",
                        ));
                    }
                    nearest
                } else {
                    None
                }
            }
            1 => Some(matches[0]),
            n => {
                report.multiple_matches += 1;
                let chosen = matches
                    .iter()
                    .map(|&j| {
                        (
                            j,
                            distance_to_point(&resolved.features[j].geometry, cell.site),
                        )
                    })
                    .min_by(|a, b| {
                        a.1.total_cmp(&b.1).then(
                            resolved.features[a.0]
                                .key
                                .cmp(&resolved.features[b.0].key)
                                .then(a.0.cmp(&b.0)),
                        )
                    })
                    .map(|(j, _)| j);
                if let Some(j) = chosen {
                    debug!(
                        "gap cell at ({}, {}) intersects {} features; kept key {}",
                        cell.site.x, cell.site.y, n, resolved.features[j].key
                    );
                    report.anomalies.push(Anomaly::new(
                        Stage::JoinAndAggregate,
                        AnomalyKind::MultipleMatches,
                        Some(resolved.features[j].key),
                        format!("gap cell intersects {} features; one match kept", n),
                    ));
                }
                chosen
            }
        };

        match owner {
            Some(j) => {
                let f = &resolved.features[j];
                let mut attributes = f.attributes.clone();
                attributes.resize(resolved.fields.len(), FieldData::Null);
                attributes.push(FieldData::Int(matches.len() as i32));
                joined.push(Feature::new(f.key, geom, attributes));
                report.joined += 1;
            }
            None => {
                report.unassigned += 1;
                report.anomalies.push(Anomaly::new(
                    Stage::JoinAndAggregate,
                    AnomalyKind::UnmatchedGapCell,
                    None,
                    format!(
                        "gap cell at ({}, {}) left unassigned",
                        cell.site.x, cell.site.y
                    ),
                ));
            }
        }
    }

    if report.multiple_matches > 0 {
        warn!(
            "{} gap cell(s) intersected more than one feature",
            report.multiple_matches
        );
    }
    if report.unassigned > 0 {
        warn!("{} gap cell(s) were left unassigned", report.unassigned);
    }
    info!(
        "Spatial join: {} of {} gap cell(s) joined",
        report.joined, report.cells
    );
    (joined, report)
}

fn nearest_feature<E: GeometryEngine + ?Sized>(
    engine: &E,
    geom: &MultiPolygon<f64>,
    fc: &FeatureCollection,
) -> Option<usize> {
    fc.features
        .iter()
        .enumerate()
        .map(|(j, f)| (j, engine.distance(geom, &f.geometry)))
        .filter(|(_, d)| d.is_finite())
        .min_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(fc.features[a.0].key.cmp(&fc.features[b.0].key))
        })
        .map(|(j, _)| j)
}
