/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::config::{AreaMethod, PipelineConfig};
use super::error::{CoverageResult, Stage};
use super::feature::{Feature, FeatureCollection};
use super::kernel::{aabb, envelope_index, guarded, GeometryEngine};
use geo::{BoundingRect, MultiPolygon};
use log::{debug, info, warn};

/// Locations covered by two or more features count as overlap.
pub const MIN_OVERLAP_COUNT: usize = 2;

/// Outcome of overlap detection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverlapReport {
    pub has_overlap: bool,
    pub overlapping_pairs: usize,
    pub features_considered: usize,
    /// Features left out because they are marked as duplicates.
    pub features_skipped: usize,
    /// The classification field was missing, so no filtering applied.
    pub degraded: bool,
    /// Union of the overlapping areas, when requested.
    #[serde(skip)]
    pub geometry: Option<MultiPolygon<f64>>,
}

/// Whether a feature takes part in overlap detection. A feature is primary
/// unless its classification value equals the duplicate marker.
pub fn is_primary(fc: &FeatureCollection, feature: &Feature, config: &PipelineConfig) -> bool {
    match &config.classification_field {
        Some(name) => match fc.value(feature, name) {
            Some(v) => !v
                .get_as_string()
                .trim()
                .eq_ignore_ascii_case(&config.duplicate_marker),
            None => true,
        },
        None => true,
    }
}

/// Reports whether any location is covered by at least
/// `MIN_OVERLAP_COUNT` primary features. The collection is not modified.
pub fn detect_overlaps<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    config: &PipelineConfig,
    with_geometry: bool,
) -> CoverageResult<OverlapReport> {
    detect(engine, fc, config, with_geometry, true)
}

/// Same test over every feature, marked duplicates included. This is the
/// check that decides whether resolution can be skipped.
pub fn detect_any_overlap<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    config: &PipelineConfig,
) -> CoverageResult<OverlapReport> {
    detect(engine, fc, config, false, false)
}

fn detect<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    config: &PipelineConfig,
    with_geometry: bool,
    classified: bool,
) -> CoverageResult<OverlapReport> {
    let mut report = OverlapReport::default();

    let filtering = match &config.classification_field {
        _ if !classified => false,
        Some(name) if fc.field_index(name).is_none() => {
            warn!(
                "Classification field '{}' not found; every feature is treated as primary",
                name
            );
            report.degraded = true;
            false
        }
        Some(_) => true,
        None => false,
    };

    let considered: Vec<usize> = (0..fc.len())
        .filter(|&i| !filtering || is_primary(fc, &fc.features[i], config))
        .collect();
    report.features_considered = considered.len();
    report.features_skipped = fc.len() - considered.len();

    let tree = envelope_index(considered.iter().map(|&i| (i, &fc.features[i].geometry)));
    let mut pieces: Vec<MultiPolygon<f64>> = vec![];
    guarded(Stage::OverlapDetection, || {
        for &i in &considered {
            let a = &fc.features[i].geometry;
            let rect = match a.bounding_rect() {
                Some(r) => r,
                None => continue,
            };
            let mut candidates: Vec<usize> = tree
                .locate_in_envelope_intersecting(&aabb(&rect, 0f64))
                .map(|e| e.data)
                .filter(|&j| j > i)
                .collect();
            candidates.sort_unstable();
            for j in candidates {
                let shared = engine.clip(a, &fc.features[j].geometry);
                if engine.area(&shared, AreaMethod::Planar) > config.overlap_tolerance {
                    debug!(
                        "features {} and {} overlap",
                        fc.features[i].key, fc.features[j].key
                    );
                    report.overlapping_pairs += 1;
                    if with_geometry {
                        pieces.push(shared);
                    } else {
                        break;
                    }
                }
            }
            if report.overlapping_pairs > 0 && !with_geometry {
                break;
            }
        }
    })?;

    report.has_overlap = report.overlapping_pairs > 0;
    if with_geometry {
        report.geometry = Some(guarded(Stage::OverlapDetection, || engine.union(&pieces))?);
    }
    info!(
        "Overlap detection: {} feature(s) considered, {} skipped, overlap {}",
        report.features_considered,
        report.features_skipped,
        if report.has_overlap { "found" } else { "not found" }
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::{detect_any_overlap, detect_overlaps};
    use crate::coverage::config::{AreaMethod, PipelineConfig};
    use crate::coverage::feature::{Feature, FeatureCollection};
    use crate::coverage::kernel::test::square;
    use crate::coverage::kernel::{GeoEngine, GeometryEngine};
    use seamless_vector::{AttributeField, FieldData, FieldDataType};

    fn layer(marks: &[&str]) -> FeatureCollection {
        let mut fc = FeatureCollection::new(
            vec![AttributeField::new("COMP", FieldDataType::Text, 10, 0)],
            "",
        );
        let geoms = [
            square(0., 0., 2., 2.),
            square(1., 1., 3., 3.),
            square(5., 5., 6., 6.),
        ];
        for (i, g) in geoms.iter().enumerate() {
            fc.push(Feature::new(
                i as i64 + 1,
                g.clone(),
                vec![FieldData::Text(marks[i].to_string())],
            ));
        }
        fc
    }

    #[test]
    fn test_overlap_found() {
        let e = GeoEngine::default();
        let fc = layer(&["a", "b", "c"]);
        let r = detect_overlaps(&e, &fc, &PipelineConfig::default(), true).unwrap();
        assert!(r.has_overlap);
        assert_eq!(r.overlapping_pairs, 1);
        let g = r.geometry.unwrap();
        assert!((e.area(&g, AreaMethod::Planar) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let e = GeoEngine::default();
        let fc = layer(&["a", "UNKNOWN", "c"]);
        let r = detect_overlaps(&e, &fc, &PipelineConfig::default(), false).unwrap();
        assert!(!r.has_overlap);
        assert_eq!(r.features_skipped, 1);
    }

    #[test]
    fn test_marked_duplicates_still_count_for_any_overlap() {
        let e = GeoEngine::default();
        let fc = layer(&["a", "unknown", "c"]);
        let r = detect_any_overlap(&e, &fc, &PipelineConfig::default()).unwrap();
        assert!(r.has_overlap);
        assert_eq!(r.features_considered, 3);
        assert_eq!(r.features_skipped, 0);
        assert!(!r.degraded);
    }

    #[test]
    fn test_missing_classification_field_degrades() {
        let e = GeoEngine::default();
        let mut cfg = PipelineConfig::default();
        cfg.classification_field = Some("STATUS".to_string());
        let r = detect_overlaps(&e, &layer(&["a", "b", "c"]), &cfg, false).unwrap();
        assert!(r.degraded);
        assert!(r.has_overlap);
        assert_eq!(r.features_considered, 3);
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let e = GeoEngine::default();
        let mut fc = FeatureCollection::default();
        fc.push(Feature::new(1, square(0., 0., 1., 1.), vec![]));
        fc.push(Feature::new(2, square(1., 0., 2., 1.), vec![]));
        let r = detect_overlaps(&e, &fc, &PipelineConfig::default(), false).unwrap();
        assert!(!r.has_overlap);
        // no COMP field in this layer
        assert!(r.degraded);
    }
}
