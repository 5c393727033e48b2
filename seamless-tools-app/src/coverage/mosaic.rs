/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Mosaic management: removes repeated copies of identical geometry.
//!
//! The layer is overlaid with itself and every fragment is numbered within
//! its signature group in iteration order. The first copy has sequence 1.
//! Later copies are dropped, or kept and marked with the duplicate marker
//! when `keep_marked` is set. Marked copies are the features that overlap
//! detection leaves out.

use super::config::PipelineConfig;
use super::error::{CoverageResult, Stage};
use super::feature::{Feature, FeatureCollection};
use super::kernel::{guarded, GeometryEngine};
use super::resolver::{assign_origin_keys, self_union};
use super::signature::Signature;
use log::info;
use seamless_vector::{AttributeField, FieldData, FieldDataType};
use std::collections::HashMap;

/// Name of the field holding the sequence number within a signature group.
pub const SEQUENCE_FIELD: &str = "NUM_SEQ";

#[derive(Debug, Clone, Default, Serialize)]
pub struct MosaicReport {
    pub input_features: usize,
    pub fragments: usize,
    pub unique_geometries: usize,
    pub duplicates_marked: usize,
    pub duplicates_removed: usize,
    pub max_sequence: usize,
}

pub fn remove_mosaic_duplicates<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    config: &PipelineConfig,
    keep_marked: bool,
) -> CoverageResult<(FeatureCollection, MosaicReport)> {
    let mut input = fc.clone();
    assign_origin_keys(&mut input, &config.key_field)?;
    let mut report = MosaicReport {
        input_features: input.len(),
        ..Default::default()
    };

    let mut output = input.empty_like();
    // (classification, sequence) columns, only when marked copies are kept
    let marks = if keep_marked {
        let class_name = config
            .classification_field
            .clone()
            .unwrap_or_else(|| "COMP".to_string());
        let class_idx = match output.field_index(&class_name) {
            Some(i) => i,
            None => {
                output.add_field(AttributeField::new(&class_name, FieldDataType::Text, 20, 0));
                output.fields.len() - 1
            }
        };
        let seq_idx = match output.field_index(SEQUENCE_FIELD) {
            Some(i) => i,
            None => {
                output.add_field(AttributeField::new(SEQUENCE_FIELD, FieldDataType::Int, 10, 0));
                output.fields.len() - 1
            }
        };
        Some((class_idx, seq_idx))
    } else {
        None
    };

    let fragments = self_union(engine, &input, config.signature_precision)?;
    report.fragments = fragments.len();

    guarded(Stage::MosaicDeduplication, || {
        let mut counts: HashMap<Signature, usize> = HashMap::new();
        for frag in &fragments {
            let seq = counts.entry(frag.signature).or_insert(0);
            *seq += 1;
            report.max_sequence = report.max_sequence.max(*seq);
            if *seq > 1 {
                report.duplicates_marked += 1;
            }
            let mut attributes = frag.attributes.clone();
            attributes.resize(output.fields.len(), FieldData::Null);
            match marks {
                Some((class_idx, seq_idx)) => {
                    attributes[class_idx] = if *seq > 1 {
                        FieldData::Text(config.duplicate_marker.clone())
                    } else {
                        FieldData::Null
                    };
                    attributes[seq_idx] = FieldData::Int(*seq as i32);
                }
                None if *seq > 1 => {
                    report.duplicates_removed += 1;
                    continue;
                }
                None => {}
            }
            output.push(Feature::new(frag.key, frag.geometry.clone(), attributes));
        }
        report.unique_geometries = counts.len();
    })?;
    output.sort_by_key();

    info!(
        "Mosaic deduplication: {} fragment(s), {} unique, {} repeated cop(ies) marked, {} removed",
        report.fragments,
        report.unique_geometries,
        report.duplicates_marked,
        report.duplicates_removed
    );
    Ok((output, report))
}

#[cfg(test)]
mod test {
    use super::{remove_mosaic_duplicates, SEQUENCE_FIELD};
    use crate::coverage::config::{AreaMethod, PipelineConfig};
    use crate::coverage::feature::{Feature, FeatureCollection};
    use crate::coverage::kernel::test::square;
    use crate::coverage::kernel::{GeoEngine, GeometryEngine};
    use crate::coverage::overlap::detect_overlaps;
    use seamless_vector::FieldData;

    fn tiles() -> FeatureCollection {
        let mut fc = FeatureCollection::default();
        fc.push(Feature::new(0, square(0., 0., 2., 2.), vec![]));
        fc.push(Feature::new(0, square(0., 0., 2., 2.), vec![]));
        fc.push(Feature::new(0, square(1., 0., 3., 2.), vec![]));
        fc
    }

    #[test]
    fn test_repeated_geometry_removed() {
        let e = GeoEngine::default();
        let (out, report) =
            remove_mosaic_duplicates(&e, &tiles(), &PipelineConfig::default(), false).unwrap();
        // faces: 0..1 (from 1 and 2), 1..2 (1, 2, 3), 2..3 (3)
        assert_eq!(report.unique_geometries, 3);
        assert_eq!(report.duplicates_marked, 3);
        assert_eq!(report.duplicates_removed, 3);
        assert_eq!(report.max_sequence, 3);
        assert_eq!(out.len(), 3);
        let total: f64 = out
            .features
            .iter()
            .map(|f| e.area(&f.geometry, AreaMethod::Planar))
            .sum();
        assert!((total - 6.0).abs() < 1e-9);
        assert!(out.field_index(SEQUENCE_FIELD).is_none());
        assert!(out.field_index("COMP").is_none());
    }

    #[test]
    fn test_marked_copies_kept() {
        let e = GeoEngine::default();
        let cfg = PipelineConfig::default();
        let (out, report) = remove_mosaic_duplicates(&e, &tiles(), &cfg, true).unwrap();
        assert_eq!(report.duplicates_marked, 3);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(out.len(), 6);

        let marked: Vec<&Feature> = out
            .features
            .iter()
            .filter(|f| out.value(f, "COMP") == Some(&FieldData::Text("unknown".to_string())))
            .collect();
        assert_eq!(marked.len(), 3);
        for f in &marked {
            match out.value(f, SEQUENCE_FIELD) {
                Some(FieldData::Int(n)) => assert!(*n > 1),
                other => panic!("unexpected sequence {:?}", other),
            }
        }

        // only the marked copies overlap, and overlap detection skips them
        let r = detect_overlaps(&e, &out, &cfg, false).unwrap();
        assert_eq!(r.features_skipped, 3);
        assert!(!r.has_overlap);
    }
}
