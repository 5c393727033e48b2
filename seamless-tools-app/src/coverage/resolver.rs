/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Self-overlap resolution.
//!
//! The layer is overlaid with itself so that every location covered by
//! several features becomes a face of its own. Faces are collapsed by
//! content signature into one record each. A record that came from two or
//! more overlapping originals is a merge product (`NEW`) and inherits the
//! identity of its nearest `EXISTING` neighbour, keeping its own geometry.

use super::config::{AreaMethod, PipelineConfig};
use super::error::{Anomaly, AnomalyKind, CoverageError, CoverageResult, Stage};
use super::feature::{Classification, Feature, FeatureCollection, OriginKey, OriginSet};
use super::kernel::{aabb, bounds_overlap, envelope_index, guarded, GeometryEngine};
use super::signature::Signature;
use geo::{BoundingRect, MultiPolygon};
use log::{debug, info, warn};
use seamless_vector::FieldData;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Faces at or below this area are overlay slivers and are dropped.
const MIN_FACE_AREA: f64 = 1e-12;

/// One face of the self-union, as contributed by one original feature.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub key: OriginKey,
    pub attributes: Vec<FieldData>,
    pub geometry: MultiPolygon<f64>,
    pub signature: Signature,
    /// Index of the face this fragment belongs to.
    pub face: usize,
}

/// All fragments sharing a signature, collapsed into one record.
#[derive(Debug, Clone)]
pub struct DissolvedFragment {
    pub signature: Signature,
    pub geometry: MultiPolygon<f64>,
    pub origins: OriginSet,
    /// Attributes of the first fragment encountered.
    pub attributes: Vec<FieldData>,
    pub first_key: OriginKey,
    pub classification: Classification,
    /// The key that owns this record in the resolved layer.
    pub owner: OriginKey,
}

/// The neighbour chosen for a `NEW` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reassignment {
    pub record: usize,
    pub neighbour: Option<usize>,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveReport {
    pub input_features: usize,
    pub fragments: usize,
    pub dissolved: usize,
    pub existing: usize,
    pub new: usize,
    pub reassigned: usize,
    pub unresolved: usize,
    /// Input keys that own no record after resolution.
    pub absorbed_keys: Vec<OriginKey>,
    pub anomalies: Vec<Anomaly>,
}

/// Gives every feature a stable origin key and moves the key out of the
/// attribute table into `Feature::key`.
///
/// When `key_field` exists its integer values are kept, null values are
/// replaced with fresh keys above the current maximum, and any other value
/// is an error. When it is absent, keys 1, 2, 3... are assigned in the
/// current feature order. Returns the number of keys created.
pub fn assign_origin_keys(fc: &mut FeatureCollection, key_field: &str) -> CoverageResult<usize> {
    if fc.has_keys() {
        return Ok(0);
    }
    if key_field.trim().is_empty() {
        return Err(CoverageError::Precondition {
            field: key_field.to_string(),
            reason: "an origin-key field name is required".to_string(),
        });
    }

    let created = match fc.field_index(key_field) {
        Some(idx) => {
            let mut keys: Vec<Option<OriginKey>> = Vec::with_capacity(fc.len());
            for (i, f) in fc.features.iter().enumerate() {
                let v = f.attributes.get(idx).cloned().unwrap_or(FieldData::Null);
                if v.is_null() {
                    keys.push(None);
                    continue;
                }
                match v.as_i64() {
                    Some(k) => keys.push(Some(k)),
                    None => {
                        return Err(CoverageError::Precondition {
                            field: fc.fields[idx].name.clone(),
                            reason: format!(
                                "value '{}' of record {} is not an integer key",
                                v,
                                i + 1
                            ),
                        })
                    }
                }
            }
            let mut next = keys.iter().flatten().copied().max().unwrap_or(0);
            let mut created = 0usize;
            for (f, k) in fc.features.iter_mut().zip(keys) {
                f.key = match k {
                    Some(k) => k,
                    None => {
                        next += 1;
                        created += 1;
                        next
                    }
                };
                if idx < f.attributes.len() {
                    f.attributes.remove(idx);
                }
            }
            if created > 0 {
                warn!(
                    "{} record(s) had a null '{}' value and received a new key",
                    created, key_field
                );
            }
            fc.key_field = fc.fields.remove(idx).name;
            created
        }
        None => {
            for (i, f) in fc.features.iter_mut().enumerate() {
                f.key = i as OriginKey + 1;
            }
            fc.key_field = key_field.to_string();
            fc.len()
        }
    };

    let distinct: BTreeSet<OriginKey> = fc.keys();
    if distinct.len() < fc.len() {
        warn!(
            "'{}' holds {} repeated key value(s)",
            fc.key_field,
            fc.len() - distinct.len()
        );
    }
    Ok(created)
}

struct Face {
    geometry: MultiPolygon<f64>,
    contributors: Vec<usize>,
}

/// Overlays the collection with itself. Features are added in ascending key
/// order; each face of the overlay is emitted once per contributing feature,
/// carrying that feature's key and attributes.
pub fn self_union<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    precision: usize,
) -> CoverageResult<Vec<Fragment>> {
    let mut order: Vec<usize> = (0..fc.len()).collect();
    order.sort_by_key(|&i| fc.features[i].key);

    let faces = guarded(Stage::SelfOverlapResolution, || {
        let mut faces: Vec<Face> = vec![];
        for &idx in &order {
            let geom = &fc.features[idx].geometry;
            let mut remaining = geom.clone();
            let mut next: Vec<Face> = Vec::with_capacity(faces.len() + 2);
            for face in faces.drain(..) {
                if !bounds_overlap(&face.geometry, geom) {
                    next.push(face);
                    continue;
                }
                let inside = engine.clip(&face.geometry, geom);
                if engine.area(&inside, AreaMethod::Planar) <= MIN_FACE_AREA {
                    next.push(face);
                    continue;
                }
                let outside = engine.erase(&face.geometry, geom);
                remaining = engine.erase(&remaining, &face.geometry);
                push_parts(engine, &mut next, outside, &face.contributors);
                let mut with_idx = face.contributors.clone();
                with_idx.push(idx);
                push_parts(engine, &mut next, inside, &with_idx);
            }
            push_parts(engine, &mut next, remaining, &[idx]);
            faces = next;
        }
        faces
    })?;

    let mut fragments = vec![];
    for (i, face) in faces.iter().enumerate() {
        let signature = Signature::of(&face.geometry, precision);
        for &c in &face.contributors {
            fragments.push(Fragment {
                key: fc.features[c].key,
                attributes: fc.features[c].attributes.clone(),
                geometry: face.geometry.clone(),
                signature,
                face: i,
            });
        }
    }
    debug!("self-union: {} face(s), {} fragment(s)", faces.len(), fragments.len());
    Ok(fragments)
}

fn push_parts<E: GeometryEngine + ?Sized>(
    engine: &E,
    faces: &mut Vec<Face>,
    geom: MultiPolygon<f64>,
    contributors: &[usize],
) {
    for part in engine.split_multipart(geom) {
        let part = MultiPolygon::new(vec![part]);
        if engine.area(&part, AreaMethod::Planar) > MIN_FACE_AREA {
            faces.push(Face {
                geometry: part,
                contributors: contributors.to_vec(),
            });
        }
    }
}

/// Collapses fragments with identical signatures, in first-encountered
/// order. Origin keys are collected; other attributes come from the first
/// fragment of each group.
pub fn dissolve_by_signature(fragments: &[Fragment]) -> Vec<DissolvedFragment> {
    let mut index: HashMap<Signature, usize> = HashMap::new();
    let mut out: Vec<DissolvedFragment> = vec![];
    for frag in fragments {
        match index.get(&frag.signature) {
            Some(&i) => {
                out[i].origins.insert(frag.key);
            }
            None => {
                index.insert(frag.signature, out.len());
                out.push(DissolvedFragment {
                    signature: frag.signature,
                    geometry: frag.geometry.clone(),
                    origins: OriginSet::from_key(frag.key),
                    attributes: frag.attributes.clone(),
                    first_key: frag.key,
                    classification: Classification::Existing,
                    owner: frag.key,
                });
            }
        }
    }
    out
}

/// Marks merge products as `NEW`. Returns the (existing, new) counts.
pub fn classify(records: &mut [DissolvedFragment]) -> (usize, usize) {
    let mut new = 0usize;
    for r in records.iter_mut() {
        r.classification = if r.origins.is_merge_product() {
            new += 1;
            Classification::New
        } else {
            Classification::Existing
        };
    }
    (records.len() - new, new)
}

/// Gives every `NEW` record the owner and attributes of its nearest other
/// record, whatever its classification. Candidates are ranked by boundary
/// distance, then by smaller area, then by record order. A record is never
/// its own neighbour. Owners are read before any reassignment is applied.
/// Records with no candidate keep their first key and are returned with
/// `neighbour: None`.
pub fn reassign_new_records<E: GeometryEngine + ?Sized>(
    engine: &E,
    records: &mut [DissolvedFragment],
    area_method: AreaMethod,
) -> Vec<Reassignment> {
    let tree = envelope_index(records.iter().enumerate().map(|(i, r)| (i, &r.geometry)));
    let areas: Vec<f64> = records
        .iter()
        .map(|r| engine.area(&r.geometry, area_method))
        .collect();

    let mut result = vec![];
    for i in 0..records.len() {
        if records[i].classification != Classification::New {
            continue;
        }
        let geom = &records[i].geometry;
        let mut best: Option<(usize, f64)> = None;
        if let Some(rect) = geom.bounding_rect() {
            let centre = [
                (rect.min().x + rect.max().x) / 2f64,
                (rect.min().y + rect.max().y) / 2f64,
            ];
            if let Some(seed) = tree.nearest_neighbor_iter(&centre).find(|e| e.data != i) {
                // every record closer than the seed lies within this reach
                let reach = engine.distance(geom, &records[seed.data].geometry);
                let margin = reach + reach.abs() * 1e-9 + 1e-12;
                let mut candidates: Vec<usize> = tree
                    .locate_in_envelope_intersecting(&aabb(&rect, margin))
                    .map(|e| e.data)
                    .filter(|&j| j != i)
                    .collect();
                candidates.sort_unstable();
                for j in candidates {
                    let d = engine.distance(geom, &records[j].geometry);
                    let better = match best {
                        None => true,
                        Some((b, bd)) => rank(d, areas[j], j, bd, areas[b], b) == Ordering::Less,
                    };
                    if better {
                        best = Some((j, d));
                    }
                }
            }
        }
        result.push(Reassignment {
            record: i,
            neighbour: best.map(|(j, _)| j),
            distance: best.map(|(_, d)| d).unwrap_or(f64::INFINITY),
        });
    }

    for r in &result {
        if let Some(j) = r.neighbour {
            let owner = records[j].owner;
            let attributes = records[j].attributes.clone();
            debug!(
                "merge product of {} assigned to {} at distance {}",
                records[r.record].origins, owner, r.distance
            );
            records[r.record].owner = owner;
            records[r.record].attributes = attributes;
        }
    }
    result
}

fn rank(d1: f64, a1: f64, i1: usize, d2: f64, a2: f64, i2: usize) -> Ordering {
    d1.total_cmp(&d2)
        .then(a1.total_cmp(&a2))
        .then(i1.cmp(&i2))
}

/// Runs the whole resolver: keys, self-union, dissolve by signature,
/// classification and reassignment. The result holds one feature per
/// dissolved record, keyed by its owner, in ascending key order.
pub fn resolve_self_overlaps<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    config: &PipelineConfig,
) -> CoverageResult<(FeatureCollection, ResolveReport)> {
    let mut input = fc.clone();
    assign_origin_keys(&mut input, &config.key_field)?;
    let mut report = ResolveReport {
        input_features: input.len(),
        ..Default::default()
    };
    let mut output = input.empty_like();
    if input.is_empty() {
        return Ok((output, report));
    }

    let fragments = self_union(engine, &input, config.signature_precision)?;
    report.fragments = fragments.len();
    let mut records = dissolve_by_signature(&fragments);
    report.dissolved = records.len();
    let (existing, new) = classify(&mut records);
    report.existing = existing;
    report.new = new;

    let area_method = config.area_method.resolve(input.is_geographic());
    let reassignments = guarded(Stage::SelfOverlapResolution, || {
        reassign_new_records(engine, &mut records, area_method)
    })?;
    for r in &reassignments {
        match r.neighbour {
            Some(_) => report.reassigned += 1,
            None => {
                let rec = &records[r.record];
                warn!(
                    "Merge product of keys {} has no neighbour; kept under key {}",
                    rec.origins, rec.first_key
                );
                report.unresolved += 1;
                report.anomalies.push(Anomaly::new(
                    Stage::SelfOverlapResolution,
                    AnomalyKind::UnresolvedNewRecord,
                    Some(rec.first_key),
                    format!("merge product of keys {} has no neighbour", rec.origins),
                ));
            }
        }
    }

    for rec in records {
        output.push(Feature::new(rec.owner, rec.geometry, rec.attributes));
    }
    output.sort_by_key();

    let kept = output.keys();
    report.absorbed_keys = input
        .keys()
        .into_iter()
        .filter(|k| !kept.contains(k))
        .collect();

    info!(
        "Self-overlap resolution: {} feature(s) -> {} fragment(s) -> {} record(s) ({} existing, {} new, {} reassigned, {} unresolved)",
        report.input_features,
        report.fragments,
        report.dissolved,
        report.existing,
        report.new,
        report.reassigned,
        report.unresolved
    );
    if !report.absorbed_keys.is_empty() {
        info!("Keys fully absorbed by other features: {:?}", report.absorbed_keys);
    }
    Ok((output, report))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coverage::kernel::test::square;
    use crate::coverage::kernel::GeoEngine;
    use seamless_vector::{AttributeField, FieldDataType};

    fn keyed(geoms: Vec<MultiPolygon<f64>>) -> FeatureCollection {
        let mut fc = FeatureCollection::new(
            vec![AttributeField::new("NAME", FieldDataType::Text, 10, 0)],
            "",
        );
        for (i, g) in geoms.into_iter().enumerate() {
            fc.push(Feature::new(
                0,
                g,
                vec![FieldData::Text(format!("f{}", i + 1))],
            ));
        }
        fc
    }

    #[test]
    fn test_assign_keys_created() {
        let mut fc = keyed(vec![square(0., 0., 1., 1.), square(2., 0., 3., 1.)]);
        assert_eq!(assign_origin_keys(&mut fc, "OID_ORIG").unwrap(), 2);
        assert_eq!(fc.features[1].key, 2);
        assert_eq!(fc.key_field, "OID_ORIG");
        // already keyed
        assert_eq!(assign_origin_keys(&mut fc, "OID_ORIG").unwrap(), 0);
    }

    #[test]
    fn test_assign_keys_existing_field() {
        let mut fc = FeatureCollection::new(
            vec![
                AttributeField::new("ID", FieldDataType::Int, 10, 0),
                AttributeField::new("NAME", FieldDataType::Text, 10, 0),
            ],
            "",
        );
        for v in [FieldData::Int(10), FieldData::Null, FieldData::Int(4)] {
            fc.push(Feature::new(
                0,
                square(0., 0., 1., 1.),
                vec![v, FieldData::Text("x".to_string())],
            ));
        }
        assert_eq!(assign_origin_keys(&mut fc, "id").unwrap(), 1);
        let keys: Vec<i64> = fc.features.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec![10, 11, 4]);
        assert_eq!(fc.fields.len(), 1);
        assert_eq!(fc.features[0].attributes.len(), 1);
        assert_eq!(fc.key_field, "ID");
    }

    #[test]
    fn test_assign_keys_rejects_text() {
        let mut fc = FeatureCollection::new(
            vec![AttributeField::new("ID", FieldDataType::Text, 10, 0)],
            "",
        );
        fc.push(Feature::new(
            0,
            square(0., 0., 1., 1.),
            vec![FieldData::Text("abc".to_string())],
        ));
        match assign_origin_keys(&mut fc, "ID") {
            Err(CoverageError::Precondition { field, .. }) => assert_eq!(field, "ID"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(!fc.has_keys());
    }

    #[test]
    fn test_self_union_faces() {
        let e = GeoEngine::default();
        let mut fc = keyed(vec![square(0., 0., 2., 2.), square(1., 0., 3., 2.)]);
        assign_origin_keys(&mut fc, "OID_ORIG").unwrap();
        let frags = self_union(&e, &fc, 9).unwrap();
        // A only, A and B, B only
        assert_eq!(frags.len(), 4);
        let records = dissolve_by_signature(&frags);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].origins.to_string(), "1;2");
        assert_eq!(records[1].attributes[0], FieldData::Text("f1".to_string()));
    }

    #[test]
    fn test_resolve_tie_break_by_order() {
        let e = GeoEngine::default();
        let fc = keyed(vec![square(0., 0., 2., 2.), square(1., 0., 3., 2.)]);
        for _ in 0..3 {
            let (out, report) = resolve_self_overlaps(&e, &fc, &PipelineConfig::default()).unwrap();
            assert_eq!(report.new, 1);
            assert_eq!(report.reassigned, 1);
            // both neighbours touch and have equal area: the first wins
            let owners: Vec<i64> = out.features.iter().map(|f| f.key).collect();
            assert_eq!(owners, vec![1, 1, 2]);
        }
    }

    #[test]
    fn test_resolve_tie_break_by_area() {
        let e = GeoEngine::default();
        let fc = keyed(vec![square(0., 0., 3., 2.), square(2., 0., 3.5, 2.)]);
        let (out, _) = resolve_self_overlaps(&e, &fc, &PipelineConfig::default()).unwrap();
        let total: f64 = out
            .features
            .iter()
            .filter(|f| f.key == 2)
            .map(|f| e.area(&f.geometry, AreaMethod::Planar))
            .sum();
        // overlap (2 units) joins the smaller B-only face (1 unit)
        assert!((total - 3.0).abs() < 1e-9);
        let f = &out.features[out.len() - 1];
        assert_eq!(f.attributes[0], FieldData::Text("f2".to_string()));
    }

    #[test]
    fn test_nearest_wins_over_area() {
        let e = GeoEngine::default();
        // the overlap of 1 and 2 touches 2's remainder, 3 is far away and tiny
        let fc = keyed(vec![
            square(0., 0., 2., 2.),
            square(0., 0., 4., 2.),
            square(10., 0., 10.5, 0.5),
        ]);
        let (out, report) = resolve_self_overlaps(&e, &fc, &PipelineConfig::default()).unwrap();
        assert_eq!(report.absorbed_keys, vec![1]);
        assert_eq!(out.keys().into_iter().collect::<Vec<i64>>(), vec![2, 3]);
    }

    #[test]
    fn test_identical_pair_unresolved() {
        let e = GeoEngine::default();
        let fc = keyed(vec![square(0., 0., 1., 1.), square(0., 0., 1., 1.)]);
        let (out, report) = resolve_self_overlaps(&e, &fc, &PipelineConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.features[0].key, 1);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.anomalies[0].kind, AnomalyKind::UnresolvedNewRecord);
        assert_eq!(report.absorbed_keys, vec![2]);
    }

    #[test]
    fn test_new_records_take_new_neighbours() {
        let e = GeoEngine::default();
        // two copies of one square with a smaller square inside: both faces are merge products
        let fc = keyed(vec![
            square(0., 0., 3., 3.),
            square(0., 0., 3., 3.),
            square(1., 1., 2., 2.),
        ]);
        let (out, report) = resolve_self_overlaps(&e, &fc, &PipelineConfig::default()).unwrap();
        assert_eq!(report.new, 2);
        assert_eq!(report.reassigned, 2);
        assert_eq!(report.unresolved, 0);
        assert!(report.anomalies.is_empty());
        assert_eq!(out.len(), 2);
        let total: f64 = out
            .features
            .iter()
            .map(|f| e.area(&f.geometry, AreaMethod::Planar))
            .sum();
        assert!((total - 9.0).abs() < 1e-9);
        assert_eq!(out.keys().into_iter().collect::<Vec<i64>>(), vec![1]);
    }

    #[test]
    fn test_idempotent() {
        let e = GeoEngine::default();
        let fc = keyed(vec![
            square(0., 0., 2., 2.),
            square(1., 1., 3., 3.),
            square(2.5, 0., 4., 1.),
        ]);
        let cfg = PipelineConfig::default();
        let (once, _) = resolve_self_overlaps(&e, &fc, &cfg).unwrap();
        let (twice, report) = resolve_self_overlaps(&e, &once, &cfg).unwrap();
        assert_eq!(report.new, 0);
        assert_eq!(report.fragments, once.len());
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_empty_input() {
        let e = GeoEngine::default();
        let (out, report) =
            resolve_self_overlaps(&e, &FeatureCollection::default(), &PipelineConfig::default())
                .unwrap();
        assert!(out.is_empty());
        assert_eq!(report.fragments, 0);
    }
}
