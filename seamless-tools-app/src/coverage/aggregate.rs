/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::config::PipelineConfig;
use super::error::{Anomaly, AnomalyKind, CoverageResult, Stage};
use super::feature::{Feature, FeatureCollection, OriginKey};
use super::join::{spatial_join, JoinReport};
use super::kernel::{guarded, GeometryEngine};
use super::tessellation::GapCell;
use super::workspace::Workspace;
use geo::MultiPolygon;
use log::{info, warn};
use seamless_vector::{AttributeField, FieldData, FieldDataType};
use std::collections::BTreeMap;

/// Per-field aggregation applied by `dissolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Value of the first record of the group.
    First,
    /// Distinct non-null values of the group, joined with ';'.
    Concatenate,
}

impl Aggregation {
    pub fn prefix(&self) -> &'static str {
        match self {
            Aggregation::First => "FIRST_",
            Aggregation::Concatenate => "CONCAT_",
        }
    }

    /// `First` for every field of the collection.
    pub fn first_for_all(fc: &FeatureCollection) -> Vec<(String, Aggregation)> {
        fc.fields
            .iter()
            .map(|f| (f.name.clone(), Aggregation::First))
            .collect()
    }
}

/// Stacks two collections. The schema is the union of both, in first-seen
/// order; a field missing on one side is null there.
pub fn merge_collections(a: &FeatureCollection, b: &FeatureCollection) -> FeatureCollection {
    let mut merged = a.empty_like();
    if merged.key_field.is_empty() {
        merged.key_field = b.key_field.clone();
    }
    if merged.projection.is_empty() {
        merged.projection = b.projection.clone();
    }
    for field in &b.fields {
        if merged.field_index(&field.name).is_none() {
            merged.add_field(field.clone());
        }
    }
    for source in [a, b] {
        let mapping: Vec<Option<usize>> = merged
            .fields
            .iter()
            .map(|f| source.field_index(&f.name))
            .collect();
        for f in &source.features {
            let attributes = mapping
                .iter()
                .map(|m| {
                    m.and_then(|i| f.attributes.get(i).cloned())
                        .unwrap_or(FieldData::Null)
                })
                .collect();
            merged.push(Feature::new(f.key, f.geometry.clone(), attributes));
        }
    }
    merged
}

/// Groups features by key, unions their geometry and aggregates the fields
/// named in `plan`. Output fields are named `<PREFIX><field>` and output
/// features come in ascending key order. Fields not in the plan are dropped.
pub fn dissolve<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
    plan: &[(String, Aggregation)],
) -> CoverageResult<FeatureCollection> {
    let mut out = FeatureCollection::new(vec![], &fc.projection);
    out.key_field = fc.key_field.clone();
    let mut columns: Vec<(Option<usize>, Aggregation)> = vec![];
    for (name, agg) in plan {
        let idx = fc.field_index(name);
        let field = match (idx, agg) {
            (Some(i), Aggregation::First) => {
                let mut f = fc.fields[i].clone();
                f.name = format!("{}{}", agg.prefix(), fc.fields[i].name);
                f
            }
            _ => AttributeField::new(
                &format!("{}{}", agg.prefix(), name),
                FieldDataType::Text,
                254,
                0,
            ),
        };
        out.fields.push(field);
        columns.push((idx, *agg));
    }

    let mut groups: BTreeMap<OriginKey, Vec<usize>> = BTreeMap::new();
    for (i, f) in fc.features.iter().enumerate() {
        groups.entry(f.key).or_default().push(i);
    }

    guarded(Stage::JoinAndAggregate, || {
        for (key, members) in &groups {
            let geoms: Vec<MultiPolygon<f64>> = members
                .iter()
                .map(|&i| fc.features[i].geometry.clone())
                .collect();
            let geometry = if geoms.len() == 1 {
                geoms[0].clone()
            } else {
                engine.union(&geoms)
            };
            let attributes = columns
                .iter()
                .map(|(idx, agg)| aggregate(fc, members, *idx, *agg))
                .collect();
            out.push(Feature::new(*key, geometry, attributes));
        }
    })?;
    Ok(out)
}

fn aggregate(
    fc: &FeatureCollection,
    members: &[usize],
    idx: Option<usize>,
    agg: Aggregation,
) -> FieldData {
    let idx = match idx {
        Some(i) => i,
        None => return FieldData::Null,
    };
    let value = |m: usize| {
        fc.features[m]
            .attributes
            .get(idx)
            .cloned()
            .unwrap_or(FieldData::Null)
    };
    match agg {
        Aggregation::First => members.first().map(|&m| value(m)).unwrap_or(FieldData::Null),
        Aggregation::Concatenate => {
            let mut parts: Vec<String> = vec![];
            for &m in members {
                let v = value(m);
                if !v.is_null() {
                    let s = v.get_as_string();
                    if !parts.contains(&s) {
                        parts.push(s);
                    }
                }
            }
            if parts.is_empty() {
                FieldData::Null
            } else {
                FieldData::Text(parts.join(";"))
            }
        }
    }
}

/// Removes aggregation prefixes from field names. A rename that would
/// collide with another field is skipped. Returns the (old, new) pairs
/// actually renamed.
pub fn strip_aggregation_prefixes(fc: &mut FeatureCollection) -> Vec<(String, String)> {
    let mut renamed = vec![];
    for i in 0..fc.fields.len() {
        let name = fc.fields[i].name.clone();
        let stripped = [Aggregation::First, Aggregation::Concatenate]
            .iter()
            .find_map(|a| strip_prefix_ignore_case(&name, a.prefix()));
        let new_name = match stripped {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        let collides = fc
            .fields
            .iter()
            .enumerate()
            .any(|(j, f)| j != i && f.name.eq_ignore_ascii_case(&new_name))
            || fc.key_field.eq_ignore_ascii_case(&new_name);
        if collides {
            warn!(
                "Field '{}' keeps its prefix: '{}' already exists",
                name, new_name
            );
            continue;
        }
        fc.fields[i].name = new_name.clone();
        renamed.push((name, new_name));
    }
    renamed
}

fn strip_prefix_ignore_case(name: &str, prefix: &str) -> Option<String> {
    if name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(name[prefix.len()..].to_string())
    } else {
        None
    }
}

fn has_aggregation_prefix(name: &str) -> bool {
    [Aggregation::First, Aggregation::Concatenate]
        .iter()
        .any(|a| strip_prefix_ignore_case(name, a.prefix()).is_some())
}

/// Joins the gap cells to the resolved features, merges both, dissolves by
/// key with first-value aggregation and strips the prefixes.
pub fn join_and_aggregate<E: GeometryEngine + ?Sized>(
    engine: &E,
    cells: &[GapCell],
    resolved: &FeatureCollection,
    config: &PipelineConfig,
    workspace: Option<&Workspace>,
) -> CoverageResult<(FeatureCollection, JoinReport)> {
    let (joined, mut report) = guarded(Stage::JoinAndAggregate, || {
        spatial_join(engine, cells, resolved, config)
    })?;
    if let Some(ws) = workspace {
        ws.store_collection("spatial_join", &joined)?;
    }

    let merged = merge_collections(&joined, resolved);
    if let Some(ws) = workspace {
        ws.store_collection("merged", &merged)?;
    }

    let plan = Aggregation::first_for_all(&merged);
    let mut dissolved = dissolve(engine, &merged, &plan)?;
    if let Some(ws) = workspace {
        ws.store_collection("dissolved", &dissolved)?;
    }
    report
        .anomalies
        .extend(finish_field_names(&mut dissolved));
    report.output_records = dissolved.len();

    info!(
        "Join and aggregate: {} joined cell(s) + {} feature(s) -> {} record(s)",
        report.joined,
        resolved.len(),
        report.output_records
    );
    Ok((dissolved, report))
}

/// Dissolves a collection by key alone, with first-value aggregation.
pub fn dissolve_by_key<E: GeometryEngine + ?Sized>(
    engine: &E,
    fc: &FeatureCollection,
) -> CoverageResult<(FeatureCollection, Vec<Anomaly>)> {
    let plan = Aggregation::first_for_all(fc);
    let mut dissolved = dissolve(engine, fc, &plan)?;
    let anomalies = finish_field_names(&mut dissolved);
    Ok((dissolved, anomalies))
}

fn finish_field_names(fc: &mut FeatureCollection) -> Vec<Anomaly> {
    strip_aggregation_prefixes(fc);
    fc.fields
        .iter()
        .filter(|f| has_aggregation_prefix(&f.name))
        .map(|f| {
            Anomaly::new(
                Stage::JoinAndAggregate,
                AnomalyKind::FieldRenameSkipped,
                None,
                format!("field '{}' kept its aggregation prefix", f.name),
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coverage::config::AreaMethod;
    use crate::coverage::kernel::test::square;
    use crate::coverage::kernel::GeoEngine;

    fn collection(fields: &[&str]) -> FeatureCollection {
        let mut fc = FeatureCollection::new(
            fields
                .iter()
                .map(|n| AttributeField::new(n, FieldDataType::Text, 10, 0))
                .collect(),
            "",
        );
        fc.key_field = "OID_ORIG".to_string();
        fc
    }

    fn text(s: &str) -> FieldData {
        FieldData::Text(s.to_string())
    }

    #[test]
    fn test_merge_schema_union() {
        let mut a = collection(&["NAME", "Join_Count"]);
        a.push(Feature::new(1, square(0., 0., 1., 1.), vec![text("a"), FieldData::Int(1)]));
        let mut b = collection(&["CODE", "name"]);
        b.push(Feature::new(2, square(1., 0., 2., 1.), vec![text("c"), text("b")]));
        let m = merge_collections(&a, &b);
        let names: Vec<&str> = m.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["NAME", "Join_Count", "CODE"]);
        assert_eq!(m.features[0].attributes[2], FieldData::Null);
        assert_eq!(m.features[1].attributes, vec![text("b"), FieldData::Null, text("c")]);
    }

    #[test]
    fn test_dissolve_first_and_concat() {
        let e = GeoEngine::default();
        let mut fc = collection(&["NAME"]);
        fc.push(Feature::new(2, square(0., 0., 1., 1.), vec![FieldData::Null]));
        fc.push(Feature::new(1, square(5., 0., 6., 1.), vec![text("b")]));
        fc.push(Feature::new(2, square(1., 0., 2., 1.), vec![text("x")]));
        let plan = vec![
            ("NAME".to_string(), Aggregation::First),
            ("NAME".to_string(), Aggregation::Concatenate),
        ];
        let d = dissolve(&e, &fc, &plan).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.features[0].key, 1);
        assert_eq!(d.fields[0].name, "FIRST_NAME");
        assert_eq!(d.fields[1].name, "CONCAT_NAME");
        // first encountered, even when null
        assert_eq!(d.features[1].attributes[0], FieldData::Null);
        assert_eq!(d.features[1].attributes[1], text("x"));
        assert!((e.area(&d.features[1].geometry, AreaMethod::Planar) - 2.0).abs() < 1e-9);
        assert_eq!(d.features[1].geometry.0.len(), 1);
    }

    #[test]
    fn test_strip_prefixes() {
        let mut fc = collection(&["FIRST_NAME", "first_code", "CONCAT_NAME", "FIRST_"]);
        let renamed = strip_aggregation_prefixes(&mut fc);
        assert_eq!(
            renamed,
            vec![
                ("FIRST_NAME".to_string(), "NAME".to_string()),
                ("first_code".to_string(), "code".to_string()),
            ]
        );
        // CONCAT_NAME would collide with NAME
        assert_eq!(fc.fields[2].name, "CONCAT_NAME");
        assert_eq!(finish_field_names(&mut fc).len(), 1);
    }

    #[test]
    fn test_join_and_aggregate() {
        let e = GeoEngine::default();
        let mut fc = collection(&["NAME"]);
        fc.push(Feature::new(1, square(0., 0., 3., 10.), vec![text("west")]));
        fc.push(Feature::new(2, square(7., 0., 10., 10.), vec![text("east")]));
        let cells = vec![
            GapCell {
                geometry: square(3., 0., 5., 10.).0.remove(0),
                site: geo::Coord { x: 3., y: 0. },
                part: 0,
            },
            GapCell {
                geometry: square(5., 0., 7., 10.).0.remove(0),
                site: geo::Coord { x: 7., y: 0. },
                part: 0,
            },
        ];
        let (out, report) =
            join_and_aggregate(&e, &cells, &fc, &PipelineConfig::default(), None).unwrap();
        assert_eq!(report.output_records, 2);
        assert!(out.fields.iter().all(|f| !f.name.starts_with("FIRST_")));
        assert_eq!(out.value(&out.features[1], "NAME"), Some(&text("east")));
        assert!((e.area(&out.features[0].geometry, AreaMethod::Planar) - 50.0).abs() < 1e-9);
    }
}
