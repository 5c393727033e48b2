/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use geo::{polygon, MultiPolygon};
use seamless_tools::coverage::convert::{from_shapefile, to_shapefile};
use seamless_tools::coverage::resolver::resolve_self_overlaps;
use seamless_tools::coverage::{
    AreaMethod, CoveragePipeline, Feature, FeatureCollection, GeoEngine, GeometryEngine,
    PipelineConfig, RunSummary, Workspace,
};
use seamless_tools::tools::ToolManager;
use seamless_vector::{AttributeField, FieldData, FieldDataType, Shapefile};
use std::env;
use std::fs;
use std::path::PathBuf;

const EPS: f64 = 1e-6;

fn assert_area(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "area {} differs from {}",
        actual,
        expected
    );
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
        (x: x0, y: y0),
    ]])
}

fn layer(geoms: Vec<MultiPolygon<f64>>) -> FeatureCollection {
    let mut fc = FeatureCollection::new(
        vec![AttributeField::new("NAME", FieldDataType::Text, 20, 0)],
        "",
    );
    for (i, g) in geoms.into_iter().enumerate() {
        fc.push(Feature::new(0, g, vec![FieldData::Text(format!("f{}", i + 1))]));
    }
    fc
}

fn scratch(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!(
        "seamless_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn run(fc: &FeatureCollection, config: PipelineConfig, name: &str) -> (FeatureCollection, RunSummary) {
    let dir = scratch(name);
    let result = {
        let mut ws = Workspace::new(&dir, false).unwrap();
        CoveragePipeline::new(config).run(fc, &mut ws).unwrap()
    };
    let _ = fs::remove_dir_all(&dir);
    result
}

fn area_of(e: &GeoEngine, f: &Feature) -> f64 {
    e.area(&f.geometry, AreaMethod::Planar)
}

fn assert_partition(e: &GeoEngine, out: &FeatureCollection, envelope_area: f64) {
    let total: f64 = out.features.iter().map(|f| area_of(e, f)).sum();
    assert_area(total, envelope_area);
    for i in 0..out.len() {
        for j in i + 1..out.len() {
            let shared = e.clip(&out.features[i].geometry, &out.features[j].geometry);
            assert_area(e.area(&shared, AreaMethod::Planar), 0.0);
        }
    }
}

#[test]
fn gap_is_shared_between_two_features() {
    let e = GeoEngine::default();
    let fc = layer(vec![square(0., 0., 3., 10.), square(7., 0., 10., 10.)]);
    let (out, summary) = run(&fc, PipelineConfig::default(), "gap");

    assert!(summary.resolver_skipped);
    assert_area(summary.tessellation.gap_area, 40.0);
    assert_eq!(out.len(), 2);
    assert_eq!(out.features[0].key, 1);
    assert_eq!(out.features[1].key, 2);
    assert_area(area_of(&e, &out.features[0]), 50.0);
    assert_area(area_of(&e, &out.features[1]), 50.0);
    assert_partition(&e, &out, 100.0);
    assert_eq!(
        out.value(&out.features[1], "NAME"),
        Some(&FieldData::Text("f2".to_string()))
    );
}

#[test]
fn overlaps_and_gaps_give_a_partition() {
    let e = GeoEngine::default();
    // A and B share 3..4; the smaller B-only piece takes it. C is separated by a gap.
    let fc = layer(vec![
        square(0., 0., 4., 4.),
        square(3., 0., 6., 4.),
        square(8., 0., 10., 4.),
    ]);
    let (out, summary) = run(&fc, PipelineConfig::default(), "partition");

    assert!(summary.overlap.has_overlap);
    let resolve = summary.resolve.as_ref().unwrap();
    assert_eq!(resolve.new, 1);
    assert_eq!(resolve.reassigned, 1);
    assert_eq!(resolve.unresolved, 0);

    let keys: Vec<i64> = out.features.iter().map(|f| f.key).collect();
    assert_eq!(keys, vec![1, 2, 3]);
    assert_area(area_of(&e, &out.features[0]), 12.0);
    assert_area(area_of(&e, &out.features[1]), 16.0);
    assert_area(area_of(&e, &out.features[2]), 12.0);
    assert_partition(&e, &out, 40.0);
}

#[test]
fn resolving_twice_changes_nothing() {
    let e = GeoEngine::default();
    let config = PipelineConfig::default();
    let fc = layer(vec![
        square(0., 0., 4., 4.),
        square(3., 0., 6., 4.),
        square(2., 2., 5., 6.),
    ]);
    let (once, first) = resolve_self_overlaps(&e, &fc, &config).unwrap();
    assert!(first.new > 0);
    let (twice, second) = resolve_self_overlaps(&e, &once, &config).unwrap();
    assert_eq!(second.new, 0);
    assert_eq!(second.fragments, once.len());
    assert_eq!(twice.len(), once.len());
    let before: f64 = once.features.iter().map(|f| area_of(&e, f)).sum();
    let after: f64 = twice.features.iter().map(|f| area_of(&e, f)).sum();
    assert_area(after, before);
}

#[test]
fn equal_candidates_are_picked_the_same_way_every_run() {
    // the shared piece is equidistant from two pieces of equal area
    let fc = layer(vec![square(0., 0., 2., 2.), square(1., 0., 3., 2.)]);
    let mut owners = vec![];
    for i in 0..3 {
        let (out, _) = run(&fc, PipelineConfig::default(), &format!("tie{}", i));
        let e = GeoEngine::default();
        owners.push(
            out.features
                .iter()
                .map(|f| (f.key, (area_of(&e, f) * 1e6).round() as i64))
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(owners[0], owners[1]);
    assert_eq!(owners[1], owners[2]);
    assert_eq!(owners[0].len(), 2);
}

#[test]
fn passthrough_matches_resolved_run() {
    let e = GeoEngine::default();
    let fc = layer(vec![
        square(0., 0., 3., 3.),
        square(5., 0., 8., 3.),
        square(0., 5., 8., 8.),
    ]);
    let (skipped, s1) = run(&fc, PipelineConfig::default(), "skip");
    let mut config = PipelineConfig::default();
    config.skip_resolver_without_overlap = false;
    let (resolved, s2) = run(&fc, config, "noskip");

    assert!(s1.resolver_skipped);
    assert!(!s2.resolver_skipped);
    assert_eq!(skipped.len(), resolved.len());
    assert_eq!(skipped.fields.len(), resolved.fields.len());
    for (a, b) in skipped.features.iter().zip(resolved.features.iter()) {
        assert_eq!(a.key, b.key);
        assert_eq!(skipped.value(a, "NAME"), resolved.value(b, "NAME"));
        assert_area(area_of(&e, a), area_of(&e, b));
        assert_area(
            e.area(&e.erase(&a.geometry, &b.geometry), AreaMethod::Planar),
            0.0,
        );
    }
}

#[test]
fn marked_duplicate_overlap_is_still_resolved() {
    let e = GeoEngine::default();
    let mut fc = FeatureCollection::new(
        vec![AttributeField::new("COMP", FieldDataType::Text, 10, 0)],
        "",
    );
    let pieces = [
        (square(0., 0., 4., 4.), ""),
        (square(2., 0., 6., 4.), "unknown"),
        (square(8., 0., 10., 4.), ""),
    ];
    for (g, mark) in pieces.iter() {
        fc.push(Feature::new(0, g.clone(), vec![FieldData::Text(mark.to_string())]));
    }
    let (out, summary) = run(&fc, PipelineConfig::default(), "marked");

    assert!(summary.overlap.has_overlap);
    assert!(!summary.resolver_skipped);
    assert!(summary.resolve.is_some());
    assert_partition(&e, &out, 40.0);
}

#[test]
fn output_fields_have_no_aggregation_prefix() {
    let fc = layer(vec![square(0., 0., 3., 10.), square(7., 0., 10., 10.)]);
    let (out, _) = run(&fc, PipelineConfig::default(), "prefix");
    for f in &out.fields {
        let upper = f.name.to_uppercase();
        assert!(!upper.starts_with("FIRST_"), "field {}", f.name);
        assert!(!upper.starts_with("CONCAT_"), "field {}", f.name);
    }
    assert!(out.field_index("NAME").is_some());
}

#[test]
fn shapefile_round_trip_through_the_tool() {
    let dir = scratch("tool");
    fs::create_dir_all(&dir).unwrap();
    let input_file = dir.join("parcels.shp");
    let fc = layer(vec![square(0., 0., 3., 10.), square(7., 0., 10., 10.)]);
    let mut sf = to_shapefile(&fc, &input_file.to_string_lossy()).unwrap();
    sf.write().unwrap();

    let wd = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);
    let tm = ToolManager::new(&wd, &false).unwrap();
    let args = vec![
        "-i=parcels".to_string(),
        "-o=coverage.shp".to_string(),
        "--scratch=work".to_string(),
    ];
    tm.run_tool("SeamlessCoverage".to_string(), args).unwrap();

    let output_file = dir.join("coverage.shp");
    let output = Shapefile::read(&output_file.to_string_lossy()).unwrap();
    assert_eq!(output.num_records, 2);
    let key = output.attributes.get_field_num("OID_ORIG").unwrap();
    let keys: Vec<Option<i64>> = (0..2)
        .map(|i| output.attributes.get_value(i, key).as_i64())
        .collect();
    assert_eq!(keys, vec![Some(1), Some(2)]);

    let back = from_shapefile(&output).unwrap();
    let e = GeoEngine::default();
    assert_area(area_of(&e, &back.features[0]), 50.0);
    assert!(RunSummary::summary_path(&output_file.to_string_lossy()).exists());
    assert!(!dir.join("work").join("seamless_run").join(".seamless.lock").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scratch_in_the_working_directory_is_refused() {
    let dir = scratch("scratch_wd");
    fs::create_dir_all(&dir).unwrap();
    let input_file = dir.join("parcels.shp");
    let fc = layer(vec![square(0., 0., 3., 10.), square(7., 0., 10., 10.)]);
    let mut sf = to_shapefile(&fc, &input_file.to_string_lossy()).unwrap();
    sf.write().unwrap();
    fs::write(dir.join("notes.txt"), b"keep me").unwrap();

    let wd = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);
    let tm = ToolManager::new(&wd, &false).unwrap();
    let args = vec![
        "-i=parcels".to_string(),
        "-o=out.shp".to_string(),
        format!("--scratch={}", dir.display()),
    ];
    assert!(tm.run_tool("SeamlessCoverage".to_string(), args).is_err());

    assert!(input_file.exists());
    assert!(dir.join("parcels.dbf").exists());
    assert!(dir.join("notes.txt").exists());
    assert!(!dir.join("out.shp").exists());
    let _ = fs::remove_dir_all(&dir);
}
