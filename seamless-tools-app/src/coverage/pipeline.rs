/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::aggregate::{dissolve_by_key, join_and_aggregate};
use super::config::PipelineConfig;
use super::error::{Anomaly, CoverageResult, Stage};
use super::feature::FeatureCollection;
use super::join::JoinReport;
use super::kernel::{GeoEngine, GeometryEngine};
use super::overlap::{detect_any_overlap, OverlapReport};
use super::resolver::{assign_origin_keys, resolve_self_overlaps, ResolveReport};
use super::tessellation::{tessellate_gaps, TessellationReport};
use super::workspace::Workspace;
use log::{info, warn};
use std::fmt;
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};

/// Drives the stages of a coverage run, in order.
pub struct CoveragePipeline<E: GeometryEngine = GeoEngine> {
    pub engine: E,
    pub config: PipelineConfig,
}

impl CoveragePipeline<GeoEngine> {
    pub fn new(config: PipelineConfig) -> CoveragePipeline<GeoEngine> {
        CoveragePipeline {
            engine: GeoEngine::new(config.signature_precision),
            config,
        }
    }
}

impl<E: GeometryEngine> CoveragePipeline<E> {
    pub fn with_engine(engine: E, config: PipelineConfig) -> CoveragePipeline<E> {
        CoveragePipeline { engine, config }
    }

    /// Turns `collection` into a coverage partition with one record per
    /// surviving origin key. The workspace is cleared first.
    pub fn run(
        &self,
        collection: &FeatureCollection,
        workspace: &mut Workspace,
    ) -> CoverageResult<(FeatureCollection, RunSummary)> {
        self.run_observed(collection, workspace, &mut |_| {})
    }

    /// Same as `run`; `observer` is called as each stage starts.
    pub fn run_observed(
        &self,
        collection: &FeatureCollection,
        workspace: &mut Workspace,
        observer: &mut dyn FnMut(Stage),
    ) -> CoverageResult<(FeatureCollection, RunSummary)> {
        workspace.clear()?;
        let engine = &self.engine;
        let config = &self.config;

        let mut input = collection.clone();
        assign_origin_keys(&mut input, &config.key_field)?;
        let mut summary = RunSummary {
            input_features: input.len(),
            key_field: input.key_field.clone(),
            ..Default::default()
        };
        workspace.store_collection("input", &input)?;

        observer(Stage::OverlapDetection);
        summary.overlap = detect_any_overlap(engine, &input, config)?;
        let resolved = if !summary.overlap.has_overlap && config.skip_resolver_without_overlap {
            info!("No overlap found; self-overlap resolution skipped");
            summary.resolver_skipped = true;
            let mut passthrough = input;
            passthrough.sort_by_key();
            passthrough
        } else {
            observer(Stage::SelfOverlapResolution);
            let (resolved, report) = resolve_self_overlaps(engine, &input, config)?;
            summary.anomalies.extend(report.anomalies.iter().cloned());
            summary.resolve = Some(report);
            resolved
        };
        workspace.store_collection("resolved", &resolved)?;

        observer(Stage::GapTessellation);
        let (cells, tessellation) = tessellate_gaps(engine, &resolved, config, Some(&*workspace))?;
        summary.tessellation = tessellation;

        observer(Stage::JoinAndAggregate);
        let output = if cells.is_empty() {
            let (dissolved, anomalies) = dissolve_by_key(engine, &resolved)?;
            summary.anomalies.extend(anomalies);
            dissolved
        } else {
            let (dissolved, report) =
                join_and_aggregate(engine, &cells, &resolved, config, Some(&*workspace))?;
            summary.anomalies.extend(report.anomalies.iter().cloned());
            summary.join = Some(report);
            dissolved
        };
        summary.output_features = output.len();

        if !summary.anomalies.is_empty() {
            warn!("{} attribution anomal(ies) recorded", summary.anomalies.len());
        }
        Ok((output, summary))
    }
}

/// End-of-run report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub input_features: usize,
    pub output_features: usize,
    pub key_field: String,
    pub resolver_skipped: bool,
    pub overlap: OverlapReport,
    pub resolve: Option<ResolveReport>,
    pub tessellation: TessellationReport,
    pub join: Option<JoinReport>,
    pub anomalies: Vec<Anomaly>,
    pub output_file: Option<String>,
}

impl RunSummary {
    /// Path of the JSON summary written next to an output file.
    pub fn summary_path(output_file: &str) -> PathBuf {
        let path = Path::new(output_file);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        path.with_file_name(format!("{}_summary.json", stem))
    }

    pub fn write_json(&self, output_file: &str) -> Result<PathBuf, Error> {
        let path = RunSummary::summary_path(output_file);
        let s = serde_json::to_string_pretty(self)?;
        fs::write(&path, s)?;
        Ok(path)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input features: {}", self.input_features)?;
        writeln!(
            f,
            "Overlap: {} ({} pair(s))",
            if self.overlap.has_overlap { "yes" } else { "no" },
            self.overlap.overlapping_pairs
        )?;
        match &self.resolve {
            Some(r) => writeln!(
                f,
                "Self-overlap resolution: {} fragment(s), {} record(s), {} reassigned, {} unresolved",
                r.fragments, r.dissolved, r.reassigned, r.unresolved
            )?,
            None => writeln!(f, "Self-overlap resolution: skipped")?,
        }
        let t = &self.tessellation;
        writeln!(
            f,
            "Gap tessellation: {} uncovered part(s), {} discarded, {} gap cell(s)",
            t.uncovered_parts, t.discarded_parts, t.gap_cells
        )?;
        if let Some(j) = &self.join {
            writeln!(
                f,
                "Spatial join: {} of {} cell(s) joined, {} multiple match(es), {} unassigned",
                j.joined, j.cells, j.multiple_matches, j.unassigned
            )?;
        }
        writeln!(f, "Output records: {}", self.output_features)?;
        writeln!(f, "Anomalies: {}", self.anomalies.len())?;
        for a in &self.anomalies {
            writeln!(f, "  {}", a)?;
        }
        if let Some(out) = &self.output_file {
            write!(f, "Output: {}", out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{CoveragePipeline, RunSummary};
    use crate::coverage::config::{AreaMethod, PipelineConfig};
    use crate::coverage::error::Stage;
    use crate::coverage::feature::{Feature, FeatureCollection};
    use crate::coverage::kernel::test::square;
    use crate::coverage::kernel::GeometryEngine;
    use crate::coverage::workspace::Workspace;
    use std::env;
    use std::fs;
    use std::path::Path;

    #[test]
    fn test_summary_path() {
        let p = RunSummary::summary_path("/tmp/out/coverage.shp");
        assert_eq!(p, Path::new("/tmp/out/coverage_summary.json"));
    }

    #[test]
    fn test_full_coverage_dissolves_by_key() {
        let dir = env::temp_dir().join(format!("seamless_pipe_{}", std::process::id()));
        let mut ws = Workspace::new(&dir, false).unwrap();
        let mut fc = FeatureCollection::default();
        fc.push(Feature::new(0, square(0., 0., 5., 10.), vec![]));
        fc.push(Feature::new(0, square(5., 0., 10., 10.), vec![]));
        let pipeline = CoveragePipeline::new(PipelineConfig::default());
        let mut stages = vec![];
        let (out, summary) = pipeline
            .run_observed(&fc, &mut ws, &mut |s| stages.push(s))
            .unwrap();
        assert_eq!(
            stages,
            vec![Stage::OverlapDetection, Stage::GapTessellation, Stage::JoinAndAggregate]
        );
        assert!(summary.resolver_skipped);
        assert!(summary.join.is_none());
        assert_eq!(out.len(), 2);
        assert_eq!(out.features[0].key, 1);
        let a = pipeline.engine.area(&out.features[1].geometry, AreaMethod::Planar);
        assert!((a - 50.0).abs() < 1e-9);
        assert!(summary.to_string().contains("Output records: 2"));
        drop(ws);
        let _ = fs::remove_dir_all(&dir);
    }
}
