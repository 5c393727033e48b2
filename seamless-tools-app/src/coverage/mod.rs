/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! The seamless coverage pipeline.
//!
//! Stages run strictly in sequence, each consuming the full output of the
//! previous one:
//!
//! 1. overlap detection (`overlap`), an optional gate;
//! 2. self-overlap resolution (`resolver`);
//! 3. gap tessellation (`tessellation`);
//! 4. spatial join, merge and dissolve (`join`, `aggregate`).
//!
//! `pipeline::CoveragePipeline` drives the stages against a scratch
//! `workspace::Workspace`.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod error;
pub mod feature;
pub mod join;
pub mod kernel;
pub mod mosaic;
pub mod overlap;
pub mod pipeline;
pub mod resolver;
pub mod search;
pub mod signature;
pub mod tessellation;
pub mod workspace;

pub use self::config::{AreaMethod, GapFilter, PipelineConfig};
pub use self::error::{CoverageError, CoverageResult, Stage};
pub use self::feature::{Classification, Feature, FeatureCollection, OriginKey, OriginSet};
pub use self::kernel::{GeoEngine, GeometryEngine};
pub use self::pipeline::{CoveragePipeline, RunSummary};
pub use self::workspace::Workspace;
