/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::feature::OriginKey;
use std::fmt;
use std::io;
use thiserror::Error;

/// A pipeline stage, used to tag failures and anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Ingest,
    OverlapDetection,
    SelfOverlapResolution,
    MosaicDeduplication,
    GapTessellation,
    JoinAndAggregate,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Stage::Ingest => "ingest",
            Stage::OverlapDetection => "overlap detection",
            Stage::SelfOverlapResolution => "self-overlap resolution",
            Stage::MosaicDeduplication => "mosaic deduplication",
            Stage::GapTessellation => "gap tessellation",
            Stage::JoinAndAggregate => "join and aggregate",
            Stage::Export => "export",
        };
        write!(f, "{}", s)
    }
}

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("invalid input '{path}': {reason}")]
    InputValidation { path: String, reason: String },

    #[error("field '{field}': {reason}")]
    Precondition { field: String, reason: String },

    #[error("{stage} failed: no input geometry")]
    NoInputGeometry { stage: Stage },

    #[error("{stage} failed: {message}")]
    Engine { stage: Stage, message: String },

    #[error("scratch workspace '{path}': {source}")]
    Workspace {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("scratch workspace '{path}' is in use by another run")]
    WorkspaceBusy { path: String },

    #[error("scratch workspace '{path}' would hold '{protected}'")]
    ScratchConflict { path: String, protected: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type CoverageResult<T> = Result<T, CoverageError>;

impl CoverageError {
    pub fn input(path: &str, reason: impl Into<String>) -> CoverageError {
        CoverageError::InputValidation {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn engine(stage: Stage, message: impl Into<String>) -> CoverageError {
        CoverageError::Engine {
            stage,
            message: message.into(),
        }
    }
}

impl From<CoverageError> for io::Error {
    fn from(e: CoverageError) -> io::Error {
        let kind = match &e {
            CoverageError::InputValidation { .. }
            | CoverageError::Precondition { .. }
            | CoverageError::ScratchConflict { .. } => {
                io::ErrorKind::InvalidInput
            }
            CoverageError::NoInputGeometry { .. } | CoverageError::Engine { .. } => {
                io::ErrorKind::InvalidData
            }
            CoverageError::WorkspaceBusy { .. } => io::ErrorKind::AlreadyExists,
            CoverageError::Workspace { source, .. } => source.kind(),
            CoverageError::Io(source) => source.kind(),
        };
        io::Error::new(kind, e.to_string())
    }
}

/// Categories of non-fatal attribution problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// A merge product with no neighbour to inherit ownership from.
    UnresolvedNewRecord,
    /// A gap cell that intersects no feature.
    UnmatchedGapCell,
    /// A gap cell that intersects more than one feature.
    MultipleMatches,
    /// A prefix could not be stripped without a name collision.
    FieldRenameSkipped,
}

/// A non-fatal problem recorded during a run and reported at its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub stage: Stage,
    pub kind: AnomalyKind,
    pub key: Option<OriginKey>,
    pub detail: String,
}

impl Anomaly {
    pub fn new(
        stage: Stage,
        kind: AnomalyKind,
        key: Option<OriginKey>,
        detail: impl Into<String>,
    ) -> Anomaly {
        Anomaly {
            stage,
            kind,
            key,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key {
            Some(k) => write!(f, "[{}] {:?} (key {}): {}", self.stage, self.kind, k, self.detail),
            None => write!(f, "[{}] {:?}: {}", self.stage, self.kind, self.detail),
        }
    }
}
