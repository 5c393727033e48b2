/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use std::fmt;
use std::fs;
use std::io::{Error, ErrorKind};

/// How uncovered parts of the envelope are filtered before tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GapFilter {
    /// Keep every uncovered part.
    None,
    /// Discard parts whose area exceeds this many square kilometres.
    MaxAreaKm2(f64),
    /// Discard the single largest part. Deprecated: equivalent to a
    /// threshold just below the largest part's area.
    LargestPart,
}

impl Default for GapFilter {
    fn default() -> GapFilter {
        GapFilter::None
    }
}

impl fmt::Display for GapFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GapFilter::None => write!(f, "none"),
            GapFilter::MaxAreaKm2(a) => write!(f, "max area {} km²", a),
            GapFilter::LargestPart => write!(f, "largest part"),
        }
    }
}

/// Area computation used for the gap filter and for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaMethod {
    /// Geodesic for geographic coordinates, planar otherwise.
    Auto,
    /// Shoelace area in map units squared, assumed to be metres.
    Planar,
    /// Area on the WGS84 ellipsoid in square metres.
    Geodesic,
}

impl Default for AreaMethod {
    fn default() -> AreaMethod {
        AreaMethod::Auto
    }
}

impl AreaMethod {
    /// Resolves `Auto` against the layer's coordinate system.
    pub fn resolve(self, geographic: bool) -> AreaMethod {
        match self {
            AreaMethod::Auto => {
                if geographic {
                    AreaMethod::Geodesic
                } else {
                    AreaMethod::Planar
                }
            }
            m => m,
        }
    }
}

/// Settings of a coverage run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub key_field: String,
    pub classification_field: Option<String>,
    pub duplicate_marker: String,
    pub skip_resolver_without_overlap: bool,
    pub gap_filter: GapFilter,
    pub area_method: AreaMethod,
    pub signature_precision: usize,
    pub assign_unmatched_to_nearest: bool,
    pub keep_intermediates: bool,
    pub overlap_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> PipelineConfig {
        PipelineConfig {
            key_field: "OID_ORIG".to_string(),
            classification_field: Some("COMP".to_string()),
            duplicate_marker: "unknown".to_string(),
            skip_resolver_without_overlap: true,
            gap_filter: GapFilter::None,
            area_method: AreaMethod::Auto,
            signature_precision: 9,
            assign_unmatched_to_nearest: true,
            keep_intermediates: false,
            overlap_tolerance: 1e-9,
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON file. Missing keys take their default value.
    pub fn from_file(file_name: &str) -> Result<PipelineConfig, Error> {
        let contents = fs::read_to_string(file_name)?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Error parsing {}: {}", file_name, e),
            )
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::{AreaMethod, GapFilter, PipelineConfig};
    use std::fs;

    #[test]
    fn test_partial_json() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{ "key_field": "ID", "gap_filter": { "MaxAreaKm2": 2.5 } }"#)
                .unwrap();
        assert_eq!(cfg.key_field, "ID");
        assert_eq!(cfg.gap_filter, GapFilter::MaxAreaKm2(2.5));
        assert_eq!(cfg.signature_precision, 9);
        assert_eq!(cfg.classification_field, Some("COMP".to_string()));
    }

    #[test]
    fn test_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("seamless_cfg_{}.json", std::process::id()));
        let mut cfg = PipelineConfig::default();
        cfg.gap_filter = GapFilter::LargestPart;
        cfg.area_method = AreaMethod::Planar;
        fs::write(&path, cfg.to_json()).unwrap();
        let read = PipelineConfig::from_file(&path.to_string_lossy()).unwrap();
        assert_eq!(read, cfg);
        let _ = fs::remove_file(&path);
        assert!(PipelineConfig::from_file(&path.to_string_lossy()).is_err());
    }

    #[test]
    fn test_area_method_resolve() {
        assert_eq!(AreaMethod::Auto.resolve(true), AreaMethod::Geodesic);
        assert_eq!(AreaMethod::Auto.resolve(false), AreaMethod::Planar);
        assert_eq!(AreaMethod::Planar.resolve(true), AreaMethod::Planar);
    }
}
