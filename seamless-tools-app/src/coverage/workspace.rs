/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::convert::{points_to_shapefile, polygons_to_shapefile, to_shapefile};
use super::error::{CoverageError, CoverageResult};
use super::feature::FeatureCollection;
use geo::{Coord, Polygon};
use log::{debug, warn};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".seamless.lock";

/// Subdirectory of the scratch path that a run owns.
pub const RUN_DIR: &str = "seamless_run";

/// Scratch area of a single run.
///
/// Everything a run writes goes into the `RUN_DIR` subdirectory of the
/// scratch path; nothing else under the scratch path is touched. Opening a
/// workspace takes the lock file and clears what a previous run left in
/// `RUN_DIR`. The lock is released when the workspace is dropped.
/// Intermediate layers are written only when `keep_intermediates` is set.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    keep_intermediates: bool,
    lock: Option<PathBuf>,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(scratch: P, keep_intermediates: bool) -> CoverageResult<Workspace> {
        let path = scratch.as_ref().join(RUN_DIR);
        fs::create_dir_all(&path).map_err(|e| ws_error(&path, e))?;

        let lock = path.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&lock) {
            Ok(mut f) => {
                writeln!(f, "{}", std::process::id()).map_err(|e| ws_error(&lock, e))?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CoverageError::WorkspaceBusy {
                    path: path.to_string_lossy().to_string(),
                });
            }
            Err(e) => return Err(ws_error(&lock, e)),
        }

        let ws = Workspace {
            path,
            keep_intermediates,
            lock: Some(lock),
        };
        ws.clear()?;
        Ok(ws)
    }

    /// Opens a workspace after checking that the scratch path neither equals
    /// nor contains any of `protected` (working directory, input and output
    /// files).
    pub fn open_apart<P: AsRef<Path>>(
        scratch: P,
        keep_intermediates: bool,
        protected: &[&Path],
    ) -> CoverageResult<Workspace> {
        check_scratch(scratch.as_ref(), protected)?;
        Workspace::new(scratch, keep_intermediates)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keeps_intermediates(&self) -> bool {
        self.keep_intermediates
    }

    /// Removes everything in the run directory except the lock file.
    pub fn clear(&self) -> CoverageResult<()> {
        let entries = fs::read_dir(&self.path).map_err(|e| ws_error(&self.path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ws_error(&self.path, e))?;
            let p = entry.path();
            if entry.file_name() == LOCK_FILE {
                continue;
            }
            let removed = if p.is_dir() {
                fs::remove_dir_all(&p)
            } else {
                fs::remove_file(&p)
            };
            removed.map_err(|e| ws_error(&p, e))?;
        }
        Ok(())
    }

    /// Path of the Shapefile an intermediate layer is written to.
    pub fn layer_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.shp", name))
    }

    pub fn store_polygons(
        &self,
        name: &str,
        polys: &[Polygon<f64>],
        projection: &str,
    ) -> CoverageResult<()> {
        if !self.keep_intermediates {
            return Ok(());
        }
        let file = self.layer_path(name);
        let mut sf = polygons_to_shapefile(polys, &file.to_string_lossy(), projection)
            .map_err(|e| ws_error(&file, e))?;
        sf.write().map_err(|e| ws_error(&file, e))?;
        debug!("stored {} polygon(s) in {}", polys.len(), file.display());
        Ok(())
    }

    pub fn store_points(
        &self,
        name: &str,
        points: &[Coord<f64>],
        projection: &str,
    ) -> CoverageResult<()> {
        if !self.keep_intermediates {
            return Ok(());
        }
        let file = self.layer_path(name);
        let mut sf = points_to_shapefile(points, &file.to_string_lossy(), projection)
            .map_err(|e| ws_error(&file, e))?;
        sf.write().map_err(|e| ws_error(&file, e))?;
        debug!("stored {} point(s) in {}", points.len(), file.display());
        Ok(())
    }

    pub fn store_collection(&self, name: &str, fc: &FeatureCollection) -> CoverageResult<()> {
        if !self.keep_intermediates || fc.is_empty() {
            return Ok(());
        }
        let file = self.layer_path(name);
        let mut sf = to_shapefile(fc, &file.to_string_lossy()).map_err(|e| ws_error(&file, e))?;
        sf.write().map_err(|e| ws_error(&file, e))?;
        debug!("stored {} feature(s) in {}", fc.len(), file.display());
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            if let Err(e) = fs::remove_file(&lock) {
                warn!("Could not release {}: {}", lock.display(), e);
            }
        }
    }
}

/// Fails when `scratch` is one of `protected` or an ancestor of one.
pub fn check_scratch(scratch: &Path, protected: &[&Path]) -> CoverageResult<()> {
    let scratch = normalized(scratch);
    for p in protected {
        let other = normalized(p);
        if other.starts_with(&scratch) {
            return Err(CoverageError::ScratchConflict {
                path: scratch.to_string_lossy().to_string(),
                protected: other.to_string_lossy().to_string(),
            });
        }
    }
    Ok(())
}

/// Absolute form of a path whose tail may not exist yet.
fn normalized(p: &Path) -> PathBuf {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(d) => d.join(p),
            Err(_) => p.to_path_buf(),
        }
    };
    if let Ok(c) = fs::canonicalize(&abs) {
        return c;
    }
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => normalized(parent).join(name),
        _ => abs,
    }
}

fn ws_error(path: &Path, source: std::io::Error) -> CoverageError {
    CoverageError::Workspace {
        path: path.to_string_lossy().to_string(),
        source,
    }
}
