// private sub-module defined in other files
mod detect_overlaps;
mod remove_mosaic_duplicates;
mod resolve_self_overlaps;
mod seamless_coverage;

// exports identifiers from private sub-modules in the current module namespace
pub use self::detect_overlaps::DetectOverlaps;
pub use self::remove_mosaic_duplicates::RemoveMosaicDuplicates;
pub use self::resolve_self_overlaps::ResolveSelfOverlaps;
pub use self::seamless_coverage::SeamlessCoverage;

use crate::coverage::convert::{from_shapefile, to_shapefile};
use crate::coverage::FeatureCollection;
use chrono::prelude::*;
use seamless_vector::Shapefile;
use std::io::Error;

/// Reads a polygon Shapefile into a feature collection.
fn read_collection(input_file: &str) -> Result<FeatureCollection, Error> {
    let input = Shapefile::read(input_file)?;
    Ok(from_shapefile(&input)?)
}

fn write_collection(fc: &FeatureCollection, output_file: &str, verbose: bool) -> Result<(), Error> {
    let mut output = to_shapefile(fc, output_file)?;
    if verbose {
        println!("Saving data...")
    };
    let _ = match output.write() {
        Ok(_) => {
            if verbose {
                println!("Output file written")
            }
        }
        Err(e) => return Err(e),
    };
    Ok(())
}

fn print_step(step: usize, message: &str) {
    println!(
        "[{}] Step {}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        step,
        message
    );
}
