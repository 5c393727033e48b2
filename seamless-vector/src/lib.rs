/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

// private sub-module defined in other files
pub mod shapefile;

// exports identifiers from private sub-modules in the current module namespace
pub use crate::shapefile::attributes::*;
pub use crate::shapefile::geometry::*;
pub use crate::shapefile::Shapefile;
