/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

/*!
Seamless coverage of polygon layers.

The `coverage` module holds the pipeline that turns an overlapping, gapped
polygon layer into a planar partition with one member per original feature.
The `tools` module wraps the pipeline stages as command-line tools.
*/

#[macro_use]
extern crate serde_derive;

pub mod coverage;
pub mod tools;
