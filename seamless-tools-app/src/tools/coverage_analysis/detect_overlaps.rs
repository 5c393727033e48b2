/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::read_collection;
use crate::coverage::convert::polygons_to_shapefile;
use crate::coverage::overlap::detect_overlaps;
use crate::coverage::search::locate_input;
use crate::coverage::{GeoEngine, PipelineConfig};
use crate::tools::*;
use seamless_common::utils::get_formatted_elapsed_time;
use std::io::Error;
use std::time::Instant;

/// This tool reports whether any location of a polygon layer is covered by two or more
/// features. Features whose classification field (`--class_field`, `COMP` by default)
/// holds the duplicate marker (`--marker`, `unknown` by default) are left out of the test;
/// when the field does not exist every feature takes part.
///
/// When an output file is given, the union of the overlapping areas is written to it.
///
/// # See Also
/// `SeamlessCoverage`, `ResolveSelfOverlaps`
pub struct DetectOverlaps {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl DetectOverlaps {
    pub fn new() -> DetectOverlaps {
        // public constructor
        let name = "DetectOverlaps".to_string();
        let toolbox = "Coverage Analysis".to_string();
        let description =
            "Reports whether any features of a polygon layer overlap.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Polygon File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input vector polygon file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Overlap File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Optional output vector polygon file of the overlapping areas.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Classification Field".to_owned(),
            flags: vec!["--class_field".to_owned()],
            description: "Field marking features already identified as duplicates.".to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Text,
                "--input".to_string(),
            ),
            default_value: Some("COMP".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Duplicate Marker".to_owned(),
            flags: vec!["--marker".to_owned()],
            description: "Classification value of features left out of the test.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some("unknown".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "-i=parcels.shp -o=overlaps.shp");

        DetectOverlaps {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl SeamlessTool for DetectOverlaps {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut input_file = String::new();
        let mut output_file = String::new();
        let mut config = PipelineConfig::default();

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-class_field" {
                config.classification_field = if value.is_empty() { None } else { Some(value) };
            } else if flag_val == "-marker" {
                config.duplicate_marker = value;
            }
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let start = Instant::now();
        let input_file = locate_input(&input_file, working_directory, None)?;
        let input = read_collection(&input_file)?;

        let engine = GeoEngine::new(config.signature_precision);
        let report = detect_overlaps(&engine, &input, &config, !output_file.is_empty())?;

        if verbose {
            println!(
                "Features considered: {} ({} skipped)",
                report.features_considered, report.features_skipped
            );
            if report.degraded {
                println!("Warning: classification field not found; no features were skipped.");
            }
        }
        println!(
            "Overlap: {}",
            if report.has_overlap { "found" } else { "none" }
        );

        if !output_file.is_empty() {
            output_file = with_working_directory(&output_file, working_directory);
            let polys = report.geometry.map(|g| g.0).unwrap_or_default();
            let mut output = polygons_to_shapefile(&polys, &output_file, &input.projection)?;
            if verbose {
                println!("Saving data...")
            };
            output.write()?;
            if verbose {
                println!("Output file written")
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
