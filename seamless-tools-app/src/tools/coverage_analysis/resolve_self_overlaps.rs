/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::{print_step, read_collection, write_collection};
use crate::coverage::resolver::resolve_self_overlaps;
use crate::coverage::search::locate_input;
use crate::coverage::{GeoEngine, PipelineConfig};
use crate::tools::*;
use seamless_common::utils::get_formatted_elapsed_time;
use std::io::{Error, ErrorKind};
use std::time::Instant;

/// This tool removes the overlaps within a polygon layer. The layer is overlaid with
/// itself, fragments with identical geometry are collapsed into a single record, and each
/// fragment that was covered by more than one feature is handed to its nearest
/// neighbouring fragment that belonged to a single feature. Distance ties are broken in
/// favour of the smaller neighbour, then of the earlier one.
///
/// Each output polygon carries the origin key (`--key_field`) and the attributes of the
/// feature it now belongs to. A fragment with no neighbour keeps the smallest of its
/// contributing keys and is reported.
///
/// # See Also
/// `SeamlessCoverage`, `DetectOverlaps`
pub struct ResolveSelfOverlaps {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ResolveSelfOverlaps {
    pub fn new() -> ResolveSelfOverlaps {
        // public constructor
        let name = "ResolveSelfOverlaps".to_string();
        let toolbox = "Coverage Analysis".to_string();
        let description =
            "Collapses overlapping parts of a polygon layer and gives each part to a single feature."
                .to_string();

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
            name: "Output Polygon File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector polygon file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Origin Key Field".to_owned(),
            flags: vec!["--key_field".to_owned()],
            description: "Integer field identifying each original feature; created if absent."
                .to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Integer,
                "--input".to_string(),
            ),
            default_value: Some("OID_ORIG".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "-i=parcels.shp -o=resolved.shp");

        ResolveSelfOverlaps {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl SeamlessTool for ResolveSelfOverlaps {
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
            } else if flag_val == "-key_field" {
                config.key_field = value;
            }
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let start = Instant::now();
        if output_file.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "No output file was specified.",
            ));
        }
        let input_file = locate_input(&input_file, working_directory, None)?;
        let output_file = with_working_directory(&output_file, working_directory);

        if verbose {
            println!("Reading data...")
        };
        let input = read_collection(&input_file)?;

        if verbose {
            print_step(1, "resolving self-overlaps...");
        }
        let engine = GeoEngine::new(config.signature_precision);
        let (output, report) = resolve_self_overlaps(&engine, &input, &config)?;

        if verbose {
            println!(
                "Fragments: {}, records: {} ({} existing, {} new)",
                report.fragments, report.dissolved, report.existing, report.new
            );
            println!(
                "Reassigned: {}, unresolved: {}",
                report.reassigned, report.unresolved
            );
            for a in &report.anomalies {
                println!("  {}", a);
            }
        }

        write_collection(&output, &output_file, verbose)?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
