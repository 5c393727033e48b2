/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::{print_step, read_collection, write_collection};
use crate::coverage::mosaic::remove_mosaic_duplicates;
use crate::coverage::search::locate_input;
use crate::coverage::{GeoEngine, PipelineConfig};
use crate::tools::*;
use seamless_common::utils::get_formatted_elapsed_time;
use std::io::{Error, ErrorKind};
use std::time::Instant;

/// This tool removes repeated copies of identical geometry from a mosaic of polygons, such
/// as tiles that were delivered with overlapping margins. The layer is overlaid with
/// itself; within each group of identical fragments the first one is kept and the others
/// are dropped.
///
/// With `--keep_marked` the repeated copies stay in the output instead. Each fragment then
/// carries its sequence number within its group (`NUM_SEQ`), and the repeats hold the
/// duplicate marker (`unknown`) in the classification field (`COMP` by default), which
/// `DetectOverlaps` leaves out of its test.
///
/// # See Also
/// `ResolveSelfOverlaps`, `DetectOverlaps`
pub struct RemoveMosaicDuplicates {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl RemoveMosaicDuplicates {
    pub fn new() -> RemoveMosaicDuplicates {
        // public constructor
        let name = "RemoveMosaicDuplicates".to_string();
        let toolbox = "Coverage Analysis".to_string();
        let description =
            "Removes repeated copies of identical polygons from a mosaic layer.".to_string();

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
            name: "Classification Field".to_owned(),
            flags: vec!["--class_field".to_owned()],
            description: "Classification field added to the output.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some("COMP".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Keep Marked Copies".to_owned(),
            flags: vec!["--keep_marked".to_owned()],
            description: "Keep repeated copies in the output, marked as duplicates.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "-i=tiles.shp -o=mosaic.shp");

        RemoveMosaicDuplicates {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl SeamlessTool for RemoveMosaicDuplicates {
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
        let mut keep_marked = false;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-class_field" && !value.is_empty() {
                config.classification_field = Some(value);
            } else if flag_val == "-keep_marked" {
                keep_marked = flag_is_set(&value);
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
            print_step(1, "removing repeated geometry...");
        }
        let engine = GeoEngine::new(config.signature_precision);
        let (output, report) = remove_mosaic_duplicates(&engine, &input, &config, keep_marked)?;

        if verbose {
            println!(
                "Fragments: {}, unique: {}, marked: {}, removed: {}",
                report.fragments,
                report.unique_geometries,
                report.duplicates_marked,
                report.duplicates_removed
            );
        }

        write_collection(&output, &output_file, verbose)?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
