/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::{print_step, read_collection, write_collection};
use crate::coverage::search::locate_input;
use crate::coverage::{CoveragePipeline, GapFilter, PipelineConfig, Stage, Workspace};
use crate::tools::*;
use seamless_common::configs::get_configs;
use seamless_common::utils::get_formatted_elapsed_time;
use std::io::{Error, ErrorKind};
use std::path::{self, Path};
use std::time::Instant;

/// This tool turns a polygon layer that may contain overlaps and gaps into a seamless
/// coverage: a set of non-overlapping polygons, one per original feature, that fills the
/// bounding envelope of the layer.
///
/// The tool works in four stages. First it checks whether any two features overlap. If
/// they do, the layer is overlaid with itself, identical fragments are collapsed into one
/// record, and every fragment shared by several features is given to its nearest
/// neighbouring feature (ties go to the smaller neighbour, then to the earlier one). The
/// uncovered area inside the envelope is then split into Thiessen cells built on the
/// vertices of the gaps. Finally, each cell is joined to the feature it touches, and the
/// features are dissolved by their origin key so that each one absorbs its share of the
/// gaps.
///
/// Every feature is identified by an origin key field (`--key_field`, `OID_ORIG` by
/// default). When the field is absent it is created and numbered from 1 in input order;
/// when it exists it must hold integer values.
///
/// Uncovered parts that are not genuine gaps, such as the frame left between an irregular
/// layer and its envelope, can be excluded with `--max_gap_area` (square kilometres). The
/// older behaviour of removing the single largest part is available with
/// `--remove_largest_gap`.
///
/// A JSON summary of the run is written next to the output (`<output>_summary.json`).
/// Intermediate layers are kept in the `seamless_run` subdirectory of the scratch
/// directory when `--keep_intermediates` is set. The scratch directory may not be the
/// working directory, nor hold the input or output file. Settings can also be read from a JSON file with `--config`; flags given on the
/// command line take precedence.
///
/// # See Also
/// `DetectOverlaps`, `ResolveSelfOverlaps`, `RemoveMosaicDuplicates`
pub struct SeamlessCoverage {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl SeamlessCoverage {
    pub fn new() -> SeamlessCoverage {
        // public constructor
        let name = "SeamlessCoverage".to_string();
        let toolbox = "Coverage Analysis".to_string();
        let description =
            "Resolves overlaps and fills gaps in a polygon layer, producing one non-overlapping polygon per feature."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Polygon File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input vector polygon file, or a file name to search for.".to_owned(),
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

        parameters.push(ToolParameter {
            name: "Maximum Gap Area (km²)".to_owned(),
            flags: vec!["--max_gap_area".to_owned()],
            description: "Uncovered parts larger than this area (square kilometres) are not filled."
                .to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Remove Largest Gap?".to_owned(),
            flags: vec!["--remove_largest_gap".to_owned()],
            description: "Leave the single largest uncovered part unfilled (deprecated).".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Skip Resolution Without Overlap?".to_owned(),
            flags: vec!["--no_resolve".to_owned()],
            description: "Skip self-overlap resolution when no overlap is found; set to false to always resolve."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("true".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Configuration File".to_owned(),
            flags: vec!["--config".to_owned()],
            description: "Optional JSON file of pipeline settings.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Text),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Keep Intermediate Layers?".to_owned(),
            flags: vec!["--keep_intermediates".to_owned()],
            description: "Write the intermediate layers of each stage to the scratch directory."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Scratch Directory".to_owned(),
            flags: vec!["--scratch".to_owned()],
            description: "Directory used for intermediate layers; must not hold the input or output.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Search Directory".to_owned(),
            flags: vec!["--search_dir".to_owned()],
            description: "Directory searched recursively when the input is given by name only."
                .to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=parcels.shp -o=coverage.shp --max_gap_area=0.5 --keep_intermediates",
        );

        SeamlessCoverage {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl SeamlessTool for SeamlessCoverage {
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
        let mut config_file = String::new();
        let mut scratch = String::new();
        let mut search_dir = String::new();
        let mut key_field: Option<String> = None;
        let mut max_gap_area: Option<f64> = None;
        let mut remove_largest_gap = false;
        let mut skip_resolver: Option<bool> = None;
        let mut keep_intermediates: Option<bool> = None;

        // read the arguments
        for (flag_val, value) in parse_args(&args)? {
            if flag_val == "-i" || flag_val == "-input" {
                input_file = value;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = value;
            } else if flag_val == "-key_field" {
                key_field = Some(value);
            } else if flag_val == "-max_gap_area" {
                let v = value.parse::<f64>().map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("Error parsing --max_gap_area value '{}'.", value),
                    )
                })?;
                if !(v > 0f64) {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        "--max_gap_area must be a positive number of square kilometres.",
                    ));
                }
                max_gap_area = Some(v);
            } else if flag_val == "-remove_largest_gap" {
                remove_largest_gap = flag_is_set(&value);
            } else if flag_val == "-no_resolve" {
                skip_resolver = Some(flag_is_set(&value));
            } else if flag_val == "-config" {
                config_file = value;
            } else if flag_val == "-keep_intermediates" {
                keep_intermediates = Some(flag_is_set(&value));
            } else if flag_val == "-scratch" {
                scratch = value;
            } else if flag_val == "-search_dir" {
                search_dir = value;
            }
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let start = Instant::now();

        if output_file.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "No output file was specified.",
            ));
        }
        output_file = with_working_directory(&output_file, working_directory);

        // settings: file first, then flags
        let mut config = if config_file.is_empty() {
            PipelineConfig::default()
        } else {
            PipelineConfig::from_file(&with_working_directory(&config_file, working_directory))?
        };
        if let Some(k) = key_field {
            config.key_field = k;
        }
        if let Some(a) = max_gap_area {
            config.gap_filter = GapFilter::MaxAreaKm2(a);
        }
        if remove_largest_gap {
            config.gap_filter = GapFilter::LargestPart;
        }
        if let Some(s) = skip_resolver {
            config.skip_resolver_without_overlap = s;
        }
        if let Some(k) = keep_intermediates {
            config.keep_intermediates = k;
        }

        let search = if search_dir.is_empty() {
            None
        } else {
            Some(search_dir.as_str())
        };
        let input_file = locate_input(&input_file, working_directory, search)?;

        if scratch.is_empty() {
            let configs = get_configs()?;
            scratch = if configs.scratch_directory.is_empty() {
                format!("{}scratch", working_directory)
            } else {
                configs.scratch_directory
            };
        } else {
            scratch = with_working_directory(&scratch, working_directory);
        }
        if !scratch.ends_with(&sep) && !scratch.ends_with("/") {
            scratch.push_str(&sep);
        }

        if verbose {
            println!("Reading data...")
        };
        let collection = read_collection(&input_file)?;
        if verbose {
            println!("Gap filter: {}", config.gap_filter);
        }

        let mut workspace = Workspace::open_apart(
            &scratch,
            config.keep_intermediates,
            &[
                Path::new(working_directory),
                Path::new(&input_file),
                Path::new(&output_file),
            ],
        )?;
        let pipeline = CoveragePipeline::new(config);
        let mut step = 0;
        let (output, mut summary) = pipeline.run_observed(&collection, &mut workspace, &mut |stage| {
            step += 1;
            if verbose {
                let (done, message) = match stage {
                    Stage::OverlapDetection => (0, "detecting overlaps..."),
                    Stage::SelfOverlapResolution => (1, "resolving self-overlaps..."),
                    Stage::GapTessellation => (2, "tessellating gaps..."),
                    Stage::JoinAndAggregate => (3, "joining and dissolving..."),
                    _ => (0, ""),
                };
                if done > 0 {
                    println!("Progress: {}%", done * 25);
                }
                print_step(step, message);
            }
        })?;
        if verbose {
            println!("Progress: 100%");
        }
        drop(workspace);

        write_collection(&output, &output_file, verbose)?;
        summary.output_file = Some(output_file.clone());
        let summary_file = summary.write_json(&output_file)?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", summary);
            println!("Summary written to {}", summary_file.display());
            println!("{}", &format!("Elapsed Time: {}", elapsed_time));
        }

        Ok(())
    }
}
