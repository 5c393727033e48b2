/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

/*!
Seamless Coverage turns polygon layers with overlaps and gaps into seamless coverages.

It is a command-line program, run either from a terminal or from a script. The
following commands are recognized:

| Command           | Description                                                                                       |
| ----------------- | ------------------------------------------------------------------------------------------------- |
| --cd, --wd        | Changes the working directory; used in conjunction with --run flag.                               |
| -h, --help        | Prints help information.                                                                          |
| -l, --license     | Prints the license. Tool names may also be used, --license=\"SeamlessCoverage\"                   |
| --listtools       | Lists all available tools, with tool descriptions. Keywords may also be used, --listtools overlap.|
| -r, --run         | Runs a tool; used in conjunction with --cd flag; -r="SeamlessCoverage".                           |
| --toolbox         | Prints the toolbox associated with a tool; --toolbox=DetectOverlaps.                              |
| --toolhelp        | Prints the help associated with a tool; --toolhelp="SeamlessCoverage".                            |
| --toolparameters  | Prints the parameters (in json form) for a specific tool; --toolparameters=\"SeamlessCoverage\".  |
| -v                | Verbose mode. Without this flag, tool outputs will not be printed.                                |
| --version         | Prints the version information.                                                                   |

Log output of the pipeline is controlled with the `RUST_LOG` environment variable.
*/

use seamless_common::configs::{get_configs, save_configs};
use seamless_tools::tools::ToolManager;
use std::env;
use std::io::Error;
use std::path;

/// Seamless Coverage command-line entry point.
///
/// # Examples
///
/// ```
/// >>./seamless_tools --wd='/Users/jane/data/' --run=SeamlessCoverage --input='parcels.shp' --output='coverage.shp' -v
/// ```
fn main() {
    env_logger::init();
    match run() {
        Ok(()) => {}
        Err(err) => panic!("{}", err),
    }
}

fn run() -> Result<(), Error> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut working_dir = String::new();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut toolbox = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut tool_args_vec: Vec<String> = vec![];
    let mut finding_working_dir = false;
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        version();
        help();
        let tm = ToolManager::new(&working_dir, &false)?;
        tm.list_tools();

        return Ok(());
    }

    let mut configs = get_configs()?;
    let mut configs_modified = false;

    for arg in args.into_iter().skip(1) {
        let flag_val = arg.to_lowercase().replace("--", "-");
        if flag_val == "-h" || flag_val == "-help" {
            help();
            return Ok(());
        } else if flag_val.starts_with("-cd")
            || flag_val.starts_with("-wd")
            || flag_val.starts_with("-working_directory")
        {
            let mut v = strip_flag(&arg, &["--cd", "--wd", "--working_directory", "-cd", "-wd", "-working_directory"]);
            if v.trim().is_empty() {
                finding_working_dir = true;
                continue;
            }
            if !v.ends_with(sep) {
                v.push_str(sep);
            }
            working_dir = v;
            if configs.working_directory != working_dir {
                configs.working_directory = working_dir.clone();
                configs_modified = true;
            }
        } else if flag_val.starts_with("-run") || flag_val == "-r" || flag_val.starts_with("-r=") {
            tool_name = strip_flag(&arg, &["--run", "-run", "-r"]);
            run_tool = true;
        } else if flag_val.starts_with("-toolhelp") {
            tool_name = strip_flag(&arg, &["--toolhelp", "-toolhelp"]);
            tool_help = true;
        } else if flag_val.starts_with("-toolparameters") {
            tool_name = strip_flag(&arg, &["--toolparameters", "-toolparameters"]);
            tool_parameters = true;
        } else if flag_val.starts_with("-toolbox") {
            tool_name = strip_flag(&arg, &["--toolbox", "-toolbox"]);
            toolbox = true;
        } else if flag_val.starts_with("-listtools") || flag_val.starts_with("-list_tools") {
            list_tools = true;
        } else if flag_val.starts_with("-license")
            || flag_val.starts_with("-licence")
            || flag_val == "-l"
        {
            let name = strip_flag(&arg, &["--license", "-license", "--licence", "-licence", "-l"]);
            if !name.is_empty() {
                let tm = ToolManager::new(&configs.working_directory, &configs.verbose_mode)?;
                return tm.tool_license(name);
            }
            license();
            return Ok(());
        } else if flag_val == "-v" || flag_val.starts_with("-v=") || flag_val.starts_with("-verbose") {
            let v = strip_flag(&arg, &["--verbose", "-verbose", "-v"]).to_lowercase();
            let verbose = v.is_empty() || v.contains("t");
            if configs.verbose_mode != verbose {
                configs.verbose_mode = verbose;
                configs_modified = true;
            }
        } else if flag_val.starts_with("-version") {
            version();
            return Ok(());
        } else if arg.starts_with("-") {
            // it's an arg to be fed to the tool
            tool_args_vec.push(arg.trim().to_string());
        } else {
            let v = arg.trim().replace("\"", "").replace("\'", "");
            if finding_working_dir {
                working_dir = v;
                if !working_dir.ends_with(sep) {
                    working_dir.push_str(sep);
                }
                finding_working_dir = false;
                configs.working_directory = working_dir.clone();
                configs_modified = true;
            } else if tool_args_vec.len() > 0 {
                tool_args_vec.push(arg.trim().to_string());
            } else {
                // add it to the keywords list
                keywords.push(v);
            }
        }
    }

    if configs_modified {
        save_configs(&configs)?;
    }

    let tm = ToolManager::new(&configs.working_directory, &configs.verbose_mode)?;
    if tool_name.is_empty() && keywords.len() > 0 && !list_tools {
        tool_name = keywords[0].clone();
    }
    if run_tool {
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if toolbox {
        return tm.toolbox(tool_name);
    } else if list_tools {
        if keywords.len() == 0 {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
    }

    Ok(())
}

/// Removes a flag name, quotes and a leading '=' from a raw argument.
fn strip_flag(arg: &str, names: &[&str]) -> String {
    let mut v = arg.replace("\"", "").replace("\'", "");
    for name in names {
        if v.to_lowercase().starts_with(name) {
            v = v[name.len()..].to_string();
            break;
        }
    }
    if v.starts_with("=") {
        v = v[1..].to_string();
    }
    v
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("seamless_tools{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "Seamless Coverage Help

The following commands are recognized:
--cd, --wd          Changes the working directory; used in conjunction with --run flag.
-h, --help          Prints help information.
-l, --license       Prints the license. Tool names may also be used, --license=\"SeamlessCoverage\"
--listtools         Lists all available tools. Keywords may also be used, --listtools overlap.
-r, --run           Runs a tool; used in conjunction with --wd flag; -r=\"SeamlessCoverage\".
--toolbox           Prints the toolbox associated with a tool; --toolbox=DetectOverlaps.
--toolhelp          Prints the help associated with a tool; --toolhelp=\"SeamlessCoverage\".
--toolparameters    Prints the parameters (in json form) for a specific tool; --toolparameters=\"SeamlessCoverage\".
-v                  Verbose mode. Without this flag, tool outputs will not be printed.
--version           Prints the version information.

Set RUST_LOG=info (or debug) to see the log of each pipeline stage.

Example Usage:
>> .*EXE_NAME -r=SeamlessCoverage --cd=\"*path*to*data*\" -i=parcels.shp -o=coverage.shp --max_gap_area=0.5
"
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn license() {
    let license_text = "Seamless Coverage License

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the \"Software\"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.";
    println!("{}", license_text);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "Seamless Coverage v{}

Builds seamless polygon coverages: overlaps are resolved, gaps are
filled with Thiessen cells and each feature keeps its attributes.",
        VERSION.unwrap_or("unknown")
    );
}
