/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

pub mod coverage_analysis;

use std::io::{Error, ErrorKind};

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(
        working_directory: &'a str,
        verbose_mode: &'a bool,
    ) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // coverage_analysis
        tool_names.push("DetectOverlaps".to_string());
        tool_names.push("RemoveMosaicDuplicates".to_string());
        tool_names.push("ResolveSelfOverlaps".to_string());
        tool_names.push("SeamlessCoverage".to_string());
        tool_names.sort();

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names: tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn SeamlessTool + 'static>> {
        match tool_name.to_lowercase().replace("_", "").as_ref() {
            // coverage_analysis
            "detectoverlaps" => Some(Box::new(coverage_analysis::DetectOverlaps::new())),
            "removemosaicduplicates" => {
                Some(Box::new(coverage_analysis::RemoveMosaicDuplicates::new()))
            }
            "resolveselfoverlaps" => Some(Box::new(coverage_analysis::ResolveSelfOverlaps::new())),
            "seamlesscoverage" => Some(Box::new(coverage_analysis::SeamlessCoverage::new())),

            _ => None,
        }
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(unrecognized(&tool_name)),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", get_help(tool)?),
                None => return Err(unrecognized(&tool_name)),
            }
        } else {
            let mut i = 1;
            for val in &self.tool_names {
                if let Some(tool) = self.get_tool(&val) {
                    println!("{}. {}\n", i, get_help(tool)?);
                    i += 1;
                }
            }
        }
        Ok(())
    }

    pub fn tool_license(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(_tool) => println!("MIT"),
            None => return Err(unrecognized(&tool_name)),
        }
        Ok(())
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => println!("{}", tool.get_tool_parameters()),
            None => return Err(unrecognized(&tool_name)),
        }
        Ok(())
    }

    pub fn toolbox(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", tool.get_toolbox()),
                None => return Err(unrecognized(&tool_name)),
            }
        } else {
            let mut tool_details: Vec<(String, String)> = Vec::new();
            for val in &self.tool_names {
                if let Some(tool) = self.get_tool(&val) {
                    tool_details.push((val.to_string(), tool.get_toolbox()));
                }
            }
            tool_details.sort();
            for (tool, toolbox) in &tool_details {
                println!("{}: {}", tool, toolbox);
            }
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            if let Some(tool) = self.get_tool(&val) {
                tool_details.push(get_name_and_description(tool));
            }
        }
        tool_details.sort();

        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            let tool = match self.get_tool(&val) {
                Some(t) => t,
                None => continue,
            };
            let toolbox = tool.get_toolbox().to_lowercase();
            let (nm, des) = get_name_and_description(tool);
            let hit = keywords.iter().any(|kw| {
                let kw = kw.to_lowercase();
                nm.to_lowercase().contains(&kw)
                    || des.to_lowercase().contains(&kw)
                    || toolbox.contains(&kw)
            });
            if hit {
                tool_details.push((nm, des));
            }
        }

        let mut ret = format!("All {} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn get_tool_names(&self) -> &[String] {
        &self.tool_names
    }
}

pub trait SeamlessTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn get_source_file(&self) -> String;
    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error>;
}

fn unrecognized(tool_name: &str) -> Error {
    Error::new(
        ErrorKind::NotFound,
        format!("Unrecognized tool name {}.", tool_name),
    )
}

fn get_help<'a>(wt: Box<dyn SeamlessTool + 'a>) -> Result<String, Error> {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters)?;
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    if let Some(a) = o["parameters"].as_array() {
        for d in a {
            let mut s = String::new();
            for f in d["flags"].as_array().into_iter().flatten() {
                s.push_str(&format!("{}, ", f.as_str().unwrap_or_default()));
            }
            p.push_str(&format!(
                "{:width$} {}\n",
                s.trim().trim_matches(','),
                d["description"].as_str().unwrap_or_default(),
                width = 18
            ));
        }
    }
    let example = wt.get_example_usage();
    let s = if example.len() <= 1 {
        format!(
            "{}

Description:\n{}
Toolbox: {}
Parameters:\n
{}
",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}
Description:\n{}
Toolbox: {}
Parameters:\n
{}

Example usage:
{}
",
            tool_name, description, toolbox, p, example
        )
    };
    Ok(s)
}

fn get_name_and_description<'a>(wt: Box<dyn SeamlessTool + 'a>) -> (String, String) {
    (wt.get_tool_name(), wt.get_tool_description())
}

#[derive(Serialize, Deserialize, Debug)]
struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

impl ToolParameter {
    pub fn to_string(&self) -> String {
        match serde_json::to_string(&self) {
            Ok(json_str) => json_str,
            Err(err) => format!("{:?}", err),
        }
    }
}

#[allow(dead_code)]
#[derive(Serialize, Deserialize, Debug)]
enum ParameterType {
    Boolean,
    String,
    Integer,
    Float,
    VectorAttributeField(AttributeType, String),
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
    Directory,
    OptionList(Vec<String>),
}

#[allow(dead_code)]
#[derive(Serialize, Deserialize, Debug)]
enum ParameterFileType {
    Any,
    Vector(VectorGeometryType),
    Text,
}

#[allow(dead_code)]
#[derive(Serialize, Deserialize, Debug)]
enum VectorGeometryType {
    Any,
    Point,
    Polygon,
}

#[allow(dead_code)]
#[derive(Serialize, Deserialize, Debug)]
enum AttributeType {
    Any,
    Integer,
    Text,
}

/// Parameters serialized as the `{"parameters": [...]}` document.
fn parameters_json(parameters: &[ToolParameter]) -> String {
    let mut s = String::from("{\"parameters\": [");
    for i in 0..parameters.len() {
        s.push_str(&(parameters[i].to_string()));
        if i < parameters.len() - 1 {
            s.push_str(",");
        }
    }
    s.push_str("]}");
    s
}

/// Example usage line with the executable's short name.
fn example_usage(tool_name: &str, flags: &str) -> String {
    let sep: String = std::path::MAIN_SEPARATOR.to_string();
    let exe = std::env::current_exe().unwrap_or_default();
    let e = format!("{}", exe.display());
    let mut parent = exe.clone();
    parent.pop();
    let p = format!("{}", parent.display());
    let mut short_exe = e
        .replace(&p, "")
        .replace(".exe", "")
        .replace(".", "")
        .replace(&sep, "");
    if e.contains(".exe") {
        short_exe += ".exe";
    }
    format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" {2}", short_exe, tool_name, flags)
        .replace("*", &sep)
}

fn print_welcome(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(32);
    // 32 = length of the 'Powered by' statement.
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!("* Powered by Seamless Coverage {}*", " ".repeat(welcome_len - 32));
    println!("{}", "*".repeat(welcome_len));
}

/// Splits raw `-flag=value` / `-flag value` arguments into (flag, value)
/// pairs. Flags are lower-cased and `--` becomes `-`; a flag with no
/// value gets an empty string.
fn parse_args(args: &[String]) -> Result<Vec<(String, String)>, Error> {
    if args.len() == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Tool run with no parameters.",
        ));
    }
    let mut parsed = vec![];
    let mut i = 0;
    while i < args.len() {
        let mut arg = args[i].replace("\"", "");
        arg = arg.replace("\'", "");
        let vec = arg.splitn(2, "=").collect::<Vec<&str>>();
        let flag_val = vec[0].to_lowercase().replace("--", "-");
        if !flag_val.starts_with("-") {
            i += 1;
            continue;
        }
        if vec.len() > 1 {
            parsed.push((flag_val, vec[1].to_string()));
        } else if i + 1 < args.len() && !looks_like_flag(&args[i + 1]) {
            parsed.push((flag_val, args[i + 1].replace("\"", "").replace("\'", "")));
            i += 1;
        } else {
            parsed.push((flag_val, String::new()));
        }
        i += 1;
    }
    Ok(parsed)
}

fn looks_like_flag(arg: &str) -> bool {
    arg.starts_with("-") && arg.parse::<f64>().is_err()
}

/// A boolean flag is set when given bare or with a value other than `false`.
fn flag_is_set(value: &str) -> bool {
    !value.eq_ignore_ascii_case("false")
}

/// Prefixes bare file names with the working directory.
fn with_working_directory(file_name: &str, working_directory: &str) -> String {
    if !file_name.contains(std::path::MAIN_SEPARATOR) && !file_name.contains("/") {
        format!("{}{}", working_directory, file_name)
    } else {
        file_name.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::{flag_is_set, parse_args, with_working_directory, ToolManager};

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = strings(&[
            "-i=\"in.shp\"",
            "--output",
            "out.shp",
            "--max_gap_area",
            "-1.5",
            "--no_resolve",
            "-v",
        ]);
        let parsed = parse_args(&args).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("-i".to_string(), "in.shp".to_string()),
                ("-output".to_string(), "out.shp".to_string()),
                ("-max_gap_area".to_string(), "-1.5".to_string()),
                ("-no_resolve".to_string(), "".to_string()),
                ("-v".to_string(), "".to_string()),
            ]
        );
        assert!(parse_args(&[]).is_err());
        assert!(flag_is_set(""));
        assert!(!flag_is_set("False"));
    }

    #[test]
    fn test_working_directory_prefix() {
        assert_eq!(with_working_directory("a.shp", "/data/"), "/data/a.shp");
        assert_eq!(with_working_directory("/x/a.shp", "/data/"), "/x/a.shp");
    }

    #[test]
    fn test_tool_lookup() {
        let tm = ToolManager::new("", &false).unwrap();
        assert_eq!(tm.get_tool_names().len(), 4);
        for name in tm.get_tool_names() {
            let tool = tm.get_tool(name).unwrap();
            assert_eq!(&tool.get_tool_name(), name);
            let params: serde_json::Value =
                serde_json::from_str(&tool.get_tool_parameters()).unwrap();
            assert!(params["parameters"].as_array().unwrap().len() >= 2);
        }
        assert!(tm.get_tool("seamless_coverage").is_some());
        assert!(tm.get_tool("Slope").is_none());
    }
}
