use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

/// A structure to hold environment settings. Backed by settings.json file in
/// the current directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    /// Folder used for intermediate datasets. Empty means a `scratch`
    /// folder inside the working directory.
    #[serde(default)]
    pub scratch_directory: String,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
            scratch_directory: String::new(),
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }
}

fn config_file() -> Result<PathBuf, Error> {
    Ok(std::env::current_dir()?.join("settings.json"))
}

/// Loads settings.json, falling back to the defaults when the file is absent.
pub fn get_configs() -> Result<Configs, Error> {
    match fs::read_to_string(config_file()?) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse settings.json file: {}", e),
            )
        }),
        Err(_) => Ok(Configs::new()),
    }
}

pub fn save_configs(configs: &Configs) -> Result<(), Error> {
    let configs_json = serde_json::to_string_pretty(configs)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
    fs::write(config_file()?, configs_json)
}

#[cfg(test)]
mod test {
    use super::Configs;

    #[test]
    fn test_older_settings_without_scratch() {
        let c: Configs =
            serde_json::from_str(r#"{"verbose_mode": false, "working_directory": "/data"}"#)
                .unwrap();
        assert!(!c.verbose_mode);
        assert_eq!(c.working_directory, "/data");
        assert!(c.scratch_directory.is_empty());
    }
}
