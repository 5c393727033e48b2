/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::error::{CoverageError, CoverageResult};
use std::path::{self, Path, PathBuf};
use walkdir::WalkDir;

/// Finds a file by name under `base`, searching recursively. Matching
/// ignores case, and a name given without an extension matches a `.shp`
/// file with that stem. Entries are visited in sorted order, so the first
/// match is stable.
pub fn find_file<P: AsRef<Path>>(base: P, name: &str) -> Option<PathBuf> {
    let wanted = Path::new(name);
    let target = match wanted.extension() {
        Some(_) => name.to_lowercase(),
        None => format!("{}.shp", name.to_lowercase()),
    };
    WalkDir::new(base)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_string_lossy().to_lowercase() == target)
        .map(|e| e.into_path())
}

/// Resolves an input argument to a file path. A bare name is looked up in
/// the working directory first, then searched for under `search_dir`
/// (the working directory when unset).
pub fn locate_input(
    input: &str,
    working_directory: &str,
    search_dir: Option<&str>,
) -> CoverageResult<String> {
    if input.is_empty() {
        return Err(CoverageError::input(input, "no input file was specified"));
    }
    if input.contains(path::MAIN_SEPARATOR) || input.contains('/') {
        if Path::new(input).is_file() {
            return Ok(input.to_string());
        }
        return Err(CoverageError::input(input, "file not found"));
    }
    let direct = format!("{}{}", working_directory, input);
    if Path::new(&direct).is_file() {
        return Ok(direct);
    }
    let base = match search_dir {
        Some(dir) if !dir.is_empty() => dir,
        _ => working_directory,
    };
    match find_file(base, input) {
        Some(p) => Ok(p.to_string_lossy().to_string()),
        None => Err(CoverageError::input(
            input,
            format!("file not found under {}", base),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::{find_file, locate_input};
    use std::env;
    use std::fs;

    #[test]
    fn test_find_file() {
        let base = env::temp_dir().join(format!("seamless_search_{}", std::process::id()));
        let nested = base.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Parcels.shp"), b"").unwrap();
        fs::write(base.join("notes.txt"), b"").unwrap();

        assert_eq!(find_file(&base, "parcels"), Some(nested.join("Parcels.shp")));
        assert_eq!(find_file(&base, "PARCELS.SHP"), Some(nested.join("Parcels.shp")));
        assert_eq!(find_file(&base, "notes.txt"), Some(base.join("notes.txt")));
        assert_eq!(find_file(&base, "roads"), None);

        let wd = format!("{}{}", base.display(), std::path::MAIN_SEPARATOR);
        assert_eq!(
            locate_input("notes.txt", &wd, None).unwrap(),
            format!("{}notes.txt", wd)
        );
        assert_eq!(
            locate_input("parcels", &wd, None).unwrap(),
            nested.join("Parcels.shp").to_string_lossy()
        );
        assert!(locate_input("roads.shp", &wd, None).is_err());
        let _ = fs::remove_dir_all(&base);
    }
}
