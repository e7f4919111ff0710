//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! definitions from files, directories, and strings.

use crate::encoder::from_json;
use crate::parser::parse;
use crate::types::{Definition, TuringMachineError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions the loader recognizes.
const EXTENSIONS: [&str; 2] = ["tm", "json"];

/// `ProgramLoader` is a utility struct for loading machine definitions.
///
/// Files ending in `.json` are decoded as JSON; anything else is parsed as `.tm` text.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read, decoded, and analyzed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` or `SerializationError` if the content
    ///   is not a valid definition.
    pub fn load_definition(path: &Path) -> Result<Definition, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("Loading definition from {}", path.display());
        if path.extension().is_some_and(|ext| ext == "json") {
            from_json(&content)
        } else {
            parse(&content)
        }
    }

    /// Loads a single definition from `.tm` text.
    pub fn load_definition_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        parse(content)
    }

    /// Loads every `.tm` and `.json` definition in a directory.
    ///
    /// Subdirectories and other files are skipped. Each loaded file yields one
    /// `Result`, carrying either its path and definition or the error it produced.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, Definition), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                let recognized = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| EXTENSIONS.contains(&ext));
                if path.is_dir() || !recognized {
                    return None;
                }

                Some(Self::load_definition(&path).map(|definition| (path, definition)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_json;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "name: Test Program\ninput: a\nrules:\n  start:\n    a -> b, R, stop\n  stop:";

    #[test]
    fn test_load_valid_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let definition = ProgramLoader::load_definition(&file_path).unwrap();
        assert_eq!(definition.name, "Test Program");
        assert_eq!(definition.signature.start_state, "start");
        assert_eq!(definition.rules.len(), 1);
    }

    #[test]
    fn test_load_json_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");
        let definition = ProgramLoader::load_definition_from_string(VALID).unwrap();

        fs::write(&file_path, to_json(&definition).unwrap()).unwrap();

        let loaded = ProgramLoader::load_definition(&file_path).unwrap();
        assert_eq!(loaded, definition);
    }

    #[test]
    fn test_load_invalid_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"This is not a valid definition").unwrap();

        assert!(ProgramLoader::load_definition(&file_path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();

        let result = ProgramLoader::load_definition(&dir.path().join("missing.tm"));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_definitions_from_directory() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("valid.tm"), VALID).unwrap();
        fs::write(dir.path().join("invalid.tm"), "This is not a valid definition").unwrap();
        fs::write(dir.path().join("ignored.txt"), "This file should be ignored").unwrap();
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_definitions(dir.path());

        // One success and one error; the text file and directory are skipped.
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_definitions_missing_directory() {
        let dir = tempdir().unwrap();

        let results = ProgramLoader::load_definitions(&dir.path().join("missing"));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TuringMachineError::FileError(_))));
    }
}
