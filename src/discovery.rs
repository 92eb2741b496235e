//! Discovery Module for the reload generator
//!
//! Recursively scans a source tree for `.cs` files and lowers each one through the
//! C# front end. Build output folders and generated files (including our own
//! companions) are never picked up.

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::{Regex, RegexSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryOptions;
use crate::error::ParseError;
use crate::parse::CSharpParser;
use crate::syntax::CompilationUnit;

lazy_static! {
    /// Generated sources: `_codegen.cs`, `.g.cs`, `.g.i.cs`, `.generated.cs`, `.designer.cs`
    static ref GENERATED_FILE_RE: Regex =
        Regex::new(r"(?i)(_codegen|\.g|\.g\.i|\.generated|\.designer)\.cs$").unwrap();
}

const SKIPPED_DIRS: &[&str] = &["bin", "obj", "Library", "Temp", "Logs", ".git", ".vs"];

/// Recursively find all `.cs` files below `dir`, sorted by path.
pub fn find_source_files(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>, regex::Error> {
    let excludes = RegexSet::new(&options.exclude)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(options.follow_links)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !is_source_file(path) {
            continue;
        }
        let normalized = path.to_string_lossy().replace('\\', "/");
        if excludes.is_match(&normalized) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

pub fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.to_ascii_lowercase().ends_with(".cs") && !GENERATED_FILE_RE.is_match(name)
}

/// Parse every file in parallel, one parser per worker. Files that cannot be read
/// or parsed are logged and left out; the order of `paths` is kept.
pub fn parse_files(paths: &[PathBuf]) -> Result<Vec<CompilationUnit>, ParseError> {
    // Fail fast if the grammar itself cannot load.
    CSharpParser::new()?;

    let units = paths
        .par_iter()
        .map_init(
            || CSharpParser::new().ok(),
            |parser, path| {
                let parser = parser.as_mut()?;
                match parser.parse_file(path) {
                    Ok(unit) => Some(unit),
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "skipping source file");
                        None
                    }
                }
            },
        )
        .collect::<Vec<Option<CompilationUnit>>>()
        .into_iter()
        .flatten()
        .collect();
    Ok(units)
}

/// Reads units a host serialized as JSON: either one unit or an array of them.
pub fn load_syntax_json(path: &Path) -> Result<Vec<CompilationUnit>, ParseError> {
    let data = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&data).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let units = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|unit| vec![unit])
    };
    units.map_err(|source| ParseError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover and parse in one step.
pub fn discover_units(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<CompilationUnit>, DiscoveryError> {
    let files = find_source_files(dir, options)?;
    tracing::debug!(count = files.len(), root = %dir.display(), "discovered C# sources");
    Ok(parse_files(&files)?)
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
