//! Emission Sink
//!
//! Hands rendered units to the host. A run registers each derived name at most once;
//! [`UnitRegistry`] enforces that before anything reaches the sink.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::{compute_hash, GeneratedUnit};
use crate::config::{GENERATED_EXTENSION, GENERATED_SUFFIX};
use crate::error::{GenerationError, SinkError};

/// Host side of the emission contract.
pub trait SourceSink {
    fn add_source(&mut self, name: &str, source: &str) -> Result<(), SinkError>;

    /// Called once after the last unit of a successful run.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAME REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

struct Claim {
    class_name: String,
    file: String,
}

/// Tracks derived names claimed during one run.
#[derive(Default)]
pub struct UnitRegistry {
    claims: HashMap<String, Claim>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, unit: &GeneratedUnit) -> Result<(), GenerationError> {
        if let Some(existing) = self.claims.get(&unit.name) {
            return Err(GenerationError::NameCollision {
                name: unit.name.clone(),
                first: existing.class_name.clone(),
                first_file: existing.file.clone(),
                second: unit.class_name.clone(),
                second_file: unit.source_file.clone(),
            });
        }
        self.claims.insert(
            unit.name.clone(),
            Claim {
                class_name: unit.class_name.clone(),
                file: unit.source_file.clone(),
            },
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SINKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Keeps units in memory, sorted by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub units: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.units.get(name).map(String::as_str)
    }
}

impl SourceSink for MemorySink {
    fn add_source(&mut self, name: &str, source: &str) -> Result<(), SinkError> {
        if self.units.contains_key(name) {
            return Err(SinkError::Rejected {
                name: name.to_string(),
                reason: "a unit with this name was already added".to_string(),
            });
        }
        self.units.insert(name.to_string(), source.to_string());
        Ok(())
    }
}

/// Writes units as files into one output directory.
///
/// Files whose content hash is unchanged are not rewritten, so build tools that
/// watch timestamps do not recompile. On `finish`, generated files left over from
/// previous runs are removed.
pub struct DirectorySink {
    dir: PathBuf,
    written: HashSet<String>,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            written: HashSet::new(),
            updated: 0,
            unchanged: 0,
            removed: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_generated_file(name: &str) -> bool {
        name.strip_suffix(GENERATED_EXTENSION)
            .is_some_and(|stem| stem.ends_with(GENERATED_SUFFIX))
    }
}

impl SourceSink for DirectorySink {
    fn add_source(&mut self, name: &str, source: &str) -> Result<(), SinkError> {
        let path = self.dir.join(name);

        let current = fs::read_to_string(&path).ok();
        let unchanged = current
            .as_deref()
            .is_some_and(|existing| compute_hash(existing) == compute_hash(source));

        if unchanged {
            self.unchanged += 1;
        } else {
            fs::write(&path, source).map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
            self.updated += 1;
        }
        self.written.insert(name.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !Self::is_generated_file(&file_name) || self.written.contains(&file_name) {
                continue;
            }
            let path = entry.path();
            fs::remove_file(&path).map_err(|source| SinkError::Io { path, source })?;
            tracing::debug!(file = %file_name, "removed stale generated file");
            self.removed += 1;
        }
        Ok(())
    }
}
