//! Configuration for the reload code generator.
//!
//! The deny-lists, the opt-out marker and the hook binding are compiled in.
//! Everything a build may reasonably vary lives in [`GenerateOptions`] and
//! [`DiscoveryOptions`], both loadable from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILED-IN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Namespaces of third-party libraries bundled into the same compilation.
/// A class in one of these, or nested below one, is never augmented.
pub const BLOCKED_NAMESPACES: &[&str] = &[
    "UnityEngine",
    "UnityEditor",
    "Unity",
    "TMPro",
    "System",
    "Microsoft",
    "Mono",
    "NUnit",
    "Newtonsoft.Json",
    "Cysharp.Threading.Tasks",
    "DG.Tweening",
    "Sirenix",
];

/// Assemblies whose sources are never augmented at all.
pub const BLOCKED_ASSEMBLIES: &[&str] = &["HofA"];

/// Opt-out attribute; `NoDomainReloadSupportAttribute` is accepted too.
pub const OPT_OUT_MARKER: &str = "NoDomainReloadSupport";
pub const ATTRIBUTE_SUFFIX: &str = "Attribute";

pub const MARKER_NAMESPACE: &str = "DomainReloadSupport";

/// Name of the generated reset method.
pub const HOOK_METHOD_NAME: &str = "ApplyStaticFieldsAndEventHandlers";

/// Runs once per play-mode entry, before scene load, even with domain reload disabled.
pub const HOOK_ATTRIBUTE: &str = "UnityEngine.RuntimeInitializeOnLoadMethod(UnityEngine.RuntimeInitializeLoadType.SubsystemRegistration)";

/// Placeholder used when a static field has no initializer.
pub const DEFAULT_VALUE_TOKEN: &str = "default";

pub const GENERATED_SUFFIX: &str = "_codegen";
pub const GENERATED_EXTENSION: &str = ".cs";

pub const CONFIG_FILE_NAME: &str = "reload-codegen.json";

pub fn is_blocked_assembly(assembly_name: Option<&str>) -> bool {
    match assembly_name {
        Some(name) if !name.is_empty() => BLOCKED_ASSEMBLIES.contains(&name),
        _ => false,
    }
}

/// Segment-wise prefix match: `UnityEngine.UI` is blocked by `UnityEngine`,
/// `UnityEngineExtras` is not.
pub fn is_blocked_namespace(path: &[String]) -> bool {
    BLOCKED_NAMESPACES.iter().any(|blocked| {
        let blocked: Vec<&str> = blocked.split('.').collect();
        path.len() >= blocked.len()
            && blocked
                .iter()
                .zip(path.iter())
                .all(|(b, segment)| *b == segment.as_str())
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Name of the assembly being compiled, if the host knows it
    pub assembly_name: Option<String>,
    /// Emit the opt-out marker attribute unit
    pub emit_marker: bool,
    /// Analyze classes on the rayon pool
    pub parallel: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            assembly_name: None,
            emit_marker: true,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryOptions {
    /// Extra regex patterns; matching paths (with `/` separators) are skipped
    pub exclude: Vec<String>,
    pub follow_links: bool,
}

/// On-disk configuration file shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub generate: GenerateOptions,
    pub discovery: DiscoveryOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `reload-codegen.json` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
