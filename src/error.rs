use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_NAME_COLLISION: &str = "RCG001";
pub const ERR_SINK: &str = "RCG002";
pub const ERR_CANCELLED: &str = "RCG003";

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Two classes derived the same unit name in one run.
    #[error(
        "generated unit name `{name}` is claimed by both `{first}` ({first_file}) and `{second}` ({second_file})"
    )]
    NameCollision {
        name: String,
        first: String,
        first_file: String,
        second: String,
        second_file: String,
    },

    #[error("failed to register generated unit: {0}")]
    Sink(#[from] SinkError),

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::NameCollision { .. } => ERR_NAME_COLLISION,
            GenerationError::Sink(_) => ERR_SINK,
            GenerationError::Cancelled => ERR_CANCELLED,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("host rejected `{name}`: {reason}")]
    Rejected { name: String, reason: String },
}

// ═══════════════════════════════════════════════════════════════════════════════
// FRONT-END ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the C# grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parser produced no tree for {path}")]
    NoTree { path: String },

    #[error("invalid syntax model JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
