//! Structured trace side-channel.
//!
//! The pipeline reports every per-class decision as a [`TraceRecord`]. Callers opt
//! in by passing a [`TraceSink`]; nothing is written anywhere otherwise. Records are
//! also mirrored to `tracing` at debug level.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::eligibility::SkipReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceRecord {
    #[serde(rename_all = "camelCase")]
    AssemblyBlocked { assembly: String },
    #[serde(rename_all = "camelCase")]
    ClassSkipped {
        class_name: String,
        file: String,
        reason: SkipReason,
    },
    #[serde(rename_all = "camelCase")]
    NothingToReset { class_name: String, file: String },
    #[serde(rename_all = "camelCase")]
    MalformedMember {
        class_name: String,
        file: String,
        detail: String,
    },
    #[serde(rename_all = "camelCase")]
    UnitEmitted {
        name: String,
        class_name: String,
        content_hash: String,
        fields: usize,
        detachments: usize,
    },
    #[serde(rename_all = "camelCase")]
    MarkerEmitted { name: String },
}

impl TraceRecord {
    pub(crate) fn log(&self) {
        match self {
            TraceRecord::AssemblyBlocked { assembly } => {
                tracing::debug!(%assembly, "assembly is blocked, no companions generated");
            }
            TraceRecord::ClassSkipped {
                class_name, reason, ..
            } => {
                tracing::debug!(class = %class_name, reason = reason.describe(), "class skipped");
            }
            TraceRecord::NothingToReset { class_name, .. } => {
                tracing::debug!(class = %class_name, "no resettable state");
            }
            TraceRecord::MalformedMember {
                class_name, detail, ..
            } => {
                tracing::debug!(class = %class_name, %detail, "malformed member skipped");
            }
            TraceRecord::UnitEmitted {
                name,
                fields,
                detachments,
                ..
            } => {
                tracing::debug!(unit = %name, fields, detachments, "companion emitted");
            }
            TraceRecord::MarkerEmitted { name } => {
                tracing::debug!(unit = %name, "opt-out marker emitted");
            }
        }
    }
}

pub trait TraceSink {
    fn record(&mut self, record: &TraceRecord);
}

impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, record: &TraceRecord) {
        self.push(record.clone());
    }
}

/// Writes one JSON object per line. Write failures are logged, never raised:
/// tracing must not change the outcome of a generation run.
pub struct JsonLinesTrace<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesTrace<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for JsonLinesTrace<W> {
    fn record(&mut self, record: &TraceRecord) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write trace record");
        }
    }
}
