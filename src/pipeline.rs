//! Generation pipeline
//!
//! Filter, collect, match and render run per class and are pure, so they may run on
//! the rayon pool. Registration with the sink is serialized in input order, which
//! keeps the output identical whatever the scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codegen::{self, GeneratedUnit};
use crate::collect;
use crate::config::{self, GenerateOptions};
use crate::eligibility::{self, SkipReason};
use crate::emit::{SourceSink, UnitRegistry};
use crate::error::GenerationError;
use crate::scope::{class_candidates, ClassCandidate};
use crate::subscriptions;
use crate::syntax::CompilationUnit;
use crate::trace::{TraceRecord, TraceSink};

// ═══════════════════════════════════════════════════════════════════════════════
// PER-CLASS ANALYSIS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum ClassOutcome {
    Skipped(SkipReason),
    NothingToReset { malformed: Vec<String> },
    Generated {
        unit: GeneratedUnit,
        malformed: Vec<String>,
    },
}

/// Runs the whole per-class pass for one candidate.
pub fn analyze(candidate: &ClassCandidate<'_>) -> ClassOutcome {
    if let Err(reason) = eligibility::check(candidate) {
        return ClassOutcome::Skipped(reason);
    }

    let state = collect::collect(candidate.decl);
    let detachments = subscriptions::match_detachments(candidate.decl, &state.handlers);

    match codegen::render(candidate, &state.fields, &detachments) {
        Some(unit) => ClassOutcome::Generated {
            unit,
            malformed: state.malformed,
        },
        None => ClassOutcome::NothingToReset {
            malformed: state.malformed,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Registered units in registration order, marker first
    pub units: Vec<GeneratedUnit>,
    pub classes_scanned: usize,
    pub classes_skipped: usize,
    pub classes_without_state: usize,
    pub assembly_blocked: bool,
}

impl GenerationReport {
    pub fn unit(&self, name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Units generated for classes, excluding the marker.
    pub fn companions(&self) -> impl Iterator<Item = &GeneratedUnit> {
        self.units.iter().filter(|u| !u.class_name.is_empty())
    }
}

pub struct Generator<'a> {
    options: GenerateOptions,
    trace: Option<&'a mut dyn TraceSink>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Generator<'a> {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            trace: None,
            cancel: None,
        }
    }

    pub fn with_trace(mut self, trace: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(trace);
        self
    }

    /// The flag is polled before each class; once set, the run registers nothing.
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run(
        &mut self,
        units: &[CompilationUnit],
        sink: &mut dyn SourceSink,
    ) -> Result<GenerationReport, GenerationError> {
        let mut report = GenerationReport::default();
        let mut registry = UnitRegistry::new();

        let assembly = self.options.assembly_name.clone();
        if config::is_blocked_assembly(assembly.as_deref()) {
            report.assembly_blocked = true;
            self.record(TraceRecord::AssemblyBlocked {
                assembly: assembly.unwrap_or_default(),
            });
            self.register_marker(&mut registry, sink, &mut report)?;
            sink.finish()?;
            return Ok(report);
        }

        let candidates: Vec<ClassCandidate<'_>> =
            units.iter().flat_map(class_candidates).collect();
        report.classes_scanned = candidates.len();

        let outcomes = self.analyze_all(&candidates)?;

        self.register_marker(&mut registry, sink, &mut report)?;

        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            let class_name = candidate.fully_qualified_name();
            let file = candidate.file_path.to_string();

            match outcome {
                ClassOutcome::Skipped(reason) => {
                    report.classes_skipped += 1;
                    self.record(TraceRecord::ClassSkipped {
                        class_name,
                        file,
                        reason,
                    });
                }
                ClassOutcome::NothingToReset { malformed } => {
                    report.classes_without_state += 1;
                    self.record_malformed(&class_name, &file, malformed);
                    self.record(TraceRecord::NothingToReset { class_name, file });
                }
                ClassOutcome::Generated { unit, malformed } => {
                    self.record_malformed(&class_name, &file, malformed);
                    registry.claim(&unit)?;
                    sink.add_source(&unit.name, &unit.source)?;
                    self.record(TraceRecord::UnitEmitted {
                        name: unit.name.clone(),
                        class_name,
                        content_hash: unit.content_hash.clone(),
                        fields: unit.field_count,
                        detachments: unit.detachment_count,
                    });
                    report.units.push(unit);
                }
            }
        }

        sink.finish()?;

        tracing::info!(
            classes = report.classes_scanned,
            units = report.units.len(),
            skipped = report.classes_skipped,
            "reload companions generated"
        );
        Ok(report)
    }

    fn analyze_all(
        &self,
        candidates: &[ClassCandidate<'_>],
    ) -> Result<Vec<ClassOutcome>, GenerationError> {
        let cancel = self.cancel;
        let step = |candidate: &ClassCandidate<'_>| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                None
            } else {
                Some(analyze(candidate))
            }
        };

        let outcomes: Option<Vec<ClassOutcome>> = if self.options.parallel {
            candidates.par_iter().map(step).collect()
        } else {
            candidates.iter().map(step).collect()
        };
        outcomes.ok_or(GenerationError::Cancelled)
    }

    fn register_marker(
        &mut self,
        registry: &mut UnitRegistry,
        sink: &mut dyn SourceSink,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        if !self.options.emit_marker {
            return Ok(());
        }
        let marker = codegen::render_marker();
        registry.claim(&marker)?;
        sink.add_source(&marker.name, &marker.source)?;
        self.record(TraceRecord::MarkerEmitted {
            name: marker.name.clone(),
        });
        report.units.push(marker);
        Ok(())
    }

    fn record_malformed(&mut self, class_name: &str, file: &str, malformed: Vec<String>) {
        for detail in malformed {
            self.record(TraceRecord::MalformedMember {
                class_name: class_name.to_string(),
                file: file.to_string(),
                detail,
            });
        }
    }

    fn record(&mut self, record: TraceRecord) {
        record.log();
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.record(&record);
        }
    }
}

/// One-shot run without tracing or cancellation.
pub fn generate(
    units: &[CompilationUnit],
    options: &GenerateOptions,
    sink: &mut dyn SourceSink,
) -> Result<GenerationReport, GenerationError> {
    Generator::new(options.clone()).run(units, sink)
}
