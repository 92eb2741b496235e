//! Codegen module for the reload generator
//!
//! Renders the companion partial declaration for one class: a single hook method
//! that first restores every collected static field and then detaches every
//! collected event subscription. Also renders the opt-out marker attribute.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::collect::StaticFieldEntry;
use crate::config::{
    ATTRIBUTE_SUFFIX, GENERATED_EXTENSION, GENERATED_SUFFIX, HOOK_ATTRIBUTE, HOOK_METHOD_NAME,
    MARKER_NAMESPACE, OPT_OUT_MARKER,
};
use crate::scope::ClassCandidate;
use crate::subscriptions::EventDetachment;
use crate::syntax::{Modifier, TypeDecl};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedUnit {
    /// Registration name, e.g. `Game.Player_codegen.cs`
    pub name: String,
    /// Fully-qualified class name, empty for the marker
    pub class_name: String,
    pub source_file: String,
    pub source: String,
    /// SHA-256 of `source`, lowercase hex
    pub content_hash: String,
    pub field_count: usize,
    pub detachment_count: usize,
}

impl GeneratedUnit {
    fn new(name: String, class_name: String, source_file: String, source: String) -> Self {
        let content_hash = compute_hash(&source);
        Self {
            name,
            class_name,
            source_file,
            source,
            content_hash,
            field_count: 0,
            detachment_count: 0,
        }
    }
}

pub fn compute_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn unit_name(candidate: &ClassCandidate<'_>) -> String {
    format!(
        "{}{}{}",
        candidate.metadata_name(),
        GENERATED_SUFFIX,
        GENERATED_EXTENSION
    )
}

pub fn marker_unit_name() -> String {
    format!(
        "{}{}{}{}",
        OPT_OUT_MARKER, ATTRIBUTE_SUFFIX, GENERATED_SUFFIX, GENERATED_EXTENSION
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE WRITER
// ═══════════════════════════════════════════════════════════════════════════════

const INDENT: &str = "    ";

struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Writes a statement that may span several lines. Continuation lines lose
    /// their common leading indentation and are re-indented at the current depth.
    /// Verbatim and raw strings may carry significant whitespace, so statements
    /// containing them keep their continuation lines untouched.
    fn statement(&mut self, text: &str) {
        let mut lines = text.lines();
        let Some(first) = lines.next() else {
            return;
        };
        self.line(first.trim_end());

        let rest: Vec<&str> = lines.collect();
        if rest.is_empty() {
            return;
        }
        if text.contains("@\"") || text.contains("\"\"\"") {
            for line in rest {
                self.out.push_str(line);
                self.out.push('\n');
            }
            return;
        }

        let common = rest
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start().len())
            .min()
            .unwrap_or(0);
        for line in rest {
            if line.trim().is_empty() {
                self.line("");
            } else {
                self.line(line.get(common..).unwrap_or(line).trim_end());
            }
        }
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPANION RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders the companion unit, or `None` when there is nothing to reset.
pub fn render(
    candidate: &ClassCandidate<'_>,
    fields: &[StaticFieldEntry],
    detachments: &[EventDetachment],
) -> Option<GeneratedUnit> {
    if fields.is_empty() && detachments.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new();
    w.line("// <auto-generated/>");

    let usings = candidate.unit_usings();
    for using in &usings {
        w.line(using);
    }
    if !usings.is_empty() {
        w.line("");
    }

    let in_namespace = !candidate.namespace.is_empty();
    if in_namespace {
        w.open(&format!("namespace {}", candidate.namespace.join(".")));
        let scoped = candidate.namespace_usings();
        for using in &scoped {
            w.line(using);
        }
        if !scoped.is_empty() {
            w.line("");
        }
    }

    for outer in &candidate.containing_types {
        w.open(&type_header(outer));
    }
    w.open(&type_header(candidate.decl));

    w.line(&format!("[{}]", HOOK_ATTRIBUTE));
    w.open(&format!("static void {}()", HOOK_METHOD_NAME));
    for field in fields {
        w.statement(&format!("{} = {};", field.identifier, field.value()));
    }
    for detachment in detachments {
        w.statement(&detachment.statement);
    }
    w.close();

    w.close();
    for _ in &candidate.containing_types {
        w.close();
    }
    if in_namespace {
        w.close();
    }

    let mut unit = GeneratedUnit::new(
        unit_name(candidate),
        candidate.fully_qualified_name(),
        candidate.file_path.to_string(),
        w.finish(),
    );
    unit.field_count = fields.len();
    unit.detachment_count = detachments.len();
    Some(unit)
}

/// `partial class Name<T>`; accessibility is left to the original declaration.
fn type_header(decl: &TypeDecl) -> String {
    let mut header = String::new();
    if decl.has_modifier(Modifier::Unsafe) {
        header.push_str("unsafe ");
    }
    header.push_str("partial ");
    header.push_str(decl.kind.keyword());
    header.push(' ');
    header.push_str(&decl.name);
    if let Some(params) = decl.type_parameters.as_deref() {
        header.push_str(params.trim());
    }
    header
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPT-OUT MARKER
// ═══════════════════════════════════════════════════════════════════════════════

pub fn render_marker() -> GeneratedUnit {
    let mut w = CodeWriter::new();
    w.line("// <auto-generated/>");
    w.line("using System;");
    w.line("");
    w.open(&format!("namespace {}", MARKER_NAMESPACE));
    w.line("[AttributeUsage(AttributeTargets.Class, Inherited = false, AllowMultiple = false)]");
    w.open(&format!(
        "internal sealed class {}{} : Attribute",
        OPT_OUT_MARKER, ATTRIBUTE_SUFFIX
    ));
    w.close();
    w.close();

    GeneratedUnit::new(marker_unit_name(), String::new(), String::new(), w.finish())
}
