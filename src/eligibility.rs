//! Eligibility Filter
//!
//! Decides whether a class declaration may receive a companion reset method.
//! Pure predicates over the syntax model; no side effects.

use serde::{Deserialize, Serialize};

use crate::config::{self, ATTRIBUTE_SUFFIX, HOOK_METHOD_NAME, OPT_OUT_MARKER};
use crate::scope::ClassCandidate;
use crate::syntax::{Attribute, Modifier, TypeKind};

/// Why a class was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotAClass,
    Abstract,
    NotPartial,
    OptedOut,
    BlockedNamespace,
    ContainingTypeNotPartial,
    HookNameTaken,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::NotAClass => "only class declarations are augmented",
            SkipReason::Abstract => "abstract classes are skipped",
            SkipReason::NotPartial => "class is not declared partial",
            SkipReason::OptedOut => "class carries the opt-out marker",
            SkipReason::BlockedNamespace => "namespace is on the deny-list",
            SkipReason::ContainingTypeNotPartial => "an enclosing type is not declared partial",
            SkipReason::HookNameTaken => "class already declares a member named like the hook method",
        }
    }
}

/// Checks every rule in order and returns the first one that fails.
pub fn check(candidate: &ClassCandidate<'_>) -> Result<(), SkipReason> {
    let decl = candidate.decl;

    if decl.kind != TypeKind::Class {
        return Err(SkipReason::NotAClass);
    }
    if decl.has_modifier(Modifier::Abstract) {
        return Err(SkipReason::Abstract);
    }
    if !decl.has_modifier(Modifier::Partial) {
        return Err(SkipReason::NotPartial);
    }
    if has_opt_out_marker(&decl.attributes) {
        return Err(SkipReason::OptedOut);
    }
    if config::is_blocked_namespace(&candidate.namespace) {
        return Err(SkipReason::BlockedNamespace);
    }
    if candidate
        .containing_types
        .iter()
        .any(|outer| !outer.has_modifier(Modifier::Partial))
    {
        return Err(SkipReason::ContainingTypeNotPartial);
    }
    if decl.declares_member(HOOK_METHOD_NAME) {
        return Err(SkipReason::HookNameTaken);
    }

    Ok(())
}

pub fn is_eligible(candidate: &ClassCandidate<'_>) -> bool {
    check(candidate).is_ok()
}

/// Qualifiers are stripped; the comparison itself is case-sensitive.
pub fn has_opt_out_marker(attributes: &[Attribute]) -> bool {
    attributes.iter().any(|attr| is_marker_name(attr.simple_name()))
}

fn is_marker_name(name: &str) -> bool {
    name == OPT_OUT_MARKER
        || name
            .strip_suffix(ATTRIBUTE_SUFFIX)
            .is_some_and(|stem| stem == OPT_OUT_MARKER)
}
