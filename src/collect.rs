//! Static-State Collector
//!
//! Walks the direct members of one class and gathers the mutable static fields to
//! reset plus the static `void` methods that may serve as event handlers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

use crate::config::DEFAULT_VALUE_TOKEN;
use crate::syntax::{ClassMember, FieldDecl, MethodDecl, Modifier, TypeDecl};

/// One mutable static field identifier to reassign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticFieldEntry {
    pub identifier: String,
    /// Declared type text, needed to re-create bare array initializers
    pub type_text: String,
    pub initializer: Option<String>,
}

impl StaticFieldEntry {
    /// Right-hand side of the reset assignment. A bare array initializer
    /// (`{ 1, 2 }`) is only legal in a declaration, so it becomes `new T[] { 1, 2 }`.
    pub fn value(&self) -> Cow<'_, str> {
        let Some(init) = self
            .initializer
            .as_deref()
            .map(str::trim)
            .filter(|init| !init.is_empty())
        else {
            return Cow::Borrowed(DEFAULT_VALUE_TOKEN);
        };

        if is_array_initializer(init) {
            Cow::Owned(format!("new {} {}", self.type_text.trim(), init))
        } else {
            Cow::Borrowed(init)
        }
    }
}

/// `{ ... }` can only start an array initializer in expression position.
fn is_array_initializer(init: &str) -> bool {
    init.trim_start().starts_with('{')
}

/// Names of static `void` methods, matched without regard to case.
#[derive(Debug, Clone, Default)]
pub struct HandlerSet {
    names: Vec<String>,
    folded: HashSet<String>,
}

impl HandlerSet {
    pub fn insert(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if self.folded.insert(name.to_lowercase()) {
            self.names.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.folded.contains(&name.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Declaration order, first spelling kept.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticState {
    pub fields: Vec<StaticFieldEntry>,
    pub handlers: HandlerSet,
    /// Members that could not be interpreted and were skipped
    pub malformed: Vec<String>,
}

pub fn collect(decl: &TypeDecl) -> StaticState {
    let mut state = StaticState::default();

    for member in &decl.members {
        match member {
            ClassMember::Field(field) if is_resettable(field) => {
                collect_field(field, &mut state);
            }
            ClassMember::Method(method) if is_candidate_handler(method) => {
                state.handlers.insert(&method.name);
            }
            _ => {}
        }
    }

    state
}

/// Static and assignable after construction.
pub fn is_resettable(field: &FieldDecl) -> bool {
    field.has_modifier(Modifier::Static)
        && !field.has_modifier(Modifier::Readonly)
        && !field.has_modifier(Modifier::Const)
}

/// Static and `void`; parameters are not inspected.
pub fn is_candidate_handler(method: &MethodDecl) -> bool {
    method.has_modifier(Modifier::Static) && method.returns_void()
}

fn collect_field(field: &FieldDecl, state: &mut StaticState) {
    if field.variables.is_empty() {
        state.malformed.push(format!(
            "static field declaration of type `{}` declares no identifiers",
            field.type_text.trim()
        ));
        return;
    }

    for variable in &field.variables {
        let identifier = variable.identifier.trim();
        if identifier.is_empty() {
            state.malformed.push(format!(
                "static field declarator of type `{}` has an empty identifier",
                field.type_text.trim()
            ));
            continue;
        }
        let type_text = field.type_text.trim();
        let bare_array = variable
            .initializer
            .as_deref()
            .is_some_and(is_array_initializer);
        if bare_array && type_text.is_empty() {
            state.malformed.push(format!(
                "static field `{identifier}` has an array initializer but no declared type"
            ));
            continue;
        }

        state.fields.push(StaticFieldEntry {
            identifier: identifier.to_string(),
            type_text: type_text.to_string(),
            initializer: variable.initializer.clone(),
        });
    }
}
