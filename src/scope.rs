//! Class scope resolution.
//!
//! Flattens a compilation unit into one [`ClassCandidate`] per class declaration,
//! carrying everything the companion file must reproduce: the namespace path, the
//! containing types of nested classes and the using directives in effect.

use crate::syntax::{CompilationUnit, NamespaceDecl, TypeDecl, TypeKind, UsingDirective};
use crate::visitor::{walk_namespace, walk_type, SyntaxVisitor};

/// One class declaration together with its resolved scope.
#[derive(Debug, Clone)]
pub struct ClassCandidate<'ast> {
    pub decl: &'ast TypeDecl,
    pub file_path: &'ast str,
    /// Outermost segment first
    pub namespace: Vec<String>,
    /// Enclosing type declarations of a nested class, outermost first
    pub containing_types: Vec<&'ast TypeDecl>,
    /// Compilation-unit level directives
    pub usings: Vec<&'ast UsingDirective>,
    /// Directives declared inside the enclosing namespace blocks, outermost first
    pub scoped_usings: Vec<&'ast UsingDirective>,
}

impl<'ast> ClassCandidate<'ast> {
    pub fn name(&self) -> &'ast str {
        &self.decl.name
    }

    /// `Game.Audio.Mixer.Channel` for a nested `Channel` in `Mixer`.
    pub fn fully_qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespace.iter().map(String::as_str).collect();
        parts.extend(self.containing_types.iter().map(|t| t.name.as_str()));
        parts.push(&self.decl.name);
        parts.join(".")
    }

    /// Like [`Self::fully_qualified_name`] with CLR arity suffixes (`Pool`1`), so
    /// generic and non-generic types of the same name stay distinct.
    pub fn metadata_name(&self) -> String {
        let mut parts: Vec<String> = self.namespace.clone();
        for decl in self.containing_types.iter().copied().chain([self.decl]) {
            match decl.arity() {
                0 => parts.push(decl.name.clone()),
                n => parts.push(format!("{}`{}", decl.name, n)),
            }
        }
        parts.join(".")
    }

    /// Using directives deduplicated by text, first occurrence wins.
    pub fn unit_usings(&self) -> Vec<&'ast str> {
        dedup(&self.usings)
    }

    pub fn namespace_usings(&self) -> Vec<&'ast str> {
        dedup(&self.scoped_usings)
    }
}

fn dedup<'ast>(directives: &[&'ast UsingDirective]) -> Vec<&'ast str> {
    let mut seen = std::collections::HashSet::new();
    directives
        .iter()
        .map(|d| d.text.trim())
        .filter(|text| !text.is_empty() && seen.insert(*text))
        .collect()
}

/// Collect every class declaration of `unit` in source order.
pub fn class_candidates(unit: &CompilationUnit) -> Vec<ClassCandidate<'_>> {
    let mut resolver = ScopeResolver {
        file_path: &unit.file_path,
        usings: unit.usings.iter().collect(),
        namespace: Vec::new(),
        scoped_usings: Vec::new(),
        containing_types: Vec::new(),
        candidates: Vec::new(),
    };
    resolver.visit_unit(unit);
    resolver.candidates
}

struct ScopeResolver<'ast> {
    file_path: &'ast str,
    usings: Vec<&'ast UsingDirective>,
    namespace: Vec<String>,
    scoped_usings: Vec<&'ast UsingDirective>,
    containing_types: Vec<&'ast TypeDecl>,
    candidates: Vec<ClassCandidate<'ast>>,
}

impl<'ast> SyntaxVisitor<'ast> for ScopeResolver<'ast> {
    fn visit_namespace(&mut self, namespace: &'ast NamespaceDecl) {
        let segments = namespace.segments();
        let namespace_depth = self.namespace.len();
        let usings_depth = self.scoped_usings.len();

        self.namespace.extend(segments);
        self.scoped_usings.extend(namespace.usings.iter());
        walk_namespace(self, namespace);

        self.namespace.truncate(namespace_depth);
        self.scoped_usings.truncate(usings_depth);
    }

    fn visit_type(&mut self, decl: &'ast TypeDecl) {
        if decl.kind == TypeKind::Class {
            self.candidates.push(ClassCandidate {
                decl,
                file_path: self.file_path,
                namespace: self.namespace.clone(),
                containing_types: self.containing_types.clone(),
                usings: self.usings.clone(),
                scoped_usings: self.scoped_usings.clone(),
            });
        }

        self.containing_types.push(decl);
        walk_type(self, decl);
        self.containing_types.pop();
    }
}
