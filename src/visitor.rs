use crate::syntax::{CompilationUnit, NamespaceDecl, NamespaceMember, TypeDecl};

/// The SyntaxVisitor trait defines the single traversal mechanism over the declaration tree.
///
/// Rules:
/// 1. Traversal order is source order and fixed.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call the matching `walk_*` function to continue traversal
///    unless pruning is intended.
///
/// Only declarations are visited. Method bodies are inspected by the passes that
/// need them, one level deep.
pub trait SyntaxVisitor<'ast> {
    fn visit_unit(&mut self, unit: &'ast CompilationUnit) {
        walk_unit(self, unit);
    }

    fn visit_members(&mut self, members: &'ast [NamespaceMember]) {
        walk_members(self, members);
    }

    fn visit_namespace(&mut self, namespace: &'ast NamespaceDecl) {
        walk_namespace(self, namespace);
    }

    fn visit_type(&mut self, decl: &'ast TypeDecl) {
        walk_type(self, decl);
    }
}

pub fn walk_unit<'ast, V: SyntaxVisitor<'ast> + ?Sized>(visitor: &mut V, unit: &'ast CompilationUnit) {
    visitor.visit_members(&unit.members);
}

pub fn walk_members<'ast, V: SyntaxVisitor<'ast> + ?Sized>(
    visitor: &mut V,
    members: &'ast [NamespaceMember],
) {
    for member in members {
        match member {
            NamespaceMember::Namespace(ns) => visitor.visit_namespace(ns),
            NamespaceMember::Type(decl) => visitor.visit_type(decl),
        }
    }
}

pub fn walk_namespace<'ast, V: SyntaxVisitor<'ast> + ?Sized>(
    visitor: &mut V,
    namespace: &'ast NamespaceDecl,
) {
    visitor.visit_members(&namespace.members);
}

pub fn walk_type<'ast, V: SyntaxVisitor<'ast> + ?Sized>(visitor: &mut V, decl: &'ast TypeDecl) {
    for nested in decl.nested_types() {
        visitor.visit_type(nested);
    }
}
