//! Parse Module for the reload generator
//!
//! Lowers a tree-sitter C# concrete syntax tree into the owned syntax model in
//! [`crate::syntax`]. Only the shapes the analysis needs are lowered in detail;
//! everything else is kept as an opaque `Other` node with its kind.
//!
//! Error nodes are dropped and the rest of the file is still lowered. Declarations
//! inside preprocessor conditionals are skipped: a reset emitted outside the
//! conditional would not compile when the symbol is undefined.

use std::fs;
use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::error::ParseError;
use crate::syntax::{
    AssignmentOperator, Attribute, ClassMember, CompilationUnit, Expression,
    ExpressionStatement, FieldDecl, MethodDecl, Modifier, NamespaceDecl, NamespaceMember,
    Parameter, Statement, TypeDecl, TypeKind, TypeRef, UsingDirective, VariableDeclarator,
};

pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language = tree_sitter_c_sharp::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str, file_path: &str) -> Result<CompilationUnit, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::NoTree {
                path: file_path.to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(file = file_path, "syntax errors present, lowering what parsed");
        }

        let mut unit = CompilationUnit {
            file_path: file_path.to_string(),
            usings: Vec::new(),
            members: Vec::new(),
        };
        lower_compilation_unit(root, source, &mut unit);
        Ok(unit)
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<CompilationUnit, ParseError> {
        let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&source, &path.to_string_lossy())
    }
}

/// Convenience for one-off parses; builds a fresh parser.
pub fn parse_source(source: &str, file_path: &str) -> Result<CompilationUnit, ParseError> {
    CSharpParser::new()?.parse(source, file_path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAMESPACE LEVEL
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_compilation_unit(node: Node<'_>, source: &str, unit: &mut CompilationUnit) {
    // With a file-scoped namespace every later sibling belongs to it.
    let mut file_namespace: Option<NamespaceDecl> = None;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "file_scoped_namespace_declaration" => {
                let Some(name) = namespace_name(child, source) else {
                    continue;
                };
                let mut ns = NamespaceDecl {
                    name,
                    usings: Vec::new(),
                    members: Vec::new(),
                };
                lower_declaration_list(child, source, &mut ns.usings, &mut ns.members);
                file_namespace = Some(ns);
            }
            _ => match file_namespace.as_mut() {
                Some(ns) => lower_namespace_member(child, source, &mut ns.usings, &mut ns.members),
                None => lower_namespace_member(child, source, &mut unit.usings, &mut unit.members),
            },
        }
    }

    if let Some(ns) = file_namespace {
        unit.members.push(NamespaceMember::Namespace(ns));
    }
}

fn lower_declaration_list(
    node: Node<'_>,
    source: &str,
    usings: &mut Vec<UsingDirective>,
    members: &mut Vec<NamespaceMember>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        lower_namespace_member(child, source, usings, members);
    }
}

fn lower_namespace_member(
    node: Node<'_>,
    source: &str,
    usings: &mut Vec<UsingDirective>,
    members: &mut Vec<NamespaceMember>,
) {
    match node.kind() {
        "using_directive" => {
            if let Some(using) = lower_using(node, source) {
                usings.push(using);
            }
        }
        "namespace_declaration" => {
            let Some(name) = namespace_name(node, source) else {
                return;
            };
            let mut ns = NamespaceDecl {
                name,
                usings: Vec::new(),
                members: Vec::new(),
            };
            if let Some(body) = node.child_by_field_name("body") {
                lower_declaration_list(body, source, &mut ns.usings, &mut ns.members);
            }
            members.push(NamespaceMember::Namespace(ns));
        }
        "declaration_list" => lower_declaration_list(node, source, usings, members),
        kind => {
            if let Some(decl) = type_kind(node, kind).and_then(|k| lower_type(node, k, source)) {
                members.push(NamespaceMember::Type(decl));
            }
        }
    }
}

/// Global usings already apply to the whole compilation and are not repeated.
fn lower_using(node: Node<'_>, source: &str) -> Option<UsingDirective> {
    let text = node_text(node, source);
    if text.is_empty() || text.starts_with("global ") {
        return None;
    }
    Some(UsingDirective::new(text))
}

fn namespace_name(node: Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source))
        .filter(|value| !value.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPE DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn type_kind(node: Node<'_>, kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "struct_declaration" => Some(TypeKind::Struct),
        "interface_declaration" => Some(TypeKind::Interface),
        "record_struct_declaration" => Some(TypeKind::RecordStruct),
        "record_declaration" => {
            let mut cursor = node.walk();
            let is_struct = node
                .children(&mut cursor)
                .any(|child| !child.is_named() && child.kind() == "struct");
            Some(if is_struct {
                TypeKind::RecordStruct
            } else {
                TypeKind::Record
            })
        }
        _ => None,
    }
}

fn lower_type(node: Node<'_>, kind: TypeKind, source: &str) -> Option<TypeDecl> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .filter(|name| !name.is_empty())?;

    let type_parameters = node
        .child_by_field_name("type_parameters")
        .or_else(|| first_child_of_kind(node, "type_parameter_list"))
        .map(|n| node_text(n, source));

    let mut decl = TypeDecl {
        kind,
        name,
        type_parameters,
        modifiers: modifiers(node, source),
        attributes: attributes(node, source),
        members: Vec::new(),
    };

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if let Some(member) = lower_class_member(child, source) {
                decl.members.push(member);
            }
        }
    }

    Some(decl)
}

fn lower_class_member(node: Node<'_>, source: &str) -> Option<ClassMember> {
    let kind = node.kind();
    if let Some(type_kind) = type_kind(node, kind) {
        return lower_type(node, type_kind, source).map(ClassMember::Type);
    }

    match kind {
        "field_declaration" => Some(ClassMember::Field(lower_field(node, source))),
        "method_declaration" => lower_method(node, source).map(ClassMember::Method),
        "event_field_declaration" => Some(ClassMember::Other {
            kind: kind.to_string(),
            name: first_child_of_kind(node, "variable_declaration")
                .and_then(|decl| first_child_of_kind(decl, "variable_declarator"))
                .and_then(|declarator| declarator_name(declarator, source)),
        }),
        "property_declaration" | "event_declaration" | "enum_declaration"
        | "delegate_declaration" | "constructor_declaration" | "destructor_declaration"
        | "indexer_declaration" | "operator_declaration" | "conversion_operator_declaration" => {
            Some(ClassMember::Other {
                kind: kind.to_string(),
                name: node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .filter(|name| !name.is_empty()),
            })
        }
        _ => None,
    }
}

fn modifiers(node: Node<'_>, source: &str) -> Vec<Modifier> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == "modifier")
        .map(|child| Modifier::from_keyword(&node_text(child, source)))
        .collect()
}

fn attributes(node: Node<'_>, source: &str) -> Vec<Attribute> {
    let mut result = Vec::new();
    let mut cursor = node.walk();
    for list in node.named_children(&mut cursor) {
        if list.kind() != "attribute_list" {
            continue;
        }
        let mut list_cursor = list.walk();
        for attr in list.named_children(&mut list_cursor) {
            if attr.kind() != "attribute" {
                continue;
            }
            let name = attr
                .child_by_field_name("name")
                .or_else(|| attr.named_child(0))
                .map(|n| node_text(n, source))
                .unwrap_or_default();
            if !name.is_empty() {
                result.push(Attribute::new(name));
            }
        }
    }
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_field(node: Node<'_>, source: &str) -> FieldDecl {
    let mut field = FieldDecl {
        modifiers: modifiers(node, source),
        attributes: attributes(node, source),
        type_text: String::new(),
        variables: Vec::new(),
    };

    let Some(declaration) = first_child_of_kind(node, "variable_declaration") else {
        return field;
    };
    field.type_text = declaration
        .child_by_field_name("type")
        .map(|n| node_text(n, source))
        .unwrap_or_default();

    let mut cursor = declaration.walk();
    for declarator in declaration.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(identifier) = declarator_name(declarator, source) else {
            continue;
        };
        field.variables.push(VariableDeclarator {
            identifier,
            initializer: declarator_initializer(declarator, source),
        });
    }
    field
}

fn declarator_name(node: Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .or_else(|| first_child_of_kind(node, "identifier"))
        .map(|n| node_text(n, source))
        .filter(|name| !name.is_empty())
}

/// Handles both grammar shapes: `name = expr` directly under the declarator, or
/// wrapped in an `equals_value_clause`.
fn declarator_initializer(node: Node<'_>, source: &str) -> Option<String> {
    if let Some(clause) = first_child_of_kind(node, "equals_value_clause") {
        return clause
            .named_child(0)
            .map(|expr| node_text(expr, source))
            .filter(|text| !text.is_empty());
    }

    let mut cursor = node.walk();
    let mut after_equals = false;
    for child in node.children(&mut cursor) {
        if after_equals && child.is_named() {
            let text = node_text(child, source);
            return (!text.is_empty()).then_some(text);
        }
        if !child.is_named() && child.kind() == "=" {
            after_equals = true;
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// METHODS & STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_method(node: Node<'_>, source: &str) -> Option<MethodDecl> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .filter(|name| !name.is_empty())?;

    let return_type = node
        .child_by_field_name("returns")
        .or_else(|| node.child_by_field_name("type"))
        .map(|n| lower_type_ref(n, source))
        .unwrap_or_else(|| TypeRef::Named {
            text: String::new(),
        });

    let parameters = node
        .child_by_field_name("parameters")
        .map(|list| lower_parameters(list, source))
        .unwrap_or_default();

    let body = node
        .child_by_field_name("body")
        .filter(|body| body.kind() == "block")
        .map(|block| lower_block(block, source));

    Some(MethodDecl {
        name,
        modifiers: modifiers(node, source),
        attributes: attributes(node, source),
        return_type,
        parameters,
        body,
    })
}

fn lower_type_ref(node: Node<'_>, source: &str) -> TypeRef {
    let text = node_text(node, source);
    match node.kind() {
        "predefined_type" | "void_keyword" => TypeRef::Predefined { keyword: text },
        _ => TypeRef::Named { text },
    }
}

fn lower_parameters(node: Node<'_>, source: &str) -> Vec<Parameter> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|p| p.kind() == "parameter")
        .map(|p| Parameter {
            type_text: p
                .child_by_field_name("type")
                .map(|n| node_text(n, source))
                .unwrap_or_default(),
            name: p
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or_default(),
        })
        .collect()
}

fn lower_block(node: Node<'_>, source: &str) -> Vec<Statement> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|stmt| !stmt.is_extra() && !stmt.is_error())
        .map(|stmt| lower_statement(stmt, source))
        .collect()
}

fn lower_statement(node: Node<'_>, source: &str) -> Statement {
    if node.kind() != "expression_statement" {
        return Statement::Other {
            kind: node.kind().to_string(),
        };
    }
    let Some(expr) = node.named_child(0) else {
        return Statement::Other {
            kind: node.kind().to_string(),
        };
    };

    let start = node.start_byte();
    Statement::Expression(ExpressionStatement {
        text: raw_text(node, source).to_string(),
        expression: lower_expression(expr, source, start),
    })
}

/// `statement_start` anchors operator offsets to the enclosing statement text.
fn lower_expression(node: Node<'_>, source: &str, statement_start: usize) -> Expression {
    match node.kind() {
        "identifier" => Expression::Identifier {
            name: node_text(node, source),
        },
        "member_access_expression" => {
            let target = node.child_by_field_name("expression");
            let name = node
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier");
            match (target, name) {
                (Some(target), Some(name)) => Expression::MemberAccess {
                    target: Box::new(lower_expression(target, source, statement_start)),
                    name: node_text(name, source),
                },
                _ => Expression::Other {
                    text: node_text(node, source),
                },
            }
        }
        "assignment_expression" => {
            let left = node.child_by_field_name("left");
            let right = node.child_by_field_name("right");
            let operator = assignment_operator(node);
            match (left, operator, right) {
                (Some(left), Some(op), Some(right)) => Expression::Assignment {
                    left: Box::new(lower_expression(left, source, statement_start)),
                    operator: AssignmentOperator::from_token(raw_text(op, source)),
                    operator_offset: op.start_byte().saturating_sub(statement_start),
                    right: Box::new(lower_expression(right, source, statement_start)),
                },
                _ => Expression::Other {
                    text: node_text(node, source),
                },
            }
        }
        _ => Expression::Other {
            text: node_text(node, source),
        },
    }
}

/// The operator is a field in newer grammars and an `assignment_operator` node in
/// older ones.
fn assignment_operator(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(op) = node.child_by_field_name("operator") {
        return Some(op);
    }
    if let Some(op) = first_child_of_kind(node, "assignment_operator") {
        return Some(op);
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| !child.is_named() && child.kind().ends_with('='));
    found
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn first_child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn raw_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

fn node_text(node: Node<'_>, source: &str) -> String {
    raw_text(node, source).trim().to_string()
}
