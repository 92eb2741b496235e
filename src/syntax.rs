//! Syntax Model
//!
//! Owned, typed view of one parsed C# compilation unit. The tree-sitter front end
//! in `parse` lowers into these types; hosts that already own a parser can hand the
//! same shape over as JSON instead.
//!
//! Every node that later needs to be reproduced in generated code keeps its exact
//! surface text (`initializer`, `ExpressionStatement::text`, using directives).

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION UNIT & NAMESPACES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilationUnit {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub usings: Vec<UsingDirective>,
    #[serde(default)]
    pub members: Vec<NamespaceMember>,
}

/// A using/import directive, kept verbatim (`using static X;`, `using A = B.C;`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsingDirective {
    pub text: String,
}

impl UsingDirective {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NamespaceMember {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDecl {
    /// Possibly dotted (`Game.Audio`)
    pub name: String,
    #[serde(default)]
    pub usings: Vec<UsingDirective>,
    #[serde(default)]
    pub members: Vec<NamespaceMember>,
}

impl NamespaceDecl {
    /// Splits the declared name into path segments, ignoring a `global::` alias.
    pub fn segments(&self) -> Vec<String> {
        self.name
            .replace("::", ".")
            .split('.')
            .map(str::trim)
            .filter(|part| !part.is_empty() && *part != "global")
            .map(str::to_string)
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPE DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Class,
    Struct,
    Record,
    RecordStruct,
    Interface,
}

impl TypeKind {
    /// Declaration keyword(s) used when re-opening the type in a companion file.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
            TypeKind::RecordStruct => "record struct",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    /// Verbatim type parameter list, e.g. `<T, TKey>`
    #[serde(default)]
    pub type_parameters: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub members: Vec<ClassMember>,
}

impl TypeDecl {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Number of generic type parameters, used for CLR-style metadata names.
    pub fn arity(&self) -> usize {
        match self.type_parameters.as_deref().map(str::trim) {
            Some(list) if list.len() > 2 => list.split(',').count(),
            _ => 0,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(md) => Some(md),
            _ => None,
        })
    }

    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Type(t) => Some(t),
            _ => None,
        })
    }

    /// True if any direct member (field declarator, method, property, event,
    /// nested type) is declared under `name`.
    pub fn declares_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| match m {
            ClassMember::Field(f) => f.variables.iter().any(|v| v.identifier.trim() == name),
            ClassMember::Method(md) => md.name == name,
            ClassMember::Type(t) => t.name == name,
            ClassMember::Other { name: Some(n), .. } => n == name,
            ClassMember::Other { name: None, .. } => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Type(TypeDecl),
    /// Properties, events, constructors, operators. Only the name is kept.
    Other {
        kind: String,
        #[serde(default)]
        name: Option<String>,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODIFIERS & ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    File,
    Static,
    Readonly,
    Const,
    Volatile,
    Abstract,
    Sealed,
    Virtual,
    Override,
    Partial,
    New,
    Extern,
    Unsafe,
    Async,
    Required,
    #[serde(other)]
    Other,
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            "public" => Modifier::Public,
            "private" => Modifier::Private,
            "protected" => Modifier::Protected,
            "internal" => Modifier::Internal,
            "file" => Modifier::File,
            "static" => Modifier::Static,
            "readonly" => Modifier::Readonly,
            "const" => Modifier::Const,
            "volatile" => Modifier::Volatile,
            "abstract" => Modifier::Abstract,
            "sealed" => Modifier::Sealed,
            "virtual" => Modifier::Virtual,
            "override" => Modifier::Override,
            "partial" => Modifier::Partial,
            "new" => Modifier::New,
            "extern" => Modifier::Extern,
            "unsafe" => Modifier::Unsafe,
            "async" => Modifier::Async,
            "required" => Modifier::Required,
            _ => Modifier::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Name as written, possibly qualified (`Foo.Bar.Skip`)
    pub name: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Last segment of the written name with any surrounding quotes removed.
    pub fn simple_name(&self) -> &str {
        let name = self.name.rsplit(['.', ':']).next().unwrap_or(&self.name);
        name.trim().trim_matches('"')
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub type_text: String,
    /// One entry per declarator: `static int a = 1, b, c = 3;` has three.
    #[serde(default)]
    pub variables: Vec<VariableDeclarator>,
}

impl FieldDecl {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclarator {
    pub identifier: String,
    /// Initializer expression surface text, without the `=`
    #[serde(default)]
    pub initializer: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// METHODS & STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// `None` for abstract, extern, partial and expression-bodied methods
    #[serde(default)]
    pub body: Option<Vec<Statement>>,
}

impl MethodDecl {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn returns_void(&self) -> bool {
        matches!(&self.return_type, TypeRef::Predefined { keyword } if keyword == "void")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TypeRef {
    /// Built-in keyword type (`void`, `int`, `string`, ...)
    Predefined { keyword: String },
    Named { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub type_text: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Statement {
    Expression(ExpressionStatement),
    /// Any other statement (blocks, conditionals, loops, declarations). Nested
    /// statements are not modelled; subscription matching is top-level only.
    Other { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionStatement {
    /// Statement surface text including the trailing `;`
    pub text: String,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Expression {
    Identifier {
        name: String,
    },
    MemberAccess {
        target: Box<Expression>,
        name: String,
    },
    Assignment {
        left: Box<Expression>,
        operator: AssignmentOperator,
        /// Byte offset of the operator token inside the enclosing statement text
        operator_offset: usize,
        right: Box<Expression>,
    },
    Other {
        text: String,
    },
}

impl Expression {
    /// True for `a`, `a.b`, `a.b.c`: a chain of plain identifiers.
    pub fn is_identifier_chain(&self) -> bool {
        match self {
            Expression::Identifier { .. } => true,
            Expression::MemberAccess { target, .. } => target.is_identifier_chain(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    Other,
}

impl AssignmentOperator {
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "=" => AssignmentOperator::Assign,
            "+=" => AssignmentOperator::AddAssign,
            "-=" => AssignmentOperator::SubtractAssign,
            _ => AssignmentOperator::Other,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubtractAssign => "-=",
            AssignmentOperator::Other => "?=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_segments_strip_global_alias() {
        let ns = NamespaceDecl {
            name: "global::Game.Audio".to_string(),
            usings: vec![],
            members: vec![],
        };
        assert_eq!(ns.segments(), vec!["Game", "Audio"]);
    }

    #[test]
    fn test_attribute_simple_name() {
        assert_eq!(Attribute::new("Foo.Bar.NoDomainReloadSupport").simple_name(), "NoDomainReloadSupport");
        assert_eq!(Attribute::new("global::Skip").simple_name(), "Skip");
        assert_eq!(Attribute::new("Plain").simple_name(), "Plain");
    }

    #[test]
    fn test_arity() {
        let mut decl = TypeDecl {
            kind: TypeKind::Class,
            name: "Pool".to_string(),
            type_parameters: None,
            modifiers: vec![],
            attributes: vec![],
            members: vec![],
        };
        assert_eq!(decl.arity(), 0);
        decl.type_parameters = Some("<TKey, TValue>".to_string());
        assert_eq!(decl.arity(), 2);
    }

    #[test]
    fn test_identifier_chain() {
        let chain = Expression::MemberAccess {
            target: Box::new(Expression::Identifier {
                name: "A".to_string(),
            }),
            name: "B".to_string(),
        };
        assert!(chain.is_identifier_chain());

        let call = Expression::MemberAccess {
            target: Box::new(Expression::Other {
                text: "Get()".to_string(),
            }),
            name: "B".to_string(),
        };
        assert!(!call.is_identifier_chain());
    }

    #[test]
    fn test_json_shape_round_trips_through_serde() {
        let json = r#"{
            "filePath": "Foo.cs",
            "usings": [{ "text": "using System;" }],
            "members": [{
                "type": "namespace",
                "name": "N",
                "members": [{
                    "type": "type",
                    "kind": "class",
                    "name": "Foo",
                    "modifiers": ["public", "partial"],
                    "members": [{
                        "type": "field",
                        "modifiers": ["static"],
                        "typeText": "int",
                        "variables": [{ "identifier": "Count", "initializer": "5" }]
                    }]
                }]
            }]
        }"#;
        let unit: CompilationUnit = serde_json::from_str(json).unwrap();
        let NamespaceMember::Namespace(ns) = &unit.members[0] else {
            panic!("expected namespace");
        };
        let NamespaceMember::Type(class) = &ns.members[0] else {
            panic!("expected type");
        };
        assert!(class.has_modifier(Modifier::Partial));
        assert_eq!(class.fields().count(), 1);
    }
}
