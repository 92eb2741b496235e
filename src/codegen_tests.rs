#[cfg(test)]
mod tests {
    use crate::codegen::{compute_hash, marker_unit_name, render, render_marker};
    use crate::collect::StaticFieldEntry;
    use crate::parse::parse_source;
    use crate::pipeline::{analyze, ClassOutcome};
    use crate::scope::{class_candidates, ClassCandidate};
    use crate::subscriptions::EventDetachment;
    use crate::syntax::{Modifier, TypeDecl, TypeKind, UsingDirective};

    fn class(name: &str, modifiers: &[Modifier]) -> TypeDecl {
        TypeDecl {
            kind: TypeKind::Class,
            name: name.to_string(),
            type_parameters: None,
            modifiers: modifiers.to_vec(),
            attributes: vec![],
            members: vec![],
        }
    }

    fn candidate<'a>(decl: &'a TypeDecl, namespace: &[&str]) -> ClassCandidate<'a> {
        ClassCandidate {
            decl,
            file_path: "Test.cs",
            namespace: namespace.iter().map(|s| s.to_string()).collect(),
            containing_types: vec![],
            usings: vec![],
            scoped_usings: vec![],
        }
    }

    fn field(identifier: &str, initializer: Option<&str>) -> StaticFieldEntry {
        StaticFieldEntry {
            identifier: identifier.to_string(),
            type_text: "int".to_string(),
            initializer: initializer.map(str::to_string),
        }
    }

    fn generated_source(source: &str) -> String {
        let unit = parse_source(source, "Foo.cs").unwrap();
        let candidates = class_candidates(&unit);
        match analyze(&candidates[0]) {
            ClassOutcome::Generated { unit, .. } => unit.source,
            other => panic!("expected a generated unit, got {other:?}"),
        }
    }

    #[test]
    fn test_companion_for_fields_and_subscription() {
        let source = generated_source(
            r#"
using System;
using UnityEngine;

namespace N
{
    public partial class Foo
    {
        static int Count = 5;

        static void OnX() { }

        static void Init()
        {
            SomeEvent += OnX;
        }
    }
}
"#,
        );

        let expected = "\
// <auto-generated/>
using System;
using UnityEngine;

namespace N
{
    partial class Foo
    {
        [UnityEngine.RuntimeInitializeOnLoadMethod(UnityEngine.RuntimeInitializeLoadType.SubsystemRegistration)]
        static void ApplyStaticFieldsAndEventHandlers()
        {
            Count = 5;
            SomeEvent -= OnX;
        }
    }
}
";
        assert_eq!(source, expected);
    }

    #[test]
    fn test_readonly_field_leaves_only_the_detachment() {
        let source = generated_source(
            r#"
namespace N
{
    public partial class Foo
    {
        static readonly int R = 1;
        static void H() { }
        static void S() { Application.quitting += H; }
    }
}
"#,
        );
        assert!(source.contains("            Application.quitting -= H;\n"));
        assert!(!source.contains("R ="));
    }

    #[test]
    fn test_global_namespace_has_no_wrapper() {
        let decl = class("Settings", &[Modifier::Partial]);
        let unit = render(&candidate(&decl, &[]), &[field("Volume", None)], &[]).unwrap();

        let expected = "\
// <auto-generated/>
partial class Settings
{
    [UnityEngine.RuntimeInitializeOnLoadMethod(UnityEngine.RuntimeInitializeLoadType.SubsystemRegistration)]
    static void ApplyStaticFieldsAndEventHandlers()
    {
        Volume = default;
    }
}
";
        assert_eq!(unit.source, expected);
        assert_eq!(unit.name, "Settings_codegen.cs");
        assert_eq!(unit.class_name, "Settings");
        assert_eq!(unit.field_count, 1);
        assert_eq!(unit.detachment_count, 0);
        assert_eq!(unit.content_hash, compute_hash(&unit.source));
    }

    #[test]
    fn test_usings_are_deduplicated_and_scoped_usings_stay_inside() {
        let decl = class("Foo", &[Modifier::Partial]);
        let system = UsingDirective::new("using System;");
        let system_again = UsingDirective::new("using System;");
        let alias = UsingDirective::new("using Log = UnityEngine.Debug;");
        let core = UsingDirective::new("using Game.Core;");

        let mut c = candidate(&decl, &["Game", "Audio"]);
        c.usings = vec![&system, &alias, &system_again];
        c.scoped_usings = vec![&core];

        let unit = render(&c, &[field("Volume", Some("1f"))], &[]).unwrap();
        let expected_head = "\
// <auto-generated/>
using System;
using Log = UnityEngine.Debug;

namespace Game.Audio
{
    using Game.Core;

    partial class Foo
    {
";
        assert!(unit.source.starts_with(expected_head), "{}", unit.source);
        assert_eq!(unit.source.matches("using System;").count(), 1);
        assert_eq!(unit.name, "Game.Audio.Foo_codegen.cs");
    }

    #[test]
    fn test_nested_generic_class_reopens_containing_types() {
        let mut outer = class("Registry", &[Modifier::Public, Modifier::Static, Modifier::Partial]);
        outer.type_parameters = Some("<TKey, TValue>".to_string());
        let mut inner = class("Cache", &[Modifier::Private, Modifier::Unsafe, Modifier::Partial]);
        inner.type_parameters = Some("<T>".to_string());

        let mut c = candidate(&inner, &["Game"]);
        c.containing_types.push(&outer);

        let unit = render(
            &c,
            &[],
            &[EventDetachment {
                statement: "Bus.Cleared -= OnCleared;".to_string(),
                handler: "OnCleared".to_string(),
            }],
        )
        .unwrap();

        let expected = "\
// <auto-generated/>
namespace Game
{
    partial class Registry<TKey, TValue>
    {
        unsafe partial class Cache<T>
        {
            [UnityEngine.RuntimeInitializeOnLoadMethod(UnityEngine.RuntimeInitializeLoadType.SubsystemRegistration)]
            static void ApplyStaticFieldsAndEventHandlers()
            {
                Bus.Cleared -= OnCleared;
            }
        }
    }
}
";
        assert_eq!(unit.source, expected);
        assert_eq!(unit.name, "Game.Registry`2.Cache`1_codegen.cs");
        assert_eq!(unit.class_name, "Game.Registry.Cache");
    }

    #[test]
    fn test_nothing_to_reset_renders_nothing() {
        let decl = class("Empty", &[Modifier::Partial]);
        assert!(render(&candidate(&decl, &["Game"]), &[], &[]).is_none());
    }

    #[test]
    fn test_fields_precede_detachments() {
        let decl = class("Order", &[Modifier::Partial]);
        let unit = render(
            &candidate(&decl, &[]),
            &[field("A", Some("1")), field("B", None)],
            &[
                EventDetachment {
                    statement: "X.E -= H1;".to_string(),
                    handler: "H1".to_string(),
                },
                EventDetachment {
                    statement: "Y.E -= H2;".to_string(),
                    handler: "H2".to_string(),
                },
            ],
        )
        .unwrap();

        let body: Vec<&str> = unit
            .source
            .lines()
            .map(str::trim)
            .filter(|line| line.ends_with(';'))
            .collect();
        assert_eq!(body, vec!["A = 1;", "B = default;", "X.E -= H1;", "Y.E -= H2;"]);
    }

    #[test]
    fn test_multi_line_statements_are_reindented() {
        let decl = class("Lists", &[Modifier::Partial]);
        let unit = render(
            &candidate(&decl, &["Game"]),
            &[field("Seen", Some("new List<int>\n        {\n            1,\n            2\n        }"))],
            &[EventDetachment {
                statement: "Bus\n            .Raised -= OnRaised;".to_string(),
                handler: "OnRaised".to_string(),
            }],
        )
        .unwrap();

        let expected_body = "\
            Seen = new List<int>
            {
                1,
                2
            };
            Bus
            .Raised -= OnRaised;
        }
";
        assert!(unit.source.contains(expected_body), "{}", unit.source);
    }

    #[test]
    fn test_verbatim_string_continuation_lines_are_kept() {
        let decl = class("Text", &[Modifier::Partial]);
        let unit = render(
            &candidate(&decl, &[]),
            &[field("Banner", Some("@\"first\n   second\""))],
            &[],
        )
        .unwrap();
        assert!(unit.source.contains("        Banner = @\"first\n   second\";\n"));
    }

    #[test]
    fn test_bare_array_field_renders_with_new() {
        let source = generated_source("partial class A { static int[] Arr = { 1, 2, 3 }; }");
        assert!(source.contains("        Arr = new int[] { 1, 2, 3 };\n"), "{source}");
    }

    #[test]
    fn test_marker_unit() {
        let marker = render_marker();
        assert_eq!(marker.name, marker_unit_name());
        assert_eq!(marker.name, "NoDomainReloadSupportAttribute_codegen.cs");
        assert!(marker.class_name.is_empty());
        assert!(marker.source.contains("namespace DomainReloadSupport"));
        assert!(marker
            .source
            .contains("internal sealed class NoDomainReloadSupportAttribute : Attribute"));
        assert!(marker.source.contains("[AttributeUsage(AttributeTargets.Class"));
    }
}
