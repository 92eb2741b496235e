#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use crate::config::GenerateOptions;
    use crate::eligibility::SkipReason;
    use crate::emit::{MemorySink, SourceSink};
    use crate::error::{GenerationError, SinkError};
    use crate::parse::parse_source;
    use crate::pipeline::{generate, Generator};
    use crate::syntax::CompilationUnit;
    use crate::trace::TraceRecord;

    const MARKER: &str = "NoDomainReloadSupportAttribute_codegen.cs";

    fn unit(file: &str, source: &str) -> CompilationUnit {
        parse_source(source, file).expect("fixture parses")
    }

    fn no_marker() -> GenerateOptions {
        GenerateOptions {
            emit_marker: false,
            ..GenerateOptions::default()
        }
    }

    fn game_units() -> Vec<CompilationUnit> {
        vec![
            unit(
                "Player.cs",
                r#"
using UnityEngine;

namespace Game
{
    public partial class Player
    {
        static int Lives = 3;
        static Player Instance;

        static void OnQuit() { }

        [RuntimeInitializeOnLoadMethod]
        static void Register()
        {
            Application.quitting += OnQuit;
        }
    }

    public class Plain
    {
        static int Count = 1;
    }

    public abstract partial class Base
    {
        static int Shared = 2;
    }

    [NoDomainReloadSupport]
    public partial class Excluded
    {
        static int Hits;
    }

    public partial class Constants
    {
        const int Max = 4;
        static readonly string Name = "x";
    }
}
"#,
            ),
            unit(
                "Vendor.cs",
                r#"
namespace UnityEngine.Custom
{
    public partial class Vendor
    {
        static int Calls;
    }
}
"#,
            ),
            unit(
                "Audio.cs",
                r#"
namespace Game.Audio;

partial class Mixer
{
    static float Volume = 1f;
}
"#,
            ),
        ]
    }

    #[test]
    fn test_only_eligible_classes_with_state_are_emitted() {
        let mut sink = MemorySink::new();
        let report = generate(&game_units(), &GenerateOptions::default(), &mut sink).unwrap();

        let names: Vec<&str> = sink.units.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "Game.Audio.Mixer_codegen.cs",
                "Game.Player_codegen.cs",
                MARKER,
            ]
        );

        let player = sink.get("Game.Player_codegen.cs").unwrap();
        assert!(player.contains("Lives = 3;"));
        assert!(player.contains("Instance = default;"));
        assert!(player.contains("Application.quitting -= OnQuit;"));

        assert_eq!(report.classes_scanned, 7);
        assert_eq!(report.classes_skipped, 4);
        assert_eq!(report.classes_without_state, 1);
        assert_eq!(report.units[0].name, MARKER);
        assert_eq!(report.companions().count(), 2);
        assert!(!report.assembly_blocked);
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let units = game_units();
        let mut first = MemorySink::new();
        let mut second = MemorySink::new();
        generate(&units, &GenerateOptions::default(), &mut first).unwrap();
        generate(&units, &GenerateOptions::default(), &mut second).unwrap();
        assert_eq!(first.units, second.units);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let units = game_units();
        let mut parallel = MemorySink::new();
        let mut sequential = MemorySink::new();

        let parallel_report = generate(&units, &GenerateOptions::default(), &mut parallel).unwrap();
        let options = GenerateOptions {
            parallel: false,
            ..GenerateOptions::default()
        };
        let sequential_report = generate(&units, &options, &mut sequential).unwrap();

        assert_eq!(parallel.units, sequential.units);
        let order = |r: &crate::pipeline::GenerationReport| {
            r.units.iter().map(|u| u.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(order(&parallel_report), order(&sequential_report));
    }

    #[test]
    fn test_no_eligible_class_emits_only_the_marker() {
        let units = vec![unit("Plain.cs", "class Plain { static int X; }")];

        let mut sink = MemorySink::new();
        generate(&units, &GenerateOptions::default(), &mut sink).unwrap();
        assert_eq!(sink.units.len(), 1);
        assert!(sink.get(MARKER).is_some());

        let mut sink = MemorySink::new();
        let report = generate(&units, &no_marker(), &mut sink).unwrap();
        assert!(sink.units.is_empty());
        assert!(report.units.is_empty());
    }

    #[test]
    fn test_blocked_assembly_is_left_alone() {
        let options = GenerateOptions {
            assembly_name: Some("HofA".to_string()),
            ..GenerateOptions::default()
        };
        let mut trace: Vec<TraceRecord> = Vec::new();
        let mut sink = MemorySink::new();

        let report = Generator::new(options)
            .with_trace(&mut trace)
            .run(&game_units(), &mut sink)
            .unwrap();

        assert!(report.assembly_blocked);
        assert_eq!(report.classes_scanned, 0);
        assert_eq!(sink.units.keys().collect::<Vec<_>>(), vec![MARKER]);
        assert_eq!(
            trace[0],
            TraceRecord::AssemblyBlocked {
                assembly: "HofA".to_string()
            }
        );
    }

    #[test]
    fn test_split_partial_class_collides() {
        let units = vec![
            unit(
                "FooA.cs",
                "namespace N { partial class Foo { static int A; } }",
            ),
            unit(
                "FooB.cs",
                "namespace N { partial class Foo { static int B; } }",
            ),
        ];

        let mut sink = MemorySink::new();
        let err = generate(&units, &no_marker(), &mut sink).unwrap_err();
        match &err {
            GenerationError::NameCollision {
                name,
                first_file,
                second_file,
                ..
            } => {
                assert_eq!(name, "N.Foo_codegen.cs");
                assert_eq!(first_file, "FooA.cs");
                assert_eq!(second_file, "FooB.cs");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.code(), "RCG001");
    }

    #[test]
    fn test_same_name_in_different_namespaces_does_not_collide() {
        let units = vec![
            unit("A.cs", "namespace A { partial class Foo { static int X; } }"),
            unit("B.cs", "namespace B { partial class Foo { static int X; } }"),
        ];
        let mut sink = MemorySink::new();
        generate(&units, &no_marker(), &mut sink).unwrap();
        assert!(sink.get("A.Foo_codegen.cs").is_some());
        assert!(sink.get("B.Foo_codegen.cs").is_some());
    }

    #[test]
    fn test_cancelled_run_registers_nothing() {
        let cancel = AtomicBool::new(true);
        let mut sink = MemorySink::new();

        let err = Generator::new(GenerateOptions::default())
            .with_cancellation(&cancel)
            .run(&game_units(), &mut sink)
            .unwrap_err();

        assert!(matches!(err, GenerationError::Cancelled));
        assert!(sink.units.is_empty());
    }

    #[test]
    fn test_trace_records_every_decision() {
        let mut trace: Vec<TraceRecord> = Vec::new();
        let mut sink = MemorySink::new();
        Generator::new(GenerateOptions::default())
            .with_trace(&mut trace)
            .run(&game_units(), &mut sink)
            .unwrap();

        assert!(matches!(&trace[0], TraceRecord::MarkerEmitted { name } if name == MARKER));

        let skipped: Vec<(&str, SkipReason)> = trace
            .iter()
            .filter_map(|r| match r {
                TraceRecord::ClassSkipped {
                    class_name, reason, ..
                } => Some((class_name.as_str(), *reason)),
                _ => None,
            })
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("Game.Plain", SkipReason::NotPartial),
                ("Game.Base", SkipReason::Abstract),
                ("Game.Excluded", SkipReason::OptedOut),
                ("UnityEngine.Custom.Vendor", SkipReason::BlockedNamespace),
            ]
        );

        assert!(trace.contains(&TraceRecord::NothingToReset {
            class_name: "Game.Constants".to_string(),
            file: "Player.cs".to_string(),
        }));

        let emitted: Vec<(&str, usize, usize)> = trace
            .iter()
            .filter_map(|r| match r {
                TraceRecord::UnitEmitted {
                    name,
                    fields,
                    detachments,
                    ..
                } => Some((name.as_str(), *fields, *detachments)),
                _ => None,
            })
            .collect();
        assert_eq!(
            emitted,
            vec![
                ("Game.Player_codegen.cs", 2, 1),
                ("Game.Audio.Mixer_codegen.cs", 1, 0),
            ]
        );
    }

    struct FailingSink;

    impl SourceSink for FailingSink {
        fn add_source(&mut self, name: &str, _source: &str) -> Result<(), SinkError> {
            Err(SinkError::Rejected {
                name: name.to_string(),
                reason: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let err = generate(&game_units(), &GenerateOptions::default(), &mut FailingSink).unwrap_err();
        assert!(matches!(err, GenerationError::Sink(SinkError::Rejected { .. })));
        assert_eq!(err.code(), "RCG002");
    }
}
