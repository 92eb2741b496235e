//! # Reload Companion Generator
//!
//! Generates, ahead of time, a reset routine for every C# class whose static state
//! would otherwise survive a soft restart (play mode entered with domain reload
//! disabled). Each routine is emitted as a companion `partial` declaration of the
//! class and runs once per restart before user code observes static state.
//!
//! ## Invariants
//!
//! 1. **Eligibility**: only non-abstract `partial` classes outside the blocked
//!    namespaces and without `[NoDomainReloadSupport]` are augmented.
//!
//! 2. **Field resets**: every `static` field that is neither `readonly` nor `const`
//!    is reassigned its original initializer text, or `default` when it has none.
//!    Grouped declarators (`static int a = 1, b;`) reset individually.
//!
//! 3. **Detachments**: a top-level `A.B += Handler;` inside a static method, where
//!    `Handler` names a static `void` method of the same class, yields exactly
//!    `A.B -= Handler;`.
//!
//! 4. **Ordering**: field resets precede detachments; both follow source order.
//!
//! 5. **Empty result**: a class with nothing to reset produces no unit at all.
//!
//! 6. **Determinism**: identical input yields byte-identical units under identical
//!    names; no state is carried between runs.

pub mod codegen;
pub mod collect;
pub mod config;
pub mod discovery;
pub mod eligibility;
pub mod emit;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod scope;
pub mod subscriptions;
pub mod syntax;
pub mod trace;
pub mod visitor;

#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod pipeline_tests;

pub use codegen::GeneratedUnit;
pub use config::{DiscoveryOptions, GenerateOptions};
pub use emit::{DirectorySink, MemorySink, SourceSink};
pub use error::{GenerationError, ParseError, SinkError};
pub use parse::{parse_source, CSharpParser};
pub use pipeline::{generate, GenerationReport, Generator};
pub use syntax::CompilationUnit;
pub use trace::{JsonLinesTrace, TraceRecord, TraceSink};
