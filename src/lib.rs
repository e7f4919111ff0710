//! This crate provides the core of a single-tape, deterministic Turing machine interpreter.
//! It includes the sparse tape, the transition table, the step/run execution engine,
//! a text format for machine definitions with its parser and analyzer, and a catalog of
//! built-in machines.

pub mod analyzer;
pub mod encoder;
pub mod history;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod transition;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the text and JSON encoding functions from the encoder module.
pub use encoder::{encode, from_json, to_json};
/// Re-exports the snapshot types from the history module.
pub use history::{Configuration, History};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct and its trace hook type from the machine module.
pub use machine::{Machine, TraceHook};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` and its rendering `Window` from the tape module.
pub use tape::{Tape, Window};
/// Re-exports the `TransitionTable` from the transition module.
pub use transition::TransitionTable;
/// Re-exports the shared types from the types module.
pub use types::{
    Definition, Direction, ExecutionStatus, Instruction, Signature, Transition,
    TuringMachineError, DEFAULT_BLANK_SYMBOL, DEFAULT_MAX_STEPS, DEFAULT_REJECT_STATE,
    MAX_DEFINITION_SIZE,
};
