//! This module defines the core data structures and types shared by the interpreter,
//! including machine signatures and definitions, transitions, execution statuses, and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The reject state every machine recognizes unless told otherwise.
pub const DEFAULT_REJECT_STATE: &str = "q_reject";
/// The default step budget for a run before it is reported as a probable loop.
pub const DEFAULT_MAX_STEPS: usize = 10000;
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the move that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Stay => Direction::Stay,
        }
    }

    /// Returns the signed head offset of this move.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "N",
        };
        f.write_str(code)
    }
}

/// The action taken once a `(state, symbol)` pair is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: String,
    /// The symbol written under the head.
    pub write: char,
    /// The head move performed after writing.
    pub direction: Direction,
}

/// Represents the outcome of a single step or of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// A transition was applied and execution can go on.
    Continuing,
    /// The machine is in an accepting state.
    Accepted,
    /// The machine is in a rejecting state, or no transition applies.
    Rejected,
    /// The step budget ran out before the machine halted.
    StepLimitExceeded,
}

impl ExecutionStatus {
    /// Returns `true` for every status other than `Continuing`.
    pub fn is_terminal(self) -> bool {
        self != ExecutionStatus::Continuing
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionStatus::Continuing => "continuing",
            ExecutionStatus::Accepted => "accepted",
            ExecutionStatus::Rejected => "rejected",
            ExecutionStatus::StepLimitExceeded => "step limit exceeded",
        };
        f.write_str(label)
    }
}

/// The static configuration of a machine: everything in its formal tuple except
/// the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Every state identifier the machine declares.
    pub states: BTreeSet<String>,
    /// Symbols an input string may consist of.
    pub input_alphabet: BTreeSet<char>,
    /// Symbols the tape may hold, blank included.
    pub tape_alphabet: BTreeSet<char>,
    /// The state a fresh run starts in.
    pub start_state: String,
    /// States in which the machine accepts.
    pub accept_states: BTreeSet<String>,
    /// States in which the machine rejects.
    #[serde(default = "default_reject_states")]
    pub reject_states: BTreeSet<String>,
    /// The symbol every unwritten cell holds.
    #[serde(default = "default_blank")]
    pub blank: char,
}

/// The reject set used when none is given.
pub fn default_reject_states() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_REJECT_STATE.to_string()])
}

fn default_blank() -> char {
    DEFAULT_BLANK_SYMBOL
}

impl Signature {
    /// Returns `true` if `state` is an accepting state.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    /// Returns `true` if `state` is an explicitly rejecting state.
    pub fn is_rejecting(&self, state: &str) -> bool {
        self.reject_states.contains(state)
    }

    /// Returns `true` if `state` is accepting or rejecting.
    pub fn is_halting(&self, state: &str) -> bool {
        self.is_accepting(state) || self.is_rejecting(state)
    }
}

/// A single row of a transition function as it appears in a machine definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The state this row applies to.
    pub state: String,
    /// The symbol that must be under the head.
    pub read: char,
    /// The symbol to write.
    pub write: char,
    /// The head move.
    pub direction: Direction,
    /// The state to move to.
    pub next_state: String,
}

/// A complete, named machine description: signature plus transition rows.
///
/// Definitions are what the parser, the JSON decoder and the built-in catalog
/// produce; a [`crate::Machine`] is built from one with `Machine::from_definition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Human-readable name of the machine.
    pub name: String,
    /// The static configuration.
    #[serde(flatten)]
    pub signature: Signature,
    /// The transition rows in declaration order.
    pub rules: Vec<Instruction>,
}

impl Definition {
    /// Returns the number of distinct states that own at least one rule.
    pub fn ruled_state_count(&self) -> usize {
        self.rules
            .iter()
            .map(|rule| rule.state.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Represents the errors the interpreter can report.
///
/// Halting verdicts (accept, reject, step limit) are never errors; they are
/// reported as [`ExecutionStatus`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The input string holds a character outside the input alphabet.
    #[error("Invalid input symbol '{symbol}' at position {position}")]
    InvalidInputSymbol { symbol: char, position: usize },
    /// Execution was requested before any input was loaded.
    #[error("Machine not initialized: load an input first")]
    NotInitialized,
    /// Indicates an error during the parsing of a machine definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a signature or definition that breaks a machine invariant.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates a JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let stay_json = serde_json::to_string(&Direction::Stay).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(stay_json, "\"Stay\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_inverse() {
        assert_eq!(Direction::Left.inverse(), Direction::Right);
        assert_eq!(Direction::Right.inverse(), Direction::Left);
        assert_eq!(Direction::Stay.inverse(), Direction::Stay);
        assert_eq!(Direction::Left.offset() + Direction::Right.offset(), 0);
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(!ExecutionStatus::Continuing.is_terminal());
        assert!(ExecutionStatus::Accepted.is_terminal());
        assert!(ExecutionStatus::Rejected.is_terminal());
        assert!(ExecutionStatus::StepLimitExceeded.is_terminal());
        assert_eq!(
            ExecutionStatus::StepLimitExceeded.to_string(),
            "step limit exceeded"
        );
    }

    #[test]
    fn test_signature_defaults_from_json() {
        let json = r#"{
            "states": ["q0", "q_accept"],
            "input_alphabet": ["a"],
            "tape_alphabet": ["a", "_"],
            "start_state": "q0",
            "accept_states": ["q_accept"]
        }"#;

        let signature: Signature = serde_json::from_str(json).unwrap();
        assert_eq!(signature.blank, DEFAULT_BLANK_SYMBOL);
        assert!(signature.is_rejecting(DEFAULT_REJECT_STATE));
        assert!(signature.is_accepting("q_accept"));
        assert!(signature.is_halting("q_accept"));
        assert!(!signature.is_halting("q0"));
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::InvalidInputSymbol {
            symbol: '2',
            position: 3,
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("Invalid input symbol"));
        assert!(error_msg.contains("'2'"));
        assert!(error_msg.contains("position 3"));
    }
}
