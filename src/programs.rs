//! The catalog of built-in machine definitions.
//!
//! The definitions are parsed once and never mutated; every machine built from
//! them owns its own table and tape.

use crate::machine::Machine;
use crate::parser::parse;
use crate::types::{Definition, TuringMachineError};

use log::warn;

// Default embedded definitions
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/equal-zeros-ones.tm"),
    include_str!("../programs/binary-palindrome.tm"),
    include_str!("../programs/even-ones.tm"),
    include_str!("../programs/right-runner.tm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Definition> = PROGRAM_TEXTS
        .iter()
        .enumerate()
        .filter_map(|(index, text)| match parse(text) {
            Ok(definition) => Some(definition),
            Err(e) => {
                warn!("Skipping built-in program {}: {}", index, e);
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Definition, TuringMachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Definition, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|definition| definition.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|definition| definition.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let definition = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            input_alphabet: definition.signature.input_alphabet.iter().collect(),
            start_state: definition.signature.start_state.clone(),
            state_count: definition.signature.states.len(),
            transition_count: definition.rules.len(),
            name: definition.name,
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, definition)| definition.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the source text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            TuringMachineError::ValidationError(format!(
                "Program text index {} out of range",
                index
            ))
        })
    }

    /// Build a fresh machine from the named program
    pub fn machine(name: &str) -> Result<Machine, TuringMachineError> {
        Machine::from_definition(&Self::get_program_by_name(name)?)
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub input_alphabet: String,
    pub start_state: String,
    pub state_count: usize,
    pub transition_count: usize,
}
