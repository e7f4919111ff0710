//! This module provides functions for checking machine signatures and definitions for
//! errors before execution: undeclared states and symbols, overlapping halting states,
//! and nondeterministic rules.

use crate::types::{Definition, Signature, TuringMachineError};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Represents the problems analysis can find in a signature or definition.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// The start state is not a declared state.
    #[error("Invalid start state: {0}")]
    InvalidStartState(String),
    /// Accept states that are not declared states.
    #[error("Accept states are not declared: {0:?}")]
    UndeclaredAcceptStates(Vec<String>),
    /// States that are both accepting and rejecting.
    #[error("States are both accepting and rejecting: {0:?}")]
    OverlappingHaltStates(Vec<String>),
    /// The input alphabet contains the blank symbol.
    #[error("Input alphabet contains the blank symbol {0:?}")]
    BlankInInputAlphabet(char),
    /// The tape alphabet lacks the blank symbol.
    #[error("Tape alphabet does not contain the blank symbol {0:?}")]
    BlankNotInTapeAlphabet(char),
    /// Input symbols missing from the tape alphabet.
    #[error("Input symbols missing from the tape alphabet: {0:?}")]
    InputNotInTapeAlphabet(Vec<char>),
    /// Rules that reference states which are not declared.
    #[error("Rules reference undeclared states: {0:?}")]
    UndeclaredStates(Vec<String>),
    /// Rules that read or write symbols outside the tape alphabet.
    #[error("Rules use symbols outside the tape alphabet: {0:?}")]
    UndeclaredSymbols(Vec<char>),
    /// A name the `.tm` format cannot carry: empty, padded, multi-line or holding `#`.
    #[error("Invalid definition name: {0:?}")]
    InvalidName(String),
    /// `(state, symbol)` pairs with more than one rule.
    #[error("Nondeterministic rules for: {0:?}")]
    NondeterministicRules(Vec<(String, char)>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        TuringMachineError::ValidationError(error.to_string())
    }
}

/// Analyzes a `Definition` for structural and logical errors.
///
/// The signature is checked first, then the rules. Only the first problem found is
/// reported.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` if any check fails.
pub fn analyze(definition: &Definition) -> Result<(), TuringMachineError> {
    check_signature(&definition.signature)?;

    [
        check_name,
        check_rule_states,
        check_rule_symbols,
        check_determinism,
    ]
    .iter()
    .try_for_each(|check| check(definition))?;

    Ok(())
}

/// Checks the invariants every machine signature must hold.
///
/// Reject states are not required to be declared: the default sentinel is
/// recognized even by machines that never mention it.
pub fn check_signature(signature: &Signature) -> Result<(), AnalysisError> {
    if !signature.states.contains(&signature.start_state) {
        return Err(AnalysisError::InvalidStartState(
            signature.start_state.clone(),
        ));
    }

    let undeclared: Vec<String> = signature
        .accept_states
        .difference(&signature.states)
        .cloned()
        .collect();
    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredAcceptStates(undeclared));
    }

    let overlapping: Vec<String> = signature
        .accept_states
        .intersection(&signature.reject_states)
        .cloned()
        .collect();
    if !overlapping.is_empty() {
        return Err(AnalysisError::OverlappingHaltStates(overlapping));
    }

    if signature.input_alphabet.contains(&signature.blank) {
        return Err(AnalysisError::BlankInInputAlphabet(signature.blank));
    }

    if !signature.tape_alphabet.contains(&signature.blank) {
        return Err(AnalysisError::BlankNotInTapeAlphabet(signature.blank));
    }

    let missing: Vec<char> = signature
        .input_alphabet
        .difference(&signature.tape_alphabet)
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::InputNotInTapeAlphabet(missing));
    }

    Ok(())
}

/// Checks that the name reads back unchanged from a `name:` line.
fn check_name(definition: &Definition) -> Result<(), AnalysisError> {
    let name = &definition.name;
    if name.is_empty()
        || name.trim() != name.as_str()
        || name.contains(|c: char| matches!(c, '#' | '\n' | '\r'))
    {
        return Err(AnalysisError::InvalidName(name.clone()));
    }

    Ok(())
}

/// Checks that every rule starts from and leads to a declared state.
fn check_rule_states(definition: &Definition) -> Result<(), AnalysisError> {
    let states = &definition.signature.states;
    let undeclared: BTreeSet<String> = definition
        .rules
        .iter()
        .flat_map(|rule| [&rule.state, &rule.next_state])
        .filter(|state| !states.contains(*state))
        .cloned()
        .collect();

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredStates(
            undeclared.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that every rule reads and writes symbols of the tape alphabet.
fn check_rule_symbols(definition: &Definition) -> Result<(), AnalysisError> {
    let alphabet = &definition.signature.tape_alphabet;
    let undeclared: BTreeSet<char> = definition
        .rules
        .iter()
        .flat_map(|rule| [rule.read, rule.write])
        .filter(|symbol| !alphabet.contains(symbol))
        .collect();

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredSymbols(
            undeclared.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that no `(state, symbol)` pair has more than one rule.
fn check_determinism(definition: &Definition) -> Result<(), AnalysisError> {
    let mut counts: BTreeMap<(&str, char), usize> = BTreeMap::new();
    for rule in &definition.rules {
        *counts.entry((rule.state.as_str(), rule.read)).or_default() += 1;
    }

    let duplicated: Vec<(String, char)> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|((state, symbol), _)| (state.to_string(), symbol))
        .collect();

    if !duplicated.is_empty() {
        return Err(AnalysisError::NondeterministicRules(duplicated));
    }

    Ok(())
}
