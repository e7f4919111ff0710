//! This module converts definitions back into text: the `.tm` format read by the parser,
//! and JSON.

use crate::analyzer::analyze;
use crate::types::{Definition, TuringMachineError};
use std::collections::BTreeSet;

/// Encodes a definition as `.tm` text.
///
/// Every section is written out explicitly, so parsing the result of an analyzed
/// definition yields the same definition. Rules are grouped into one block per state, in order of each state's
/// first rule.
pub fn encode(definition: &Definition) -> String {
    let signature = &definition.signature;
    let mut lines = vec![
        format!("name: {}", definition.name),
        format!("blank: {}", encode_symbol(signature.blank)),
        format!("states: {}", join(&signature.states)),
        format!("input: {}", join_symbols(&signature.input_alphabet)),
        format!("tape: {}", join_symbols(&signature.tape_alphabet)),
        format!("start: {}", signature.start_state),
        format!("accept: {}", join(&signature.accept_states)),
        format!("reject: {}", join(&signature.reject_states)),
        "rules:".to_string(),
    ];

    let mut order: Vec<&str> = Vec::new();
    for rule in &definition.rules {
        if !order.contains(&rule.state.as_str()) {
            order.push(&rule.state);
        }
    }

    for state in order {
        lines.push(format!("  {state}:"));
        lines.extend(
            definition
                .rules
                .iter()
                .filter(|rule| rule.state == state)
                .map(|rule| {
                    format!(
                        "    {} -> {}, {}, {}",
                        encode_symbol(rule.read),
                        encode_symbol(rule.write),
                        rule.direction,
                        rule.next_state
                    )
                }),
        );
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Serializes a definition as pretty-printed JSON.
pub fn to_json(definition: &Definition) -> Result<String, TuringMachineError> {
    serde_json::to_string_pretty(definition)
        .map_err(|e| TuringMachineError::SerializationError(e.to_string()))
}

/// Deserializes a definition from JSON and analyzes it.
pub fn from_json(content: &str) -> Result<Definition, TuringMachineError> {
    let definition: Definition = serde_json::from_str(content)
        .map_err(|e| TuringMachineError::SerializationError(e.to_string()))?;

    analyze(&definition)?;

    Ok(definition)
}

/// Quotes symbols the grammar would otherwise read as separators or comments.
fn encode_symbol(symbol: char) -> String {
    match symbol {
        ' ' | '\t' | ',' | '\'' | '#' => format!("'{symbol}'"),
        _ => symbol.to_string(),
    }
}

fn join(states: &BTreeSet<String>) -> String {
    states.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn join_symbols(symbols: &BTreeSet<char>) -> String {
    symbols
        .iter()
        .map(|&symbol| encode_symbol(symbol))
        .collect::<Vec<_>>()
        .join(", ")
}
