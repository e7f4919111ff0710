//! This module provides the parser for `.tm` machine definitions, utilizing the `pest` crate.
//! It parses the text into a `Definition`, fills in the sections that may be omitted, and
//! analyzes the result before returning it.

use crate::{
    analyzer::analyze,
    types::{
        default_reject_states, Definition, Direction, Instruction, Signature, TuringMachineError,
        DEFAULT_BLANK_SYMBOL, MAX_DEFINITION_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashSet};

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses the given input string into a `Definition`.
///
/// This is the main entry point for reading machine definitions. The parsed
/// definition is analyzed before being returned.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed and analyzed.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the definition fails analysis.
pub fn parse(input: &str) -> Result<Definition, TuringMachineError> {
    if input.len() > MAX_DEFINITION_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Definition is {} bytes, the limit is {} bytes",
            input.len(),
            MAX_DEFINITION_SIZE
        )));
    }

    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty definition".to_string()))?;

    let definition = parse_definition(root)?;

    analyze(&definition)?;

    Ok(definition)
}

/// Parses the top-level sections of a definition from a `Pair<Rule::program>`.
fn parse_definition(pair: Pair<Rule>) -> Result<Definition, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut states: Option<BTreeSet<String>> = None;
    let mut input_alphabet: Option<BTreeSet<char>> = None;
    let mut tape_alphabet: Option<BTreeSet<char>> = None;
    let mut start_state: Option<String> = None;
    let mut accept_states: Option<BTreeSet<String>> = None;
    let mut reject_states: Option<BTreeSet<String>> = None;
    let mut rules: Option<(Vec<Instruction>, Vec<String>)> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();
        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => {
                name = p
                    .into_inner()
                    .next()
                    .map(|text| text.as_str().trim().to_string())
            }
            Rule::blank => blank = collect_symbols(p).into_iter().next(),
            Rule::states => states = Some(collect_identifiers(p)),
            Rule::input => input_alphabet = Some(collect_symbols(p)),
            Rule::tape => tape_alphabet = Some(collect_symbols(p)),
            Rule::start => start_state = collect_identifiers(p).into_iter().next(),
            Rule::accept => accept_states = Some(collect_identifiers(p)),
            Rule::reject => reject_states = Some(collect_identifiers(p)),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let input_alphabet = check_required_rule(input_alphabet, "input")?;
    let (rules, blocks) = check_required_rule(rules, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);

    let start_state = start_state
        .or_else(|| blocks.into_iter().next())
        .ok_or_else(|| TuringMachineError::ValidationError("Missing start state".to_string()))?;
    let accept_states = accept_states.unwrap_or_default();
    let explicit_reject = reject_states.clone().unwrap_or_default();
    let reject_states = reject_states.unwrap_or_else(default_reject_states);

    let states = states.unwrap_or_else(|| {
        infer_states(&rules, &start_state, &accept_states, &explicit_reject)
    });
    let tape_alphabet =
        tape_alphabet.unwrap_or_else(|| infer_tape_alphabet(&rules, &input_alphabet, blank));

    Ok(Definition {
        name,
        signature: Signature {
            states,
            input_alphabet,
            tape_alphabet,
            start_state,
            accept_states,
            reject_states,
            blank,
        },
        rules,
    })
}

/// Parses the `rules:` section into instructions and block names, both in
/// declaration order.
///
/// Each state may own only one block.
fn parse_rules(pair: Pair<Rule>) -> Result<(Vec<Instruction>, Vec<String>), TuringMachineError> {
    let mut instructions = Vec::new();
    let mut blocks = Vec::new();
    let mut seen = HashSet::new();

    for block in pair.into_inner() {
        let span = block.as_span();
        let mut pairs = block.into_inner();
        let state = parse_string(&mut pairs, span)?;

        if !seen.insert(state.clone()) {
            return Err(parse_error(&format!("Duplicate transition rule: {state}"), span));
        }

        for action in pairs {
            instructions.push(parse_action(&state, action)?);
        }
        blocks.push(state);
    }

    Ok((instructions, blocks))
}

/// Parses one action line of a state block.
///
/// If the written symbol is omitted the action writes back what it read.
fn parse_action(state: &str, pair: Pair<Rule>) -> Result<Instruction, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let read = parse_symbol(&parse_string(&mut pairs, span)?);

    let write = match pairs.peek().map(|p| p.as_rule()) {
        Some(Rule::symbol) => parse_symbol(&parse_string(&mut pairs, span)?),
        _ => read,
    };

    let direction = match pairs.next() {
        Some(p) => parse_direction(p)?,
        None => return Err(parse_error("Missing direction", span)),
    };
    let next_state = parse_string(&mut pairs, span)?;

    Ok(Instruction {
        state: state.to_string(),
        read,
        write,
        direction,
        next_state,
    })
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and 'S', 'N' or '-' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        "S" | "N" | "-" => Ok(Direction::Stay),
        other => Err(parse_error(
            &format!("Unsupported direction: {other}"),
            span,
        )),
    }
}

/// Parses a single character symbol, handling quoted and unquoted forms.
fn parse_symbol(input: &str) -> char {
    input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input)
        .chars()
        .next()
        .unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Collects every identifier nested in `pair`.
fn collect_identifiers(pair: Pair<Rule>) -> BTreeSet<String> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Collects every symbol nested in `pair`.
fn collect_symbols(pair: Pair<Rule>) -> BTreeSet<char> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Extracts the string content of the next `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>, span: Span) -> Result<String, TuringMachineError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| parse_error("Incomplete rule", span))
}

/// All states mentioned by the rules and the start, accept, and explicit reject sections.
fn infer_states(
    rules: &[Instruction],
    start_state: &str,
    accept_states: &BTreeSet<String>,
    reject_states: &BTreeSet<String>,
) -> BTreeSet<String> {
    rules
        .iter()
        .flat_map(|rule| [rule.state.clone(), rule.next_state.clone()])
        .chain(std::iter::once(start_state.to_string()))
        .chain(accept_states.iter().cloned())
        .chain(reject_states.iter().cloned())
        .collect()
}

/// The input alphabet, the blank symbol, and every symbol the rules read or write.
fn infer_tape_alphabet(
    rules: &[Instruction],
    input_alphabet: &BTreeSet<char>,
    blank: char,
) -> BTreeSet<char> {
    rules
        .iter()
        .flat_map(|rule| [rule.read, rule.write])
        .chain(input_alphabet.iter().copied())
        .chain(std::iter::once(blank))
        .collect()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks that a top-level section is declared at most once.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_REJECT_STATE;

    #[test]
    fn test_parse_simple_definition() {
        let input = r#"
name: Simple Test
input: a
rules:
  start:
    a -> b, R, halt
  halt:
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.name, "Simple Test");
        assert_eq!(definition.signature.start_state, "start");
        assert_eq!(
            definition.signature.states,
            BTreeSet::from(["start".to_string(), "halt".to_string()])
        );
        assert_eq!(
            definition.signature.tape_alphabet,
            BTreeSet::from(['a', 'b', '_'])
        );
        assert!(definition.signature.accept_states.is_empty());
        assert!(definition
            .signature
            .reject_states
            .contains(DEFAULT_REJECT_STATE));
        assert_eq!(
            definition.rules,
            vec![Instruction {
                state: "start".into(),
                read: 'a',
                write: 'b',
                direction: Direction::Right,
                next_state: "halt".into(),
            }]
        );
    }

    #[test]
    fn test_parse_full_definition() {
        let input = r#"
# Accepts a single zero.
name: One Zero   # trailing comment
blank: '.'
states: q0, q1, yes, no
input: 0
tape: 0, .
start: q0
accept: yes
reject: no
rules:
  q0:
    0, > , q1
    ., -, no
  q1:
    . -> ., N, yes
    0 -> 0, <, no
"#;

        let definition = parse(input).unwrap();
        let signature = &definition.signature;
        assert_eq!(definition.name, "One Zero");
        assert_eq!(signature.blank, '.');
        assert_eq!(signature.states.len(), 4);
        assert_eq!(signature.accept_states, BTreeSet::from(["yes".to_string()]));
        assert_eq!(signature.reject_states, BTreeSet::from(["no".to_string()]));
        assert_eq!(definition.rules.len(), 4);
        assert_eq!(definition.rules[0].write, '0');
        assert_eq!(definition.rules[0].direction, Direction::Right);
        assert_eq!(definition.rules[1].direction, Direction::Stay);
        assert_eq!(definition.rules[3].direction, Direction::Left);
    }

    #[test]
    fn test_parse_quoted_symbols() {
        let input = r#"
name: Quoted
blank: ' '
input: ','
rules:
  q0:
    ',' -> '#', R, q0
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.signature.blank, ' ');
        assert_eq!(definition.signature.input_alphabet, BTreeSet::from([',']));
        assert_eq!(definition.rules[0].write, '#');
        assert!(definition.signature.tape_alphabet.contains(&' '));
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
input: a
rules:
  start:
    a -> b, R, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
input: a
rules:
  start:
    a -> b, R, start
"#;
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_input() {
        let input = r#"
name: Missing Input
rules:
  start:
    a -> b, R, start
"#;
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'input' section"
        );
    }

    #[test]
    fn test_parse_missing_rules() {
        let input = r#"
name: Missing Rules
input: a
"#;
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'rules' section"
        );
    }

    #[test]
    fn test_parse_duplicate_transition_rule() {
        let input = r#"
name: Duplicate Block
input: a
rules:
  start:
    a -> b, R, start
  start:
    b -> a, L, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate transition rule: start"));
    }

    #[test]
    fn test_parse_nondeterministic_block() {
        let input = r#"
name: Nondeterministic
input: a
rules:
  start:
    a -> b, R, start
    a -> a, L, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("Nondeterministic rules"));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = r#"
name: Bad Direction
input: a
rules:
  start:
    a -> b, X, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_rules_must_be_last() {
        let input = r#"
name: Late Accept
input: a
rules:
  start:
    a -> a, R, done
accept: done
"#;
        assert!(parse(input).is_err());
    }

    #[test]
    fn test_parse_blank_in_input_alphabet() {
        let input = r#"
name: Blank Input
input: a, _
rules:
  start:
    a -> a, R, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("blank symbol"));
    }

    #[test]
    fn test_parse_start_defaults_to_first_block() {
        let input = r#"
name: Empty First Block
input: a
rules:
  first:
  second:
    a -> a, R, first
"#;
        let definition = parse(input).unwrap();
        assert_eq!(definition.signature.start_state, "first");
        assert_eq!(definition.rules.len(), 1);
    }

    #[test]
    fn test_parse_rules_without_blocks() {
        let input = r#"
name: No Rules
input: a
start: idle
rules:
"#;
        let definition = parse(input).unwrap();
        assert_eq!(definition.signature.start_state, "idle");
        assert!(definition.rules.is_empty());
        assert!(definition.signature.states.contains("idle"));

        let error = parse("name: No Start\ninput: a\nrules:\n").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing start state"
        );
    }

    #[test]
    fn test_parse_oversized_definition() {
        let input = "#".repeat(MAX_DEFINITION_SIZE + 1);
        assert!(matches!(
            parse(&input),
            Err(TuringMachineError::ValidationError(_))
        ));
    }
}
