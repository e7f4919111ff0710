//! This module defines the `TransitionTable`, the deterministic transition function
//! of a machine.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Direction, Transition};

/// Maps `(state, symbol)` pairs to at most one [`Transition`].
///
/// A missing entry is not an error: the machine rejects when it finds none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: HashMap<String, HashMap<char, Transition>>,
}

impl TransitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the entry for `(state, read)`, returning the one it replaced.
    ///
    /// Symbols and states are not checked against any alphabet here.
    pub fn add(
        &mut self,
        state: impl Into<String>,
        read: char,
        next_state: impl Into<String>,
        write: char,
        direction: Direction,
    ) -> Option<Transition> {
        self.entries.entry(state.into()).or_default().insert(
            read,
            Transition {
                next_state: next_state.into(),
                write,
                direction,
            },
        )
    }

    /// Returns the entry for `(state, symbol)`, if there is one.
    pub fn lookup(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.entries.get(state)?.get(&symbol)
    }

    /// Returns `true` if at least one entry starts from `state`.
    pub fn has_state(&self, state: &str) -> bool {
        self.entries
            .get(state)
            .is_some_and(|transitions| !transitions.is_empty())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all entries ordered by state, then symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&str, char, &Transition)> {
        let ordered: BTreeMap<(&str, char), &Transition> = self
            .entries
            .iter()
            .flat_map(|(state, transitions)| {
                transitions
                    .iter()
                    .map(move |(&symbol, transition)| ((state.as_str(), symbol), transition))
            })
            .collect();

        ordered
            .into_iter()
            .map(|((state, symbol), transition)| (state, symbol, transition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut table = TransitionTable::new();
        table.add("q0", '0', "q1", 'X', Direction::Right);

        let transition = table.lookup("q0", '0').unwrap();
        assert_eq!(transition.next_state, "q1");
        assert_eq!(transition.write, 'X');
        assert_eq!(transition.direction, Direction::Right);
    }

    #[test]
    fn test_lookup_missing_entry() {
        let mut table = TransitionTable::new();
        table.add("q0", '0', "q1", 'X', Direction::Right);

        assert!(table.lookup("q0", '1').is_none());
        assert!(table.lookup("q1", '0').is_none());
        assert!(TransitionTable::new().lookup("q0", '0').is_none());
    }

    #[test]
    fn test_add_overwrites_entry() {
        let mut table = TransitionTable::new();
        assert!(table.add("q0", '0', "q1", 'X', Direction::Right).is_none());

        let replaced = table.add("q0", '0', "q2", 'Y', Direction::Left).unwrap();
        assert_eq!(replaced.next_state, "q1");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("q0", '0').unwrap().next_state, "q2");
    }

    #[test]
    fn test_iter_is_ordered() {
        let mut table = TransitionTable::new();
        table.add("q1", 'b', "q0", 'b', Direction::Left);
        table.add("q0", 'b', "q1", 'b', Direction::Right);
        table.add("q0", 'a', "q1", 'a', Direction::Stay);

        let keys: Vec<_> = table.iter().map(|(state, symbol, _)| (state, symbol)).collect();
        assert_eq!(keys, vec![("q0", 'a'), ("q0", 'b'), ("q1", 'b')]);
        assert!(table.has_state("q0"));
        assert!(!table.has_state("q2"));
        assert!(!table.is_empty());
    }
}
