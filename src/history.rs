//! Configuration snapshots and the execution history a run records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

/// The observable configuration of a machine at one point of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// The current state identifier.
    pub state: String,
    /// A rendering of the tape window around the head.
    pub tape: String,
    /// The head position.
    pub head: i64,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state: {}, head: {}, tape: {}",
            self.state, self.head, self.tape
        )
    }
}

/// The configurations recorded by a run, in order.
///
/// One configuration is recorded before every step; a run that halts also
/// records the final configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    configurations: Vec<Configuration>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, configuration: Configuration) {
        self.configurations.push(configuration);
    }

    pub(crate) fn clear(&mut self) {
        self.configurations.clear();
    }

    /// The number of recorded configurations.
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// The configuration the run started from.
    pub fn first(&self) -> Option<&Configuration> {
        self.configurations.first()
    }

    /// The last recorded configuration; the final one when the run halted.
    pub fn last(&self) -> Option<&Configuration> {
        self.configurations.last()
    }

    /// Iterates over the configurations in recording order.
    pub fn iter(&self) -> slice::Iter<'_, Configuration> {
        self.configurations.iter()
    }

    /// The configurations as a slice.
    pub fn as_slice(&self) -> &[Configuration] {
        &self.configurations
    }

    /// The sequence of states visited, one per recorded configuration.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.configurations.iter().map(|c| c.state.as_str())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Configuration;
    type IntoIter = slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for History {
    type Item = Configuration;
    type IntoIter = std::vec::IntoIter<Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.configurations.into_iter()
    }
}
