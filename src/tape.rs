//! This module defines the `Tape`: an unbounded, sparse, bidirectional sequence of
//! symbols with a single read/write head.
//!
//! Only non-blank cells are stored. Reading a cell that was never written, or that
//! was last written with the blank symbol, yields the blank symbol.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Direction;

/// Controls how much of the tape [`Tape::render`] shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Maximum number of cells shown on each side of the head.
    pub radius: usize,
    /// Blank cells shown beyond the occupied range.
    pub margin: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            radius: 25,
            margin: 5,
        }
    }
}

/// A sparse tape addressed by signed positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, char>,
    blank: char,
    head: i64,
}

impl Tape {
    /// Creates an empty tape with the head at position 0.
    pub fn new(blank: char) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
            head: 0,
        }
    }

    /// Creates a tape holding `input` at positions `0..len`, head at 0.
    ///
    /// Blank characters in `input` leave their cell unset.
    pub fn from_input(input: &str, blank: char) -> Self {
        let cells = (0..)
            .zip(input.chars())
            .filter(|&(_, symbol)| symbol != blank)
            .collect();

        Self {
            cells,
            blank,
            head: 0,
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> char {
        self.symbol_at(self.head)
    }

    /// Writes `symbol` under the head. Writing the blank symbol clears the cell.
    pub fn write(&mut self, symbol: char) {
        if symbol == self.blank {
            self.cells.remove(&self.head);
        } else {
            self.cells.insert(self.head, symbol);
        }
    }

    /// Moves the head one cell in `direction`.
    pub fn move_head(&mut self, direction: Direction) {
        self.head += direction.offset();
    }

    /// Returns the symbol at `position`, or blank if it was never written.
    pub fn symbol_at(&self, position: i64) -> char {
        self.cells.get(&position).copied().unwrap_or(self.blank)
    }

    /// Returns the current head position.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the lowest and highest non-blank positions, if any.
    pub fn occupied(&self) -> Option<(i64, i64)> {
        let (&min, _) = self.cells.first_key_value()?;
        let (&max, _) = self.cells.last_key_value()?;
        Some((min, max))
    }

    /// Iterates over the non-blank cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, char)> + '_ {
        self.cells.iter().map(|(&position, &symbol)| (position, symbol))
    }

    /// Returns the occupied range as a string, inner blanks included.
    pub fn contents(&self) -> String {
        match self.occupied() {
            Some((min, max)) => (min..=max).map(|pos| self.symbol_at(pos)).collect(),
            None => String::new(),
        }
    }

    /// Renders a window of the tape around the head.
    ///
    /// The head cell is wrapped in brackets. `...` marks a side where the window
    /// cuts off part of the occupied range (plus its blank margin).
    pub fn render(&self, window: Window) -> String {
        let (min, max) = self.occupied().unwrap_or((self.head, self.head));
        let margin = i64::try_from(window.margin).unwrap_or(i64::MAX);
        let radius = i64::try_from(window.radius).unwrap_or(i64::MAX);

        let low = min.min(self.head).saturating_sub(margin);
        let high = max.max(self.head).saturating_add(margin);
        let start = low.max(self.head.saturating_sub(radius));
        let end = high.min(self.head.saturating_add(radius));

        let mut out = String::new();
        if start > low {
            out.push_str("...");
        }
        for pos in start..=end {
            let symbol = self.symbol_at(pos);
            if pos == self.head {
                out.push('[');
                out.push(symbol);
                out.push(']');
            } else {
                out.push(symbol);
            }
        }
        if end < high {
            out.push_str("...");
        }

        out
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Window::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_seeds_positions() {
        let tape = Tape::from_input("abc", '_');

        assert_eq!(tape.head(), 0);
        assert_eq!(tape.symbol_at(0), 'a');
        assert_eq!(tape.symbol_at(2), 'c');
        assert_eq!(tape.symbol_at(3), '_');
        assert_eq!(tape.symbol_at(-1), '_');
        assert_eq!(tape.occupied(), Some((0, 2)));
    }

    #[test]
    fn test_from_input_skips_blanks() {
        let tape = Tape::from_input("a_b", '_');

        assert_eq!(tape.cells().collect::<Vec<_>>(), vec![(0, 'a'), (2, 'b')]);
        assert_eq!(tape.contents(), "a_b");
    }

    #[test]
    fn test_write_blank_clears_cell() {
        let mut tape = Tape::from_input("a", '_');
        tape.write('_');

        assert_eq!(tape.read(), '_');
        assert_eq!(tape.occupied(), None);
        assert_eq!(tape, Tape::new('_'));
    }

    #[test]
    fn test_head_can_go_negative() {
        let mut tape = Tape::new('_');
        tape.move_head(Direction::Left);
        tape.move_head(Direction::Left);
        tape.write('x');

        assert_eq!(tape.head(), -2);
        assert_eq!(tape.symbol_at(-2), 'x');
        assert_eq!(tape.contents(), "x");

        tape.move_head(Direction::Stay);
        assert_eq!(tape.head(), -2);
    }

    #[test]
    fn test_render_empty_tape() {
        let tape = Tape::new('_');
        let window = Window {
            radius: 10,
            margin: 2,
        };

        assert_eq!(tape.render(window), "__[_]__");
    }

    #[test]
    fn test_render_marks_head() {
        let mut tape = Tape::from_input("0011", '_');
        tape.move_head(Direction::Right);
        let window = Window {
            radius: 10,
            margin: 1,
        };

        assert_eq!(tape.render(window), "_0[0]11_");
    }

    #[test]
    fn test_render_clips_with_ellipsis() {
        let tape = Tape::from_input("abcdefgh", '_');
        let window = Window {
            radius: 2,
            margin: 0,
        };

        assert_eq!(tape.render(window), "[a]bc...");

        let mut tape = tape;
        for _ in 0..4 {
            tape.move_head(Direction::Right);
        }
        assert_eq!(tape.render(window), "...cd[e]fg...");
    }

    #[test]
    fn test_render_includes_head_outside_occupied_range() {
        let mut tape = Tape::from_input("a", '_');
        for _ in 0..3 {
            tape.move_head(Direction::Right);
        }
        let window = Window {
            radius: 10,
            margin: 0,
        };

        assert_eq!(tape.render(window), "a__[_]");
    }

    #[test]
    fn test_render_with_unbounded_radius() {
        let mut tape = Tape::from_input("01", '_');
        tape.move_head(Direction::Right);
        let window = Window {
            radius: usize::MAX,
            margin: 5,
        };

        assert_eq!(tape.render(window), "_____0[1]_____");
    }

    #[test]
    fn test_render_with_unbounded_margin() {
        let tape = Tape::from_input("01", '_');
        let window = Window {
            radius: 25,
            margin: usize::MAX,
        };

        let rendered = tape.render(window);
        assert!(rendered.starts_with("..."));
        assert!(rendered.ends_with("..."));
        assert!(rendered.contains("[0]1"));
        assert_eq!(rendered.chars().count(), 3 + 25 + 3 + 25 + 3);
    }

    #[test]
    fn test_display_uses_default_window() {
        let tape = Tape::from_input("01", '_');

        assert_eq!(tape.to_string(), "_____[0]1_____");
    }
}
