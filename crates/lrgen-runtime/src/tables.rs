//! The generated parse table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// The flattened LR(1) action table, together with everything the engine
/// needs to drive it: terminal classification maps, per-production metadata
/// and terminal display names for error reporting.
///
/// Actions are signed: `0` accepts, a positive value shifts to (or, in a
/// nonterminal column, goes to) that state, and a negative value reduces by
/// the production whose index is the negated action.
///
/// `K` is the token-type discriminator used by the host lexer; the generator
/// produces `ParserTables<String>` keyed by the declared type names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserTables<K = String>
where
    K: Eq + Hash,
{
    /// Sparse action map keyed by `state * pitch + symbol index`.
    pub table: HashMap<u32, i32>,

    /// Row width of the flattened table, one past the highest symbol index.
    pub pitch: u32,

    /// Token-type discriminator to terminal index.
    pub terminal_types: HashMap<K, u16>,

    /// Literal token text to terminal index.
    pub terminal_values: HashMap<String, u16>,

    /// Production index to right-hand-side length.
    pub production_lengths: HashMap<u16, u16>,

    /// Production index to left-hand nonterminal index.
    pub production_lefts: HashMap<u16, u16>,

    /// Terminal index to display name, used in error messages.
    pub terminal_names: HashMap<u16, String>,
}

impl<K> ParserTables<K>
where
    K: Eq + Hash,
{
    /// The terminal index reserved for the end of input.
    pub const EOI: u16 = 0;

    /// Look up the action assigned to `(state, symbol)`, if any.
    pub fn action(&self, state: u32, symbol: u16) -> Option<i32> {
        self.table
            .get(&(state * self.pitch + u32::from(symbol)))
            .copied()
    }

    /// The display name of a terminal index.
    pub fn terminal_name(&self, index: u16) -> &str {
        match self.terminal_names.get(&index) {
            Some(name) => name,
            None if index == Self::EOI => "EOF",
            None => "<unknown>",
        }
    }

    /// Display names of every terminal that has an action assigned in `state`.
    pub fn expected_terminals(&self, state: u32) -> Vec<String> {
        let mut expected = Vec::new();
        for index in 0..self.pitch.min(u32::from(u16::MAX)) {
            let index = index as u16;
            if index != Self::EOI && !self.terminal_names.contains_key(&index) {
                // nonterminal column
                continue;
            }
            if self.action(state, index).is_some() {
                expected.push(self.terminal_name(index).to_owned());
            }
        }
        expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hand-written tables for `S := A`: $end 0, A 1, S 2, $start 3.
    fn tables() -> ParserTables {
        ParserTables {
            table: [
                (1, 1),  // state 0, A: shift to 1
                (2, 2),  // state 0, S: goto 2
                (4, -1), // state 1, $end: reduce S := A
                (8, 0),  // state 2, $end: accept
            ]
            .into_iter()
            .collect(),
            pitch: 4,
            terminal_types: [("A".to_owned(), 1)].into_iter().collect(),
            terminal_values: HashMap::new(),
            production_lengths: [(1, 1)].into_iter().collect(),
            production_lefts: [(1, 2)].into_iter().collect(),
            terminal_names: [(1, "A".to_owned())].into_iter().collect(),
        }
    }

    #[test]
    fn action_lookup_uses_the_flattened_key() {
        let tables = tables();
        assert_eq!(tables.action(0, 1), Some(1));
        assert_eq!(tables.action(1, 0), Some(-1));
        assert_eq!(tables.action(2, 0), Some(0));
        assert_eq!(tables.action(0, 0), None);
    }

    #[test]
    fn terminal_names_with_fallbacks() {
        let tables = tables();
        assert_eq!(tables.terminal_name(1), "A");
        assert_eq!(tables.terminal_name(ParserTables::<String>::EOI), "EOF");
        assert_eq!(tables.terminal_name(9), "<unknown>");
    }

    #[test]
    fn expected_terminals_skip_nonterminal_columns() {
        let tables = tables();
        // State 0 also has a goto on S (column 2); only A may be reported.
        assert_eq!(tables.expected_terminals(0), vec!["A".to_owned()]);
        assert_eq!(tables.expected_terminals(2), vec!["EOF".to_owned()]);
    }
}
