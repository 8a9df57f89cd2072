//! The table-driven shift-reduce engine.

use crate::tables::ParserTables;
use std::hash::Hash;

/// A pull-based token source feeding the engine.
///
/// The engine classifies the current token to a terminal index by first
/// consulting the table's type map with [`kind`](Self::kind), then the
/// literal-value map with [`lexeme`](Self::lexeme), defaulting to the
/// end-of-input terminal when neither matches.
pub trait TokenStream {
    /// Semantic value carried by tokens and produced by reductions.
    type Value;

    /// Token-type discriminator, matching the table's type map keys.
    type Kind: Eq + Hash;

    /// Type discriminator of the current token, or `None` once the input is
    /// exhausted.
    fn kind(&self) -> Option<&Self::Kind>;

    /// Literal text of the current token, consulted when no type mapping
    /// matches. Hosts that declare no literal terminals can keep the default.
    fn lexeme(&self) -> Option<&str> {
        None
    }

    /// Take the semantic value of the current token. Called exactly once per
    /// token, when it is shifted.
    fn value(&mut self) -> Self::Value;

    /// Discard the current token and move to the next one.
    fn advance(&mut self);
}

/// Per-production reduction logic supplied by the host.
pub trait Reduce {
    type Value;

    /// Called once per reduction with the popped right-hand-side values in
    /// source order. Returning `None` leaves a hole on the value stack, the
    /// same as a production without a semantic action.
    fn reduce(&mut self, production: u16, args: Vec<Option<Self::Value>>) -> Option<Self::Value>;
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No table entry exists for the current state and terminal.
    #[error(
        "illegal action in state {state}: expected {} but found `{found}'",
        expected.join(" or ")
    )]
    IllegalAction {
        state: u32,
        found: String,
        expected: Vec<String>,
    },
}

/// The shift-reduce automaton: a pure function of the parse table plus the
/// host's token source and reduction logic.
pub struct Engine<'t, T, R>
where
    T: TokenStream,
    R: Reduce<Value = T::Value>,
{
    tables: &'t ParserTables<T::Kind>,
    tokens: T,
    reducer: R,
}

impl<'t, T, R> Engine<'t, T, R>
where
    T: TokenStream,
    R: Reduce<Value = T::Value>,
{
    pub fn new(tables: &'t ParserTables<T::Kind>, tokens: T, reducer: R) -> Self {
        Self {
            tables,
            tokens,
            reducer,
        }
    }

    /// Run the automaton to completion.
    ///
    /// Returns the value produced by reducing the start symbol, or the
    /// illegal-action error naming the terminals that would have been legal.
    pub fn parse(mut self) -> Result<Option<T::Value>, ParseError> {
        // Pairs of (value slot, state slot); the bottom placeholder sits
        // under the initial state 0 and is only popped at acceptance.
        let mut stack: Vec<(Option<T::Value>, u32)> = vec![(None, 0)];

        loop {
            let state = stack.last().map(|(_, state)| *state).unwrap();
            let terminal = self.classify();
            let action = self.action(state, terminal)?;

            if action == 0 {
                // accept
                let (value, _state) = stack.pop().unwrap();
                return Ok(value);
            } else if action > 0 {
                // shift
                let value = self.tokens.value();
                stack.push((Some(value), action as u32));
                self.tokens.advance();
            } else {
                // reduce
                let production = (-action) as u16;
                let len = self
                    .tables
                    .production_lengths
                    .get(&production)
                    .copied()
                    .unwrap_or(0);
                let args: Vec<Option<T::Value>> = stack
                    .split_off(stack.len() - usize::from(len))
                    .into_iter()
                    .map(|(value, _state)| value)
                    .collect();

                let state = stack.last().map(|(_, state)| *state).unwrap();
                let left = self
                    .tables
                    .production_lefts
                    .get(&production)
                    .copied()
                    .unwrap_or(0);
                let goto = self.action(state, left)?;

                let value = self.reducer.reduce(production, args);
                stack.push((value, goto as u32));
            }
        }
    }

    fn classify(&self) -> u16 {
        if let Some(kind) = self.tokens.kind() {
            if let Some(&index) = self.tables.terminal_types.get(kind) {
                return index;
            }
        }
        if let Some(lexeme) = self.tokens.lexeme() {
            if let Some(&index) = self.tables.terminal_values.get(lexeme) {
                return index;
            }
        }
        ParserTables::<T::Kind>::EOI
    }

    fn action(&self, state: u32, symbol: u16) -> Result<i32, ParseError> {
        self.tables
            .action(state, symbol)
            .ok_or_else(|| ParseError::IllegalAction {
                state,
                found: self.tables.terminal_name(symbol).to_owned(),
                expected: self.tables.expected_terminals(state),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Hand-written tables for `S := A`: $end 0, A 1, S 2, $start 3.
    fn tables() -> ParserTables {
        ParserTables {
            table: [(1, 1), (2, 2), (4, -1), (8, 0)].into_iter().collect(),
            pitch: 4,
            terminal_types: [("A".to_owned(), 1)].into_iter().collect(),
            terminal_values: HashMap::new(),
            production_lengths: [(1, 1)].into_iter().collect(),
            production_lefts: [(1, 2)].into_iter().collect(),
            terminal_names: [(1, "A".to_owned())].into_iter().collect(),
        }
    }

    struct Tokens {
        input: Vec<(String, String)>,
        pos: usize,
    }

    impl TokenStream for Tokens {
        type Value = String;
        type Kind = String;

        fn kind(&self) -> Option<&String> {
            self.input.get(self.pos).map(|(kind, _)| kind)
        }

        fn value(&mut self) -> String {
            self.input[self.pos].1.clone()
        }

        fn advance(&mut self) {
            self.pos += 1;
        }
    }

    struct Bang;

    impl Reduce for Bang {
        type Value = String;

        fn reduce(&mut self, _production: u16, mut args: Vec<Option<String>>) -> Option<String> {
            args.remove(0).map(|value| format!("{}!", value))
        }
    }

    #[test]
    fn shift_reduce_accept() {
        let tables = tables();
        let tokens = Tokens {
            input: vec![("A".to_owned(), "a".to_owned())],
            pos: 0,
        };
        let value = Engine::new(&tables, tokens, Bang).parse().unwrap();
        assert_eq!(value, Some("a!".to_owned()));
    }

    #[test]
    fn empty_input_is_rejected_with_expectations() {
        let tables = tables();
        let tokens = Tokens {
            input: Vec::new(),
            pos: 0,
        };
        let err = Engine::new(&tables, tokens, Bang).parse().unwrap_err();
        let ParseError::IllegalAction {
            state,
            found,
            expected,
        } = err;
        assert_eq!(state, 0);
        assert_eq!(found, "EOF");
        assert_eq!(expected, vec!["A".to_owned()]);
    }
}
