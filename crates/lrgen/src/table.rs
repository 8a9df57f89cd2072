//! Action-table construction from the canonical LR(1) collection.

use crate::{
    first_follow::FirstFollow,
    grammar::{Grammar, ProductionID, TerminalKind},
    lr1::Automaton,
};
use lrgen_runtime::ParserTables;
use std::collections::HashMap;
use tracing::debug;

/// A grammar that is not LR(1). Each variant reports the first conflicting
/// cell encountered, identified by state and lookahead terminal.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(
        "shift/reduce conflict in state {state} on `{terminal}' \
         (reduce by production {production})"
    )]
    ShiftReduce {
        state: usize,
        terminal: String,
        production: u16,
    },

    #[error(
        "reduce/reduce conflict in state {state} on `{terminal}' \
         (productions {first} and {second})"
    )]
    ReduceReduce {
        state: usize,
        terminal: String,
        first: u16,
        second: u16,
    },

    #[error(
        "accept/reduce conflict in state {state} on `{terminal}' \
         (reduce by production {production})"
    )]
    AcceptReduce {
        state: usize,
        terminal: String,
        production: u16,
    },
}

/// Derive the complete parser tables for `grammar`, or fail on the first
/// LR(1) conflict.
pub fn compute(grammar: &Grammar) -> Result<ParserTables, TableError> {
    debug!(
        terminals = grammar.terminals.len(),
        nonterminals = grammar.nonterminals.len(),
        productions = grammar.productions.len(),
        "augmented grammar"
    );

    let first = FirstFollow::new(grammar);
    debug!("computed FIRST/FOLLOW sets");

    let automaton = Automaton::generate(grammar, &first);
    debug!(states = automaton.len(), "built the LR(1) collection");

    let tables = fill_table(grammar, &automaton)?;
    debug!(entries = tables.table.len(), "filled the action table");

    Ok(tables)
}

fn fill_table(grammar: &Grammar, automaton: &Automaton) -> Result<ParserTables, TableError> {
    let pitch = u32::from(grammar.pitch());
    let mut table: HashMap<u32, i32> = HashMap::new();

    for (state, items) in automaton.states() {
        let base = state as u32 * pitch;

        // Shift and goto entries come straight from the transition edges.
        // Within one state they can never collide: every edge has a distinct
        // symbol, hence a distinct column.
        for jump in automaton.jumps().filter(|jump| jump.from == state) {
            let column = grammar.symbol_index(jump.symbol);
            table.insert(base + u32::from(column), jump.to as i32);
        }

        // Completed items reduce (or accept) on their lookahead. A cell
        // already holding a shift or another reduce is a conflict, and the
        // grammar is rejected rather than resolved by precedence.
        for item in items {
            let production = &grammar.productions[&item.production];
            if item.dot != production.right().len() {
                continue;
            }

            let column = base + u32::from(item.lookahead);
            if item.production == ProductionID::ACCEPT {
                match table.get(&column) {
                    Some(&occupied) if occupied < 0 => {
                        return Err(TableError::AcceptReduce {
                            state,
                            terminal: grammar.terminal_name(item.lookahead).to_owned(),
                            production: (-occupied) as u16,
                        });
                    }
                    _ => {
                        table.insert(column, 0);
                    }
                }
                continue;
            }

            let index = item.production.index();
            match table.get(&column) {
                None => {
                    table.insert(column, -i32::from(index));
                }
                Some(&occupied) if occupied > 0 => {
                    return Err(TableError::ShiftReduce {
                        state,
                        terminal: grammar.terminal_name(item.lookahead).to_owned(),
                        production: index,
                    });
                }
                Some(&occupied) if occupied < 0 => {
                    if occupied != -i32::from(index) {
                        return Err(TableError::ReduceReduce {
                            state,
                            terminal: grammar.terminal_name(item.lookahead).to_owned(),
                            first: (-occupied) as u16,
                            second: index,
                        });
                    }
                }
                Some(_) => {
                    return Err(TableError::AcceptReduce {
                        state,
                        terminal: grammar.terminal_name(item.lookahead).to_owned(),
                        production: index,
                    });
                }
            }
        }
    }

    let mut terminal_types = HashMap::new();
    let mut terminal_values = HashMap::new();
    let mut terminal_names = HashMap::new();
    for terminal in grammar.terminals.values() {
        match terminal.kind() {
            Some(TerminalKind::Type(ty)) => {
                terminal_types.insert(ty.clone(), terminal.index());
            }
            Some(TerminalKind::Literal(text)) => {
                terminal_values.insert(text.clone(), terminal.index());
            }
            // The end-of-input terminal is classified by token exhaustion,
            // not by lookup.
            None => continue,
        }
        terminal_names.insert(terminal.index(), terminal.name().to_owned());
    }

    let mut production_lengths = HashMap::new();
    let mut production_lefts = HashMap::new();
    for production in grammar.productions.values() {
        let index = production.id().index();
        production_lengths.insert(index, production.right().len() as u16);
        production_lefts.insert(
            index,
            grammar.nonterminals[&production.left()].index(),
        );
    }

    Ok(ParserTables {
        table,
        pitch,
        terminal_types,
        terminal_values,
        production_lengths,
        production_lefts,
        terminal_names,
    })
}
