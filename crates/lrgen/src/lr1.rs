//! The canonical collection of LR(1) item sets.

use crate::{
    first_follow::{FirstFollow, EPSILON},
    grammar::{Grammar, ProductionID, SymbolID},
    intern::InternSet,
    types::Set,
    util::display_fn,
};
use std::{collections::BTreeSet, fmt};

/// A parsing-progress marker: a production, the dot position inside its
/// right side, and one lookahead terminal index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LRItem {
    pub production: ProductionID,
    pub dot: usize,
    pub lookahead: u16,
}

impl LRItem {
    // `"(LHS := R1 . R2) [la]"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let production = &g.productions[&self.production];
            write!(f, "({} :=", g.nonterminals[&production.left()])?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.dot {
                    f.write_str(" .")?;
                }
                match symbol {
                    SymbolID::T(t) => write!(f, " {}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, " {}", g.nonterminals[n])?,
                }
            }
            if self.dot == production.right().len() {
                f.write_str(" .")?;
            }
            write!(f, ") [{}]", g.terminal_name(self.lookahead))
        })
    }
}

/// A state of the automaton, identified purely by its item-set contents.
/// The ordered set makes equality structural and iteration deterministic.
pub type ItemSet = BTreeSet<LRItem>;

/// A labeled transition edge between two states.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Jump {
    pub from: usize,
    pub symbol: SymbolID,
    pub to: usize,
}

/// The canonical collection of LR(1) states together with its transitions.
#[derive(Debug)]
pub struct Automaton {
    states: InternSet<ItemSet>,
    jumps: Vec<Jump>,
}

impl Automaton {
    /// Build the collection from the augmented grammar's initial item.
    pub fn generate(grammar: &Grammar, first: &FirstFollow) -> Self {
        let builder = Builder { grammar, first };

        let mut initial = ItemSet::new();
        initial.insert(LRItem {
            production: ProductionID::ACCEPT,
            dot: 0,
            lookahead: 0, // end of input
        });

        let mut states: InternSet<ItemSet> = InternSet::new();
        states.insert(builder.closure(initial));
        let mut jumps = Vec::new();
        let symbols = builder.symbols();

        // The state list grows while we walk it; the loop bound is the live
        // count, re-read every iteration, not a snapshot.
        let mut current = 0;
        while current < states.len() {
            let state = states[current].clone();
            for &symbol in &symbols {
                let next = builder.goto(&state, symbol);
                if next.is_empty() {
                    continue;
                }
                // Structurally-equal item sets collapse onto one state.
                let (to, _) = states.insert_full(next);
                jumps.push(Jump {
                    from: current,
                    symbol,
                    to,
                });
            }
            current += 1;
        }

        Self { states, jumps }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (usize, &ItemSet)> + '_ {
        self.states.iter().enumerate()
    }

    pub fn state(&self, index: usize) -> &ItemSet {
        &self.states[index]
    }

    pub fn jumps(&self) -> impl Iterator<Item = &Jump> + '_ {
        self.jumps.iter()
    }

    /// The transition target recorded for `(from, symbol)`, if any.
    pub fn next_state(&self, from: usize, symbol: SymbolID) -> Option<usize> {
        self.jumps
            .iter()
            .find(|jump| jump.from == from && jump.symbol == symbol)
            .map(|jump| jump.to)
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (index, state) in self.states() {
                if index > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:02}", index)?;
                writeln!(f, "## items")?;
                for item in state {
                    writeln!(f, "- {}", item.display(g))?;
                }
                writeln!(f, "## transitions")?;
                for jump in self.jumps.iter().filter(|jump| jump.from == index) {
                    let label = match jump.symbol {
                        SymbolID::T(t) => g.terminals[&t].name(),
                        SymbolID::N(n) => g.nonterminals[&n].name(),
                    };
                    writeln!(f, "- {} => {:02}", label, jump.to)?;
                }
            }
            Ok(())
        })
    }
}

struct Builder<'g> {
    grammar: &'g Grammar,
    first: &'g FirstFollow,
}

impl Builder<'_> {
    /// Every grammar symbol, in the fixed order that determines state
    /// numbering: terminals first, then nonterminals.
    fn symbols(&self) -> Vec<SymbolID> {
        self.grammar
            .terminals
            .keys()
            .map(|id| SymbolID::T(*id))
            .chain(self.grammar.nonterminals.keys().map(|id| SymbolID::N(*id)))
            .collect()
    }

    /// Close `items` under nonterminal expansion: for every item with the
    /// dot before a nonterminal `B`, add `(B := . γ, t)` for each production
    /// of `B` and each `t` in First(β) minus epsilon, where β is the symbol
    /// following `B`. When no such symbol exists, or β derives only epsilon,
    /// the item's own lookahead propagates instead; that fallback is what
    /// makes the items LR(1) rather than LR(0).
    fn closure(&self, mut items: ItemSet) -> ItemSet {
        let mut changed = true;
        while changed {
            changed = false;

            let snapshot: Vec<LRItem> = items.iter().copied().collect();
            for item in snapshot {
                let production = &self.grammar.productions[&item.production];
                let Some(SymbolID::N(b)) = production.right().get(item.dot).copied() else {
                    continue;
                };

                let mut beta_first: Set<u16> = Set::default();
                if let Some(beta) = production.right().get(item.dot + 1) {
                    beta_first.extend(
                        self.first
                            .first(*beta)
                            .iter()
                            .copied()
                            .filter(|&t| t != EPSILON)
                            .map(|t| t as u16),
                    );
                }
                if beta_first.is_empty() {
                    beta_first.insert(item.lookahead);
                }

                for (id, candidate) in &self.grammar.productions {
                    if candidate.left() != b {
                        continue;
                    }
                    for &lookahead in &beta_first {
                        changed |= items.insert(LRItem {
                            production: *id,
                            dot: 0,
                            lookahead,
                        });
                    }
                }
            }
        }
        items
    }

    /// Advance the dot across `symbol`, keeping lookaheads, then close.
    /// An empty result means the state has no transition on `symbol`.
    fn goto(&self, items: &ItemSet, symbol: SymbolID) -> ItemSet {
        let mut next = ItemSet::new();
        for item in items {
            let production = &self.grammar.productions[&item.production];
            if production.right().get(item.dot) == Some(&symbol) {
                next.insert(LRItem {
                    dot: item.dot + 1,
                    ..*item
                });
            }
        }
        if next.is_empty() {
            next
        } else {
            self.closure(next)
        }
    }
}
