//! FIRST/FOLLOW fixed-point computation.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID},
    types::{Map, Set},
};

/// The epsilon sentinel: a FIRST-set member standing for the empty string.
/// It never receives a table column and never leaves this module's sets.
pub const EPSILON: i32 = -1;

/// FIRST and FOLLOW sets over assigned terminal indices.
#[derive(Debug)]
pub struct FirstFollow {
    first: Map<SymbolID, Set<i32>>,
    follow: Map<NonterminalID, Set<i32>>,
}

impl FirstFollow {
    pub fn new(grammar: &Grammar) -> Self {
        let first = first_sets(grammar);
        let follow = follow_sets(grammar, &first);
        Self { first, follow }
    }

    pub fn first(&self, symbol: SymbolID) -> &Set<i32> {
        &self.first[&symbol]
    }

    pub fn follow(&self, nonterminal: NonterminalID) -> &Set<i32> {
        &self.follow[&nonterminal]
    }
}

fn first_sets(grammar: &Grammar) -> Map<SymbolID, Set<i32>> {
    let mut map: Map<SymbolID, Set<i32>> = Map::default();

    // First(t) = {t} for terminals, including the end marker.
    for terminal in grammar.terminals.values() {
        map.insert(
            SymbolID::T(terminal.id()),
            Some(i32::from(terminal.index())).into_iter().collect(),
        );
    }
    for nonterminal in grammar.nonterminals.values() {
        map.insert(SymbolID::N(nonterminal.id()), Set::default());
    }

    // A := ε seeds epsilon directly.
    for production in grammar.productions.values() {
        if production.right().is_empty() {
            map.get_mut(&SymbolID::N(production.left()))
                .unwrap()
                .insert(EPSILON);
        }
    }

    // Iterate until a full pass over the productions changes nothing: scan
    // each right side left to right, union in First(Xi) minus epsilon, and
    // stop at the first symbol that cannot derive epsilon. A scan that falls
    // off the end means every symbol is nullable, so the left side is too.
    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions.values() {
            let mut added: Set<i32> = Set::default();
            let mut nullable = true;
            for symbol in production.right() {
                let first = &map[symbol];
                added.extend(first.iter().copied().filter(|&t| t != EPSILON));
                if !first.contains(&EPSILON) {
                    nullable = false;
                    break;
                }
            }
            if nullable {
                added.insert(EPSILON);
            }

            let left = map.get_mut(&SymbolID::N(production.left())).unwrap();
            for t in added {
                changed |= left.insert(t);
            }
        }
    }

    map
}

fn follow_sets(
    grammar: &Grammar,
    first: &Map<SymbolID, Set<i32>>,
) -> Map<NonterminalID, Set<i32>> {
    let mut map: Map<NonterminalID, Set<i32>> = grammar
        .nonterminals
        .values()
        .map(|n| (n.id(), Set::default()))
        .collect();

    // The end marker follows the augmented start symbol.
    let eoi = i32::from(grammar.terminals[&TerminalID::EOI].index());
    map.get_mut(&NonterminalID::START).unwrap().insert(eoi);

    // Adjacent pairs: Follow(Xi) ⊇ First(Xi+1) \ {ε}.
    for production in grammar.productions.values() {
        for pair in production.right().windows(2) {
            let SymbolID::N(left) = pair[0] else { continue };
            let follow = map.get_mut(&left).unwrap();
            for &t in &first[&pair[1]] {
                if t != EPSILON {
                    follow.insert(t);
                }
            }
        }
    }

    // Follow(Xi) ⊇ Follow(A) for every `A := X1..Xn` where the whole suffix
    // after Xi derives epsilon (or is empty). Iterate to the fixed point.
    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions.values() {
            let right = production.right();
            for (i, symbol) in right.iter().enumerate() {
                let SymbolID::N(n) = *symbol else { continue };
                let nullable_after = right[i + 1..]
                    .iter()
                    .all(|s| first[s].contains(&EPSILON));
                if !nullable_after {
                    continue;
                }

                let from: Vec<i32> = map[&production.left()].iter().copied().collect();
                let follow = map.get_mut(&n).unwrap();
                for t in from {
                    changed |= follow.insert(t);
                }
            }
        }
    }

    map
}
