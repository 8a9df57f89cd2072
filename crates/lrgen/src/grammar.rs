//! Grammar types.

use crate::{intern::InternSet, types::Map, util::display_fn};
use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    /// Reserved terminal symbol meaning the end of input.
    pub const EOI: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}
impl NonterminalID {
    /// Reserved nonterminal for the augmented start symbol.
    pub const START: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}
impl ProductionID {
    /// The augmented `$start := S` production, recognized as acceptance.
    pub const ACCEPT: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// The production index as encoded in the action table: user productions
    /// count from 1, so a reduce action `-index` never collides with the
    /// accept action `0`.
    pub fn index(self) -> u16 {
        self.raw
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

/// How a concrete input token is recognized as a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    /// Matched against the lexer's token-type discriminator.
    Type(String),

    /// Matched against the literal token text.
    Literal(String),
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: String,
    kind: Option<TerminalKind>,
    index: u16,
}
impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the reserved end-of-input terminal.
    pub fn kind(&self) -> Option<&TerminalKind> {
        self.kind.as_ref()
    }

    /// The assigned table column. The end-of-input terminal is 0; user
    /// terminals are contiguous from 1 in declaration order.
    pub fn index(&self) -> u16 {
        self.index
    }
}
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
    index: u16,
}
impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The assigned table column, contiguous after the terminals; the
    /// synthetic `$start` receives the highest index of all symbols.
    pub fn index(&self) -> u16 {
        self.index
    }
}
impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production rule `left := right...` with optional semantic-action text.
#[derive(Debug, Clone)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    code: Option<String>,
}
impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// The right-hand side; empty for an epsilon production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// Semantic-action source text, passed through to the code emitter.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} := ", g.nonterminals[&self.left()])?;
            for (i, symbol) in self.right().iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                match symbol {
                    SymbolID::T(t) => write!(f, "{}", g.terminals[t])?,
                    SymbolID::N(n) => write!(f, "{}", g.nonterminals[n])?,
                }
            }
            Ok(())
        })
    }
}

// Structural equality: left, right pairwise, action text. The assigned id
// deliberately does not participate.
impl PartialEq for Production {
    fn eq(&self, other: &Self) -> bool {
        self.left == other.left && self.right == other.right && self.code == other.code
    }
}
impl Eq for Production {}
impl Hash for Production {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.left.hash(state);
        self.right.hash(state);
        self.code.hash(state);
    }
}

/// Free-form option value attached to a grammar. These are carried through
/// untouched for the code emitter; the generator core never interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Code(String),
}

/// The grammar definition used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub name: Option<String>,
    pub options: Map<String, OptionValue>,
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub start_symbol: NonterminalID,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{} (index={})", terminal, terminal.index())?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{} (index={})", nonterminal, nonterminal.index())?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            writeln!(f, "{}", production.display(self))?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            name: None,
            options: Map::default(),
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: Map::default(),
            names: InternSet::new(),
            seen_productions: InternSet::new(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_production_id: ProductionID::OFFSET,
            _marker: PhantomData,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$end".to_owned(),
                kind: None,
                index: 0,
            },
        );

        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".to_owned(),
                index: 0,
            },
        );

        f(&mut def)?;

        def.end()
    }

    /// Row width of the flattened action table: one past the highest
    /// assigned symbol index.
    pub fn pitch(&self) -> u16 {
        (self.terminals.len() + self.nonterminals.len()) as u16
    }

    /// The assigned table column of a symbol.
    pub fn symbol_index(&self, symbol: SymbolID) -> u16 {
        match symbol {
            SymbolID::T(t) => self.terminals[&t].index(),
            SymbolID::N(n) => self.nonterminals[&n].index(),
        }
    }

    /// The augmented `$start := S` production.
    pub fn accept_production(&self) -> &Production {
        &self.productions[&ProductionID::ACCEPT]
    }

    /// Display name of the terminal occupying the given table column.
    pub fn terminal_name(&self, index: u16) -> &str {
        self.terminals
            .values()
            .find(|t| t.index() == index)
            .map(|t| t.name())
            .unwrap_or("<unknown>")
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef<'def> {
    name: Option<String>,
    options: Map<String, OptionValue>,
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Map<ProductionID, Production>,
    names: InternSet<String>,
    seen_productions: InternSet<(NonterminalID, Vec<SymbolID>, Option<String>)>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_production_id: u16,
    _marker: PhantomData<&'def mut ()>,
}

impl<'def> GrammarDef<'def> {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(
        &mut self,
        name: &str,
        kind: TerminalKind,
    ) -> Result<TerminalID, GrammarDefError> {
        if !verify_ident(name) {
            return Err(GrammarDefError::InvalidName {
                name: name.to_owned(),
            });
        }
        if !self.names.insert(name.to_owned()) {
            return Err(GrammarDefError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }

        let id = TerminalID::new(self.next_terminal_id);
        self.next_terminal_id += 1;

        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
                kind: Some(kind),
                // The table column equals the declaration position; it is
                // re-assigned (to the same value) in `end` after augmentation.
                index: 0,
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        if !verify_ident(name) {
            return Err(GrammarDefError::InvalidName {
                name: name.to_owned(),
            });
        }
        if !self.names.insert(name.to_owned()) {
            return Err(GrammarDefError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }

        let id = NonterminalID::new(self.next_nonterminal_id);
        self.next_nonterminal_id += 1;

        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
                index: 0,
            },
        );

        Ok(id)
    }

    /// Add a production rule to this grammar.
    pub fn production<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        code: Option<&str>,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        let right: Vec<SymbolID> = right.into_iter().collect();
        let code = code.map(str::to_owned);
        if !self
            .seen_productions
            .insert((left, right.clone(), code.clone()))
        {
            return Err(GrammarDefError::DuplicateProduction {
                left: self.nonterminals[&left].name().to_owned(),
            });
        }

        let id = ProductionID::new(self.next_production_id);
        self.next_production_id += 1;
        self.productions.insert(
            id,
            Production {
                id,
                left,
                right,
                code,
            },
        );

        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        self.start.replace(symbol);
        Ok(())
    }

    /// Name this grammar. Consumed by the code emitter, not by the core.
    pub fn name(&mut self, name: &str) {
        self.name.replace(name.to_owned());
    }

    /// Attach a free-form option. Consumed by the code emitter, not by the core.
    pub fn option(&mut self, key: &str, value: OptionValue) {
        self.options.insert(key.to_owned(), value);
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // If no start symbol is specified, the first declared nonterminal is used.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or(GrammarDefError::EmptyNonterminals)?,
        };

        // Augmentation: $start := S, detected as acceptance by the table
        // builder. The $end terminal was reserved at index 0 up front.
        self.productions.insert(
            ProductionID::ACCEPT,
            Production {
                id: ProductionID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
                code: None,
            },
        );

        // Assign the table columns, once, in declaration order: $end 0,
        // user terminals 1..=T, user nonterminals after them, $start last.
        for (position, terminal) in self.terminals.values_mut().enumerate() {
            terminal.index = position as u16;
        }
        let base = self.terminals.len() as u16;
        let count = self.nonterminals.len() as u16;
        for (position, nonterminal) in self.nonterminals.values_mut().enumerate() {
            nonterminal.index = if nonterminal.id == NonterminalID::START {
                base + count - 1
            } else {
                base + position as u16 - 1
            };
        }

        Ok(Grammar {
            name: self.name,
            options: self.options,
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions: self.productions,
            start_symbol: start,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("incorrect symbol name: `{name}'")]
    InvalidName { name: String },

    #[error("the symbol `{name}' has already been declared")]
    DuplicateSymbol { name: String },

    #[error("duplicate production rule for `{left}'")]
    DuplicateProduction { left: String },

    #[error("the grammar declares no nonterminal symbols")]
    EmptyNonterminals,
}

fn verify_ident(s: &str) -> bool {
    if s.is_empty() {
        // The identifier must not be empty.
        return false;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        // A number must not be an identifier.
        return false;
    }

    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !is_ident_start(first) {
        // The identifier must start with XID-Start.
        return false;
    }
    if chars.any(|ch| !is_ident_continue(ch)) {
        // The identifier must continue with XID-Continue.
        return false;
    }

    true
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_start(ch)
}

fn is_ident_continue(ch: char) -> bool {
    unicode_ident::is_xid_continue(ch)
}
