//! Generator-to-engine tests over a small key/value grammar:
//!
//! ```text
//! object := '{' pairs '}'
//! pairs  := pair
//!         | pairs ',' pair
//! pair   := ID ':' LETTER
//! ```
//!
//! Punctuation is declared by literal text and carried under an unmapped
//! token type, so classification exercises both the type map and the
//! literal-value fallback.

use lrgen::grammar::{Grammar, SymbolID::*, TerminalKind};
use lrgen_runtime::{Engine, ParseError, ParserTables, Reduce, TokenStream};

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    List(Vec<String>),
}

struct Tokens {
    input: Vec<(String, String)>,
    pos: usize,
}

impl Tokens {
    fn lex(pairs: &[(&str, &str)]) -> Self {
        Self {
            input: pairs
                .iter()
                .map(|(kind, text)| (kind.to_string(), text.to_string()))
                .collect(),
            pos: 0,
        }
    }
}

impl TokenStream for Tokens {
    type Value = Value;
    type Kind = String;

    fn kind(&self) -> Option<&Self::Kind> {
        self.input.get(self.pos).map(|(kind, _)| kind)
    }

    fn lexeme(&self) -> Option<&str> {
        self.input.get(self.pos).map(|(_, text)| text.as_str())
    }

    fn value(&mut self) -> Self::Value {
        Value::Text(self.input[self.pos].1.clone())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

#[derive(Debug, Copy, Clone)]
struct Productions {
    object: u16,
    single: u16,
    append: u16,
    pair: u16,
}

struct Reducer {
    productions: Productions,
}

impl Reduce for Reducer {
    type Value = Value;

    fn reduce(&mut self, production: u16, mut args: Vec<Option<Value>>) -> Option<Value> {
        let p = self.productions;
        if production == p.pair {
            // ID ':' LETTER
            let letter = match args.remove(2) {
                Some(Value::Text(text)) => text,
                other => panic!("unexpected pair value: {:?}", other),
            };
            let id = match args.remove(0) {
                Some(Value::Text(text)) => text,
                other => panic!("unexpected pair key: {:?}", other),
            };
            Some(Value::Text(format!("{}:{}", id, letter)))
        } else if production == p.single {
            match args.remove(0) {
                Some(Value::Text(text)) => Some(Value::List(vec![text])),
                other => panic!("unexpected list head: {:?}", other),
            }
        } else if production == p.append {
            // pairs ',' pair
            let tail = match args.remove(2) {
                Some(Value::Text(text)) => text,
                other => panic!("unexpected list tail: {:?}", other),
            };
            match args.remove(0) {
                Some(Value::List(mut items)) => {
                    items.push(tail);
                    Some(Value::List(items))
                }
                other => panic!("unexpected list: {:?}", other),
            }
        } else if production == p.object {
            // '{' pairs '}'
            args.remove(1)
        } else {
            None
        }
    }
}

fn key_value_grammar() -> (Grammar, Productions) {
    let mut productions = Productions {
        object: 0,
        single: 0,
        append: 0,
        pair: 0,
    };

    let grammar = Grammar::define(|g| {
        let lbrace = g.terminal("LBRACE", TerminalKind::Literal("{".to_owned()))?;
        let rbrace = g.terminal("RBRACE", TerminalKind::Literal("}".to_owned()))?;
        let colon = g.terminal("COLON", TerminalKind::Literal(":".to_owned()))?;
        let comma = g.terminal("COMMA", TerminalKind::Literal(",".to_owned()))?;
        let id = g.terminal("ID", TerminalKind::Type("ID".to_owned()))?;
        let letter = g.terminal("LETTER", TerminalKind::Type("LETTER".to_owned()))?;

        let object = g.nonterminal("object")?;
        let pairs = g.nonterminal("pairs")?;
        let pair = g.nonterminal("pair")?;

        g.start_symbol(object)?;
        productions.object = g
            .production(object, [T(lbrace), N(pairs), T(rbrace)], None)?
            .index();
        productions.single = g.production(pairs, [N(pair)], None)?.index();
        productions.append = g
            .production(pairs, [N(pairs), T(comma), N(pair)], None)?
            .index();
        productions.pair = g
            .production(pair, [T(id), T(colon), T(letter)], None)?
            .index();
        Ok(())
    })
    .unwrap();

    (grammar, productions)
}

fn parse(
    tables: &ParserTables,
    productions: Productions,
    tokens: &[(&str, &str)],
) -> Result<Option<Value>, ParseError> {
    let engine = Engine::new(tables, Tokens::lex(tokens), Reducer { productions });
    engine.parse()
}

const INPUT: &[(&str, &str)] = &[
    ("PUNCT", "{"),
    ("ID", "x"),
    ("PUNCT", ":"),
    ("LETTER", "a"),
    ("PUNCT", ","),
    ("ID", "y"),
    ("PUNCT", ":"),
    ("LETTER", "b"),
    ("PUNCT", "}"),
];

#[test]
fn parses_a_key_value_object() -> anyhow::Result<()> {
    trace_init();
    let (grammar, productions) = key_value_grammar();
    let tables = lrgen::compute(&grammar)?;

    let value = parse(&tables, productions, INPUT)?;
    assert_eq!(
        value,
        Some(Value::List(vec!["x:a".to_owned(), "y:b".to_owned()]))
    );
    Ok(())
}

#[test]
fn tables_survive_serialization() -> anyhow::Result<()> {
    trace_init();
    let (grammar, productions) = key_value_grammar();
    let tables = lrgen::compute(&grammar)?;

    let encoded = serde_json::to_string(&tables)?;
    let decoded: ParserTables = serde_json::from_str(&encoded)?;
    assert_eq!(decoded, tables);

    let value = parse(&decoded, productions, INPUT)?;
    assert_eq!(
        value,
        Some(Value::List(vec!["x:a".to_owned(), "y:b".to_owned()]))
    );
    Ok(())
}

#[test]
fn generation_is_deterministic() -> anyhow::Result<()> {
    trace_init();
    let (grammar, _) = key_value_grammar();
    let first = lrgen::compute(&grammar)?;
    let second = lrgen::compute(&grammar)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn reports_the_expected_terminals_on_bad_input() -> anyhow::Result<()> {
    trace_init();
    let (grammar, productions) = key_value_grammar();
    let tables = lrgen::compute(&grammar)?;

    // A comma where a key is required.
    let err = parse(&tables, productions, &[("PUNCT", "{"), ("PUNCT", ",")]).unwrap_err();
    let ParseError::IllegalAction {
        found, expected, ..
    } = err;
    assert_eq!(found, "COMMA");
    assert_eq!(expected, vec!["ID".to_owned()]);
    Ok(())
}

#[test]
fn truncated_input_reports_end_of_input() -> anyhow::Result<()> {
    trace_init();
    let (grammar, productions) = key_value_grammar();
    let tables = lrgen::compute(&grammar)?;

    let err = parse(&tables, productions, &[("PUNCT", "{"), ("ID", "x")]).unwrap_err();
    let ParseError::IllegalAction { found, .. } = err;
    // The token after `x` is exhausted, so classification falls back to EOF;
    // the only legal continuation there is the colon.
    assert_eq!(found, "EOF");
    Ok(())
}
