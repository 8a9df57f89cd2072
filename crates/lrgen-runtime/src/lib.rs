//! Runtime support for the `lrgen` parser generator.
//!
//! The generator emits a [`ParserTables`] value; this crate owns that type
//! together with the table-driven shift-reduce engine that executes it, so
//! that the table layout can never drift between generation and execution.

pub mod engine;
pub mod tables;

pub use crate::{
    engine::{Engine, ParseError, Reduce, TokenStream},
    tables::ParserTables,
};
