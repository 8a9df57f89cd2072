//! An LR(1) parser-generator core.
//!
//! Given a context-free grammar, this crate computes FIRST/FOLLOW sets,
//! builds the canonical collection of LR(1) item sets, and derives the
//! shift/reduce/goto action table consumed by `lrgen-runtime`'s engine.

pub mod first_follow;
pub mod grammar;
pub mod intern;
pub mod lr1;
pub mod table;
pub mod types;
mod util;

pub use crate::table::{compute, TableError};
