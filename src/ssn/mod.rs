// src/ssn/mod.rs

//! The `synchronous_standby_names` grammar: tokenizer, parser, and emitter.

mod emit;
mod lexer;
mod parser;
mod value;

pub use emit::{format_ssn, quote_ident};
pub use parser::parse;
pub use value::{SsnValue, SyncType};
