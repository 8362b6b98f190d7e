//! Query language: lexer, request tree and parser

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Literal, Operation, RequestNode};
pub use parser::{MAX_DEPTH, parse_query};
