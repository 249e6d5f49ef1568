#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jackc-syntax
//!
//! Lexer, token stream, and recursive-descent parser: source text to AST.
//!
//! ## Architecture
//!
//! 1. **Lexer** ([`lexer`]) — a table-driven DFA turning a `.jack` source
//!    file into a [`token::TokenQueue`].
//! 2. **Parser** ([`parser`]) — recursive descent over that queue, producing
//!    a [`ast::Class`] subtree per file. The driver attaches every class
//!    under one [`ast::Program`].
//!
//! This crate has no notion of scopes, types, or code generation — see
//! `jackc-sema` and `jackc-codegen` for those phases. It only knows how to
//! turn text into a tree.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BasicType, Type};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Punct, Token, TokenCategory, TokenQueue, TokenType};
