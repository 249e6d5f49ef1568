//! Integration test suite for jackc.
//!
//! This crate exists only to run integration tests from the `tests/`
//! directory. All actual test code lives in `tests/*.rs` files, exercising
//! the full pipeline (lex, parse, BUILD, ANALYZE, GENERATE) and the driver
//! and CLI layers on top of it — the unit tests inside each crate cover its
//! own phase in isolation, this crate covers them wired together.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p jackc-tests
//! ```
