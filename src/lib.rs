// Copyright (c) 2018 Fabian Schuiki

//! Lookahead computation over the transition networks of adaptive parsers.
//!
//! Given a state in a compiled transition network and the context of rule
//! invocations that led there, the analyzer determines which symbols may
//! appear next. This serves decision making, expected-symbol diagnostics, and
//! static analysis of a grammar's alternatives.

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod symbol;
pub mod symbol_set;
pub mod network;
pub mod context;
pub mod analyzer;
pub mod expected;

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
