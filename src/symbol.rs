// Copyright (c) 2018 Fabian Schuiki

//! Symbols of a network's vocabulary and the reserved out-of-band markers.
//!
//! Grammar symbols occupy the codes `MIN_USER_SYMBOL..=max_symbol`, where the
//! upper bound is declared by the network. The codes below `MIN_USER_SYMBOL`
//! are reserved for markers which the analyzer places into the same symbol
//! sets as ordinary symbols, such that callers may test for them uniformly.
//! Never assign these codes to grammar symbols.

use std::fmt;

use Pretty;
use network::Network;

/// A symbol code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(i32);

/// Marks that a closure with the empty local context reached the end of a rule
/// or the designated stop state.
pub const EPSILON: Symbol = Symbol(-2);

/// Marks that a closure with a full context exhausted the entire call chain.
pub const EOF: Symbol = Symbol(-1);

/// Marks that an opaque predicate blocked further analysis.
pub const HIT_PRED: Symbol = Symbol(0);

/// The smallest code that may be assigned to a grammar symbol.
pub const MIN_USER_SYMBOL: Symbol = Symbol(1);

/// The smallest code a symbol set can hold.
pub(crate) const MIN_SYMBOL: Symbol = EPSILON;

impl Symbol {
    /// Create a symbol from an i32.
    pub fn from_i32(code: i32) -> Symbol {
        Symbol(code)
    }

    /// Obtain the symbol code as an i32.
    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Check whether this is one of the reserved marker codes.
    pub fn is_reserved(self) -> bool {
        self < MIN_USER_SYMBOL
    }

    /// Get a pretty printer for this symbol.
    pub fn pretty(self, network: &Network) -> Pretty<&Network, Self> {
        Pretty::new(network, self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EPSILON => write!(f, "<epsilon>"),
            EOF => write!(f, "<eof>"),
            HIT_PRED => write!(f, "<pred>"),
            Symbol(code) => write!(f, "{}", code),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Network, Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ctx.symbol_name(self.item) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.item),
        }
    }
}
