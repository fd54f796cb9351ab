// Copyright (c) 2018 Fabian Schuiki

//! Sets of symbols.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use bit_set::{self, BitSet};

use Pretty;
use network::Network;
use symbol::{Symbol, MIN_SYMBOL};

/// A set of symbols.
///
/// The set may hold grammar symbols as well as the reserved markers, all of
/// which are stored in a single bit set offset by the smallest reserved code.
#[derive(Clone, Default)]
pub struct SymbolSet {
    bits: BitSet,
}

fn index_of(symbol: Symbol) -> usize {
    if symbol < MIN_SYMBOL {
        panic!("symbol {} is below the reserved range", symbol);
    }
    (i64::from(symbol.as_i32()) - i64::from(MIN_SYMBOL.as_i32())) as usize
}

fn symbol_at(index: usize) -> Symbol {
    Symbol::from_i32((index as i64 + i64::from(MIN_SYMBOL.as_i32())) as i32)
}

impl SymbolSet {
    /// Create a new empty set.
    pub fn new() -> SymbolSet {
        SymbolSet { bits: BitSet::new() }
    }

    /// Create a set containing a single symbol.
    pub fn of(symbol: Symbol) -> SymbolSet {
        let mut set = SymbolSet::new();
        set.insert(symbol);
        set
    }

    /// Create a set containing all symbols in the inclusive range `lo..=hi`.
    ///
    /// The set is empty if `hi < lo`.
    pub fn range(lo: Symbol, hi: Symbol) -> SymbolSet {
        let mut set = SymbolSet::new();
        set.insert_range(lo, hi);
        set
    }

    /// Add a symbol to the set. Returns `true` if it was not yet present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        self.bits.insert(index_of(symbol))
    }

    /// Add all symbols in the inclusive range `lo..=hi` to the set.
    pub fn insert_range(&mut self, lo: Symbol, hi: Symbol) {
        if hi < lo {
            return;
        }
        self.bits.reserve_len(index_of(hi) + 1);
        for i in index_of(lo)..index_of(hi) + 1 {
            self.bits.insert(i);
        }
    }

    /// Remove a symbol from the set. Returns `true` if it was present.
    pub fn remove(&mut self, symbol: Symbol) -> bool {
        if symbol < MIN_SYMBOL {
            return false;
        }
        self.bits.remove(index_of(symbol))
    }

    /// Check whether the set contains a symbol.
    pub fn contains(&self, symbol: Symbol) -> bool {
        symbol >= MIN_SYMBOL && self.bits.contains(index_of(symbol))
    }

    /// Add all symbols of another set to this set.
    pub fn union_with(&mut self, other: &SymbolSet) {
        self.bits.union_with(&other.bits);
    }

    /// Compute the symbols in `lo..=hi` that are not in this set.
    pub fn complement(&self, lo: Symbol, hi: Symbol) -> SymbolSet {
        let mut set = SymbolSet::range(lo, hi);
        set.bits.difference_with(&self.bits);
        set
    }

    /// The number of symbols in the set.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get an iterator over the symbols in the set, in ascending order.
    pub fn iter(&self) -> Symbols {
        Symbols(self.bits.iter())
    }

    /// Get the maximal runs of consecutive symbols in the set.
    pub fn intervals(&self) -> Vec<(Symbol, Symbol)> {
        let mut runs: Vec<(Symbol, Symbol)> = Vec::new();
        for symbol in self.iter() {
            match runs.last_mut() {
                Some(run) if run.1.as_i32() + 1 == symbol.as_i32() => {
                    run.1 = symbol;
                    continue;
                }
                _ => (),
            }
            runs.push((symbol, symbol));
        }
        runs
    }

    /// Get a pretty printer for this set.
    pub fn pretty<'a>(&'a self, network: &'a Network) -> Pretty<&'a Network, &'a Self> {
        Pretty::new(network, self)
    }
}

impl PartialEq for SymbolSet {
    fn eq(&self, other: &SymbolSet) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for SymbolSet {}

impl Hash for SymbolSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for symbol in self.iter() {
            symbol.hash(state);
        }
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> SymbolSet {
        let mut set = SymbolSet::new();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = Symbol;
    type IntoIter = Symbols<'a>;

    fn into_iter(self) -> Symbols<'a> {
        self.iter()
    }
}

/// An iterator over the symbols of a set.
pub struct Symbols<'a>(bit_set::Iter<'a, u32>);

impl<'a> Iterator for Symbols<'a> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        self.0.next().map(symbol_at)
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (lo, hi)) in self.intervals().into_iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            if hi == lo {
                write!(f, "{}", lo)?;
            } else {
                write!(f, "{}..{}", lo, hi)?;
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Network, &'a SymbolSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Named symbols are listed one by one, runs only make sense for codes.
        write!(f, "{{")?;
        let mut first = true;
        for (lo, hi) in self.item.intervals() {
            let named = (lo.as_i32()..hi.as_i32() + 1)
                .any(|c| self.ctx.symbol_name(Symbol::from_i32(c)).is_some());
            if named || lo == hi {
                for c in lo.as_i32()..hi.as_i32() + 1 {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}", Symbol::from_i32(c).pretty(self.ctx))?;
                }
            } else {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}..{}", lo, hi)?;
            }
        }
        write!(f, "}}")
    }
}
