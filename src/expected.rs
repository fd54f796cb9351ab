// Copyright (c) 2018 Fabian Schuiki

//! Expected symbol computation.
//!
//! Error messages need to state which symbols a parser would have accepted at
//! the point where it failed. This module precomputes the symbols that may
//! appear next within each state's own rule, and combines these tables along
//! a parser's invocation stack to obtain the expected symbols.

use std::ops::Index;

use analyzer::Analyzer;
use context::Context;
use network::{Network, StateId, TransitionKind};
use symbol::{EOF, EPSILON};
use symbol_set::SymbolSet;

/// The symbols that may appear next at every state of a network, without
/// looking beyond the state's rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextSymbols(Vec<SymbolSet>);

impl NextSymbols {
    /// Compute the next symbols for every state of a network.
    pub fn compute(network: &Network) -> NextSymbols {
        let analyzer = Analyzer::new(network);
        let local = Context::empty_local();
        let sets: Vec<SymbolSet> = network
            .states()
            .map(|s| analyzer.follow_set(s.id(), &local))
            .collect();
        debug!("computed next symbols of {} states", sets.len());
        NextSymbols(sets)
    }

    /// The symbols that may appear next at a state. Contains `EPSILON` if the
    /// end of the state's rule can be reached without consuming a symbol.
    pub fn get(&self, state: StateId) -> &SymbolSet {
        &self.0[state.as_usize()]
    }

    /// Compute the symbols a parser expects at `state`.
    ///
    /// `invoking_states` lists the states whose rule transitions led to the
    /// current rule, innermost call first. As long as the end of the current
    /// rule is reachable, the symbols following the respective call are
    /// added. If the end of the outermost rule is reachable, `EOF` is added.
    ///
    /// Panics if one of the invoking states does not begin with a rule
    /// transition.
    pub fn expected(
        &self,
        network: &Network,
        state: StateId,
        invoking_states: &[StateId],
    ) -> SymbolSet {
        let mut following = self.get(state);
        let mut expected = following.clone();
        expected.remove(EPSILON);
        for &invoking in invoking_states {
            if !following.contains(EPSILON) {
                break;
            }
            let follow = match network[invoking].transitions().first().map(|t| t.kind()) {
                Some(&TransitionKind::Rule { follow, .. }) => follow,
                _ => panic!("invoking state {} does not call a rule", invoking),
            };
            following = self.get(follow);
            expected.union_with(following);
            expected.remove(EPSILON);
        }
        if following.contains(EPSILON) {
            expected.insert(EOF);
        }
        expected
    }
}

impl Index<StateId> for NextSymbols {
    type Output = SymbolSet;

    fn index(&self, index: StateId) -> &SymbolSet {
        self.get(index)
    }
}
