// Copyright (c) 2018 Fabian Schuiki

//! Lookahead analysis of a transition network.
//!
//! This module computes the symbols that may appear next at a state of the
//! network. The computation is a closure over the epsilon transitions of the
//! network: rule transitions push their follow state onto the context, and
//! reaching the end of a rule pops the context to continue at the caller.
//! Which symbols end up at the boundaries depends on the context the analysis
//! starts with:
//!
//! - With the empty local context, reaching the end of the rule adds
//!   `EPSILON` to the result.
//! - With a full context, reaching the bottom of the call chain adds `EOF` to
//!   the result if requested, or nothing otherwise.
//!
//! Semantic predicates may either be treated as always true, or as opaque, in
//! which case `HIT_PRED` is added wherever one is encountered.

use std::collections::HashSet;
use bit_set::BitSet;

use context::{Context, EMPTY_FULL_RETURN};
use network::{Network, RuleId, StateId, TransitionKind};
use symbol::{EOF, EPSILON, HIT_PRED, MIN_USER_SYMBOL};
use symbol_set::SymbolSet;

/// Options controlling a lookahead closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookOptions {
    /// Treat semantic predicates as always true and continue past them. If
    /// false, `HIT_PRED` is added to the result instead.
    pub see_through_predicates: bool,
    /// Add `EOF` to the result if the bottom of a full context is reached.
    /// Has no effect for the empty local context.
    pub add_end_of_input: bool,
}

impl LookOptions {
    /// The options used to compute the lookahead of decision alternatives:
    /// opaque predicates and no end of input.
    pub fn decision() -> LookOptions {
        LookOptions {
            see_through_predicates: false,
            add_end_of_input: false,
        }
    }
}

impl Default for LookOptions {
    fn default() -> LookOptions {
        LookOptions {
            see_through_predicates: true,
            add_end_of_input: true,
        }
    }
}

/// The state and context pairs already explored by a closure.
#[derive(Debug, Default)]
pub struct Visited(HashSet<(StateId, Context)>);

impl Visited {
    /// Create a new empty set.
    pub fn new() -> Visited {
        Visited(HashSet::new())
    }

    /// Record a pair. Returns `false` if it had already been recorded.
    pub fn insert(&mut self, state: StateId, ctx: &Context) -> bool {
        self.0.insert((state, ctx.clone()))
    }

    /// Check whether a pair has been recorded.
    pub fn contains(&self, state: StateId, ctx: &Context) -> bool {
        self.0.contains(&(state, ctx.clone()))
    }

    /// The number of recorded pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether no pair has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The rules a closure has entered through rule transitions and not yet left.
///
/// A closure never enters a rule that is already active, which keeps left
/// recursion from looping forever.
#[derive(Debug, Default)]
pub struct CalledRules(BitSet);

impl CalledRules {
    /// Create a new empty set.
    pub fn new() -> CalledRules {
        CalledRules(BitSet::new())
    }

    /// Mark a rule as active. Returns `false` if it already was.
    pub fn insert(&mut self, rule: RuleId) -> bool {
        self.0.insert(rule.as_usize())
    }

    /// Mark a rule as inactive. Returns `true` if it was active.
    pub fn remove(&mut self, rule: RuleId) -> bool {
        self.0.remove(rule.as_usize())
    }

    /// Check whether a rule is active.
    pub fn contains(&self, rule: RuleId) -> bool {
        self.0.contains(rule.as_usize())
    }
}

/// A lookahead analyzer for a network.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    network: &'a Network,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer for a network.
    pub fn new(network: &'a Network) -> Analyzer<'a> {
        Analyzer { network: network }
    }

    /// The network being analyzed.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Compute the lookahead of each alternative leaving a state.
    ///
    /// Returns one entry per outgoing transition of `state`, holding the
    /// symbols that may appear when taking that transition. The entry is
    /// `None` if no symbol could be determined, or if the alternative is
    /// guarded by a predicate which would have to be evaluated first.
    pub fn decision_lookahead(&self, state: StateId) -> Vec<Option<SymbolSet>> {
        let s = &self.network[state];
        s.transitions()
            .iter()
            .enumerate()
            .map(|(alt, t)| {
                let mut look = SymbolSet::new();
                self.closure(
                    t.target(),
                    None,
                    &Context::empty_full(),
                    &mut look,
                    &mut Visited::new(),
                    &mut CalledRules::new(),
                    LookOptions::decision(),
                );
                debug!("lookahead of {} alt {}: {}", state, alt, look);
                if look.is_empty() || look.contains(HIT_PRED) {
                    None
                } else {
                    Some(look)
                }
            })
            .collect()
    }

    /// Compute the symbols that may follow a state in a context.
    ///
    /// If `ctx` is the empty local context and the end of the rule containing
    /// `state` is reached, `EPSILON` is added to the result. If `ctx` is a
    /// full context and the end of the outermost rule is reached, `EOF` is
    /// added. Predicates are treated as always true.
    pub fn follow_set(&self, state: StateId, ctx: &Context) -> SymbolSet {
        self.follow_set_within(state, None, ctx)
    }

    /// Compute the symbols that may follow a state in a context, stopping at
    /// an additional state.
    ///
    /// Reaching `stop` is treated like reaching the end of a rule with no
    /// caller: `EPSILON` is added for the empty local context, and `EOF` for
    /// an empty full context. A block end state may be passed as `stop` to
    /// detect whether the end of a sub-construct can be reached without
    /// consuming a symbol.
    pub fn follow_set_within(
        &self,
        state: StateId,
        stop: Option<StateId>,
        ctx: &Context,
    ) -> SymbolSet {
        let mut look = SymbolSet::new();
        self.closure(
            state,
            stop,
            ctx,
            &mut look,
            &mut Visited::new(),
            &mut CalledRules::new(),
            LookOptions::default(),
        );
        look
    }

    /// Add the symbols that may follow a state in a context to `look`.
    ///
    /// This is the primitive the other queries are built upon. `visited` and
    /// `called` guard against epsilon cycles and left recursion respectively;
    /// callers pass fresh, empty instances and should not reuse them across
    /// independent queries.
    pub fn closure(
        &self,
        state: StateId,
        stop: Option<StateId>,
        ctx: &Context,
        look: &mut SymbolSet,
        visited: &mut Visited,
        called: &mut CalledRules,
        options: LookOptions,
    ) {
        if !visited.insert(state, ctx) {
            return;
        }
        trace!("look {} in {}", state, ctx);
        let s = &self.network[state];

        if stop == Some(state) || s.is_rule_stop() {
            if ctx.is_empty_local() {
                look.insert(EPSILON);
                return;
            } else if ctx.is_empty() && options.add_end_of_input {
                look.insert(EOF);
                return;
            }
        }

        // Leave the rule and continue at each of the states it may return to.
        // The rule is no longer active while the caller continues, so the
        // caller may call it again.
        if s.is_rule_stop() {
            let rule = s.rule();
            let removed = called.remove(rule);
            for i in 0..ctx.len() {
                let return_state = ctx.return_state(i);
                if return_state == EMPTY_FULL_RETURN {
                    if options.add_end_of_input {
                        look.insert(EOF);
                    }
                    continue;
                }
                trace!("pop {} to {}", state, return_state);
                self.closure(
                    return_state,
                    stop,
                    ctx.parent(i),
                    look,
                    visited,
                    called,
                    options,
                );
            }
            if removed {
                called.insert(rule);
            }
            return;
        }

        for t in s.transitions() {
            match *t.kind() {
                TransitionKind::Rule { rule, follow } => {
                    if called.contains(rule) {
                        continue;
                    }
                    let child = ctx.push(follow);
                    called.insert(rule);
                    self.closure(t.target(), stop, &child, look, visited, called, options);
                    called.remove(rule);
                }
                TransitionKind::Predicate { .. } | TransitionKind::Precedence(_) => {
                    if options.see_through_predicates {
                        self.closure(t.target(), stop, ctx, look, visited, called, options);
                    } else {
                        look.insert(HIT_PRED);
                    }
                }
                TransitionKind::Epsilon | TransitionKind::Action { .. } => {
                    self.closure(t.target(), stop, ctx, look, visited, called, options);
                }
                TransitionKind::Wildcard => {
                    look.insert_range(MIN_USER_SYMBOL, self.network.max_symbol());
                }
                TransitionKind::Atom(symbol) => {
                    look.insert(symbol);
                }
                TransitionKind::Range(lo, hi) => {
                    look.insert_range(lo, hi);
                }
                TransitionKind::Set(ref set) => {
                    look.union_with(set);
                }
                TransitionKind::NotSet(ref set) => {
                    look.union_with(&set.complement(MIN_USER_SYMBOL, self.network.max_symbol()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network::StateKind;
    use symbol::Symbol;

    fn sym(code: i32) -> Symbol {
        Symbol::from_i32(code)
    }

    #[test]
    fn guards() {
        let mut visited = Visited::new();
        let ctx = Context::empty_full().push(StateId::from_usize(3));
        let s = StateId::from_usize(1);
        assert!(visited.insert(s, &ctx));
        assert!(!visited.insert(s, &Context::empty_full().push(StateId::from_usize(3))));
        assert!(visited.insert(s, &Context::empty_full()));
        assert!(visited.contains(s, &ctx));
        assert_eq!(visited.len(), 2);

        let mut called = CalledRules::new();
        let r = RuleId::from_usize(4);
        assert!(called.insert(r));
        assert!(!called.insert(r));
        assert!(called.contains(r));
        assert!(called.remove(r));
        assert!(!called.contains(r));
    }

    #[test]
    fn options() {
        let d = LookOptions::default();
        assert!(d.see_through_predicates && d.add_end_of_input);
        let d = LookOptions::decision();
        assert!(!d.see_through_predicates && !d.add_end_of_input);
    }

    #[test]
    fn stop_state_halts_closure() {
        // a : (X)? Y ;
        let mut net = Network::new(5);
        let a = net.add_rule("a");
        let (a0, a1) = (net.rule_start(a), net.rule_stop(a));
        let block = net.add_state(a, StateKind::BlockStart);
        let end = net.add_state(a, StateKind::BlockEnd);
        let x = net.add_state(a, StateKind::Basic);
        net.epsilon(a0, block);
        net.atom(block, x, sym(1));
        net.epsilon(x, end);
        net.epsilon(block, end);
        net.atom(end, a1, sym(2));
        let an = Analyzer::new(&net);

        let within = an.follow_set_within(block, Some(end), &Context::empty_local());
        assert_eq!(within, [EPSILON, sym(1)].iter().cloned().collect());
        let full = an.follow_set(block, &Context::empty_local());
        assert_eq!(full, [sym(1), sym(2)].iter().cloned().collect());
        let eof = an.follow_set_within(block, Some(end), &Context::empty_full());
        assert_eq!(eof, [EOF, sym(1)].iter().cloned().collect());
    }

    #[test]
    fn stop_state_without_eof_continues() {
        let mut net = Network::new(5);
        let a = net.add_rule("a");
        let (a0, a1) = (net.rule_start(a), net.rule_stop(a));
        let end = net.add_state(a, StateKind::BlockEnd);
        net.epsilon(a0, end);
        net.atom(end, a1, sym(3));
        let an = Analyzer::new(&net);

        let mut look = SymbolSet::new();
        an.closure(
            a0,
            Some(end),
            &Context::empty_full(),
            &mut look,
            &mut Visited::new(),
            &mut CalledRules::new(),
            LookOptions {
                see_through_predicates: true,
                add_end_of_input: false,
            },
        );
        assert_eq!(look, SymbolSet::of(sym(3)));
    }

    #[test]
    fn precedence_and_action_transitions() {
        let mut net = Network::new(5);
        let a = net.add_rule("a");
        let (a0, a1) = (net.rule_start(a), net.rule_stop(a));
        let p = net.add_state(a, StateKind::Basic);
        let p2 = net.add_state(a, StateKind::Basic);
        let q = net.add_state(a, StateKind::Basic);
        net.epsilon(a0, p);
        net.add_transition(p, p2, TransitionKind::Precedence(3));
        net.atom(p2, a1, sym(4));
        net.add_transition(a0, q, TransitionKind::Action { rule: a, index: 0 });
        net.add_transition(q, a1, TransitionKind::Range(sym(1), sym(2)));
        let an = Analyzer::new(&net);

        let look = an.decision_lookahead(a0);
        assert_eq!(look.len(), 2);
        assert_eq!(look[0], None);
        assert_eq!(look[1], Some([sym(1), sym(2)].iter().cloned().collect()));
        assert_eq!(
            an.follow_set(a0, &Context::empty_local()),
            [sym(1), sym(2), sym(4)].iter().cloned().collect()
        );
    }
}
