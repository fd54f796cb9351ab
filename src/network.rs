// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a transition network.
//!
//! A network is the compiled form of a grammar: each rule owns a sub-graph of
//! states which begins at the rule's start state and ends at its stop state.
//! States are connected by transitions which either match symbols, or are
//! epsilon transitions that consume nothing. Rule transitions enter the
//! sub-graph of another rule and remember the state where to continue once
//! that rule is done.

use std;
use std::fmt;
use std::collections::HashMap;
use std::ops::Index;

use Pretty;
use symbol::{Symbol, MIN_USER_SYMBOL};
use symbol_set::SymbolSet;

/// A transition network.
#[derive(Debug, Clone)]
pub struct Network {
    states: Vec<State>,
    rules: Vec<RuleInfo>,
    max_symbol: Symbol,
    symbol_names: HashMap<Symbol, String>,
}

#[derive(Debug, Clone)]
struct RuleInfo {
    name: String,
    start: StateId,
    stop: StateId,
}

/// A state in the network.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    rule: RuleId,
    kind: StateKind,
    transitions: Vec<Transition>,
}

/// The different kinds of states.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Basic,
    RuleStart,
    BlockStart,
    BlockEnd,
    RuleStop,
}

/// A transition from one state to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    target: StateId,
    kind: TransitionKind,
}

/// The different kinds of transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    /// Consumes nothing.
    Epsilon,
    /// Matches a single symbol.
    Atom(Symbol),
    /// Matches the symbols in an inclusive range.
    Range(Symbol, Symbol),
    /// Matches the symbols in a set.
    Set(SymbolSet),
    /// Matches the symbols of the vocabulary that are not in a set.
    NotSet(SymbolSet),
    /// Matches any symbol of the vocabulary.
    Wildcard,
    /// Enters another rule. The transition's target is the start state of
    /// `rule`, and `follow` is where to continue after the rule is done.
    Rule {
        /// The rule being called.
        rule: RuleId,
        /// The state to continue at after the call.
        follow: StateId,
    },
    /// A semantic predicate guarding the transition.
    Predicate {
        /// The rule containing the predicate.
        rule: RuleId,
        /// The index of the predicate within its rule.
        index: usize,
        /// Whether the predicate refers to the rule's context.
        ctx_dependent: bool,
    },
    /// A precedence predicate of a left-recursive rule.
    Precedence(u32),
    /// An embedded action. Never executed during analysis.
    Action {
        /// The rule containing the action.
        rule: RuleId,
        /// The index of the action within its rule.
        index: usize,
    },
}

/// A unique state identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

/// A unique rule identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

/// An iterator over the states of a network.
pub type StatesIter<'a> = std::slice::Iter<'a, State>;

impl Network {
    /// Create a new empty network whose vocabulary ends at `max_symbol`.
    pub fn new(max_symbol: i32) -> Network {
        Network {
            states: Vec::new(),
            rules: Vec::new(),
            max_symbol: Symbol::from_i32(max_symbol),
            symbol_names: HashMap::new(),
        }
    }

    /// Add a rule.
    ///
    /// This creates the rule's start and stop states.
    pub fn add_rule<S: Into<String>>(&mut self, name: S) -> RuleId {
        let id = RuleId(self.rules.len());
        let start = StateId(self.states.len());
        let stop = StateId(self.states.len() + 1);
        self.rules.push(RuleInfo {
            name: name.into(),
            start: start,
            stop: stop,
        });
        self.push_state(id, StateKind::RuleStart);
        self.push_state(id, StateKind::RuleStop);
        id
    }

    /// Add a state to a rule.
    pub fn add_state(&mut self, rule: RuleId, kind: StateKind) -> StateId {
        if rule.0 >= self.rules.len() {
            panic!("add_state() called for unknown rule {}", rule);
        }
        self.push_state(rule, kind)
    }

    fn push_state(&mut self, rule: RuleId, kind: StateKind) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State {
            id: id,
            rule: rule,
            kind: kind,
            transitions: Vec::new(),
        });
        id
    }

    /// Add a transition from one state to another.
    pub fn add_transition(&mut self, from: StateId, target: StateId, kind: TransitionKind) {
        self.states[from.0].transitions.push(Transition {
            target: target,
            kind: kind,
        });
    }

    /// Add an epsilon transition.
    pub fn epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, to, TransitionKind::Epsilon)
    }

    /// Add a transition matching a single symbol.
    pub fn atom(&mut self, from: StateId, to: StateId, symbol: Symbol) {
        self.add_transition(from, to, TransitionKind::Atom(symbol))
    }

    /// Add a transition matching a set of symbols.
    pub fn set(&mut self, from: StateId, to: StateId, set: SymbolSet) {
        self.add_transition(from, to, TransitionKind::Set(set))
    }

    /// Add a transition matching any symbol not in a set.
    pub fn not_set(&mut self, from: StateId, to: StateId, set: SymbolSet) {
        self.add_transition(from, to, TransitionKind::NotSet(set))
    }

    /// Add a transition matching any symbol.
    pub fn wildcard(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, to, TransitionKind::Wildcard)
    }

    /// Add a transition that calls `rule` and continues at `follow`.
    pub fn call(&mut self, from: StateId, rule: RuleId, follow: StateId) {
        let start = self.rule_start(rule);
        self.add_transition(
            from,
            start,
            TransitionKind::Rule {
                rule: rule,
                follow: follow,
            },
        )
    }

    /// Add a transition guarded by a semantic predicate of the source state's
    /// rule.
    pub fn predicate(&mut self, from: StateId, to: StateId, index: usize, ctx_dependent: bool) {
        let rule = self[from].rule;
        self.add_transition(
            from,
            to,
            TransitionKind::Predicate {
                rule: rule,
                index: index,
                ctx_dependent: ctx_dependent,
            },
        )
    }

    /// Assign a human-readable name to a symbol.
    pub fn name_symbol<S: Into<String>>(&mut self, symbol: Symbol, name: S) {
        self.symbol_names.insert(symbol, name.into());
    }

    /// Get the human-readable name of a symbol, if it has one.
    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        self.symbol_names.get(&symbol).map(|s| s.as_str())
    }

    /// The largest symbol of the vocabulary.
    pub fn max_symbol(&self) -> Symbol {
        self.max_symbol
    }

    /// The set of all grammar symbols, excluding the reserved markers.
    pub fn vocabulary(&self) -> SymbolSet {
        SymbolSet::range(MIN_USER_SYMBOL, self.max_symbol)
    }

    /// The states in this network.
    pub fn states(&self) -> StatesIter {
        self.states.iter()
    }

    /// The number of states in this network.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The number of rules in this network.
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// The name of a rule.
    pub fn rule_name(&self, rule: RuleId) -> &str {
        &self.rules[rule.0].name
    }

    /// The state where a rule begins.
    pub fn rule_start(&self, rule: RuleId) -> StateId {
        self.rules[rule.0].start
    }

    /// The state where a rule ends.
    pub fn rule_stop(&self, rule: RuleId) -> StateId {
        self.rules[rule.0].stop
    }

    /// Check the structural invariants the analyzer relies upon.
    ///
    /// Returns a list of all violations found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        let vocab = (MIN_USER_SYMBOL, self.max_symbol);
        let in_vocab = |s: Symbol| s >= vocab.0 && s <= vocab.1;

        for state in &self.states {
            if state.kind == StateKind::RuleStop && !state.transitions.is_empty() {
                issues.push(format!(
                    "rule stop state {} has {} outgoing transitions",
                    state.id,
                    state.transitions.len()
                ));
            }
            for t in &state.transitions {
                if t.target.0 >= self.states.len() {
                    issues.push(format!(
                        "transition from {} targets unknown state {}",
                        state.id, t.target
                    ));
                    continue;
                }
                match t.kind {
                    TransitionKind::Rule { rule, follow } => {
                        if rule.0 >= self.rules.len() || self.rule_start(rule) != t.target {
                            issues.push(format!(
                                "rule transition from {} to {} does not enter rule {}",
                                state.id, t.target, rule
                            ));
                        }
                        if follow.0 >= self.states.len() {
                            issues.push(format!(
                                "rule transition from {} follows unknown state {}",
                                state.id, follow
                            ));
                        }
                    }
                    TransitionKind::Atom(s) => if !in_vocab(s) {
                        issues.push(format!(
                            "transition from {} matches {} outside the vocabulary",
                            state.id, s
                        ));
                    },
                    TransitionKind::Range(lo, hi) => if !in_vocab(lo) || !in_vocab(hi) {
                        issues.push(format!(
                            "transition from {} matches {}..{} outside the vocabulary",
                            state.id, lo, hi
                        ));
                    },
                    TransitionKind::Set(ref set) | TransitionKind::NotSet(ref set) => {
                        if set.iter().any(|s| !in_vocab(s)) {
                            issues.push(format!(
                                "transition from {} matches {} outside the vocabulary",
                                state.id, set
                            ));
                        }
                    }
                    _ => (),
                }
            }
        }

        for issue in &issues {
            warn!("{}", issue);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

impl Index<StateId> for Network {
    type Output = State;

    fn index(&self, index: StateId) -> &State {
        match self.states.get(index.0) {
            Some(state) => state,
            None => panic!("state {} is not part of the network", index),
        }
    }
}

impl State {
    /// Get the unique identifier of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Get the rule this state belongs to.
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Get the kind of this state.
    pub fn kind(&self) -> StateKind {
        self.kind
    }

    /// Check whether this state ends a rule.
    pub fn is_rule_stop(&self) -> bool {
        self.kind == StateKind::RuleStop
    }

    /// The outgoing transitions of this state.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl Transition {
    /// Create a new transition.
    pub fn new(target: StateId, kind: TransitionKind) -> Transition {
        Transition {
            target: target,
            kind: kind,
        }
    }

    /// The state this transition leads to.
    pub fn target(&self) -> StateId {
        self.target
    }

    /// The kind of this transition.
    pub fn kind(&self) -> &TransitionKind {
        &self.kind
    }

    /// Check whether this transition consumes no symbol.
    pub fn is_epsilon(&self) -> bool {
        match self.kind {
            TransitionKind::Atom(_)
            | TransitionKind::Range(..)
            | TransitionKind::Set(_)
            | TransitionKind::NotSet(_)
            | TransitionKind::Wildcard => false,
            _ => true,
        }
    }

    /// Check whether this transition carries a predicate.
    pub fn is_predicate(&self) -> bool {
        match self.kind {
            TransitionKind::Predicate { .. } | TransitionKind::Precedence(_) => true,
            _ => false,
        }
    }

    /// The symbols matched by this transition, before complementing.
    ///
    /// Returns `None` for epsilon transitions and wildcards.
    pub fn label(&self) -> Option<SymbolSet> {
        match self.kind {
            TransitionKind::Atom(s) => Some(SymbolSet::of(s)),
            TransitionKind::Range(lo, hi) => Some(SymbolSet::range(lo, hi)),
            TransitionKind::Set(ref set) | TransitionKind::NotSet(ref set) => Some(set.clone()),
            _ => None,
        }
    }

    /// Get a pretty printer for this transition.
    pub fn pretty<'a>(&'a self, network: &'a Network) -> Pretty<&'a Network, &'a Self> {
        Pretty::new(network, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Network, &'a Transition> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let net = self.ctx;
        match self.item.kind {
            TransitionKind::Epsilon => write!(f, "epsilon")?,
            TransitionKind::Atom(s) => write!(f, "{}", s.pretty(net))?,
            TransitionKind::Range(lo, hi) => {
                write!(f, "{}..{}", lo.pretty(net), hi.pretty(net))?
            }
            TransitionKind::Set(ref set) => write!(f, "{}", set.pretty(net))?,
            TransitionKind::NotSet(ref set) => write!(f, "~{}", set.pretty(net))?,
            TransitionKind::Wildcard => write!(f, ".")?,
            TransitionKind::Rule { rule, follow } => {
                write!(f, "call {} (follow {})", net.rule_name(rule), follow)?
            }
            TransitionKind::Predicate { rule, index, .. } => {
                write!(f, "pred {}:{}", net.rule_name(rule), index)?
            }
            TransitionKind::Precedence(level) => write!(f, "prec {}", level)?,
            TransitionKind::Action { rule, index } => {
                write!(f, "action {}:{}", net.rule_name(rule), index)?
            }
        }
        write!(f, " -> {}", self.item.target)
    }
}

impl<'a> fmt::Display for Pretty<&'a Network, &'a State> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {:?} ({})",
            self.item.id,
            self.item.kind,
            self.ctx.rule_name(self.item.rule)
        )?;
        for t in &self.item.transitions {
            write!(f, "\n  {}", t.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl StateId {
    /// Create a state id from a usize.
    pub const fn from_usize(id: usize) -> StateId {
        StateId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for the state with this id.
    pub fn pretty(self, network: &Network) -> Pretty<&Network, &State> {
        Pretty::new(network, &network[self])
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl RuleId {
    /// Create a rule id from a usize.
    pub fn from_usize(id: usize) -> RuleId {
        RuleId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
