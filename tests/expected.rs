// Copyright (c) 2018 Fabian Schuiki
extern crate lookahead;

use lookahead::analyzer::Analyzer;
use lookahead::context::Context;
use lookahead::expected::NextSymbols;
use lookahead::network::{Network, RuleId, StateId, StateKind};
use lookahead::symbol::{Symbol, EOF, EPSILON};
use lookahead::symbol_set::SymbolSet;

const ID: i32 = 1;
const SEMI: i32 = 2;
const ASSIGN: i32 = 3;

fn codes(codes: &[i32]) -> SymbolSet {
    codes.iter().map(|&c| Symbol::from_i32(c)).collect()
}

struct Assignment {
    net: Network,
    s0: StateId,
    a0: StateId,
    a1: StateId,
    b0: StateId,
}

/// s : a ';' ;
/// a : ID b ;
/// b : ('=' ID)? ;
fn assignment() -> Assignment {
    let mut net = Network::new(3);
    net.name_symbol(Symbol::from_i32(ID), "ID");
    net.name_symbol(Symbol::from_i32(SEMI), "';'");
    net.name_symbol(Symbol::from_i32(ASSIGN), "'='");
    let s = net.add_rule("s");
    let a = net.add_rule("a");
    let b = net.add_rule("b");
    let (s0, a0, b0) = (net.rule_start(s), net.rule_start(a), net.rule_start(b));

    let s1 = net.add_state(s, StateKind::Basic);
    net.call(s0, a, s1);
    net.atom(s1, net.rule_stop(s), Symbol::from_i32(SEMI));

    let a1 = net.add_state(a, StateKind::Basic);
    let a2 = net.add_state(a, StateKind::Basic);
    net.atom(a0, a1, Symbol::from_i32(ID));
    net.call(a1, b, a2);
    net.epsilon(a2, net.rule_stop(a));

    let b1 = net.add_state(b, StateKind::Basic);
    net.atom(b0, b1, Symbol::from_i32(ASSIGN));
    net.atom(b1, net.rule_stop(b), Symbol::from_i32(ID));
    net.epsilon(b0, net.rule_stop(b));

    Assignment {
        net: net,
        s0: s0,
        a0: a0,
        a1: a1,
        b0: b0,
    }
}

#[test]
fn next_symbols_stay_within_rule() {
    let g = assignment();
    assert!(g.net.validate().is_ok());
    let next = NextSymbols::compute(&g.net);

    let mut b0 = codes(&[ASSIGN]);
    b0.insert(EPSILON);
    assert_eq!(next[g.b0], b0);
    assert_eq!(next[g.a1], b0);
    assert_eq!(next[g.a0], codes(&[ID]));
    let end: SymbolSet = Some(EPSILON).into_iter().collect();
    for rule in 0..g.net.num_rules() {
        let stop = g.net.rule_stop(RuleId::from_usize(rule));
        assert_eq!(*next.get(stop), end);
    }
}

#[test]
fn expected_follows_invocation_stack() {
    let g = assignment();
    let next = NextSymbols::compute(&g.net);

    let expected = next.expected(&g.net, g.b0, &[g.a1, g.s0]);
    assert_eq!(expected, codes(&[SEMI, ASSIGN]));

    // The full follow set over the same stack agrees.
    let ctx = Context::from_invocation_stack(&g.net, &[g.a1, g.s0]);
    assert_eq!(Analyzer::new(&g.net).follow_set(g.b0, &ctx), expected);
}

#[test]
fn expected_at_bottom_of_stack_includes_eof() {
    let g = assignment();
    let next = NextSymbols::compute(&g.net);

    let mut expected = codes(&[ASSIGN]);
    expected.insert(EOF);
    assert_eq!(next.expected(&g.net, g.b0, &[g.a1]), expected);

    // A state that must consume a symbol never looks at the stack.
    assert_eq!(next.expected(&g.net, g.a0, &[]), codes(&[ID]));
    assert_eq!(next.expected(&g.net, g.a0, &[g.s0]), codes(&[ID]));
}

#[test]
#[should_panic(expected = "does not call a rule")]
fn expected_rejects_non_calling_state() {
    let g = assignment();
    let next = NextSymbols::compute(&g.net);
    next.expected(&g.net, g.b0, &[g.b0]);
}
