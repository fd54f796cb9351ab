// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
extern crate lookahead;
extern crate stderrlog;

use std::process::exit;

use clap::{App, Arg};
use lookahead::analyzer::{Analyzer, CalledRules, LookOptions, Visited};
use lookahead::context::Context;
use lookahead::network::{Network, StateId, StateKind};
use lookahead::symbol::Symbol;
use lookahead::symbol_set::SymbolSet;

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all log messages"),
        )
        .arg(
            Arg::with_name("local")
                .long("local")
                .help("Limit follow sets to the enclosing rule"),
        )
        .arg(
            Arg::with_name("opaque-predicates")
                .long("opaque-predicates")
                .help("Do not look past semantic predicates"),
        )
        .arg(
            Arg::with_name("no-eof")
                .long("no-eof")
                .help("Do not mark the end of input in follow sets"),
        )
        .arg(
            Arg::with_name("STATE")
                .multiple(true)
                .help("States to compute the follow sets of [default: all rule starts]"),
        )
        .get_matches();

    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .quiet(matches.is_present("quiet"))
        .verbosity(matches.occurrences_of("verbosity") as usize)
        .init()
    {
        eprintln!("unable to set up logging: {}", e);
    }

    let net = demo_network();
    if let Err(issues) = net.validate() {
        for issue in issues {
            eprintln!("error: {}", issue);
        }
        exit(1);
    }

    let mut states = Vec::new();
    if let Some(values) = matches.values_of("STATE") {
        for value in values {
            match value.trim_start_matches('s').parse::<usize>() {
                Ok(id) if id < net.num_states() => states.push(StateId::from_usize(id)),
                _ => {
                    eprintln!("error: `{}` is not a state of the network", value);
                    exit(1);
                }
            }
        }
    } else {
        states.extend(net.states().filter(|s| s.kind() == StateKind::RuleStart).map(|s| s.id()));
    }

    let ctx = if matches.is_present("local") {
        Context::empty_local()
    } else {
        Context::empty_full()
    };
    let options = LookOptions {
        see_through_predicates: !matches.is_present("opaque-predicates"),
        add_end_of_input: !matches.is_present("no-eof"),
    };

    println!("network:");
    for state in net.states() {
        println!("{}", state.id().pretty(&net));
    }

    let analyzer = Analyzer::new(&net);
    println!("\ndecisions:");
    for state in net.states().filter(|s| s.transitions().len() > 1) {
        println!("{}:", state.id());
        for (alt, look) in analyzer.decision_lookahead(state.id()).into_iter().enumerate() {
            match look {
                Some(look) => println!("  alt {}: {}", alt, look.pretty(&net)),
                None => println!("  alt {}: unknown", alt),
            }
        }
    }

    println!("\nfollow sets in {}:", ctx);
    for state in states {
        let mut look = SymbolSet::new();
        analyzer.closure(
            state,
            None,
            &ctx,
            &mut look,
            &mut Visited::new(),
            &mut CalledRules::new(),
            options,
        );
        println!("  {}: {}", state, look.pretty(&net));
    }
}

/// Build the network of a small statement grammar.
///
/// ```text
/// stat : expr ';' | ID '=' expr ';' ;
/// expr : expr '+' term | term ;
/// term : (ID | INT) | '(' expr ')' | {p}? . ;
/// ```
fn demo_network() -> Network {
    let mut net = Network::new(7);
    let id = Symbol::from_i32(1);
    let int = Symbol::from_i32(2);
    let plus = Symbol::from_i32(3);
    let lparen = Symbol::from_i32(4);
    let rparen = Symbol::from_i32(5);
    let semi = Symbol::from_i32(6);
    let assign = Symbol::from_i32(7);
    for &(sym, name) in &[
        (id, "ID"),
        (int, "INT"),
        (plus, "'+'"),
        (lparen, "'('"),
        (rparen, "')'"),
        (semi, "';'"),
        (assign, "'='"),
    ] {
        net.name_symbol(sym, name);
    }

    let stat = net.add_rule("stat");
    let expr = net.add_rule("expr");
    let term = net.add_rule("term");

    // stat
    let block = net.add_state(stat, StateKind::BlockStart);
    let end = net.add_state(stat, StateKind::BlockEnd);
    let (start, stop) = (net.rule_start(stat), net.rule_stop(stat));
    net.epsilon(start, block);
    let a1 = net.add_state(stat, StateKind::Basic);
    let a2 = net.add_state(stat, StateKind::Basic);
    net.epsilon(block, a1);
    net.call(a1, expr, a2);
    net.atom(a2, end, semi);
    let b1 = net.add_state(stat, StateKind::Basic);
    let b2 = net.add_state(stat, StateKind::Basic);
    let b3 = net.add_state(stat, StateKind::Basic);
    let b4 = net.add_state(stat, StateKind::Basic);
    net.epsilon(block, b1);
    net.atom(b1, b2, id);
    net.atom(b2, b3, assign);
    net.call(b3, expr, b4);
    net.atom(b4, end, semi);
    net.epsilon(end, stop);

    // expr
    let block = net.add_state(expr, StateKind::BlockStart);
    let end = net.add_state(expr, StateKind::BlockEnd);
    let (start, stop) = (net.rule_start(expr), net.rule_stop(expr));
    net.epsilon(start, block);
    let a1 = net.add_state(expr, StateKind::Basic);
    let a2 = net.add_state(expr, StateKind::Basic);
    let a3 = net.add_state(expr, StateKind::Basic);
    let a4 = net.add_state(expr, StateKind::Basic);
    net.epsilon(block, a1);
    net.call(a1, expr, a2);
    net.atom(a2, a3, plus);
    net.call(a3, term, a4);
    net.epsilon(a4, end);
    let b1 = net.add_state(expr, StateKind::Basic);
    let b2 = net.add_state(expr, StateKind::Basic);
    net.epsilon(block, b1);
    net.call(b1, term, b2);
    net.epsilon(b2, end);
    net.epsilon(end, stop);

    // term
    let block = net.add_state(term, StateKind::BlockStart);
    let end = net.add_state(term, StateKind::BlockEnd);
    let (start, stop) = (net.rule_start(term), net.rule_stop(term));
    net.epsilon(start, block);
    let a1 = net.add_state(term, StateKind::Basic);
    net.epsilon(block, a1);
    net.set(a1, end, SymbolSet::range(id, int));
    let b1 = net.add_state(term, StateKind::Basic);
    let b2 = net.add_state(term, StateKind::Basic);
    let b3 = net.add_state(term, StateKind::Basic);
    net.epsilon(block, b1);
    net.atom(b1, b2, lparen);
    net.call(b2, expr, b3);
    net.atom(b3, end, rparen);
    let c1 = net.add_state(term, StateKind::Basic);
    let c2 = net.add_state(term, StateKind::Basic);
    net.epsilon(block, c1);
    net.predicate(c1, c2, 0, false);
    net.wildcard(c2, end);
    net.epsilon(end, stop);

    net
}
