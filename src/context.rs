// Copyright (c) 2018 Fabian Schuiki

//! Prediction contexts.
//!
//! A context stands in for the call stack of a parser during static analysis.
//! It records the states to return to once the current rule is done, and
//! continues from there with the context of the caller. Contexts are immutable
//! and shared; pushing a return state or merging two contexts allocates new
//! nodes and leaves the existing ones untouched.
//!
//! There are two distinct empty contexts. The *local* empty context marks that
//! the caller is only interested in the current rule, whereas the *full* empty
//! context marks the bottom of the entire call chain.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::slice::Iter;
use std::sync::Arc;
use indexmap::IndexSet;

use network::{Network, StateId, TransitionKind};

/// The return state used within a merged context to mark a path that has
/// already reached the bottom of the call chain.
pub const EMPTY_FULL_RETURN: StateId = StateId::from_usize(::std::usize::MAX);

/// A prediction context.
#[derive(Clone)]
pub struct Context(Arc<Node>);

struct Node {
    kind: NodeKind,
    hash: u64,
}

enum NodeKind {
    EmptyLocal,
    EmptyFull,
    /// Return states sorted in ascending order, each paired with the parent
    /// context at the same position.
    Returns(Vec<StateId>, Vec<Context>),
}

impl Context {
    /// The empty context which limits analysis to the current rule.
    pub fn empty_local() -> Context {
        Context::from_kind(NodeKind::EmptyLocal)
    }

    /// The empty context which marks the bottom of the call chain.
    pub fn empty_full() -> Context {
        Context::from_kind(NodeKind::EmptyFull)
    }

    fn from_kind(kind: NodeKind) -> Context {
        let mut hasher = DefaultHasher::new();
        match kind {
            NodeKind::EmptyLocal => 0u8.hash(&mut hasher),
            NodeKind::EmptyFull => 1u8.hash(&mut hasher),
            NodeKind::Returns(ref states, ref parents) => {
                2u8.hash(&mut hasher);
                for (state, parent) in states.iter().zip(parents.iter()) {
                    state.hash(&mut hasher);
                    parent.0.hash.hash(&mut hasher);
                }
            }
        }
        Context(Arc::new(Node {
            hash: hasher.finish(),
            kind: kind,
        }))
    }

    /// Build a context from return points sorted by return state.
    fn from_entries(entries: Vec<(StateId, Context)>) -> Context {
        if entries.len() == 1 && entries[0].0 == EMPTY_FULL_RETURN {
            return Context::empty_full();
        }
        let (states, parents) = entries.into_iter().unzip();
        Context::from_kind(NodeKind::Returns(states, parents))
    }

    /// Build the full context of a parser's invocation stack.
    ///
    /// `invoking_states` lists the states whose first transition performed
    /// each of the active rule calls, innermost call first. The outermost call
    /// sits on top of the empty full context.
    ///
    /// Panics if one of the states does not begin with a rule transition.
    pub fn from_invocation_stack(network: &Network, invoking_states: &[StateId]) -> Context {
        let mut ctx = Context::empty_full();
        for &state in invoking_states.iter().rev() {
            let follow = match network[state].transitions().first().map(|t| t.kind()) {
                Some(&TransitionKind::Rule { follow, .. }) => follow,
                _ => panic!("invoking state {} does not call a rule", state),
            };
            ctx = ctx.push(follow);
        }
        ctx
    }

    /// Derive the context which returns to `return_state` and then continues
    /// like this context.
    pub fn push(&self, return_state: StateId) -> Context {
        Context::from_kind(NodeKind::Returns(vec![return_state], vec![self.clone()]))
    }

    /// The number of return points in this context.
    ///
    /// Both empty contexts have no return points.
    pub fn len(&self) -> usize {
        match self.0.kind {
            NodeKind::Returns(ref states, _) => states.len(),
            _ => 0,
        }
    }

    /// Check whether this is one of the empty contexts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether this is the empty local context.
    pub fn is_empty_local(&self) -> bool {
        match self.0.kind {
            NodeKind::EmptyLocal => true,
            _ => false,
        }
    }

    /// Check whether this is the empty full context.
    pub fn is_empty_full(&self) -> bool {
        match self.0.kind {
            NodeKind::EmptyFull => true,
            _ => false,
        }
    }

    /// Check whether one of the merged paths of this context has already
    /// reached the bottom of the call chain.
    pub fn has_empty_path(&self) -> bool {
        match self.0.kind {
            NodeKind::Returns(ref states, _) => states.last() == Some(&EMPTY_FULL_RETURN),
            _ => false,
        }
    }

    /// The return state of the `index`-th return point.
    ///
    /// Panics if there is no such return point.
    pub fn return_state(&self, index: usize) -> StateId {
        match self.0.kind {
            NodeKind::Returns(ref states, _) if index < states.len() => states[index],
            _ => panic!("return_state({}) called on context {}", index, self),
        }
    }

    /// The parent context of the `index`-th return point.
    ///
    /// Panics if there is no such return point.
    pub fn parent(&self, index: usize) -> &Context {
        match self.0.kind {
            NodeKind::Returns(_, ref parents) if index < parents.len() => &parents[index],
            _ => panic!("parent({}) called on context {}", index, self),
        }
    }

    /// An iterator over the parent contexts, one per return point.
    pub fn parents(&self) -> Parents {
        match self.0.kind {
            NodeKind::Returns(_, ref parents) => Parents(parents.iter()),
            _ => {
                let none: &[Context] = &[];
                Parents(none.iter())
            }
        }
    }

    /// The return points of this context.
    ///
    /// The empty full context yields a single `EMPTY_FULL_RETURN` point, such
    /// that it can take part in a merge.
    fn entries(&self) -> Vec<(StateId, Context)> {
        match self.0.kind {
            NodeKind::EmptyLocal => vec![],
            NodeKind::EmptyFull => vec![(EMPTY_FULL_RETURN, self.clone())],
            NodeKind::Returns(ref states, ref parents) => states
                .iter()
                .cloned()
                .zip(parents.iter().cloned())
                .collect(),
        }
    }

    /// Merge two contexts into one that represents either of them.
    ///
    /// The empty local context absorbs everything, since it already stands
    /// for any caller. Return points with the same return state have their
    /// parents merged recursively.
    pub fn merge(&self, other: &Context) -> Context {
        if self == other {
            return self.clone();
        }
        if self.is_empty_local() || other.is_empty_local() {
            return Context::empty_local();
        }
        let mut entries: Vec<(StateId, Context)> = self.entries();
        for (state, parent) in other.entries() {
            match entries.binary_search_by_key(&state, |e| e.0) {
                Ok(i) => {
                    let merged = entries[i].1.merge(&parent);
                    entries[i].1 = merged;
                }
                Err(i) => entries.insert(i, (state, parent)),
            }
        }
        Context::from_entries(entries)
    }

    /// Check whether two handles refer to the same shared node.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Context) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.0.hash != other.0.hash {
            return false;
        }
        match (&self.0.kind, &other.0.kind) {
            (&NodeKind::EmptyLocal, &NodeKind::EmptyLocal) => true,
            (&NodeKind::EmptyFull, &NodeKind::EmptyFull) => true,
            (&NodeKind::Returns(ref sa, ref pa), &NodeKind::Returns(ref sb, ref pb)) => {
                sa == sb && pa == pb
            }
            _ => false,
        }
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.kind {
            NodeKind::EmptyLocal => write!(f, "*"),
            NodeKind::EmptyFull => write!(f, "$"),
            NodeKind::Returns(ref states, ref parents) => {
                write!(f, "[")?;
                for (index, (state, parent)) in states.iter().zip(parents.iter()).enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    if *state == EMPTY_FULL_RETURN {
                        write!(f, "$")?;
                    } else {
                        write!(f, "{} {}", state, parent)?;
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// An iterator over the parents of a context.
pub struct Parents<'a>(Iter<'a, Context>);

impl<'a> Iterator for Parents<'a> {
    type Item = &'a Context;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

/// A table of shared contexts.
///
/// Interning a context replaces it and all its ancestors with previously seen
/// structurally equal instances, such that equal contexts share their nodes.
/// The cache requires mutable access; it is meant to be filled while a network
/// and its contexts are prepared, before queries run concurrently.
#[derive(Default)]
pub struct ContextCache {
    contexts: IndexSet<Context>,
}

impl ContextCache {
    /// Create a new empty cache.
    pub fn new() -> ContextCache {
        ContextCache {
            contexts: IndexSet::new(),
        }
    }

    /// Obtain the shared instance of a context.
    pub fn intern(&mut self, ctx: &Context) -> Context {
        if let Some(existing) = self.contexts.get(ctx) {
            return existing.clone();
        }
        let shared = match ctx.0.kind {
            NodeKind::Returns(ref states, ref parents) => {
                let parents = parents.iter().map(|p| self.intern(p)).collect();
                Context::from_kind(NodeKind::Returns(states.clone(), parents))
            }
            _ => ctx.clone(),
        };
        self.contexts.insert(shared.clone());
        shared
    }

    /// Push a return state and intern the result.
    pub fn push(&mut self, ctx: &Context, return_state: StateId) -> Context {
        let parent = self.intern(ctx);
        let child = parent.push(return_state);
        self.intern(&child)
    }

    /// Merge two contexts and intern the result.
    pub fn merge(&mut self, a: &Context, b: &Context) -> Context {
        let merged = a.merge(b);
        self.intern(&merged)
    }

    /// The number of distinct contexts in the cache.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
