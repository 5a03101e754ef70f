use std::{collections::VecDeque, fmt::Display};

use itertools::Itertools;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use crate::{Set, Symbol, Word};

/// States of a [`Dfa`] are identified by their position, starting from `0`.
pub type StateIndex = usize;

/// A deterministic finite automaton over the alphabet `{A, B}`.
///
/// The transition function is partial: a state may lack a successor for a symbol, in which
/// case every word that would leave the state on that symbol is rejected. There is no
/// implicit sink state. The automaton always has at least one state and an initial state.
#[derive(Clone, PartialEq, Eq)]
pub struct Dfa {
    edges: Vec<[Option<StateIndex>; 2]>,
    accepting: Vec<bool>,
    initial: StateIndex,
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Dfa {
    /// Creates an automaton with the single, rejecting state `0`, which is initial.
    pub fn new() -> Self {
        Self {
            edges: vec![[None; 2]],
            accepting: vec![false],
            initial: 0,
        }
    }

    /// Adds a fresh rejecting state without transitions and returns its index.
    pub fn add_state(&mut self) -> StateIndex {
        self.edges.push([None; 2]);
        self.accepting.push(false);
        self.edges.len() - 1
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all state indices.
    pub fn states(&self) -> std::ops::Range<StateIndex> {
        0..self.size()
    }

    /// The initial state.
    pub fn initial(&self) -> StateIndex {
        self.initial
    }

    /// Makes `state` the initial state.
    ///
    /// # Panics
    /// If `state` does not exist.
    pub fn set_initial(&mut self, state: StateIndex) {
        assert!(state < self.size(), "state {state} does not exist");
        self.initial = state;
    }

    /// Marks `state` as accepting or rejecting.
    ///
    /// # Panics
    /// If `state` does not exist.
    pub fn set_accepting(&mut self, state: StateIndex, accepting: bool) {
        self.accepting[state] = accepting;
    }

    /// Returns true iff `state` exists and is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        self.accepting.get(state).copied().unwrap_or(false)
    }

    /// Iterates over the accepting states in ascending order.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.states().filter(|q| self.accepting[*q])
    }

    /// Inserts the transition `from --sym--> to` unless `from` already has a successor on
    /// `sym`. The first transition written for a pair stays in place, later attempts are
    /// ignored and reported by returning `false`.
    ///
    /// # Panics
    /// If `from` or `to` does not exist.
    pub fn add_transition(&mut self, from: StateIndex, sym: Symbol, to: StateIndex) -> bool {
        assert!(to < self.size(), "state {to} does not exist");
        let slot = &mut self.edges[from][sym.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(to);
        true
    }

    /// The state reached from `state` on `sym`, if there is a transition.
    pub fn successor(&self, state: StateIndex, sym: Symbol) -> Option<StateIndex> {
        self.edges.get(state).and_then(|edges| edges[sym.index()])
    }

    /// Iterates over all transitions as `(source, symbol, target)` triples, ordered by source
    /// and then by symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateIndex, Symbol, StateIndex)> + '_ {
        self.edges.iter().enumerate().flat_map(|(q, edges)| {
            Symbol::ALL
                .into_iter()
                .filter_map(move |sym| edges[sym.index()].map(|p| (q, sym, p)))
        })
    }

    /// Runs `word` from the initial state. Returns `None` as soon as a transition is missing.
    pub fn reached<'a, W>(&self, word: W) -> Option<StateIndex>
    where
        W: IntoIterator<Item = &'a Symbol>,
    {
        word.into_iter()
            .try_fold(self.initial, |q, sym| self.successor(q, *sym))
    }

    /// Returns true iff `word` leads from the initial state to an accepting state.
    pub fn accepts<'a, W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = &'a Symbol>,
    {
        self.reached(word)
            .map(|q| self.is_accepting(q))
            .unwrap_or(false)
    }

    /// Lists the states reachable from the initial state together with their
    /// length-lexicographically minimal access word.
    pub fn reachable_states(&self) -> Vec<(Word, StateIndex)> {
        let mut seen = Set::from_iter([self.initial]);
        let mut queue = VecDeque::from([(Word::epsilon(), self.initial)]);
        let mut out = vec![];

        while let Some((access, q)) = queue.pop_front() {
            for sym in Symbol::ALL {
                if let Some(p) = self.successor(q, sym) {
                    if seen.insert(p) {
                        queue.push_back((&access + sym, p));
                    }
                }
            }
            out.push((access, q));
        }
        out
    }
}

impl std::fmt::Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DFA with {} states, initial {}, accepting {{{}}}, transitions [{}]",
            self.size(),
            self.initial,
            self.accepting_states().join(", "),
            self.transitions()
                .map(|(q, sym, p)| format!("{q}-{sym}->{p}"))
                .join(", ")
        )
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(
            std::iter::once("state".to_string()).chain(Symbol::ALL.iter().map(|s| s.to_string())),
        );

        for q in self.states() {
            let mut name = if self.is_accepting(q) {
                format!("*{q}")
            } else {
                q.to_string()
            };
            if q == self.initial {
                name = name.bold().to_string();
            }
            let targets = Symbol::ALL.iter().map(|sym| {
                self.successor(q, *sym)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string())
            });
            builder.push_record(std::iter::once(name).chain(targets));
        }

        let mut table = builder.build();
        table.with(Style::modern());
        write!(f, "{}", table)
    }
}
