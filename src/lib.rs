//! Membership and equivalence oracle for active learning of finite automata.
//!
//! The crate holds a reference [`Dfa`] over the two-symbol alphabet `{A, B}` and answers
//! the two kinds of queries an L*-style learner asks:
//! - *membership*: is a given [`Word`] accepted by the reference automaton?
//! - *equivalence*: does a hypothesis, given as an [`ObservationTable`], accept the same
//!   language? If not, a shortest distinguishing word is produced.
//!
//! The reference automaton is usually obtained by generating a random [`maze::Maze`] and
//! compiling its topology with [`compile`]. Hypotheses are built with [`synthesize`],
//! both sides are reduced with [`minimize`] and compared by [`equivalent`]. The
//! [`server`] module exposes all of this over a line-based TCP protocol.
#![warn(missing_docs)]

mod alphabet;
pub use alphabet::{Symbol, Word};

mod dfa;
pub use dfa::{Dfa, StateIndex};

mod error;
pub use error::{CompileError, InvalidSymbol, MazeError, TableError};

/// Undirected graphs with node coordinates, the input of the graph compiler.
pub mod topology;
pub use topology::{NodeId, Point, Topology};

/// Random generation of maze-shaped topologies.
pub mod maze;

mod compile;
pub use compile::{compile, RandomTail, TailPolicy};

/// Observation tables and the synthesis of hypothesis automata from them.
pub mod table;
pub use table::{synthesize, Cell, ObservationTable};

mod minimize;
pub use minimize::{minimize, partition_refinement, Partition};

mod equivalence;
pub use equivalence::{equivalent, Equivalence, Side};

mod oracle;
pub use oracle::{Counterexample, DfaOracle, Oracle};

/// Line-oriented TCP interface to an [`Oracle`].
pub mod server;

mod dot;
pub use dot::ToDot;

mod parameters;
pub use parameters::write_parameters;

/// Generation of random automata, used for testing the algorithms on many inputs.
pub mod random;

/// The hash map used throughout the crate.
#[cfg(feature = "ahash")]
pub type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
/// The hash map used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Map<K, V> = std::collections::HashMap<K, V>;

/// The hash set used throughout the crate.
#[cfg(feature = "ahash")]
pub type Set<T> = std::collections::HashSet<T, ahash::RandomState>;
/// The hash set used throughout the crate.
#[cfg(not(feature = "ahash"))]
pub type Set<T> = std::collections::HashSet<T>;

/// Commonly used items, meant to be glob imported.
pub mod prelude {
    pub use super::{
        compile, equivalent, minimize, synthesize, Dfa, DfaOracle, Equivalence, ObservationTable,
        Oracle, Side, StateIndex, Symbol, TailPolicy, ToDot, Word,
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{Dfa, Symbol};

    /// The automaton from the Wikipedia article on DFA minimization, with `a` read as `A`
    /// and `b` as `B`. It has six states, three of which remain after minimization.
    pub fn wiki_dfa() -> Dfa {
        let mut dfa = Dfa::new();
        for _ in 1..6 {
            dfa.add_state();
        }
        for (p, sym, q) in [
            (0, Symbol::A, 1),
            (0, Symbol::B, 2),
            (1, Symbol::A, 0),
            (1, Symbol::B, 3),
            (2, Symbol::A, 4),
            (2, Symbol::B, 5),
            (3, Symbol::A, 4),
            (3, Symbol::B, 5),
            (4, Symbol::A, 4),
            (4, Symbol::B, 5),
            (5, Symbol::A, 5),
            (5, Symbol::B, 5),
        ] {
            dfa.add_transition(p, sym, q);
        }
        for q in [2, 3, 4] {
            dfa.set_accepting(q, true);
        }
        dfa
    }

    /// Accepts exactly the word `A`: state 0 is initial, `0 -A-> 1`, `0 -B-> 2`, only 1 is final.
    pub fn single_a() -> Dfa {
        let mut dfa = Dfa::new();
        let q1 = dfa.add_state();
        let q2 = dfa.add_state();
        dfa.add_transition(0, Symbol::A, q1);
        dfa.add_transition(0, Symbol::B, q2);
        dfa.set_accepting(q1, true);
        dfa
    }
}
