use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{Dfa, Set, StateIndex, Symbol, Word};

/// Identifies one of the two automata passed to [`equivalent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first automaton.
    Left,
    /// The second automaton.
    Right,
}

/// Outcome of comparing two automata with [`equivalent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    /// Both automata accept the same language.
    Equivalent,
    /// The automata differ, `witness` is accepted by the automaton on `side` only.
    Distinct {
        /// A shortest word in the symmetric difference of the two languages.
        witness: Word,
        /// The automaton that accepts `witness`.
        side: Side,
    },
}

/// A state of the product automaton. `None` stands for the implicit dead state that is entered
/// on a missing transition.
type Pair = (Option<StateIndex>, Option<StateIndex>);

/// Decides whether `left` and `right` accept the same language.
///
/// Explores the pairs of states reachable by the same word in both automata breadth-first,
/// trying `A` before `B`, and stops at the first pair where exactly one state is accepting.
/// The word leading there is therefore a shortest distinguishing word and, among those of the
/// same length, the lexicographically smallest one. A missing transition leads into a
/// rejecting dead state, so a word may still be accepted by one side after the other side got
/// stuck. Every pair is visited at most once.
pub fn equivalent(left: &Dfa, right: &Dfa) -> Equivalence {
    let start: Pair = (Some(left.initial()), Some(right.initial()));
    let mut seen: Set<Pair> = Set::from_iter([start]);
    let mut queue = VecDeque::from([(Word::epsilon(), start)]);

    while let Some((word, (p, q))) = queue.pop_front() {
        let left_accepts = p.is_some_and(|p| left.is_accepting(p));
        let right_accepts = q.is_some_and(|q| right.is_accepting(q));
        if left_accepts != right_accepts {
            let side = if left_accepts { Side::Left } else { Side::Right };
            debug!(
                "Found witness {} accepted by {:?} after exploring {} pairs",
                word,
                side,
                seen.len()
            );
            return Equivalence::Distinct {
                witness: word,
                side,
            };
        }

        for sym in Symbol::ALL {
            let next = (
                p.and_then(|p| left.successor(p, sym)),
                q.and_then(|q| right.successor(q, sym)),
            );
            if next == (None, None) {
                continue;
            }
            if seen.insert(next) {
                trace!("Reached pair {:?} with {}{}", next, word, sym);
                queue.push_back((&word + sym, next));
            }
        }
    }

    debug!("No witness found among {} reachable pairs", seen.len());
    Equivalence::Equivalent
}
