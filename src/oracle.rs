use tracing::{debug, info};

use crate::{equivalent, minimize, Dfa, Equivalence, Side, Word};

/// A word on which a hypothesis and the target language disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    /// The distinguishing word.
    pub word: Word,
    /// The output of the target on `word`. If this is `true`, the hypothesis wrongly rejects
    /// `word`, otherwise it wrongly accepts it.
    pub output: bool,
}

/// The query interface of L*-esque algorithms for learning regular languages. An oracle
/// answers membership queries and checks hypotheses for equivalence with the target language.
pub trait Oracle {
    /// Returns true iff `word` belongs to the target language.
    fn output(&self, word: &Word) -> bool;

    /// Tests the given hypothesis for equivalence, returning `Ok(())` if it accepts exactly
    /// the target language and a [`Counterexample`] otherwise.
    fn equivalence(&self, hypothesis: &Dfa) -> Result<(), Counterexample>;
}

/// An [`Oracle`] whose target language is given by a [`Dfa`]. The minimal form of the
/// automaton is computed once on construction and used for all equivalence queries.
#[derive(Debug, Clone)]
pub struct DfaOracle {
    automaton: Dfa,
    minimal: Dfa,
}

impl DfaOracle {
    /// Creates an oracle for the language of `automaton`.
    pub fn new(automaton: Dfa) -> Self {
        let minimal = minimize(&automaton);
        info!(
            "Reference DFA has {} states, {} after minimization",
            automaton.size(),
            minimal.size()
        );
        Self { automaton, minimal }
    }

    /// The automaton the oracle was created from.
    pub fn automaton(&self) -> &Dfa {
        &self.automaton
    }

    /// The minimal automaton for the target language.
    pub fn minimal(&self) -> &Dfa {
        &self.minimal
    }
}

impl Oracle for DfaOracle {
    fn output(&self, word: &Word) -> bool {
        self.automaton.accepts(word)
    }

    fn equivalence(&self, hypothesis: &Dfa) -> Result<(), Counterexample> {
        let hypothesis = minimize(hypothesis);
        match equivalent(&self.minimal, &hypothesis) {
            Equivalence::Equivalent => Ok(()),
            Equivalence::Distinct { witness, side } => {
                debug!("Hypothesis fails on {}", witness);
                Err(Counterexample {
                    word: witness,
                    output: side == Side::Left,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Counterexample, DfaOracle, Oracle};
    use crate::{
        synthesize,
        tests::{single_a, wiki_dfa},
        Cell, Dfa, ObservationTable, Symbol, Word,
    };

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn membership_queries() {
        let oracle = DfaOracle::new(single_a());
        assert!(oracle.output(&word("A")));
        assert!(!oracle.output(&word("B")));
        assert_eq!(oracle.minimal().size(), 3);
    }

    #[test]
    fn correct_hypothesis_with_more_states() {
        let oracle = DfaOracle::new(single_a());
        let mut hypothesis = single_a();
        // an unreachable copy of the accepting state
        let copy = hypothesis.add_state();
        hypothesis.set_accepting(copy, true);
        assert_eq!(oracle.equivalence(&hypothesis), Ok(()));
    }

    #[test]
    fn counterexamples_carry_the_target_output() {
        let oracle = DfaOracle::new(single_a());

        let empty = Dfa::new();
        assert_eq!(
            oracle.equivalence(&empty),
            Err(Counterexample {
                word: word("A"),
                output: true
            })
        );

        let mut too_big = single_a();
        too_big.set_accepting(2, true);
        assert_eq!(
            oracle.equivalence(&too_big),
            Err(Counterexample {
                word: word("B"),
                output: false
            })
        );
    }

    #[test]
    fn learning_from_a_closed_table() {
        // words with exactly one B, cells are filled by membership queries
        let oracle = DfaOracle::new(wiki_dfa());
        let prefixes: Vec<Word> = ["ε", "B", "BB", "A", "BA", "BBA", "BBB"]
            .into_iter()
            .map(word)
            .collect();
        let suffixes = vec![Word::epsilon(), word("A"), word("B")];
        let cells = prefixes
            .iter()
            .flat_map(|p| {
                suffixes.iter().map(move |s| {
                    let mut w = p.clone();
                    for sym in s {
                        w.push(*sym);
                    }
                    w
                })
            })
            .map(|w| {
                if oracle.output(&w) {
                    Cell::Accept
                } else {
                    Cell::Reject
                }
            })
            .collect();
        let table = ObservationTable::new(prefixes, suffixes, cells);
        let hypothesis = synthesize(&table).unwrap();
        assert_eq!(hypothesis.size(), 3);
        assert_eq!(oracle.equivalence(&hypothesis), Ok(()));
        assert!(hypothesis.accepts(&[Symbol::B, Symbol::A]));
    }
}
