use fastrand::Rng;

use crate::{Dfa, Symbol, Word};

/// Generates a DFA with `size` states. Every transition exists with probability `density` and
/// leads to a uniformly chosen state, every state is accepting with probability one half.
/// State `0` is initial.
pub fn generate_random_dfa(rng: &mut Rng, size: usize, density: f64) -> Dfa {
    let mut dfa = Dfa::new();
    for _ in 1..size.max(1) {
        dfa.add_state();
    }
    for q in dfa.states() {
        for sym in Symbol::ALL {
            if rng.f64() < density {
                let target = rng.usize(..dfa.size());
                dfa.add_transition(q, sym, target);
            }
        }
        dfa.set_accepting(q, rng.bool());
    }
    dfa
}

/// Enumerates all words of length at most `max_length` in length-lexicographic order.
pub fn all_words(max_length: usize) -> Vec<Word> {
    let mut words = vec![Word::epsilon()];
    let mut start = 0;
    for _ in 0..max_length {
        let end = words.len();
        for index in start..end {
            for sym in Symbol::ALL {
                let extended = &words[index] + sym;
                words.push(extended);
            }
        }
        start = end;
    }
    words
}

#[cfg(test)]
mod tests {
    use fastrand::Rng;
    use pretty_assertions::assert_eq;

    use super::{all_words, generate_random_dfa};

    #[test]
    fn word_enumeration() {
        let words = all_words(2);
        assert_eq!(
            words.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            vec!["ε", "A", "B", "AA", "AB", "BA", "BB"]
        );
        assert_eq!(all_words(5).len(), 63);
    }

    #[test]
    fn generated_dfas_have_the_requested_size() {
        let mut rng = Rng::with_seed(1);
        for size in 1..10 {
            let dfa = generate_random_dfa(&mut rng, size, 0.8);
            assert_eq!(dfa.size(), size);
            assert!(dfa.transitions().count() <= 2 * size);
        }
        let complete = generate_random_dfa(&mut rng, 4, 1.0);
        assert_eq!(complete.transitions().count(), 8);
    }
}
