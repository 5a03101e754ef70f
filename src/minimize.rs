use tracing::{debug, trace};

use crate::{Dfa, Map, StateIndex, Symbol};

/// A partition of the states of a [`Dfa`] into blocks. Blocks are numbered in the order of
/// their smallest state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    blocks: Vec<Vec<StateIndex>>,
    block_of: Vec<usize>,
}

impl Partition {
    /// Builds the partition in which state `q` belongs to block `block_of[q]`. The block ids
    /// must be numbered in the order of the smallest state of each block.
    fn from_assignment(block_of: Vec<usize>) -> Self {
        let count = block_of.iter().max().map(|m| m + 1).unwrap_or(0);
        let mut blocks = vec![vec![]; count];
        for (q, block) in block_of.iter().enumerate() {
            blocks[*block].push(q);
        }
        Self { blocks, block_of }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true iff there are no blocks, which only happens for an empty set of states.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The blocks, each one sorted in ascending order.
    pub fn blocks(&self) -> &[Vec<StateIndex>] {
        &self.blocks
    }

    /// The block that contains `state`.
    pub fn block_of(&self, state: StateIndex) -> usize {
        self.block_of[state]
    }
}

/// Computes the coarsest partition of the states of `dfa` into behaviourally equivalent
/// blocks. Starting from the split into accepting and rejecting states, blocks are split
/// until all states in a block agree, for every symbol, on the block their successor lies in,
/// where a missing transition counts as a block of its own.
pub fn partition_refinement(dfa: &Dfa) -> Partition {
    let mut block_of: Vec<usize> = dfa.states().map(|q| dfa.is_accepting(q) as usize).collect();
    let mut count = usize::from(dfa.accepting_states().next().is_some())
        + usize::from(dfa.states().any(|q| !dfa.is_accepting(q)));

    loop {
        let mut ids: Map<(usize, [Option<usize>; 2]), usize> = Map::default();
        let refined: Vec<usize> = dfa
            .states()
            .map(|q| {
                let key = (
                    block_of[q],
                    Symbol::ALL.map(|sym| dfa.successor(q, sym).map(|p| block_of[p])),
                );
                let fresh = ids.len();
                *ids.entry(key).or_insert(fresh)
            })
            .collect();
        block_of = refined;

        trace!("Refined into {} blocks", ids.len());
        if ids.len() == count {
            break;
        }
        count = ids.len();
    }

    Partition::from_assignment(block_of)
}

/// Returns the minimal automaton for `dfa`: one state per block of
/// [`partition_refinement`], with transitions, acceptance and the initial state taken from any
/// member of the block. The input is not modified.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let partition = partition_refinement(dfa);

    let mut min = Dfa::new();
    for _ in 1..partition.len() {
        min.add_state();
    }
    for (block, members) in partition.blocks().iter().enumerate() {
        let representative = members[0];
        min.set_accepting(block, dfa.is_accepting(representative));
        for sym in Symbol::ALL {
            if let Some(target) = dfa.successor(representative, sym) {
                min.add_transition(block, sym, partition.block_of(target));
            }
        }
    }
    min.set_initial(partition.block_of(dfa.initial()));

    debug!("Minimized DFA from {} to {} states", dfa.size(), min.size());
    min
}
