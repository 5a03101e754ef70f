use std::collections::VecDeque;

use fastrand::Rng;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{CompileError, Dfa, Map, NodeId, Set, StateIndex, Symbol, Topology};

/// Decides which symbol labels the transition out of a node that has a single unvisited
/// neighbour. Nodes with two unvisited neighbours always use `A` for the first and `B` for the
/// second one.
pub trait TailPolicy {
    /// Picks the symbol for the next single-successor node.
    fn choose(&mut self) -> Symbol;
}

/// A fixed symbol is used for every single-successor node.
impl TailPolicy for Symbol {
    fn choose(&mut self) -> Symbol {
        *self
    }
}

/// Picks the symbol uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomTail(Rng);

impl RandomTail {
    /// Creates a policy drawing from a generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self(Rng::with_seed(seed))
    }
}

impl TailPolicy for RandomTail {
    fn choose(&mut self) -> Symbol {
        if self.0.bool() {
            Symbol::A
        } else {
            Symbol::B
        }
    }
}

/// Compiles `topology` into a [`Dfa`] by a breadth-first traversal from `root`, which becomes
/// state `0`.
///
/// A node counts as gone once it has been visited, so what happens at a node depends on the
/// number of its neighbours that have not been visited yet:
/// - none: the node's state is accepting and has no transitions,
/// - one: a transition labelled by `policy` leads to the neighbour's state,
/// - two: `A` leads to the smaller, `B` to the larger neighbour (by [`NodeId`]).
///
/// States are created when a node is first seen as a neighbour, and each node is processed only
/// once, so cycles of the topology are cut where the traversal meets them. The topology itself
/// is left untouched.
///
/// Fails if `root` is not part of the topology or a node still has more than two unvisited
/// neighbours when it is reached.
pub fn compile<P: TailPolicy>(
    topology: &Topology,
    root: NodeId,
    policy: &mut P,
) -> Result<Dfa, CompileError> {
    if !topology.contains(root) {
        return Err(CompileError::UnknownNode(root));
    }

    let mut dfa = Dfa::new();
    let mut states: Map<NodeId, StateIndex> = Map::default();
    states.insert(root, dfa.initial());
    let mut visited: Set<NodeId> = Set::default();
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            continue;
        }
        let state = states[&node];
        let open = topology
            .neighbours(node)
            .filter(|n| !visited.contains(n))
            .collect_vec();
        trace!("Visiting node {} as state {}, open neighbours {:?}", node, state, open);

        let labelled = match open[..] {
            [] => {
                dfa.set_accepting(state, true);
                vec![]
            }
            [next] => vec![(policy.choose(), next)],
            [first, second] => vec![(Symbol::A, first), (Symbol::B, second)],
            _ => {
                return Err(CompileError::DegreeExceeded {
                    node,
                    degree: open.len(),
                })
            }
        };

        for (sym, next) in labelled {
            let target = *states.entry(next).or_insert_with(|| dfa.add_state());
            dfa.add_transition(state, sym, target);
            queue.push_back(next);
        }
    }

    debug!(
        "Compiled topology of {} nodes into DFA with {} states, {} of them accepting",
        topology.size(),
        dfa.size(),
        dfa.accepting_states().count()
    );
    Ok(dfa)
}
