use std::collections::BTreeMap;

use fastrand::Rng;
use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::{MazeError, NodeId, Point, Topology};

/// Parameters of a generated maze. The same configuration always yields the same maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeConfig {
    /// Number of cells per row of the initial lattice.
    pub width: usize,
    /// Number of rows of the initial lattice.
    pub height: usize,
    /// How many times a random pair of adjacent nodes is cut out.
    pub holes: usize,
    /// Number of exits the maze should have.
    pub exits: usize,
    /// Seed of the random number generator.
    pub seed: u64,
}

impl MazeConfig {
    /// Draws a configuration with a width between 3 and 12, a height between 3 and 6, between 3
    /// and `width * height` holes and between 3 and `3 + width * height / 4` exits.
    pub fn random(rng: &mut Rng) -> Self {
        let width = rng.usize(3..=12);
        let height = rng.usize(3..=6);
        let cells = width * height;
        Self {
            width,
            height,
            holes: rng.usize(3..=cells),
            exits: rng.usize(3..=3 + cells / 4),
            seed: rng.u64(..),
        }
    }
}

/// A maze-shaped [`Topology`] together with its designated start node and its exits.
///
/// Every node has at most three neighbours, the start node has exactly two. Exits are nodes
/// with a single neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    /// The underlying graph.
    pub topology: Topology,
    /// The node from which the maze is entered.
    pub start: NodeId,
    /// The dead ends of the maze.
    pub exits: Vec<NodeId>,
}

impl Maze {
    /// Generates a maze according to `config`:
    /// 1. build the lattice of [`lattice`],
    /// 2. cut [`MazeConfig::holes`] holes into it,
    /// 3. contract all nodes with exactly two neighbours,
    /// 4. add exits until there are [`MazeConfig::exits`] of them (or no edge between two
    ///    branching nodes is left),
    /// 5. split one more edge between branching nodes, the new node becomes the start.
    pub fn generate(config: &MazeConfig) -> Result<Self, MazeError> {
        if config.width == 0 || config.height == 0 {
            return Err(MazeError::Dimensions {
                width: config.width,
                height: config.height,
            });
        }
        let mut rng = Rng::with_seed(config.seed);

        let mut topology = lattice(config.width, config.height);
        debug!(
            "Built lattice with {} nodes and {} edges",
            topology.size(),
            topology.edge_count()
        );
        make_holes(&mut topology, &mut rng, config.holes);
        remove_double(&mut topology);
        debug!(
            "After holes and contraction {} nodes and {} edges remain",
            topology.size(),
            topology.edge_count()
        );

        let exits = make_exits(&mut topology, &mut rng, config.exits);
        let (a, b) = random_branch_edge(&topology, &mut rng).ok_or(MazeError::NoStartEdge)?;
        let start = split_edge(&mut topology, a, b);
        debug!("Placed start {} between {} and {}", start, a, b);

        Ok(Self {
            topology,
            start,
            exits,
        })
    }
}

/// Builds a `width` x `height` lattice. Each row consists of four layers of nodes: a top layer
/// of `width` nodes, two middle layers of `width + 1` nodes joined by vertical rungs, and a
/// bottom layer of `width` nodes. Top and bottom nodes are joined diagonally to the two middle
/// nodes below respectively above them, and each bottom node is linked to the top node of the
/// next row.
pub fn lattice(width: usize, height: usize) -> Topology {
    let mut topology = Topology::new();
    let mut at: BTreeMap<(usize, usize), NodeId> = BTreeMap::new();
    let mut node = |topology: &mut Topology, x: usize, y: usize| -> NodeId {
        *at.entry((x, y))
            .or_insert_with(|| topology.add_node(Point::new(x as f64, y as f64)))
    };

    for j in 0..height {
        let (top, upper, lower, bottom) = (4 * j, 4 * j + 1, 4 * j + 2, 4 * j + 3);
        for i in 0..=width {
            let u = node(&mut topology, 2 * i, upper);
            let l = node(&mut topology, 2 * i, lower);
            topology.add_edge(u, l);
        }
        for i in 0..width {
            let t = node(&mut topology, 2 * i + 1, top);
            let b = node(&mut topology, 2 * i + 1, bottom);
            let (upper_left, upper_right) = (
                node(&mut topology, 2 * i, upper),
                node(&mut topology, 2 * i + 2, upper),
            );
            let (lower_left, lower_right) = (
                node(&mut topology, 2 * i, lower),
                node(&mut topology, 2 * i + 2, lower),
            );
            topology.add_edge(t, upper_left);
            topology.add_edge(t, upper_right);
            topology.add_edge(b, lower_left);
            topology.add_edge(b, lower_right);
            if j + 1 < height {
                let next = node(&mut topology, 2 * i + 1, top + 4);
                topology.add_edge(b, next);
            }
        }
    }
    topology
}

/// Cuts `count` holes: each time a random node of the original topology is picked and, if it is
/// still present and has a neighbour, removed together with a random neighbour. A removed node
/// that had exactly two other neighbours gets them joined, so paths through it survive.
pub fn make_holes(topology: &mut Topology, rng: &mut Rng, count: usize) {
    let candidates = topology.nodes().collect_vec();
    if candidates.is_empty() {
        return;
    }
    for _ in 0..count {
        let node = candidates[rng.usize(..candidates.len())];
        let neighbours = topology.neighbours(node).collect_vec();
        if neighbours.is_empty() {
            continue;
        }
        let neighbour = neighbours[rng.usize(..neighbours.len())];
        let node_rest = neighbours
            .into_iter()
            .filter(|n| *n != neighbour)
            .collect_vec();
        let neighbour_rest = topology
            .neighbours(neighbour)
            .filter(|n| *n != node)
            .collect_vec();
        trace!("Cutting hole at {} and {}", node, neighbour);

        topology.remove_node(node);
        topology.remove_node(neighbour);
        for rest in [node_rest, neighbour_rest] {
            if let [a, b] = rest[..] {
                topology.add_edge(a, b);
            }
        }
    }
}

/// Contracts every node with exactly two neighbours by joining the neighbours directly, until
/// no such node is left.
pub fn remove_double(topology: &mut Topology) {
    loop {
        let mut changed = false;
        for node in topology.nodes().collect_vec() {
            if topology.degree(node) != 2 {
                continue;
            }
            if let [a, b] = topology.remove_node(node)[..] {
                topology.add_edge(a, b);
            }
            changed = true;
        }
        if !changed {
            break;
        }
    }
}

/// Collects the nodes with a single neighbour as exits and adds new ones until there are
/// `count` of them. A new exit hangs off a fresh node that splits an edge between two
/// branching nodes.
pub fn make_exits(topology: &mut Topology, rng: &mut Rng, count: usize) -> Vec<NodeId> {
    let mut exits = topology.nodes_with_degree(1);
    while exits.len() < count {
        let Some((a, b)) = random_branch_edge(topology, rng) else {
            warn!(
                "Only {} of {} exits could be placed, no edge between branching nodes is left",
                exits.len(),
                count
            );
            break;
        };
        let mid = split_edge(topology, a, b);
        let position = match (topology.position(a), topology.position(b)) {
            (Some(pa), Some(pb)) => pa.beside_segment(&pb, 1.0),
            _ => Point::default(),
        };
        let exit = topology.add_node(position);
        topology.add_edge(mid, exit);
        exits.push(exit);
    }
    exits
}

/// Picks a random edge whose endpoints both have three neighbours.
fn random_branch_edge(topology: &Topology, rng: &mut Rng) -> Option<(NodeId, NodeId)> {
    let candidates = topology
        .edges()
        .filter(|(a, b)| topology.degree(*a) == 3 && topology.degree(*b) == 3)
        .collect_vec();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.usize(..candidates.len())])
    }
}

/// Replaces the edge `a`-`b` by a new node halfway between them, connected to both.
fn split_edge(topology: &mut Topology, a: NodeId, b: NodeId) -> NodeId {
    topology.remove_edge(a, b);
    let position = match (topology.position(a), topology.position(b)) {
        (Some(pa), Some(pb)) => pa.midpoint(&pb),
        _ => Point::default(),
    };
    let mid = topology.add_node(position);
    topology.add_edge(a, mid);
    topology.add_edge(b, mid);
    mid
}
