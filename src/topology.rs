use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

/// Nodes of a [`Topology`] are identified by the order in which they were added.
pub type NodeId = usize;

/// Position of a node in the plane. Only used for placing new nodes next to existing ones
/// and for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// A point at `distance` from the midpoint of the segment `self`-`other`, in the direction
    /// perpendicular to the segment.
    pub fn beside_segment(&self, other: &Point, distance: f64) -> Point {
        let mid = self.midpoint(other);
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        let length = dx.hypot(dy);
        if length == 0.0 {
            return Point::new(mid.x + distance, mid.y);
        }
        Point::new(mid.x - dy / length * distance, mid.y + dx / length * distance)
    }
}

/// A simple undirected graph whose nodes carry a [`Point`].
///
/// Nodes and neighbours are always iterated in ascending [`NodeId`] order. Removing a node
/// does not free its id, ids are never reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    positions: BTreeMap<NodeId, Point>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    next_id: NodeId,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an isolated node at `position` and returns its id.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.positions.insert(id, position);
        self.adjacency.insert(id, BTreeSet::new());
        id
    }

    /// Connects `a` and `b`. Returns `false` if the edge already existed, if `a == b` or if
    /// one of the nodes is not present.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let inserted = self
            .adjacency
            .get_mut(&a)
            .map(|n| n.insert(b))
            .unwrap_or(false);
        if let Some(n) = self.adjacency.get_mut(&b) {
            n.insert(a);
        }
        inserted
    }

    /// Removes the edge between `a` and `b`, returning whether it existed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let removed = self
            .adjacency
            .get_mut(&a)
            .map(|n| n.remove(&b))
            .unwrap_or(false);
        if let Some(n) = self.adjacency.get_mut(&b) {
            n.remove(&a);
        }
        removed
    }

    /// Removes `node` together with all its edges. Returns the former neighbours of `node`.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<NodeId> {
        self.positions.remove(&node);
        let neighbours = self.adjacency.remove(&node).unwrap_or_default();
        for n in &neighbours {
            if let Some(adjacent) = self.adjacency.get_mut(n) {
                adjacent.remove(&node);
            }
        }
        neighbours.into_iter().collect()
    }

    /// Returns true iff `node` is part of the topology.
    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.contains_key(&node)
    }

    /// Returns true iff `a` and `b` are connected.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// The neighbours of `node` in ascending order, empty if the node is not present.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&node).into_iter().flatten().copied()
    }

    /// Number of neighbours of `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map(BTreeSet::len).unwrap_or(0)
    }

    /// Position of `node`, if present.
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.positions.get(&node).copied()
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.positions.keys().copied()
    }

    /// All edges as pairs `(a, b)` with `a < b`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().flat_map(|(a, neighbours)| {
            neighbours
                .iter()
                .filter(move |b| *b > a)
                .map(move |b| (*a, *b))
        })
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.positions.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// The largest degree of any node, `0` for an empty topology.
    pub fn max_degree(&self) -> usize {
        self.nodes().map(|n| self.degree(n)).max().unwrap_or(0)
    }

    /// Nodes with exactly `degree` neighbours.
    pub fn nodes_with_degree(&self, degree: usize) -> Vec<NodeId> {
        self.nodes().filter(|n| self.degree(*n) == degree).collect_vec()
    }
}
