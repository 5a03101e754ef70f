use itertools::Itertools;

use crate::{maze::Maze, Dfa};

/// Trait that encapsulates the functionality of converting an object
/// into a [graphviz](https://graphviz.org/) representation.
pub trait ToDot {
    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        format!("{} {{\n{}\n{}\n}}\n", self.kind(), self.header(), self.body())
    }

    /// The graph keyword, `digraph` or `graph`.
    fn kind(&self) -> &'static str;

    /// Global attributes.
    fn header(&self) -> String;

    /// Node and edge statements.
    fn body(&self) -> String;
}

impl ToDot for Dfa {
    fn kind(&self) -> &'static str {
        "digraph A"
    }

    fn header(&self) -> String {
        [
            "fontname=\"Helvetica,Arial,sans-serif\"\nrankdir=LR",
            "init [label=\"\", shape=none]",
            "node [shape=circle]",
        ]
        .join("\n")
    }

    fn body(&self) -> String {
        let mut lines = self
            .accepting_states()
            .map(|q| format!("{q} [shape=doublecircle]"))
            .collect_vec();
        lines.push(format!("init -> {}", self.initial()));
        lines.extend(
            self.transitions()
                .map(|(p, sym, q)| format!("{p} -> {q} [label=\"{sym}\"]")),
        );
        lines.join("\n")
    }
}

impl ToDot for Maze {
    fn kind(&self) -> &'static str {
        "graph M"
    }

    fn header(&self) -> String {
        ["layout=neato", "node [shape=point, width=0.1]"].join("\n")
    }

    fn body(&self) -> String {
        let topology = &self.topology;
        let nodes = topology.nodes().map(|node| {
            let color = if node == self.start {
                "green"
            } else if self.exits.contains(&node) {
                "red"
            } else {
                "black"
            };
            let position = topology.position(node).unwrap_or_default();
            format!(
                "{node} [pos=\"{},{}!\", color={color}]",
                position.x, -position.y
            )
        });
        let edges = topology.edges().map(|(a, b)| format!("{a} -- {b}"));
        nodes.chain(edges).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::ToDot;
    use crate::{
        maze::{Maze, MazeConfig},
        tests::single_a,
    };

    #[test]
    fn dfa_to_dot() {
        let dot = single_a().dot_representation();
        assert!(dot.starts_with("digraph A {"));
        assert!(dot.contains("1 [shape=doublecircle]"));
        assert!(!dot.contains("2 [shape=doublecircle]"));
        assert!(dot.contains("init -> 0"));
        assert!(dot.contains(r#"0 -> 1 [label="A"]"#));
        assert!(dot.contains(r#"0 -> 2 [label="B"]"#));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn maze_to_dot() {
        let maze = (0..16)
            .find_map(|seed| {
                Maze::generate(&MazeConfig {
                    width: 4,
                    height: 3,
                    holes: 2,
                    exits: 3,
                    seed,
                })
                .ok()
            })
            .unwrap();
        let dot = maze.dot_representation();
        assert!(dot.starts_with("graph M {"));
        assert!(dot.contains(&format!("{} [pos=", maze.start)));
        assert_eq!(dot.matches("color=green").count(), 1);
        assert_eq!(dot.matches("color=red").count(), maze.exits.len());
        assert_eq!(dot.matches(" -- ").count(), maze.topology.edge_count());
    }
}
