use std::path::PathBuf;

use thiserror::Error;

use crate::NodeId;

/// A character that is not a symbol of the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("'{0}' is not a symbol of the alphabet")]
pub struct InvalidSymbol(pub char);

/// Errors raised while reading an observation table or building a hypothesis from it.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table file could not be read.
    #[error("could not read table file {}: {source}", path.display())]
    Io {
        /// Path of the table file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The table file is not a valid JSON record.
    #[error("invalid table file: {0}")]
    Json(#[from] serde_json::Error),

    /// A prefix or suffix contains a character outside the alphabet.
    #[error("invalid word in table: {0}")]
    Word(#[from] InvalidSymbol),

    /// The table is structurally unusable, e.g. it has no row for the empty prefix or too many
    /// cells.
    #[error("malformed table: {0}")]
    Malformed(String),
}

/// Errors raised when compiling a topology into an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The node to start from is not part of the topology.
    #[error("node {0} is not part of the topology")]
    UnknownNode(NodeId),

    /// A node still had more than two unvisited neighbours when it was reached.
    #[error("node {node} has {degree} unvisited neighbours, at most two are supported")]
    DegreeExceeded {
        /// The offending node.
        node: NodeId,
        /// Number of unvisited neighbours at visit time.
        degree: usize,
    },
}

/// Errors raised by the maze generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Width and height of a maze must both be positive.
    #[error("maze dimensions must be positive, got {width}x{height}")]
    Dimensions {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
    },

    /// No edge between two branching nodes is left to place the start node on.
    #[error("no edge between two branching nodes is left to place the start on")]
    NoStartEdge,
}
