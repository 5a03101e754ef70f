use std::{net::IpAddr, path::PathBuf};

use clap::{Args, Parser, ValueEnum};
use eqoracle::Symbol;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Eqoracle {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,
    /// Port to listen on, picked at random between 5000 and 9999 if omitted
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Seed for all random choices
    #[arg(short, long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub maze: MazeArgs,

    /// Symbol used on corridors, chosen at random for each corridor if omitted
    #[arg(long, value_enum)]
    pub tail: Option<Tail>,
    /// File the number of states and exits is written to
    #[arg(long, default_value = "parameters.txt")]
    pub parameters: PathBuf,
    /// Observation table read by a `check` without argument
    #[arg(long, default_value = "learner.json")]
    pub table: PathBuf,
    /// Write the generated maze in DOT format to this file
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "debug")]
    pub verbose: bool,
    /// Turn on debugging information
    #[arg(short, long)]
    pub debug: bool,
}

/// Dimensions of the maze, each one drawn at random if omitted.
#[derive(Args)]
pub struct MazeArgs {
    /// Number of cells per row, between 3 and 12 if omitted
    #[arg(long)]
    pub width: Option<usize>,
    /// Number of rows, between 3 and 6 if omitted
    #[arg(long)]
    pub height: Option<usize>,
    /// Number of holes cut into the lattice, between 3 and width * height if omitted
    #[arg(long)]
    pub holes: Option<usize>,
    /// Number of exits, between 3 and 3 + width * height / 4 if omitted
    #[arg(long)]
    pub exits: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Tail {
    A,
    B,
}

impl From<Tail> for Symbol {
    fn from(value: Tail) -> Self {
        match value {
            Tail::A => Symbol::A,
            Tail::B => Symbol::B,
        }
    }
}
