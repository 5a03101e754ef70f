use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use clap::Parser;
use eqoracle::{
    compile,
    maze::{Maze, MazeConfig},
    server::{QueryServer, ServerConfig},
    write_parameters, Dfa, DfaOracle, RandomTail, Symbol, ToDot,
};
use fastrand::Rng;
use tracing::{debug, info, warn, Level};

mod cli;
use cli::{Eqoracle, MazeArgs};

/// How often a maze is regenerated with a fresh seed before giving up.
const ATTEMPTS: usize = 16;

fn maze_config(args: &MazeArgs, rng: &mut Rng) -> MazeConfig {
    let random = MazeConfig::random(rng);
    let width = args.width.unwrap_or(random.width);
    let height = args.height.unwrap_or(random.height);
    let cells = width * height;
    MazeConfig {
        width,
        height,
        holes: args
            .holes
            .unwrap_or_else(|| random.holes.min(cells)),
        exits: args.exits.unwrap_or(random.exits),
        seed: random.seed,
    }
}

fn reference(args: &Eqoracle, rng: &mut Rng) -> anyhow::Result<(Maze, Dfa)> {
    for attempt in 1..=ATTEMPTS {
        let config = maze_config(&args.maze, rng);
        debug!("Attempt {} with {:?}", attempt, config);
        let maze = match Maze::generate(&config) {
            Ok(maze) => maze,
            Err(e) => {
                warn!("Could not generate maze: {}", e);
                continue;
            }
        };
        let compiled = match args.tail {
            Some(tail) => compile(&maze.topology, maze.start, &mut Symbol::from(tail)),
            None => compile(&maze.topology, maze.start, &mut RandomTail::with_seed(rng.u64(..))),
        };
        match compiled {
            Ok(dfa) => return Ok((maze, dfa)),
            Err(e) => warn!("Could not compile maze: {}", e),
        }
    }
    Err(anyhow!("no usable maze after {} attempts", ATTEMPTS))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Eqoracle::parse();

    let level = if args.verbose {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("could not install the logger")?;

    let mut rng = match args.seed {
        Some(seed) => Rng::with_seed(seed),
        None => Rng::new(),
    };

    let (maze, dfa) = reference(&args, &mut rng)?;
    info!(
        "Maze has {} nodes and {} exits",
        maze.topology.size(),
        maze.exits.len()
    );
    if let Some(path) = &args.dot {
        std::fs::write(path, maze.dot_representation())
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    let port = args.port.unwrap_or_else(|| rng.u16(5000..10000));
    let server = QueryServer::new(
        DfaOracle::new(dfa),
        ServerConfig {
            addr: SocketAddr::new(args.host, port),
            default_table: args.table.clone(),
        },
    );
    let oracle = server.oracle();
    debug!("Reference automaton\n{}", oracle.automaton());
    write_parameters(&args.parameters, oracle.minimal().size(), maze.exits.len())
        .with_context(|| format!("could not write {}", args.parameters.display()))?;

    tokio::select! {
        result = server.run() => result.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
    }
    Ok(())
}
