use std::path::Path;

use tracing::info;

/// Writes the parameters of the current instance for downstream tools: the number of states of
/// the minimal reference automaton and the number of exits of the maze, each on its own line.
pub fn write_parameters<P: AsRef<Path>>(path: P, states: usize, exits: usize) -> std::io::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format!("{states}\n{exits}\n"))?;
    info!("Wrote parameters to {}", path.display());
    Ok(())
}
