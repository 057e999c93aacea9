use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use turnstile_core::Graph;
use crate::error::DslError;
use crate::parser::Format;

/// Read, parse and validate one definition file
pub fn load_graph_file(path: &Path) -> Result<Graph, DslError> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let graph = crate::parse_graph(&text, format)?;
    debug!(graph_id = %graph.id, path = %path.display(), "Loaded graph definition");
    Ok(graph)
}

/// Load every `*.json`, `*.yaml` and `*.yml` file in `dir`, in file name order.
///
/// Other files are skipped. The first invalid definition aborts the load.
pub fn load_graphs_from_dir(dir: &Path) -> Result<Vec<Graph>, DslError> {
    let entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if Format::from_path(&path).is_ok() {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-definition file");
        }
    }
    paths.sort();

    let graphs = paths
        .iter()
        .map(|path| load_graph_file(path))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = graphs.len(), dir = %dir.display(), "Loaded graph definitions");
    Ok(graphs)
}

fn io_error(path: &Path, err: std::io::Error) -> DslError {
    DslError::IoError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
