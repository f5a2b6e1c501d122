//! Graph visualization: Graphviz DOT, a text listing, and best-effort PNG rendering.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use super::{GraphTopology, END, START};

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("graphviz `dot` not found on PATH: {0}")]
    DotNotFound(#[from] which::Error),
    #[error("write graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("graphviz failed ({status}): {stderr}")]
    Render { status: String, stderr: String },
}

/// Graphviz DOT for the topology. Conditional edges are dashed and labelled.
pub fn generate_dot(topology: &GraphTopology) -> String {
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");
    dot.push_str(&format!(
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];\n",
        START
    ));
    dot.push_str(&format!(
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];\n",
        END
    ));
    for node in &topology.nodes {
        dot.push_str(&format!("  \"{}\";\n", node));
    }
    dot.push('\n');
    for edge in &topology.edges {
        match &edge.condition {
            Some(label) => dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [style=dashed, label=\"{}\"];\n",
                edge.from, edge.to, label
            )),
            None => dot.push_str(&format!("  \"{}\" -> \"{}\";\n", edge.from, edge.to)),
        }
    }
    dot.push_str("}\n");
    dot
}

/// Plain-text listing of nodes and edges.
pub fn generate_text(topology: &GraphTopology) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", topology.nodes.join(", "));
    let _ = writeln!(text, "\nEdges:");
    for edge in &topology.edges {
        match &edge.condition {
            Some(c) => {
                let _ = writeln!(text, "  {} -> {} (if {})", edge.from, edge.to, c);
            }
            None => {
                let _ = writeln!(text, "  {} -> {}", edge.from, edge.to);
            }
        }
    }
    text
}

/// Writes the topology to `path`. A `.dot` path gets the DOT source; any other path is
/// rendered to PNG by piping DOT through the Graphviz `dot` binary.
///
/// Every failure is returned, never panics; callers treat it as a notice.
pub fn render_graph_image(topology: &GraphTopology, path: &Path) -> Result<PathBuf, VisualizationError> {
    let dot = generate_dot(topology);
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("dot")) {
        std::fs::write(path, dot)?;
        return Ok(path.to_path_buf());
    }

    let dot_bin = which::which("dot")?;
    let mut command = Command::new(dot_bin);
    command.arg("-Tpng").arg("-o").arg(path);
    pipe_to_renderer(command, &dot)?;
    Ok(path.to_path_buf())
}

/// Feeds `dot` to the renderer's stdin and always reaps the child. A non-zero exit is
/// reported ahead of a failed write, since a renderer that quits early breaks the pipe.
fn pipe_to_renderer(mut command: Command, dot: &str) -> Result<(), VisualizationError> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(dot.as_bytes()),
        None => Ok(()),
    };
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(VisualizationError::Render {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    written?;
    Ok(())
}
