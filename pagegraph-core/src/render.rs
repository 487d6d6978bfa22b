// Graph output for crawl results

use pagegraph_scanner::Edge;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphFormat {
    #[default]
    Dot,
    Json,
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" => Ok(GraphFormat::Dot),
            "json" => Ok(GraphFormat::Json),
            other => Err(format!("unknown graph format '{}'", other)),
        }
    }
}

/// Graphviz digraph with one quoted `from -> to` statement per edge.
pub fn render_dot(edges: &[Edge]) -> String {
    let mut dot = String::from("digraph G {\n");
    for edge in edges {
        dot.push_str(&format!(
            "\t\"{}\" -> \"{}\"\n",
            escape_dot(&edge.from),
            escape_dot(&edge.to)
        ));
    }
    dot.push_str("}\n");
    dot
}

pub fn render_json(edges: &[Edge]) -> Result<String, serde_json::Error> {
    let graph = serde_json::json!({
        "graph": {
            "generator": "pagegraph",
            "version": env!("CARGO_PKG_VERSION"),
            "edge_count": edges.len(),
            "edges": edges,
        }
    });

    serde_json::to_string_pretty(&graph)
}

pub fn render_graph(edges: &[Edge], format: GraphFormat) -> Result<String, serde_json::Error> {
    match format {
        GraphFormat::Dot => Ok(render_dot(edges)),
        GraphFormat::Json => render_json(edges),
    }
}

pub fn save_graph(content: &str, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

pub fn write_graph(path: &Path, edges: &[Edge], format: GraphFormat) -> io::Result<()> {
    let content = render_graph(edges, format).map_err(io::Error::other)?;
    save_graph(&content, path)
}

/// Renders into an already opened sink, e.g. an output file created before
/// the crawl started.
pub fn write_graph_to<W: Write>(writer: &mut W, edges: &[Edge], format: GraphFormat) -> io::Result<()> {
    let content = render_graph(edges, format).map_err(io::Error::other)?;
    writer.write_all(content.as_bytes())?;
    writer.flush()
}

fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
