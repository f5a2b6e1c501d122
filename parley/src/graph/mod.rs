//! Static topology of the chat pipeline and its visualization.
//!
//! There is no execution engine here; `ChatRunner` runs the loop directly. The topology
//! only describes it (for DOT/PNG export and `--graph`).

mod visualization;

pub use visualization::{generate_dot, generate_text, render_graph_image, VisualizationError};

/// Virtual entry node.
pub const START: &str = "__start__";
/// Virtual exit node.
pub const END: &str = "__end__";

/// One edge; `condition` is set for edges chosen by `tools_condition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<String>,
}

impl Edge {
    fn plain(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            condition: None,
        }
    }

    fn conditional(from: &str, to: &str, condition: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            condition: Some(condition.to_string()),
        }
    }
}

/// Nodes (excluding START/END) and edges of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphTopology {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

impl GraphTopology {
    /// `__start__ → chatbot`, then either `chatbot → __end__` (no tools) or the conditional
    /// pair `chatbot → tools | __end__` with `tools → chatbot`.
    pub fn chat(chatbot: &str, tools: Option<&str>) -> Self {
        match tools {
            None => Self {
                nodes: vec![chatbot.to_string()],
                edges: vec![Edge::plain(START, chatbot), Edge::plain(chatbot, END)],
            },
            Some(tools) => Self {
                nodes: vec![chatbot.to_string(), tools.to_string()],
                edges: vec![
                    Edge::plain(START, chatbot),
                    Edge::conditional(chatbot, tools, tools),
                    Edge::conditional(chatbot, END, END),
                    Edge::plain(tools, chatbot),
                ],
            },
        }
    }
}
