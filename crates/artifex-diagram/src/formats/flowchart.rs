//! Flowchart format
//!
//! Each clause becomes a node, consecutive clauses are linked. Clauses that
//! read like questions become decisions; a following `else`/`otherwise`
//! clause hangs off the most recent decision with a `No` edge.

use crate::base::{sanitize_label, DiagramConfig, DiagramFormat, FormatCapabilities, DirectionStyle};
use crate::scan;
use artifex_model::Direction;
use artifex_registry::Handler;
use serde::Serialize;
use std::fmt::Write as _;

/// Node shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    /// `([label])`
    Terminal,
    /// `["label"]`
    Process,
    /// `{"label"}`
    Decision,
}

/// Flowchart node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    /// Sanitized identifier
    pub id: String,
    /// Display label
    pub label: String,
    /// Bracket style
    pub shape: NodeShape,
}

/// Directed edge with optional label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
    /// Optional edge label
    pub label: Option<String>,
}

/// Flowchart structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowGraph {
    /// Nodes in first-mention order
    pub nodes: Vec<FlowNode>,
    /// Edges in description order
    pub edges: Vec<FlowEdge>,
}

const TERMINAL_WORDS: &[&str] = &["start", "begin", "end", "finish", "done", "stop", "complete"];

/// Flowchart handler
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowchartHandler;

impl FlowchartHandler {
    fn shape_of(clause: &str) -> NodeShape {
        let lower = clause.to_lowercase();
        let first = lower.split_whitespace().next().unwrap_or_default();
        if lower.ends_with('?') || ["if", "whether", "check", "is", "does"].contains(&first) {
            NodeShape::Decision
        } else if TERMINAL_WORDS.contains(&first) || TERMINAL_WORDS.contains(&lower.as_str()) {
            NodeShape::Terminal
        } else {
            NodeShape::Process
        }
    }

    fn skeleton() -> FlowGraph {
        let node = |id: &str, label: &str, shape| FlowNode {
            id: id.to_string(),
            label: label.to_string(),
            shape,
        };
        FlowGraph {
            nodes: vec![
                node("A", "Start", NodeShape::Terminal),
                node("B", "Process", NodeShape::Process),
                node("C", "End", NodeShape::Terminal),
            ],
            edges: vec![
                FlowEdge {
                    from: "A".to_string(),
                    to: "B".to_string(),
                    label: None,
                },
                FlowEdge {
                    from: "B".to_string(),
                    to: "C".to_string(),
                    label: None,
                },
            ],
        }
    }
}

impl Handler for FlowchartHandler {}

impl DiagramFormat for FlowchartHandler {
    type Elements = FlowGraph;

    const KEY: &'static str = "flowchart";
    const HEADER: &'static str = "flowchart";

    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::directional(&Direction::ALL, Some(Direction::TD), DirectionStyle::Inline)
    }

    fn parse(&self, description: &str) -> FlowGraph {
        let clauses = scan::clauses(description);
        if clauses.is_empty() {
            return Self::skeleton();
        }

        let mut graph = FlowGraph {
            nodes: Vec::with_capacity(clauses.len()),
            edges: Vec::new(),
        };
        let mut last_decision: Option<String> = None;
        let mut pending_label: Option<&'static str> = None;

        for (idx, clause) in clauses.iter().enumerate() {
            let id = format!("S{}", idx + 1);
            let lower = clause.to_lowercase();
            let is_else = lower.starts_with("else") || lower.starts_with("otherwise");
            let text = if is_else {
                clause
                    .split_once(char::is_whitespace)
                    .map_or(clause.as_str(), |(_, rest)| rest.trim_start_matches(',').trim())
            } else {
                clause.as_str()
            };
            let shape = Self::shape_of(text);

            match (is_else, &last_decision, graph.nodes.last()) {
                (true, Some(decision), _) => graph.edges.push(FlowEdge {
                    from: decision.clone(),
                    to: id.clone(),
                    label: Some("No".to_string()),
                }),
                (_, _, Some(prev)) => graph.edges.push(FlowEdge {
                    from: prev.id.clone(),
                    to: id.clone(),
                    label: pending_label.take().map(str::to_string),
                }),
                _ => {}
            }

            pending_label = None;
            if shape == NodeShape::Decision {
                last_decision = Some(id.clone());
                pending_label = Some("Yes");
            }

            graph.nodes.push(FlowNode {
                id,
                label: scan::truncate(text, 60),
                shape,
            });
        }

        graph
    }

    fn render(&self, graph: &FlowGraph, header: &str, config: &DiagramConfig<'_>) -> String {
        let mut out = String::new();
        if let Some(curve) = config.feature_str("curve") {
            let curve: String = curve.chars().filter(char::is_ascii_alphanumeric).collect();
            if !curve.is_empty() {
                let _ = writeln!(out, "%%{{init: {{'flowchart': {{'curve': '{curve}'}}}}}}%%");
            }
        }
        out.push_str(header);
        for node in &graph.nodes {
            let label = sanitize_label(&node.label);
            let _ = match node.shape {
                NodeShape::Terminal => write!(out, "\n    {}([\"{}\"])", node.id, label),
                NodeShape::Process => write!(out, "\n    {}[\"{}\"]", node.id, label),
                NodeShape::Decision => write!(out, "\n    {}{{\"{}\"}}", node.id, label),
            };
        }
        for edge in &graph.edges {
            let _ = match &edge.label {
                Some(label) => write!(
                    out,
                    "\n    {} -->|{}| {}",
                    edge.from,
                    sanitize_label(label),
                    edge.to
                ),
                None => write!(out, "\n    {} --> {}", edge.from, edge.to),
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::DiagramHandler;
    use artifex_model::AdvancedFeatures;

    fn config<'a>(description: &'a str, features: &'a AdvancedFeatures) -> DiagramConfig<'a> {
        DiagramConfig {
            description,
            direction: None,
            features,
        }
    }

    #[test]
    fn linear_steps_become_chain() {
        let graph = DiagramFormat::parse(&FlowchartHandler, "Open app. Enter credentials. Submit");
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].from, "S1");
        assert_eq!(graph.edges[1].to, "S3");
    }

    #[test]
    fn decision_gets_yes_and_no_edges() {
        let graph = DiagramFormat::parse(
            &FlowchartHandler,
            "Submit form. Is input valid? Save record. Otherwise show error",
        );
        assert_eq!(graph.nodes[1].shape, NodeShape::Decision);
        assert!(graph
            .edges
            .iter()
            .any(|e| e.from == "S2" && e.to == "S3" && e.label.as_deref() == Some("Yes")));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.from == "S2" && e.to == "S4" && e.label.as_deref() == Some("No")));
        assert_eq!(graph.nodes[3].label, "show error");
    }

    #[test]
    fn empty_description_yields_skeleton() {
        let graph = DiagramFormat::parse(&FlowchartHandler, "   ");
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn generate_defaults_to_top_down() {
        let features = AdvancedFeatures::new();
        let code = FlowchartHandler.generate(&config("Start. Work. Finish", &features));
        assert!(code.starts_with("flowchart TD\n"));
        assert!(code.contains("S1([\"Start\"])"));
        assert!(code.contains("S2[\"Work\"]"));
        assert!(code.contains("S1 --> S2"));
    }

    #[test]
    fn generate_honors_direction_and_curve() {
        let mut features = AdvancedFeatures::new();
        features.insert("curve".to_string(), serde_json::json!("basis"));
        let mut cfg = config("A then B", &features);
        cfg.direction = Some(Direction::LR);
        let code = FlowchartHandler.generate(&cfg);
        assert!(code.starts_with("%%{init: {'flowchart': {'curve': 'basis'}}}%%\nflowchart LR"));
    }

    #[test]
    fn labels_are_sanitized() {
        let features = AdvancedFeatures::new();
        let code = FlowchartHandler.generate(&config("Show \"welcome\" banner", &features));
        assert!(code.contains("#quot;welcome#quot;"));
    }
}
