//! Mindmap format
//!
//! Multi-line descriptions are read as an indented outline. Single-line
//! descriptions put the first clause at the root; `Topic: a, b` clauses
//! add a branch with leaves.

use crate::base::{DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•+]|\d+[.)])\s+").expect("list marker regex is valid"));

/// Mindmap node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindNode {
    /// Node text
    pub label: String,
    /// Child topics
    pub children: Vec<MindNode>,
}

impl MindNode {
    fn leaf(label: &str) -> Self {
        Self {
            label: node_label(label),
            children: Vec::new(),
        }
    }

    /// Total nodes in this subtree
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Strip characters that open node shapes
fn node_label(raw: &str) -> String {
    let label: String = raw
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '`'))
        .collect();
    let label = scan::truncate(label.trim().trim_end_matches(['.', ':']).trim(), 50);
    if label.is_empty() {
        "Topic".to_string()
    } else {
        label
    }
}

/// Mindmap handler
#[derive(Debug, Clone, Copy, Default)]
pub struct MindmapHandler;

impl MindmapHandler {
    fn skeleton() -> MindNode {
        MindNode {
            label: "Topic".to_string(),
            children: vec![MindNode::leaf("Idea A"), MindNode::leaf("Idea B")],
        }
    }

    /// Indented outline; the least indented first line is the root
    fn outline(lines: &[&str]) -> MindNode {
        let mut entries: Vec<(usize, String)> = lines
            .iter()
            .map(|line| {
                let indent = line.len() - line.trim_start().len();
                let text = LIST_MARKER.replace(line.trim(), "").into_owned();
                (indent, text)
            })
            .filter(|(_, text)| !text.is_empty())
            .collect();
        if entries.is_empty() {
            return Self::skeleton();
        }

        let (_, root_text) = entries.remove(0);
        let mut root = MindNode::leaf(&root_text);
        // Stack of (indent, path into the tree)
        let mut stack: Vec<(usize, Vec<usize>)> = Vec::new();
        for (indent, text) in entries {
            while stack.last().is_some_and(|(i, _)| *i >= indent) {
                stack.pop();
            }
            let mut path = stack.last().map(|(_, p)| p.clone()).unwrap_or_default();
            let mut parent = &mut root;
            for idx in &path {
                parent = &mut parent.children[*idx];
            }
            parent.children.push(MindNode::leaf(&text));
            path.push(parent.children.len() - 1);
            stack.push((indent, path));
        }
        root
    }

    fn flat(clauses: &[String]) -> MindNode {
        let mut root = MindNode::leaf(&clauses[0]);
        for clause in &clauses[1..] {
            match clause.split_once(':') {
                Some((topic, leaves)) if !leaves.trim().is_empty() => {
                    let mut branch = MindNode::leaf(topic);
                    branch.children = scan::split_list(leaves)
                        .iter()
                        .map(|leaf| MindNode::leaf(leaf))
                        .collect();
                    root.children.push(branch);
                }
                _ => root.children.push(MindNode::leaf(clause)),
            }
        }
        root
    }
}

impl Handler for MindmapHandler {}

impl DiagramFormat for MindmapHandler {
    type Elements = MindNode;

    const KEY: &'static str = "mindmap";
    const HEADER: &'static str = "mindmap";

    fn parse(&self, description: &str) -> MindNode {
        let lines: Vec<&str> = description.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() >= 2 {
            return Self::outline(&lines);
        }
        let clauses = scan::clauses(description);
        if clauses.is_empty() {
            return Self::skeleton();
        }
        Self::flat(&clauses)
    }

    fn render(&self, root: &MindNode, header: &str, _config: &DiagramConfig<'_>) -> String {
        fn walk(node: &MindNode, depth: usize, out: &mut String) {
            out.push('\n');
            out.push_str(&"  ".repeat(depth + 2));
            out.push_str(&node.label);
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }

        let mut out = format!("{header}\n  root(({}))", root.label);
        for child in &root.children {
            walk(child, 0, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::DiagramHandler;
    use artifex_model::AdvancedFeatures;
    use pretty_assertions::assert_eq;

    #[test]
    fn indented_outline() {
        let root = DiagramFormat::parse(
            &MindmapHandler,
            "Project\n  - Goals\n    - Speed\n    - Quality\n  - Risks",
        );
        assert_eq!(root.label, "Project");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(root.count(), 5);
    }

    #[test]
    fn flat_topics_with_leaves() {
        let root = DiagramFormat::parse(&MindmapHandler, "Vacation. Places: beach, mountains. Budget");
        assert_eq!(root.label, "Vacation");
        assert_eq!(root.children[0].label, "Places");
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(root.children[1].label, "Budget");
    }

    #[test]
    fn labels_lose_shape_characters() {
        let root = DiagramFormat::parse(&MindmapHandler, "Core (v2) [draft]");
        assert_eq!(root.label, "Core v2 draft");
    }

    #[test]
    fn render_indents_by_depth() {
        let features = AdvancedFeatures::new();
        let code = MindmapHandler.generate(&DiagramConfig {
            description: "Root\n  A\n    B",
            direction: None,
            features: &features,
        });
        assert_eq!(code, "mindmap\n  root((Root))\n    A\n      B");
    }

    #[test]
    fn empty_yields_skeleton() {
        assert_eq!(DiagramFormat::parse(&MindmapHandler, "").count(), 3);
    }
}
