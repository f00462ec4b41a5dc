//! Git graph format
//!
//! Operations are replayed against a small branch model while parsing so
//! the emitted graph never checks out or merges a branch the grammar would
//! reject.

use crate::base::{DiagramConfig, DiagramFormat, DirectionStyle, FormatCapabilities};
use crate::scan;
use artifex_model::Direction;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

const MAIN: &str = "main";

static MERGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmerge\s+(?:the\s+)?(?:branch\s+)?(?P<name>[\w\-/.]+)(?:\s+(?:into|to|back into)\s+(?:the\s+)?(?P<into>[\w\-/.]+))?")
        .expect("merge regex is valid")
});

static CHECKOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:checkout|check out|switch(?: back)? to|go back to|return to)\s+(?:the\s+)?(?:branch\s+)?(?P<name>[\w\-/.]+)")
        .expect("checkout regex is valid")
});

static BRANCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bbranch(?:\s+(?:called|named))?\s+(?P<name>[\w\-/.]+)|\b(?P<prefix>[\w\-/.]+)\s+branch\b")
        .expect("branch regex is valid")
});

static COMMIT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:and\s+)?(?:commit|add|make a commit)(?:\s+(?:to|on)\s+\w+)?\s*[:\-]?\s*")
        .expect("commit prefix regex is valid")
});

/// Replayed git operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum GitOp {
    /// `commit id: "<id>"`
    Commit(String),
    /// `branch <name>` (also checks it out)
    Branch(String),
    /// `checkout <name>`
    Checkout(String),
    /// `merge <name>`
    Merge(String),
}

/// Git graph structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitHistory {
    /// Operations in replay order
    pub ops: Vec<GitOp>,
}

/// Branch bookkeeping used while replaying operations
struct Repo {
    ops: Vec<GitOp>,
    current: String,
    /// Commits made on each branch since it was created or last merged
    ahead: HashMap<String, usize>,
    commits: usize,
}

impl Repo {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            current: MAIN.to_string(),
            ahead: HashMap::from([(MAIN.to_string(), 0)]),
            commits: 0,
        }
    }

    fn commit(&mut self, message: &str) {
        self.commits += 1;
        let message: String = message
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
            .collect();
        let message = scan::truncate(&message, 30);
        let id = if message.is_empty() {
            format!("c{}", self.commits)
        } else {
            format!("c{} {message}", self.commits)
        };
        *self.ahead.entry(self.current.clone()).or_default() += 1;
        self.ops.push(GitOp::Commit(id));
    }

    fn ensure_commit(&mut self) {
        if self.commits == 0 {
            self.commit("Initial commit");
        }
    }

    fn branch(&mut self, name: &str) {
        if self.ahead.contains_key(name) {
            self.checkout(name);
            return;
        }
        self.ensure_commit();
        self.ahead.insert(name.to_string(), 0);
        self.current = name.to_string();
        self.ops.push(GitOp::Branch(name.to_string()));
    }

    fn checkout(&mut self, name: &str) {
        if !self.ahead.contains_key(name) {
            self.branch(name);
            return;
        }
        if self.current != name {
            self.current = name.to_string();
            self.ops.push(GitOp::Checkout(name.to_string()));
        }
    }

    fn merge(&mut self, name: &str, into: Option<&str>) {
        if let Some(into) = into.filter(|i| self.ahead.contains_key(*i)) {
            self.checkout(into);
        }
        let ahead = self.ahead.get(name).copied();
        match ahead {
            Some(n) if n > 0 && name != self.current => {
                self.ahead.insert(name.to_string(), 0);
                self.commits += 1;
                *self.ahead.entry(self.current.clone()).or_default() += 1;
                self.ops.push(GitOp::Merge(name.to_string()));
            }
            _ => tracing::debug!(branch = name, "skipping merge the graph would reject"),
        }
    }
}

fn branch_name(raw: &str) -> String {
    let name: String = raw
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if name.is_empty() {
        "branch".to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Git graph handler
#[derive(Debug, Clone, Copy, Default)]
pub struct GitGraphHandler;

impl GitGraphHandler {
    fn skeleton() -> GitHistory {
        let mut repo = Repo::new();
        repo.commit("Initial commit");
        repo.branch("develop");
        repo.commit("Add feature");
        repo.checkout(MAIN);
        repo.merge("develop", None);
        GitHistory { ops: repo.ops }
    }

    fn apply(repo: &mut Repo, clause: &str) {
        if let Some(caps) = MERGE.captures(clause) {
            let into = caps.name("into").map(|m| branch_name(m.as_str()));
            repo.merge(&branch_name(&caps["name"]), into.as_deref());
        } else if let Some(caps) = CHECKOUT.captures(clause) {
            repo.checkout(&branch_name(&caps["name"]));
        } else if let Some(caps) = BRANCH.captures(clause) {
            let raw = caps
                .name("name")
                .or_else(|| caps.name("prefix"))
                .map_or("branch", |m| m.as_str());
            let created = branch_name(raw);
            if ["a", "new", "the"].contains(&created.as_str()) {
                return;
            }
            repo.branch(&created);
        } else {
            let message = COMMIT_PREFIX.replace(clause, "");
            repo.commit(&message);
        }
    }
}

impl Handler for GitGraphHandler {}

impl DiagramFormat for GitGraphHandler {
    type Elements = GitHistory;

    const KEY: &'static str = "git-graph";
    const HEADER: &'static str = "gitGraph";

    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::directional(
            &[Direction::LR, Direction::TB, Direction::BT],
            None,
            DirectionStyle::Suffixed,
        )
    }

    fn parse(&self, description: &str) -> GitHistory {
        let clauses = scan::clauses(description);
        if clauses.is_empty() {
            return Self::skeleton();
        }
        let mut repo = Repo::new();
        for clause in &clauses {
            Self::apply(&mut repo, clause);
        }
        repo.ensure_commit();
        GitHistory { ops: repo.ops }
    }

    fn render(&self, history: &GitHistory, header: &str, _config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        for op in &history.ops {
            let _ = match op {
                GitOp::Commit(id) => write!(out, "\n    commit id: \"{id}\""),
                GitOp::Branch(name) => write!(out, "\n    branch {name}"),
                GitOp::Checkout(name) => write!(out, "\n    checkout {name}"),
                GitOp::Merge(name) => write!(out, "\n    merge {name}"),
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
    use pretty_assertions::assert_eq;

    fn ops(description: &str) -> Vec<GitOp> {
        DiagramFormat::parse(&GitGraphHandler, description).ops
    }

    #[test]
    fn feature_branch_flow() {
        let got = ops("Initial setup. Create branch feature/login. Add login form. Merge feature/login into main");
        assert_eq!(
            got,
            vec![
                GitOp::Commit("c1 Initial setup".to_string()),
                GitOp::Branch("feature-login".to_string()),
                GitOp::Commit("c2 login form".to_string()),
                GitOp::Checkout("main".to_string()),
                GitOp::Merge("feature-login".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_merges_are_skipped() {
        let got = ops("Create develop branch. Merge develop into main. Merge hotfix");
        assert!(!got.iter().any(|op| matches!(op, GitOp::Merge(_))));
    }

    #[test]
    fn commit_ids_are_unique() {
        let got = ops("Fix bug. Fix bug. Fix bug");
        let ids: Vec<_> = got
            .iter()
            .filter_map(|op| match op {
                GitOp::Commit(id) => Some(id.clone()),
                _ => None,
            })
            .collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids, deduped);
    }

    #[test]
    fn render_with_direction() {
        let features = AdvancedFeatures::new();
        let code = GitGraphHandler.generate(&DiagramConfig {
            description: "",
            direction: Some(Direction::TB),
            features: &features,
        });
        assert!(code.starts_with("gitGraph TB:\n    commit id: \"c1 Initial commit\""));
        assert!(code.ends_with("merge develop"));
    }

    #[test]
    fn unsupported_direction_is_dropped() {
        let features = AdvancedFeatures::new();
        let code = GitGraphHandler.generate(&DiagramConfig {
            description: "",
            direction: Some(Direction::RL),
            features: &features,
        });
        assert!(code.starts_with("gitGraph\n"));
    }
}
