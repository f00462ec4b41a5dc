//! User journey format

use crate::base::{plain_text, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use serde::Serialize;
use std::fmt::Write as _;

const POSITIVE: &[&str] = &[
    "enjoy", "love", "happy", "easy", "easily", "quick", "fast", "smooth", "delight", "success", "great",
    "satisf", "pleasant", "simple",
];
const NEGATIVE: &[&str] = &[
    "frustrat", "slow", "confus", "difficult", "hard", "error", "fail", "annoy", "wait", "stuck",
    "angry", "complain", "broken",
];

const DEFAULT_ACTOR: &str = "User";
const DEFAULT_SECTION: &str = "Journey";

/// Single journey step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Step text
    pub task: String,
    /// Satisfaction score from 1 to 5
    pub score: u8,
}

/// Journey section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    /// Section heading
    pub name: String,
    /// Steps in order
    pub steps: Vec<Step>,
}

/// Journey structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyModel {
    /// Optional journey title
    pub title: Option<String>,
    /// Sections in description order
    pub stages: Vec<Stage>,
}

/// Satisfaction score for a step: 5 positive, 2 negative, 3 neutral
#[must_use]
pub fn sentiment(text: &str) -> u8 {
    if scan::contains_any(text, NEGATIVE) {
        2
    } else if scan::contains_any(text, POSITIVE) {
        5
    } else {
        3
    }
}

/// User journey handler
#[derive(Debug, Clone, Copy, Default)]
pub struct JourneyHandler;

impl JourneyHandler {
    fn skeleton_stages() -> Vec<Stage> {
        let step = |task: &str| Step {
            task: task.to_string(),
            score: sentiment(task),
        };
        vec![Stage {
            name: DEFAULT_SECTION.to_string(),
            steps: vec![step("Discover product"), step("Sign up"), step("Use product")],
        }]
    }
}

impl Handler for JourneyHandler {}

impl DiagramFormat for JourneyHandler {
    type Elements = JourneyModel;

    const KEY: &'static str = "journey";
    const HEADER: &'static str = "journey";

    fn parse(&self, description: &str) -> JourneyModel {
        let clauses = scan::clauses(description);
        let (title, body) = scan::title_and_body(&clauses);

        let mut stages: Vec<Stage> = Vec::new();
        for clause in body {
            let (heading, step) = scan::split_heading(clause);
            if let Some(name) = heading {
                stages.push(Stage {
                    name: plain_text(&name),
                    steps: Vec::new(),
                });
            }
            let Some(clause) = step else {
                continue;
            };
            if stages.is_empty() {
                stages.push(Stage {
                    name: DEFAULT_SECTION.to_string(),
                    steps: Vec::new(),
                });
            }
            if let Some(stage) = stages.last_mut() {
                stage.steps.push(Step {
                    task: plain_text(&scan::truncate(clause, 50)),
                    score: sentiment(clause),
                });
            }
        }
        stages.retain(|s| !s.steps.is_empty());
        if stages.is_empty() {
            stages = Self::skeleton_stages();
        }

        JourneyModel {
            title: title.map(|t| plain_text(&t)),
            stages,
        }
    }

    fn render(&self, model: &JourneyModel, header: &str, config: &DiagramConfig<'_>) -> String {
        let actor = plain_text(config.feature_str("actor").unwrap_or(DEFAULT_ACTOR)).replace(',', "");
        let mut out = header.to_string();
        if let Some(title) = &model.title {
            let _ = write!(out, "\n    title {title}");
        }
        for stage in &model.stages {
            let _ = write!(out, "\n    section {}", stage.name);
            for step in &stage.steps {
                let _ = write!(out, "\n      {}: {}: {actor}", step.task, step.score);
            }
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
    fn sentiment_scores() {
        assert_eq!(sentiment("Checkout is quick"), 5);
        assert_eq!(sentiment("Shipping page is slow"), 2);
        assert_eq!(sentiment("Browse catalog"), 3);
    }

    #[test]
    fn sections_and_steps() {
        let model = DiagramFormat::parse(
            &JourneyHandler,
            "Online shopping. Section Browse. Search items. Section Buy: Pay easily. Wait for delivery",
        );
        assert_eq!(model.title.as_deref(), Some("Online shopping"));
        assert_eq!(model.stages.len(), 2);
        assert_eq!(model.stages[1].name, "Buy");
        assert_eq!(model.stages[1].steps[0].score, 5);
        assert_eq!(model.stages[1].steps[1].score, 2);
    }

    #[test]
    fn render_with_actor() {
        let mut features = AdvancedFeatures::new();
        features.insert("actor".to_string(), serde_json::json!("Shopper"));
        let code = JourneyHandler.generate(&DiagramConfig {
            description: "Trip. Book flight",
            direction: None,
            features: &features,
        });
        assert_eq!(
            code,
            "journey\n    title Trip\n    section Journey\n      Book flight: 3: Shopper"
        );
    }

    #[test]
    fn single_clause_uses_skeleton_steps() {
        let model = DiagramFormat::parse(&JourneyHandler, "Onboarding");
        assert_eq!(model.title.as_deref(), Some("Onboarding"));
        assert_eq!(model.stages[0].steps.len(), 3);
    }
}
