//! Timeline format

use crate::base::{plain_text, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static PERIOD_EVENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<period>[^:]{1,40}?)\s*:\s*(?P<events>.+)$").expect("period regex is valid")
});

static YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:in\s+)?(?P<year>(?:19|20)\d{2}|Q[1-4]\s+\d{4})\s*,?\s+(?P<event>.+)$")
        .expect("year regex is valid")
});

/// One period with its events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    /// Period label
    pub label: String,
    /// Events within the period
    pub events: Vec<String>,
}

/// Timeline structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineModel {
    /// Optional timeline title
    pub title: Option<String>,
    /// Periods in order
    pub periods: Vec<Period>,
}

/// Timeline handler
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineHandler;

impl TimelineHandler {
    fn skeleton_periods() -> Vec<Period> {
        [("Phase 1", "Planning"), ("Phase 2", "Execution"), ("Phase 3", "Review")]
            .into_iter()
            .map(|(label, event)| Period {
                label: label.to_string(),
                events: vec![event.to_string()],
            })
            .collect()
    }

    fn period(sentence: &str) -> Option<Period> {
        if let Some(caps) = PERIOD_EVENTS.captures(sentence) {
            let events: Vec<String> = caps["events"]
                .split([':', ','])
                .map(|e| plain_text(e.trim()))
                .filter(|e| !e.is_empty())
                .collect();
            let label = plain_text(caps["period"].trim());
            return (!events.is_empty() && !label.is_empty()).then_some(Period { label, events });
        }
        let caps = YEAR.captures(sentence)?;
        Some(Period {
            label: caps["year"].to_string(),
            events: vec![plain_text(&scan::truncate(&caps["event"], 50))],
        })
    }
}

impl Handler for TimelineHandler {}

impl DiagramFormat for TimelineHandler {
    type Elements = TimelineModel;

    const KEY: &'static str = "timeline";
    const HEADER: &'static str = "timeline";

    fn parse(&self, description: &str) -> TimelineModel {
        let sentences = scan::sentences(description);
        let mut title = None;
        let mut periods: Vec<Period> = Vec::new();
        for (idx, sentence) in sentences.iter().enumerate() {
            match Self::period(sentence) {
                Some(period) => match periods.iter_mut().find(|p| p.label == period.label) {
                    Some(existing) => existing.events.extend(period.events),
                    None => periods.push(period),
                },
                None if idx == 0 => title = Some(plain_text(&scan::truncate(sentence, 60))),
                None => {
                    if let Some(last) = periods.last_mut() {
                        last.events.push(plain_text(&scan::truncate(sentence, 50)));
                    }
                }
            }
        }
        if periods.is_empty() {
            periods = Self::skeleton_periods();
        }
        TimelineModel { title, periods }
    }

    fn render(&self, model: &TimelineModel, header: &str, _config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        if let Some(title) = &model.title {
            let _ = write!(out, "\n    title {title}");
        }
        for period in &model.periods {
            let _ = write!(out, "\n    {} : {}", period.label, period.events.join(" : "));
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
    fn periods_and_years() {
        let model = DiagramFormat::parse(
            &TimelineHandler,
            "Company history. 2019: Founded. In 2021 raised seed round. 2023: Launched, Hired 50",
        );
        assert_eq!(model.title.as_deref(), Some("Company history"));
        let labels: Vec<_> = model.periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2019", "2021", "2023"]);
        assert_eq!(model.periods[2].events, vec!["Launched", "Hired 50"]);
    }

    #[test]
    fn repeated_period_merges_events() {
        let model = DiagramFormat::parse(&TimelineHandler, "Q1: Plan\nQ1: Hire");
        assert_eq!(model.periods.len(), 1);
        assert_eq!(model.periods[0].events, vec!["Plan", "Hire"]);
    }

    #[test]
    fn render_layout() {
        let features = AdvancedFeatures::new();
        let code = TimelineHandler.generate(&DiagramConfig {
            description: "Roadmap",
            direction: None,
            features: &features,
        });
        assert_eq!(
            code,
            "timeline\n    title Roadmap\n    Phase 1 : Planning\n    Phase 2 : Execution\n    Phase 3 : Review"
        );
    }
}
