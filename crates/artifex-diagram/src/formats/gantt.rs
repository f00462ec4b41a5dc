//! Gantt chart format
//!
//! The first clause is the chart title unless it already carries a
//! duration. Clauses that look like headings open a section; every other
//! clause is a task scheduled after the previous one.

use crate::base::{plain_text, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:\(|\bfor\s+|\btakes\s+|\blasting\s+)?(?P<n>\d+)\s*(?P<unit>d|days?|w|weeks?)\b\)?")
        .expect("duration regex is valid")
});

const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";
const DEFAULT_START: &str = "2024-01-01";
const DEFAULT_SECTION: &str = "Tasks";
const DEFAULT_DAYS: u32 = 3;

/// Scheduled task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Task name
    pub name: String,
    /// Duration in days, at least one
    pub days: u32,
}

/// Named group of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Section heading
    pub name: String,
    /// Tasks in schedule order
    pub tasks: Vec<Task>,
}

/// Gantt structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Optional chart title
    pub title: Option<String>,
    /// Sections in description order
    pub sections: Vec<Section>,
}

/// Keep only characters that can appear in a date or date pattern
fn date_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | '.' | ':' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Default start date written in `pattern`
///
/// Understands the `YYYY`, `YY`, `MM`, `M`, `DD`, `D`, `HH`, `H`, `mm` and
/// `ss` tokens; `None` for any other letter run.
fn default_start_in(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_ascii_alphabetic() {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.next_if_eq(&c).is_some() {
            run += 1;
        }
        let value = match (c, run) {
            ('Y', 4) => "2024",
            ('Y', 2) => "24",
            ('M' | 'D', 2) => "01",
            ('M' | 'D', 1) => "1",
            ('H' | 'm' | 's', 2) => "00",
            ('H', 1) => "0",
            _ => return None,
        };
        out.push_str(value);
    }
    Some(out)
}

/// Gantt chart handler
#[derive(Debug, Clone, Copy, Default)]
pub struct GanttHandler;

impl GanttHandler {
    fn skeleton_sections() -> Vec<Section> {
        let task = |name: &str, days| Task {
            name: name.to_string(),
            days,
        };
        vec![Section {
            name: DEFAULT_SECTION.to_string(),
            tasks: vec![task("Planning", 3), task("Execution", 5), task("Review", 2)],
        }]
    }

    /// `Phase 1: Design` opens a section and carries a task; `Review: 2d`
    /// is just a task.
    fn split_heading(clause: &str) -> (Option<String>, Option<&str>) {
        if let Some((_, rest)) = clause.split_once(':') {
            let rest = rest.trim();
            if !rest.is_empty() && DURATION.replace(rest, "").trim().is_empty() {
                return (None, Some(clause));
            }
        }
        scan::split_heading(clause)
    }

    /// `dateFormat` and start date that agree with each other
    ///
    /// A custom format without a start date gets the default start written
    /// in that format; a format it cannot fill reverts both to the defaults.
    fn dates(config: &DiagramConfig<'_>) -> (String, String) {
        let format = config.feature_str("dateFormat").map(date_token).filter(|f| !f.is_empty());
        let start = config.feature_str("startDate").map(date_token).filter(|s| !s.is_empty());
        match (format, start) {
            (Some(format), Some(start)) => (format, start),
            (Some(format), None) => match default_start_in(&format) {
                Some(start) => (format, start),
                None => {
                    tracing::debug!(%format, "cannot fill date format, reverting to defaults");
                    (DEFAULT_DATE_FORMAT.to_string(), DEFAULT_START.to_string())
                }
            },
            (None, start) => (
                DEFAULT_DATE_FORMAT.to_string(),
                start.unwrap_or_else(|| DEFAULT_START.to_string()),
            ),
        }
    }

    fn task(clause: &str) -> Task {
        let days = DURATION.captures(clause).map_or(DEFAULT_DAYS, |caps| {
            let n: u32 = caps["n"].parse().unwrap_or(DEFAULT_DAYS);
            if caps["unit"].to_ascii_lowercase().starts_with('w') {
                n.saturating_mul(7)
            } else {
                n
            }
        });
        let name = DURATION.replace(clause, "");
        let name = plain_text(name.trim().trim_end_matches([',', '-', ':']).trim());
        Task {
            name: if name.is_empty() {
                "Task".to_string()
            } else {
                scan::truncate(&name, 50)
            },
            days: days.max(1),
        }
    }
}

impl Handler for GanttHandler {}

impl DiagramFormat for GanttHandler {
    type Elements = Schedule;

    const KEY: &'static str = "gantt";
    const HEADER: &'static str = "gantt";

    fn parse(&self, description: &str) -> Schedule {
        let clauses = scan::clauses(description);
        let (title, body) = match clauses.first() {
            Some(first) if DURATION.is_match(first) => (None, clauses.as_slice()),
            _ => scan::title_and_body(&clauses),
        };

        let mut sections: Vec<Section> = Vec::new();
        for clause in body {
            let (heading, task) = Self::split_heading(clause);
            if let Some(name) = heading {
                sections.push(Section {
                    name: plain_text(&name),
                    tasks: Vec::new(),
                });
            }
            let Some(clause) = task else {
                continue;
            };
            if sections.is_empty() {
                sections.push(Section {
                    name: DEFAULT_SECTION.to_string(),
                    tasks: Vec::new(),
                });
            }
            if let Some(section) = sections.last_mut() {
                section.tasks.push(Self::task(clause));
            }
        }
        sections.retain(|s| !s.tasks.is_empty());
        if sections.is_empty() {
            sections = Self::skeleton_sections();
        }

        Schedule {
            title: title.map(|t| plain_text(&t)),
            sections,
        }
    }

    fn render(&self, schedule: &Schedule, header: &str, config: &DiagramConfig<'_>) -> String {
        let (date_format, start) = Self::dates(config);

        let mut out = header.to_string();
        if let Some(title) = &schedule.title {
            let _ = write!(out, "\n    title {title}");
        }
        let _ = write!(out, "\n    dateFormat {date_format}");

        let mut counter = 0usize;
        for section in &schedule.sections {
            let _ = write!(out, "\n    section {}", section.name);
            for task in &section.tasks {
                counter += 1;
                let when = if counter == 1 {
                    start.clone()
                } else {
                    format!("after t{}", counter - 1)
                };
                let _ = write!(out, "\n    {} :t{counter}, {when}, {}d", task.name, task.days);
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
    fn title_sections_and_durations() {
        let schedule = DiagramFormat::parse(
            &GanttHandler,
            "Website launch. Phase 1: Design mockups for 5 days. Build pages (2 weeks). Phase 2: QA",
        );
        assert_eq!(schedule.title.as_deref(), Some("Website launch"));
        assert_eq!(schedule.sections[0].name, "Phase 1");
        assert_eq!(
            schedule.sections[0].tasks[0],
            Task {
                name: "Design mockups".to_string(),
                days: 5
            }
        );
        assert_eq!(schedule.sections[0].tasks[1].days, 14);
    }

    #[test]
    fn first_clause_with_duration_is_a_task() {
        let schedule = DiagramFormat::parse(&GanttHandler, "Research 4d. Write report 2d");
        assert_eq!(schedule.title, None);
        assert_eq!(schedule.sections[0].tasks.len(), 2);
    }

    #[test]
    fn single_clause_is_title_with_skeleton() {
        let schedule = DiagramFormat::parse(&GanttHandler, "Migration plan");
        assert_eq!(schedule.title.as_deref(), Some("Migration plan"));
        assert_eq!(schedule.sections[0].tasks.len(), 3);
    }

    fn render_with(features: &[(&str, &str)]) -> String {
        let features: AdvancedFeatures = features
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
            .collect();
        GanttHandler.generate(&DiagramConfig {
            description: "Plan. Draft 2d",
            direction: None,
            features: &features,
        })
    }

    #[test]
    fn default_start_follows_date_format() {
        assert_eq!(default_start_in(DEFAULT_DATE_FORMAT).as_deref(), Some(DEFAULT_START));
        assert_eq!(default_start_in("DD/MM/YYYY").as_deref(), Some("01/01/2024"));
        assert_eq!(default_start_in("M.D.YY HH:mm").as_deref(), Some("1.1.24 00:00"));
        assert_eq!(default_start_in("X"), None);
    }

    #[test]
    fn custom_format_without_start_date() {
        let code = render_with(&[("dateFormat", "DD/MM/YYYY")]);
        assert!(code.contains("dateFormat DD/MM/YYYY"));
        assert!(code.contains("Draft :t1, 01/01/2024, 2d"));

        let code = render_with(&[("dateFormat", "X")]);
        assert!(code.contains("dateFormat YYYY-MM-DD"));
        assert!(code.contains("Draft :t1, 2024-01-01, 2d"));
    }

    #[test]
    fn explicit_format_and_start_are_kept() {
        let code = render_with(&[("dateFormat", "DD-MM-YYYY"), ("startDate", "15-03-2025")]);
        assert!(code.contains("dateFormat DD-MM-YYYY"));
        assert!(code.contains("Draft :t1, 15-03-2025, 2d"));
    }

    #[test]
    fn render_chains_tasks() {
        let mut features = AdvancedFeatures::new();
        features.insert("startDate".to_string(), serde_json::json!("2025-03-01"));
        let code = GanttHandler.generate(&DiagramConfig {
            description: "Plan. Draft 2d. Review 1d",
            direction: None,
            features: &features,
        });
        assert_eq!(
            code,
            "gantt\n    title Plan\n    dateFormat YYYY-MM-DD\n    section Tasks\n    Draft :t1, 2025-03-01, 2d\n    Review :t2, after t1, 1d"
        );
    }
}
