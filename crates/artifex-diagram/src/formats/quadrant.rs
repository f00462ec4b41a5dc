//! Quadrant chart format

use crate::base::{plain_text, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static AXES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<x>[A-Za-z][\w\-]*)\s+(?:vs\.?|versus)\s+(?P<y>[A-Za-z][\w\-]*)")
        .expect("axes regex is valid")
});

static POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<name>[A-Za-z][A-Za-z0-9 _\-]*?)\s*:?\s*[\(\[]\s*(?P<x>0(?:\.\d+)?|1(?:\.0+)?|\.\d+)\s*,\s*(?P<y>0(?:\.\d+)?|1(?:\.0+)?|\.\d+)\s*[\)\]]",
    )
    .expect("point regex is valid")
});

const DEFAULT_X: &str = "Effort";
const DEFAULT_Y: &str = "Impact";
const QUADRANT_LABELS: [&str; 4] = ["Major Projects", "Quick Wins", "Fill Ins", "Thankless Tasks"];

/// Plotted item with coordinates in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Point name
    pub name: String,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

/// Quadrant structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantModel {
    /// Optional chart title
    pub title: Option<String>,
    /// X axis label
    pub x_axis: String,
    /// Y axis label
    pub y_axis: String,
    /// Plotted points
    pub points: Vec<Point>,
}

/// Quadrant chart handler
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadrantHandler;

impl QuadrantHandler {
    fn skeleton_points() -> Vec<Point> {
        [
            ("Item A", 0.3, 0.6),
            ("Item B", 0.45, 0.23),
            ("Item C", 0.57, 0.69),
            ("Item D", 0.78, 0.34),
        ]
        .into_iter()
        .map(|(name, x, y)| Point {
            name: name.to_string(),
            x,
            y,
        })
        .collect()
    }

    fn point_name(raw: &str) -> String {
        let name: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
            .collect();
        scan::truncate(&name, 40)
    }
}

impl Handler for QuadrantHandler {}

impl DiagramFormat for QuadrantHandler {
    type Elements = QuadrantModel;

    const KEY: &'static str = "quadrant";
    const HEADER: &'static str = "quadrantChart";

    fn parse(&self, description: &str) -> QuadrantModel {
        let (x_axis, y_axis) = AXES.captures(description).map_or_else(
            || (DEFAULT_X.to_string(), DEFAULT_Y.to_string()),
            |caps| (scan::capitalize(&caps["x"]), scan::capitalize(&caps["y"])),
        );

        let clauses = scan::clauses(description);
        let mut title = None;
        let mut points = Vec::new();
        for (idx, clause) in clauses.iter().enumerate() {
            let before = points.len();
            for caps in POINT.captures_iter(clause) {
                let (Ok(x), Ok(y)) = (caps["x"].parse::<f64>(), caps["y"].parse::<f64>()) else {
                    continue;
                };
                let name = Self::point_name(&caps["name"]);
                if name.is_empty() {
                    continue;
                }
                points.push(Point {
                    name,
                    x: x.clamp(0.0, 1.0),
                    y: y.clamp(0.0, 1.0),
                });
            }
            if idx == 0 && points.len() == before {
                title = Some(plain_text(&scan::truncate(clause, 60)));
            }
        }
        if points.is_empty() {
            points = Self::skeleton_points();
        }

        QuadrantModel {
            title,
            x_axis,
            y_axis,
            points,
        }
    }

    fn render(&self, model: &QuadrantModel, header: &str, config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        if let Some(title) = &model.title {
            let _ = write!(out, "\n    title {title}");
        }
        let x = plain_text(&model.x_axis);
        let y = plain_text(&model.y_axis);
        let _ = write!(out, "\n    x-axis Low {x} --> High {x}");
        let _ = write!(out, "\n    y-axis Low {y} --> High {y}");
        for (idx, default) in QUADRANT_LABELS.iter().enumerate() {
            let key = format!("quadrant{}", idx + 1);
            let label = config.feature_str(&key).map_or_else(|| (*default).to_string(), plain_text);
            let _ = write!(out, "\n    quadrant-{} {label}", idx + 1);
        }
        for point in &model.points {
            let _ = write!(out, "\n    {}: [{}, {}]", point.name, point.x, point.y);
        }
        out
    }
}
