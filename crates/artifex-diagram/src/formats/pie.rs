//! Pie chart format

use crate::base::{plain_text, sanitize_label, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static LABEL_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>[A-Za-z][\w &/\-']*?)\s*(?:(?::|=|\bis\b|\bat\b|-)\s*)?(?P<value>\d+(?:\.\d+)?)\s*%?$")
        .expect("label-value regex is valid")
});

static VALUE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<value>\d+(?:\.\d+)?)\s*%\s*(?:of\s+|are\s+|is\s+|for\s+)?(?P<label>[A-Za-z][\w &/\-']*)$")
        .expect("value-label regex is valid")
});

static ITEM_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?:[,;\n]|\.\s+|\band\b)\s*").expect("item split regex is valid")
});

static BY_DIMENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bby\s+(?P<dim>[A-Za-z][\w\-]*)").expect("by regex is valid"));

/// Slice of the pie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    /// Slice label
    pub label: String,
    /// Positive slice value
    pub value: f64,
}

/// Pie structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieModel {
    /// Optional chart title
    pub title: Option<String>,
    /// Slices in description order
    pub slices: Vec<Slice>,
}

/// Pie chart handler
#[derive(Debug, Clone, Copy, Default)]
pub struct PieHandler;

impl PieHandler {
    /// Placeholder slices named after the title's `by <dimension>` if any
    fn skeleton_slices(title: Option<&str>) -> Vec<Slice> {
        let prefix = title
            .and_then(|t| BY_DIMENSION.captures(t))
            .map_or_else(|| "Category".to_string(), |caps| scan::capitalize(&scan::singular(&caps["dim"])));
        [("A", 40.0), ("B", 35.0), ("C", 25.0)]
            .into_iter()
            .map(|(suffix, value)| Slice {
                label: format!("{prefix} {suffix}"),
                value,
            })
            .collect()
    }

    fn slice(item: &str) -> Option<Slice> {
        let item = item.trim().trim_end_matches('.');
        let (label, value) = if let Some(caps) = LABEL_VALUE.captures(item) {
            (caps["label"].to_string(), caps["value"].to_string())
        } else if let Some(caps) = VALUE_LABEL.captures(item) {
            (caps["label"].to_string(), caps["value"].to_string())
        } else {
            return None;
        };
        let value: f64 = value.parse().ok()?;
        let label = label.trim();
        (value > 0.0 && !label.is_empty()).then(|| Slice {
            label: scan::truncate(label, 40),
            value,
        })
    }
}

impl Handler for PieHandler {}

impl DiagramFormat for PieHandler {
    type Elements = PieModel;

    const KEY: &'static str = "pie";
    const HEADER: &'static str = "pie";

    fn parse(&self, description: &str) -> PieModel {
        let mut title = None;
        let mut body = description.trim();
        // `Title: a 10, b 20` or a leading sentence without numbers
        if let Some((head, rest)) = body.split_once(':') {
            let first_item = body.split([',', ';', '\n']).next().unwrap_or_default().trim();
            if !head.chars().any(|c| c.is_ascii_digit())
                && rest.chars().any(|c| c.is_ascii_digit())
                && !LABEL_VALUE.is_match(first_item)
            {
                title = Some(head.trim().to_string());
                body = rest;
            }
        }
        if title.is_none() {
            if let Some((head, rest)) = body.split_once(". ") {
                if !head.chars().any(|c| c.is_ascii_digit()) {
                    title = Some(head.trim().to_string());
                    body = rest;
                }
            }
        }

        let slices: Vec<Slice> = ITEM_SPLIT.split(body).filter_map(Self::slice).collect();
        if slices.is_empty() {
            let title = title.or_else(|| {
                let text = description.trim().trim_end_matches('.');
                (!text.is_empty()).then(|| text.to_string())
            });
            let title = title.map(|t| plain_text(&scan::truncate(&t, 60)));
            return PieModel {
                slices: Self::skeleton_slices(title.as_deref()),
                title,
            };
        }

        PieModel {
            title: title.map(|t| plain_text(&scan::truncate(&t, 60))),
            slices,
        }
    }

    fn render(&self, model: &PieModel, header: &str, config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        if config.flag("showData") {
            out.push_str(" showData");
        }
        if let Some(title) = &model.title {
            let _ = write!(out, "\n    title {title}");
        }
        for slice in &model.slices {
            let _ = write!(out, "\n    \"{}\" : {}", sanitize_label(&slice.label), slice.value);
        }
        out
    }
}
