//! Shared handler contract and helpers
//!
//! Every diagram format implements the typed [`DiagramFormat`] trait. The
//! object-safe [`DiagramHandler`] trait is derived from it automatically so
//! formats can live in a [`HandlerRegistry`](artifex_registry::HandlerRegistry).

use artifex_model::{AdvancedFeatures, Direction, GenerationRequest};
use artifex_registry::Handler;
use serde::Serialize;
use std::fmt::Debug;

/// Where a direction token goes in the generated source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionStyle {
    /// Appended to the header: `flowchart LR`
    Inline,
    /// Separate statement after the header: `direction LR`
    Statement,
    /// Appended to the header with a trailing colon: `gitGraph LR:`
    Suffixed,
}

/// Static capability flags of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapabilities {
    /// Whether a theme directive may be prepended
    pub supports_theme: bool,
    /// Directions the grammar accepts (empty = no direction support)
    pub supported_directions: &'static [Direction],
    /// Direction emitted when none (or an unsupported one) is requested
    pub default_direction: Option<Direction>,
    /// How the direction is written
    pub direction_style: DirectionStyle,
}

impl FormatCapabilities {
    /// Themed format without direction support
    #[inline]
    #[must_use]
    pub const fn themed() -> Self {
        Self {
            supports_theme: true,
            supported_directions: &[],
            default_direction: None,
            direction_style: DirectionStyle::Inline,
        }
    }

    /// Themed format with direction support
    #[inline]
    #[must_use]
    pub const fn directional(
        supported: &'static [Direction],
        default_direction: Option<Direction>,
        style: DirectionStyle,
    ) -> Self {
        Self {
            supports_theme: true,
            supported_directions: supported,
            default_direction,
            direction_style: style,
        }
    }

    /// Whether any direction is supported
    #[inline]
    #[must_use]
    pub fn supports_direction(&self) -> bool {
        !self.supported_directions.is_empty()
    }

    /// Whether `direction` is in the supported set
    #[inline]
    #[must_use]
    pub fn accepts(&self, direction: Direction) -> bool {
        self.supported_directions.contains(&direction)
    }
}

/// Generation input for a diagram handler
#[derive(Debug, Clone, Copy)]
pub struct DiagramConfig<'a> {
    /// Description mined for structure
    pub description: &'a str,
    /// Requested direction
    pub direction: Option<Direction>,
    /// Format-specific extras
    pub features: &'a AdvancedFeatures,
}

impl<'a> DiagramConfig<'a> {
    /// Config from a full request
    #[inline]
    #[must_use]
    pub fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            description: &request.description,
            direction: request.style.direction,
            features: &request.advanced_features,
        }
    }

    /// Boolean feature flag (absent = false)
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.features
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// String feature value
    #[must_use]
    pub fn feature_str(&self, key: &str) -> Option<&'a str> {
        self.features
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Typed contract for one diagram format
///
/// `parse` must never return an empty model: when the description yields
/// nothing usable it returns a small skeleton instead.
pub trait DiagramFormat: Send + Sync + 'static {
    /// Structural model extracted from a description
    type Elements: Serialize + Debug;

    /// Canonical registry key (e.g. `git-graph`)
    const KEY: &'static str;

    /// Header token that opens the source (e.g. `gitGraph`)
    const HEADER: &'static str;

    /// Capability flags
    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::themed()
    }

    /// Extract structure from a description by shallow scanning
    fn parse(&self, description: &str) -> Self::Elements;

    /// Render source from elements; `header` already carries any direction
    fn render(&self, elements: &Self::Elements, header: &str, config: &DiagramConfig<'_>) -> String;
}

/// Object-safe diagram handler stored in the sub-type registry
pub trait DiagramHandler: Handler {
    /// Canonical key
    fn key(&self) -> &'static str;

    /// Header token
    fn header_token(&self) -> &'static str;

    /// Capability flags
    fn capabilities(&self) -> FormatCapabilities;

    /// Generate source; pure function of `config`
    fn generate(&self, config: &DiagramConfig<'_>) -> String;

    /// Structural model as JSON
    fn parse(&self, description: &str) -> serde_json::Value;

    /// Prepend a theme directive when supported
    fn apply_theme(&self, code: &str, theme: Option<&str>) -> String {
        apply_theme(&self.capabilities(), code, theme)
    }

    /// Attach a direction to `header` when supported
    fn apply_direction(&self, header: &str, direction: Option<Direction>) -> String {
        apply_direction(&self.capabilities(), header, direction)
    }
}

impl<F> DiagramHandler for F
where
    F: DiagramFormat + Handler,
{
    fn key(&self) -> &'static str {
        F::KEY
    }

    fn header_token(&self) -> &'static str {
        F::HEADER
    }

    fn capabilities(&self) -> FormatCapabilities {
        DiagramFormat::capabilities(self)
    }

    fn generate(&self, config: &DiagramConfig<'_>) -> String {
        let caps = DiagramFormat::capabilities(self);
        let direction = match config.direction {
            Some(requested) if caps.accepts(requested) => Some(requested),
            Some(requested) => {
                tracing::debug!(
                    format = F::KEY,
                    direction = %requested,
                    "unsupported direction ignored"
                );
                caps.default_direction
            }
            None => caps.default_direction,
        };
        let header = apply_direction(&caps, F::HEADER, direction);
        let elements = DiagramFormat::parse(self, config.description);
        self.render(&elements, &header, config)
    }

    fn parse(&self, description: &str) -> serde_json::Value {
        serde_json::to_value(DiagramFormat::parse(self, description))
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Prepend `%%{init: {'theme':'<theme>'}}%%` to `code`
///
/// No-op when the format has no theme support or `theme` is absent or
/// contains no usable characters.
#[must_use]
pub fn apply_theme(caps: &FormatCapabilities, code: &str, theme: Option<&str>) -> String {
    let theme: String = theme
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if !caps.supports_theme || theme.is_empty() {
        return code.to_string();
    }
    format!("%%{{init: {{'theme':'{theme}'}}}}%%\n{code}")
}

/// Attach `direction` to `header` in the format's style
///
/// Returns `header` unchanged when the direction is absent or unsupported.
#[must_use]
pub fn apply_direction(
    caps: &FormatCapabilities,
    header: &str,
    direction: Option<Direction>,
) -> String {
    match direction {
        Some(d) if caps.accepts(d) => match caps.direction_style {
            DirectionStyle::Inline => format!("{header} {d}"),
            DirectionStyle::Statement => format!("{header}\n    direction {d}"),
            DirectionStyle::Suffixed => format!("{header} {d}:"),
        },
        _ => header.to_string(),
    }
}

const RESERVED_IDS: &[&str] = &[
    "end", "graph", "subgraph", "style", "class", "classdef", "click", "default", "flowchart",
];

/// Normalize text into a grammar-safe identifier (`[A-Za-z][A-Za-z0-9_]*`)
#[must_use]
pub fn sanitize_id(raw: &str) -> String {
    let mut id = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    let id = id.trim_matches('_');
    let mut id = if id.is_empty() {
        "node".to_string()
    } else if id.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n{id}")
    } else {
        id.to_string()
    };
    if RESERVED_IDS.contains(&id.to_ascii_lowercase().as_str()) {
        id.push_str("_node");
    }
    id
}

/// Escape text that would break a quoted label
///
/// Quotes become `#quot;`, line breaks become `<br/>`, statement separators
/// become commas.
#[must_use]
pub fn sanitize_label(raw: &str) -> String {
    raw.trim()
        .replace(';', ",")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br/>")
        .replace('"', "#quot;")
}

/// Label for grammars where `:` separates fields (gantt, journey, timeline)
#[must_use]
pub(crate) fn plain_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(':', " -")
        .replace(['#', ';'], "")
        .replace('"', "'")
}
