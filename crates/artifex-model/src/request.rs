//! Generation requests
//!
//! A [`GenerationRequest`] is built once per call and never mutated. The
//! wire-level shape accepted from collaborators is [`RequestSpec`], which maps
//! one-to-one onto the request through `From`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Free-form per-format options (`advancedFeatures` on the wire)
pub type AdvancedFeatures = BTreeMap<String, serde_json::Value>;

/// Layout direction for formats that support one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Top-down
    TD,
    /// Top to bottom (same as `TD` for most formats)
    TB,
    /// Bottom to top
    BT,
    /// Left to right
    LR,
    /// Right to left
    RL,
}

impl Direction {
    /// Every direction, in declaration order
    pub const ALL: [Direction; 5] = [Self::TD, Self::TB, Self::BT, Self::LR, Self::RL];

    /// Directive token as written in the generated source
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TD => "TD",
            Self::TB => "TB",
            Self::BT => "BT",
            Self::LR => "LR",
            Self::RL => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`Direction`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction: '{0}' (expected TD, TB, BT, LR or RL)")]
pub struct DirectionParseError(pub String);

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TD" => Ok(Self::TD),
            "TB" => Ok(Self::TB),
            "BT" => Ok(Self::BT),
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            _ => Err(DirectionParseError(s.to_string())),
        }
    }
}

/// Capability plus optional sub-type
///
/// Both identifiers are kept exactly as the caller supplied them; alias
/// normalization happens at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetType {
    /// Artifact family, e.g. `diagram` or `workflow`
    pub capability: String,
    /// Concrete format within the family, e.g. `flowchart` or `deploy`
    pub sub_type: Option<String>,
}

impl TargetType {
    /// Target with a capability only
    #[inline]
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            sub_type: None,
        }
    }

    /// Target with both tiers named
    #[inline]
    #[must_use]
    pub fn with_sub_type(capability: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            sub_type: Some(sub_type.into()),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_type {
            Some(sub) => write!(f, "{}/{}", self.capability, sub),
            None => f.write_str(&self.capability),
        }
    }
}

/// Cross-cutting presentation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Theme name (e.g. `dark`, `forest`)
    pub theme: Option<String>,
    /// Requested layout direction
    pub direction: Option<Direction>,
}

/// Accessibility metadata echoed into the artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessibility {
    /// Short accessible title
    pub title: Option<String>,
    /// Longer accessible description
    pub descr: Option<String>,
}

impl Accessibility {
    /// True when neither field carries non-blank text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.title) && blank(&self.descr)
    }
}

/// Correctness settings for the validation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMode {
    /// Require a valid result, falling back to a skeleton when needed
    pub strict: bool,
    /// Attempt heuristic repair before falling back
    pub repair: bool,
}

impl Default for GenerationMode {
    fn default() -> Self {
        Self {
            strict: true,
            repair: true,
        }
    }
}

/// Immutable per-call generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description mined for structure
    pub description: String,
    /// What to generate
    pub target: TargetType,
    /// Theme and direction
    pub style: StyleConfig,
    /// Accessibility title/description
    pub accessibility: Accessibility,
    /// Strict and repair switches
    pub mode: GenerationMode,
    /// Format-specific extras
    pub advanced_features: AdvancedFeatures,
}

impl GenerationRequest {
    /// Create request with default style, accessibility and mode
    #[must_use]
    pub fn new(description: impl Into<String>, target: TargetType) -> Self {
        Self {
            description: description.into(),
            target,
            style: StyleConfig::default(),
            accessibility: Accessibility::default(),
            mode: GenerationMode::default(),
            advanced_features: AdvancedFeatures::new(),
        }
    }

    /// With theme
    #[inline]
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.style.theme = Some(theme.into());
        self
    }

    /// With direction
    #[inline]
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.style.direction = Some(direction);
        self
    }

    /// With accessibility title and description
    #[inline]
    #[must_use]
    pub fn with_accessibility(mut self, title: Option<String>, descr: Option<String>) -> Self {
        self.accessibility = Accessibility { title, descr };
        self
    }

    /// With strict/repair switches
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, strict: bool, repair: bool) -> Self {
        self.mode = GenerationMode { strict, repair };
        self
    }

    /// With a single advanced feature
    #[inline]
    #[must_use]
    pub fn with_feature(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.advanced_features.insert(key.into(), value);
        self
    }
}

/// Flat request shape as supplied by collaborators
///
/// ```json
/// { "description": "...", "capability": "diagram", "subType": "pie",
///   "theme": "dark", "direction": "LR", "strict": true, "repair": true,
///   "accTitle": "...", "accDescr": "...", "advancedFeatures": {} }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    /// Natural-language description; empty when omitted
    #[serde(default)]
    pub description: String,
    /// Capability name or alias (`diagram`, `mermaid`, `workflow`, ...)
    pub capability: String,
    /// Format within the capability; inferred when omitted
    #[serde(default)]
    pub sub_type: Option<String>,
    /// Theme name
    #[serde(default)]
    pub theme: Option<String>,
    /// Layout direction
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Strict mode; defaults to `true`
    #[serde(default)]
    pub strict: Option<bool>,
    /// Heuristic repair; defaults to `true`
    #[serde(default)]
    pub repair: Option<bool>,
    /// Accessible title
    #[serde(default)]
    pub acc_title: Option<String>,
    /// Accessible description
    #[serde(default)]
    pub acc_descr: Option<String>,
    /// Format-specific extras
    #[serde(default)]
    pub advanced_features: AdvancedFeatures,
}

impl From<RequestSpec> for GenerationRequest {
    fn from(spec: RequestSpec) -> Self {
        let defaults = GenerationMode::default();
        Self {
            description: spec.description,
            target: TargetType {
                capability: spec.capability,
                sub_type: spec.sub_type,
            },
            style: StyleConfig {
                theme: spec.theme,
                direction: spec.direction,
            },
            accessibility: Accessibility {
                title: spec.acc_title,
                descr: spec.acc_descr,
            },
            mode: GenerationMode {
                strict: spec.strict.unwrap_or(defaults.strict),
                repair: spec.repair.unwrap_or(defaults.repair),
            },
            advanced_features: spec.advanced_features,
        }
    }
}
