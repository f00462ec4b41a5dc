//! Entity-relationship diagram format

use crate::base::{sanitize_id, sanitize_label, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

const ARTICLE: &str = r"(?:an?\s+|the\s+|each\s+|every\s+)?";

static ATTRIBUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<entity>\w+)\s+(?:has|with)\s+(?:attributes|fields|columns|properties)\s+(?P<list>.+)$"
    ))
    .expect("attribute regex is valid")
});

static HAS_MANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<a>\w+)\s+(?:has|have|contains|owns)\s+(?:many|multiple|several|zero or more)\s+(?P<b>\w+)$"
    ))
    .expect("has-many regex is valid")
});

static HAS_ONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<a>\w+)\s+(?:has|have)\s+(?:one|an?|exactly one|a single)\s+(?P<b>\w+)$"
    ))
    .expect("has-one regex is valid")
});

static BELONGS_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<a>\w+)\s+belongs?\s+to\s+{ARTICLE}(?:one\s+)?(?P<b>\w+)$"
    ))
    .expect("belongs-to regex is valid")
});

static VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<a>\w+)\s+(?P<verb>places|contains|owns|writes|makes|holds|includes|references|creates|manages|submits|receives)\s+(?P<qty>many\s+|multiple\s+|several\s+|one\s+|an?\s+|the\s+)?(?P<b>\w+)$"
    ))
    .expect("verb regex is valid")
});

/// Relationship cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// `||--||`
    OneToOne,
    /// `||--o{`
    OneToMany,
    /// `}o--||`
    ManyToOne,
}

impl Cardinality {
    fn symbol(self) -> &'static str {
        match self {
            Self::OneToOne => "||--||",
            Self::OneToMany => "||--o{",
            Self::ManyToOne => "}o--||",
        }
    }
}

/// Entity with typed attributes `(type, name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Entity name
    pub name: String,
    /// `(type, name)` column pairs
    pub attributes: Vec<(String, String)>,
}

/// Relationship between two entity names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Left entity
    pub left: String,
    /// Right entity
    pub right: String,
    /// Crow's-foot cardinality
    pub cardinality: Cardinality,
    /// Relationship verb
    pub label: String,
}

/// ER structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErModel {
    /// Entities in first-mention order
    pub entities: Vec<Entity>,
    /// Relationships in description order
    pub relationships: Vec<Relationship>,
}

impl ErModel {
    fn entity_mut(&mut self, raw: &str) -> &mut Entity {
        let name = entity_name(raw);
        let idx = match self.entities.iter().position(|e| e.name == name) {
            Some(idx) => idx,
            None => {
                self.entities.push(Entity {
                    name,
                    attributes: Vec::new(),
                });
                self.entities.len() - 1
            }
        };
        &mut self.entities[idx]
    }

    fn relate(&mut self, left: &str, right: &str, cardinality: Cardinality, label: &str) {
        let left = self.entity_mut(left).name.clone();
        let right = self.entity_mut(right).name.clone();
        self.relationships.push(Relationship {
            left,
            right,
            cardinality,
            label: label.to_lowercase(),
        });
    }
}

fn entity_name(raw: &str) -> String {
    sanitize_id(&scan::singular(raw.trim())).to_ascii_uppercase()
}

fn is_plural(word: &str) -> bool {
    scan::singular(word) != word
}

/// Column type guessed from the attribute name
fn attribute_type(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower == "id" || lower.ends_with("_id") || lower.ends_with("count") || lower == "quantity" {
        "int"
    } else if ["price", "amount", "total", "balance", "cost"].iter().any(|w| lower.contains(w)) {
        "float"
    } else if lower.ends_with("date") || lower.ends_with("_at") || lower == "birthday" {
        "date"
    } else if lower.starts_with("is_") || lower.starts_with("has_") || lower == "active" {
        "boolean"
    } else {
        "string"
    }
}

/// ER diagram handler
#[derive(Debug, Clone, Copy, Default)]
pub struct ErHandler;

impl ErHandler {
    fn skeleton() -> ErModel {
        let mut model = ErModel {
            entities: Vec::new(),
            relationships: Vec::new(),
        };
        model.relate("Customer", "Order", Cardinality::OneToMany, "places");
        model
    }

    fn scan_clause(model: &mut ErModel, clause: &str) {
        if let Some(caps) = ATTRIBUTES.captures(clause) {
            let entity = model.entity_mut(&caps["entity"]);
            for item in scan::split_list(&caps["list"]) {
                let name = item
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .map(str::to_ascii_lowercase)
                    .collect::<Vec<_>>()
                    .join("_");
                if name.is_empty() || entity.attributes.iter().any(|(_, n)| *n == name) {
                    continue;
                }
                let name = sanitize_id(&name);
                entity.attributes.push((attribute_type(&name).to_string(), name));
            }
        } else if let Some(caps) = HAS_MANY.captures(clause) {
            model.relate(&caps["a"], &caps["b"], Cardinality::OneToMany, "has");
        } else if let Some(caps) = HAS_ONE.captures(clause) {
            model.relate(&caps["a"], &caps["b"], Cardinality::OneToOne, "has");
        } else if let Some(caps) = BELONGS_TO.captures(clause) {
            model.relate(&caps["a"], &caps["b"], Cardinality::ManyToOne, "belongs to");
        } else if let Some(caps) = VERB.captures(clause) {
            let qty = caps.name("qty").map_or("", |m| m.as_str().trim());
            let many = matches!(qty.to_ascii_lowercase().as_str(), "many" | "multiple" | "several")
                || (qty.is_empty() && is_plural(&caps["b"]));
            let cardinality = if many {
                Cardinality::OneToMany
            } else {
                Cardinality::OneToOne
            };
            model.relate(&caps["a"], &caps["b"], cardinality, &caps["verb"]);
        }
    }
}

impl Handler for ErHandler {}

impl DiagramFormat for ErHandler {
    type Elements = ErModel;

    const KEY: &'static str = "er";
    const HEADER: &'static str = "erDiagram";

    fn parse(&self, description: &str) -> ErModel {
        let mut model = ErModel {
            entities: Vec::new(),
            relationships: Vec::new(),
        };
        for clause in scan::clauses(description) {
            Self::scan_clause(&mut model, &clause);
        }
        if model.entities.is_empty() {
            return Self::skeleton();
        }
        model
    }

    fn render(&self, model: &ErModel, header: &str, _config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        for rel in &model.relationships {
            let _ = write!(
                out,
                "\n    {} {} {} : \"{}\"",
                rel.left,
                rel.cardinality.symbol(),
                rel.right,
                sanitize_label(&rel.label)
            );
        }
        for entity in &model.entities {
            let related = model
                .relationships
                .iter()
                .any(|r| r.left == entity.name || r.right == entity.name);
            if entity.attributes.is_empty() {
                if !related {
                    let _ = write!(out, "\n    {} {{\n    }}", entity.name);
                }
                continue;
            }
            let _ = write!(out, "\n    {} {{", entity.name);
            for (ty, name) in &entity.attributes {
                let _ = write!(out, "\n        {ty} {name}");
            }
            out.push_str("\n    }");
        }
        out
    }
}
