//! Class diagram format

use crate::base::{sanitize_id, DiagramConfig, DiagramFormat, DirectionStyle, FormatCapabilities};
use crate::scan;
use artifex_model::Direction;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

const ARTICLE: &str = r"(?:an?\s+|the\s+)?";

static INHERITANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<child>\w+)\s+(?:extends|inherits from|is a kind of|is a type of|is an?)\s+{ARTICLE}(?P<parent>\w+)$"
    ))
    .expect("inheritance regex is valid")
});

static ATTRIBUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<class>\w+)\s+has\s+(?:attributes|fields|properties)\s+(?P<list>.+)$"
    ))
    .expect("attribute regex is valid")
});

static METHODS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<class>\w+)\s+(?:can|has methods|has operations)\s+(?P<list>.+)$"
    ))
    .expect("method regex is valid")
});

static ASSOCIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{ARTICLE}(?P<from>\w+)\s+(?P<verb>has many|has one|has an?|has|contains|owns|uses|depends on|references)\s+(?:many\s+|multiple\s+|several\s+|one\s+|an?\s+|the\s+)?(?P<to>\w+)$"
    ))
    .expect("association regex is valid")
});

/// Relationship kind between two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// `Parent <|-- Child`
    Inheritance,
    /// `Whole *-- Part`
    Composition,
    /// `Owner o-- Item`
    Aggregation,
    /// `Owner "1" o-- "*" Item`
    OneToMany,
    /// `Client ..> Service`
    Dependency,
}

/// One class with members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDef {
    /// Class name as written in the source
    pub name: String,
    /// Attribute names, deduplicated
    pub attributes: Vec<String>,
    /// Method names without parentheses
    pub methods: Vec<String>,
}

/// Relation between two class names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// Source class
    pub from: String,
    /// Target class
    pub to: String,
    /// Arrow kind
    pub kind: RelationKind,
    /// Optional edge label
    pub label: Option<String>,
}

/// Class diagram structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    /// Classes in first-mention order
    pub classes: Vec<ClassDef>,
    /// Relations in description order
    pub relations: Vec<Relation>,
}

impl ClassModel {
    fn class_mut(&mut self, raw: &str) -> &mut ClassDef {
        let name = class_name(raw);
        let idx = match self.classes.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.classes.push(ClassDef {
                    name,
                    attributes: Vec::new(),
                    methods: Vec::new(),
                });
                self.classes.len() - 1
            }
        };
        &mut self.classes[idx]
    }

    fn relate(&mut self, from: &str, to: &str, kind: RelationKind, label: Option<&str>) {
        let from = self.class_mut(from).name.clone();
        let to = self.class_mut(to).name.clone();
        self.relations.push(Relation {
            from,
            to,
            kind,
            label: label.map(str::to_string),
        });
    }
}

fn class_name(raw: &str) -> String {
    sanitize_id(&scan::pascal_case(&scan::singular(raw)))
}

fn member_name(raw: &str) -> String {
    let words: Vec<String> = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    sanitize_id(&words.join("_"))
}

/// Class diagram handler
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHandler;

impl ClassHandler {
    fn skeleton() -> ClassModel {
        ClassModel {
            classes: vec![
                ClassDef {
                    name: "Entity".to_string(),
                    attributes: vec!["id".to_string()],
                    methods: vec!["create".to_string()],
                },
                ClassDef {
                    name: "Item".to_string(),
                    attributes: vec!["name".to_string()],
                    methods: Vec::new(),
                },
            ],
            relations: vec![Relation {
                from: "Entity".to_string(),
                to: "Item".to_string(),
                kind: RelationKind::Aggregation,
                label: Some("has".to_string()),
            }],
        }
    }

    fn scan_clause(model: &mut ClassModel, clause: &str) {
        if let Some(caps) = INHERITANCE.captures(clause) {
            model.relate(&caps["parent"], &caps["child"], RelationKind::Inheritance, None);
        } else if let Some(caps) = ATTRIBUTES.captures(clause) {
            let class = model.class_mut(&caps["class"]);
            for attr in scan::split_list(&caps["list"]) {
                let attr = member_name(&attr);
                if !class.attributes.contains(&attr) {
                    class.attributes.push(attr);
                }
            }
        } else if let Some(caps) = METHODS.captures(clause) {
            let class = model.class_mut(&caps["class"]);
            for method in scan::split_list(&caps["list"]) {
                let method = member_name(&method);
                if !class.methods.contains(&method) {
                    class.methods.push(method);
                }
            }
        } else if let Some(caps) = ASSOCIATION.captures(clause) {
            let verb = caps["verb"].to_lowercase();
            let kind = match verb.as_str() {
                "has many" => RelationKind::OneToMany,
                "contains" => RelationKind::Composition,
                "uses" | "depends on" | "references" => RelationKind::Dependency,
                _ => RelationKind::Aggregation,
            };
            let label = verb.split_whitespace().next().unwrap_or("has").to_string();
            model.relate(&caps["from"], &caps["to"], kind, Some(&label));
        }
    }
}

impl Handler for ClassHandler {}

impl DiagramFormat for ClassHandler {
    type Elements = ClassModel;

    const KEY: &'static str = "class";
    const HEADER: &'static str = "classDiagram";

    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::directional(
            &[Direction::TB, Direction::BT, Direction::LR, Direction::RL],
            None,
            DirectionStyle::Statement,
        )
    }

    fn parse(&self, description: &str) -> ClassModel {
        let mut model = ClassModel {
            classes: Vec::new(),
            relations: Vec::new(),
        };
        for clause in scan::clauses(description) {
            Self::scan_clause(&mut model, &clause);
        }
        if model.classes.is_empty() {
            return Self::skeleton();
        }
        model
    }

    fn render(&self, model: &ClassModel, header: &str, _config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        for class in &model.classes {
            if class.attributes.is_empty() && class.methods.is_empty() {
                let _ = write!(out, "\n    class {}", class.name);
                continue;
            }
            let _ = write!(out, "\n    class {} {{", class.name);
            for attr in &class.attributes {
                let _ = write!(out, "\n        +{attr}");
            }
            for method in &class.methods {
                let _ = write!(out, "\n        +{method}()");
            }
            out.push_str("\n    }");
        }
        for rel in &model.relations {
            let _ = match rel.kind {
                RelationKind::Inheritance => write!(out, "\n    {} <|-- {}", rel.from, rel.to),
                RelationKind::Composition => write!(out, "\n    {} *-- {}", rel.from, rel.to),
                RelationKind::Aggregation => write!(out, "\n    {} o-- {}", rel.from, rel.to),
                RelationKind::OneToMany => {
                    write!(out, "\n    {} \"1\" o-- \"*\" {}", rel.from, rel.to)
                }
                RelationKind::Dependency => write!(out, "\n    {} ..> {}", rel.from, rel.to),
            };
            if let Some(label) = &rel.label {
                let _ = write!(out, " : {label}");
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

    fn generate(description: &str, direction: Option<Direction>) -> String {
        let features = AdvancedFeatures::new();
        ClassHandler.generate(&DiagramConfig {
            description,
            direction,
            features: &features,
        })
    }

    #[test]
    fn relations_and_members() {
        let model = DiagramFormat::parse(
            &ClassHandler,
            "Admin extends User. User has many orders. Order has attributes id, total and status. Order can submit and cancel",
        );
        let names: Vec<_> = model.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Admin", "Order"]);
        assert_eq!(model.relations[0].kind, RelationKind::Inheritance);
        assert_eq!(model.relations[1].kind, RelationKind::OneToMany);
        let order = &model.classes[2];
        assert_eq!(order.attributes, vec!["id", "total", "status"]);
        assert_eq!(order.methods, vec!["submit", "cancel"]);
    }

    #[test]
    fn render_uses_class_syntax() {
        let code = generate("Car is a Vehicle. Car uses Engine", Some(Direction::LR));
        assert!(code.starts_with("classDiagram\n    direction LR"));
        assert!(code.contains("Vehicle <|-- Car"));
        assert!(code.contains("Car ..> Engine : uses"));
    }

    #[test]
    fn td_is_not_a_class_direction() {
        let code = generate("Car is a Vehicle", Some(Direction::TD));
        assert!(!code.contains("direction"));
    }

    #[test]
    fn skeleton_when_nothing_matches() {
        let code = generate("make it nice", None);
        assert!(code.contains("class Entity {"));
        assert!(code.contains("Entity o-- Item : has"));
    }
}
