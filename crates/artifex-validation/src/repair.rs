//! Heuristic repair of malformed diagram source
//!
//! [`repair`] is a pure, deterministic rewrite aimed at the mistakes text
//! generators commonly make. It is idempotent: `repair(&repair(x)) ==
//! repair(x)` for every input. It does not guarantee the result is valid.

use crate::grammar::{self, is_significant};
use once_cell::sync::Lazy;
use regex::Regex;

static ER_CARDINALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[|}][|o](?:--|\.\.)[|o][|{]").expect("cardinality regex is valid")
});

static CLASS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+\w+\s*\{").expect("class block regex is valid"));

const STYLE_PREFIXES: &[&str] = &["style ", "classDef ", "linkStyle "];

/// Rewrite `code` into a form more likely to pass validation
#[must_use]
pub fn repair(code: &str) -> String {
    let normalized = code.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = normalized
        .split('\n')
        .map(|line| line.trim_end().to_string())
        .collect();

    strip_fences(&mut lines);

    for line in &mut lines {
        if STYLE_PREFIXES.iter().any(|p| line.trim_start().starts_with(p)) {
            *line = line.replace('=', ":").replace(';', ",");
        }
    }

    if let Some(idx) = lines.iter().position(|l| is_significant(l)) {
        let trimmed = lines[idx].trim_start();
        if trimmed == "graph" || trimmed.starts_with("graph ") {
            let indent = lines[idx].len() - trimmed.len();
            lines[idx] = format!("{}flowchart{}", &lines[idx][..indent], &trimmed["graph".len()..]);
        }
        if !grammar::has_known_header(&lines[idx]) {
            if let Some(header) = detect_header(&lines[idx..]) {
                tracing::debug!(header, "inserted missing diagram header");
                lines.insert(idx, header.to_string());
            }
        }
    }

    lines.join("\n")
}

/// Remove surrounding blank lines and Markdown code fences until stable
fn strip_fences(lines: &mut Vec<String>) {
    loop {
        let before = lines.len();
        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
            lines.remove(0);
        }
        if lines.last().is_some_and(|l| l.trim() == "```") {
            lines.pop();
        }
        if lines.len() == before {
            break;
        }
    }
}

/// Header for a body that clearly belongs to a known format
fn detect_header(body: &[String]) -> Option<&'static str> {
    let significant = || body.iter().map(|l| l.trim()).filter(|l| is_significant(l));

    if significant().any(|l| {
        l.contains("->>") || l.starts_with("participant ") || l.starts_with("actor ")
    }) {
        return Some("sequenceDiagram");
    }
    if significant().any(|l| ER_CARDINALITY.is_match(l)) {
        return Some("erDiagram");
    }
    if significant().any(|l| l.contains("[*]")) {
        return Some("stateDiagram-v2");
    }
    if significant().any(|l| l.contains("<|--") || CLASS_BLOCK.is_match(l)) {
        return Some("classDiagram");
    }
    if significant().any(|l| l.contains("-->") || l.contains("---")) {
        return Some("flowchart TD");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn strips_fences_and_whitespace() {
        let input = "\r\n```mermaid\r\nflowchart TD   \r\n    A --> B\r\n```\r\n\r\n";
        assert_eq!(repair(input), "flowchart TD\n    A --> B");
    }

    #[test]
    fn rewrites_legacy_graph_header() {
        assert_eq!(repair("graph LR\n    A --> B"), "flowchart LR\n    A --> B");
        assert_eq!(repair("graphql --> B"), "flowchart TD\ngraphql --> B");
    }

    #[test]
    fn canonicalizes_style_separators() {
        let repaired = repair("flowchart TD\n    A --> B\n    style A fill=#f9f;stroke=#333");
        assert!(repaired.ends_with("    style A fill:#f9f,stroke:#333"));
    }

    #[test]
    fn inserts_header_after_directives() {
        let repaired = repair("%%{init: {'theme':'dark'}}%%\nA --> B");
        assert_eq!(repaired, "%%{init: {'theme':'dark'}}%%\nflowchart TD\nA --> B");
    }

    #[test]
    fn detects_each_family() {
        let cases = [
            ("Alice->>Bob: Hi", "sequenceDiagram"),
            ("participant Alice", "sequenceDiagram"),
            ("CUSTOMER ||--o{ ORDER : places", "erDiagram"),
            ("[*] --> Idle", "stateDiagram-v2"),
            ("Animal <|-- Dog", "classDiagram"),
            ("class Dog {", "classDiagram"),
            ("A --- B", "flowchart TD"),
        ];
        for (body, header) in cases {
            let repaired = repair(body);
            assert_eq!(repaired.lines().next(), Some(header), "{body}");
        }
    }

    #[test]
    fn header_inserted_exactly_once() {
        let once = repair("A --> B\n    B --> C");
        let twice = repair(&once);
        let thrice = repair(&twice);
        assert_eq!(once, "flowchart TD\nA --> B\n    B --> C");
        assert_eq!(once, thrice);
        assert_eq!(thrice.matches("flowchart").count(), 1);
    }

    #[test]
    fn unrecognized_body_is_left_alone() {
        assert_eq!(repair("hello world"), "hello world");
        assert_eq!(repair(""), "");
    }

    proptest! {
        #[test]
        fn repair_is_idempotent(input in "[ a-z\\[\\]{}|o*<>=;:%`\r\n-]{0,80}") {
            let once = repair(&input);
            prop_assert_eq!(repair(&once), once);
        }

        #[test]
        fn repair_is_idempotent_on_line_soup(
            lines in proptest::collection::vec(
                prop_oneof![
                    Just("```mermaid".to_string()),
                    Just("```".to_string()),
                    Just("graph LR".to_string()),
                    Just("A --> B".to_string()),
                    Just("%% note".to_string()),
                    Just("  ".to_string()),
                    Just("style A fill=#fff;".to_string()),
                    Just("[*] --> S".to_string()),
                    "[a-z ]{0,10}",
                ],
                0..10,
            )
        ) {
            let input = lines.join("\n");
            let once = repair(&input);
            prop_assert_eq!(repair(&once), once);
        }
    }
}
