//! Shallow description scanning
//!
//! Keyword and token level helpers shared by the format parsers. Nothing
//! here attempts real language understanding.

use once_cell::sync::Lazy;
use regex::Regex;

static CLAUSE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:;|->|→|=>|\.\s+|\.$|,?\s+then\s+|,?\s+and then\s+)\s*")
        .expect("clause regex is valid")
});

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("list marker regex is valid"));

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:;|\.\s+|\.$)\s*").expect("sentence regex is valid"));

static LIST_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:,|\band\b|&)\s*").expect("list split regex is valid"));

/// Split a description into ordered clauses
///
/// Lines are split first (list markers stripped), then each line on
/// sentence ends, semicolons, arrows and "then". Question marks stay on
/// their clause.
#[must_use]
pub fn clauses(text: &str) -> Vec<String> {
    text.replace("? ", "?\n")
        .replace("! ", "!\n")
        .lines()
        .map(|line| LIST_MARKER.replace(line, "").into_owned())
        .flat_map(|line| {
            CLAUSE_BREAK
                .split(&line)
                .map(|c| c.trim().trim_end_matches(['.', ',']).trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// Split into sentences only, keeping arrows and "then" intact
#[must_use]
pub fn sentences(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LIST_MARKER.replace(line, "").into_owned())
        .flat_map(|line| {
            SENTENCE_BREAK
                .split(&line)
                .map(|c| c.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// Split an enumeration such as `a, b and c`
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    LIST_SPLIT
        .split(text)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Truncate to at most `max` characters on a word boundary when possible
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > max / 2 => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}

/// `order service` -> `OrderService`
#[must_use]
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

/// Capitalize the first character
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Naive singular form (`Orders` -> `Order`, `Address` unchanged)
#[must_use]
pub fn singular(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.len() > 4 && lower.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Whether `haystack` contains any of `needles` (case-insensitive)
#[must_use]
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

/// Section heading marker (`Section: Build`, `Phase 2`, `Design:`)
#[must_use]
pub fn section_heading(clause: &str) -> Option<String> {
    let trimmed = clause.trim();
    let lower = trimmed.to_lowercase();
    for prefix in ["section ", "phase ", "stage "] {
        if !lower.starts_with(prefix) {
            continue;
        }
        if let Some(rest) = trimmed.get(prefix.len()..) {
            let rest = rest.trim().trim_end_matches(':').trim();
            let name = if prefix == "section " {
                rest.to_string()
            } else {
                format!("{} {rest}", capitalize(prefix.trim_end()))
            };
            return Some(name.trim().to_string()).filter(|n| !n.is_empty());
        }
    }
    trimmed
        .strip_suffix(':')
        .map(|name| name.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Split `Heading: rest` into a section name and the remaining text
///
/// Plain clauses come back as `(None, Some(clause))`, bare headings as
/// `(Some(name), None)`.
#[must_use]
pub fn split_heading(clause: &str) -> (Option<String>, Option<&str>) {
    if let Some((head, rest)) = clause.split_once(':') {
        let rest = rest.trim();
        if !rest.is_empty() {
            if let Some(name) = section_heading(&format!("{head}:")) {
                return (Some(name), Some(rest));
            }
        }
    }
    match section_heading(clause) {
        Some(name) => (Some(name), None),
        None => (None, Some(clause)),
    }
}

/// First clause as title plus the remaining clauses
///
/// A single clause is only a title; the body is then empty.
#[must_use]
pub fn title_and_body(clauses: &[String]) -> (Option<String>, &[String]) {
    match clauses.split_first() {
        Some((first, rest)) => (Some(truncate(first, 60)), rest),
        None => (None, &[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clauses_split_sentences_arrows_and_then() {
        let got = clauses("Login -> Validate credentials. Load dashboard then show alerts");
        assert_eq!(
            got,
            vec!["Login", "Validate credentials", "Load dashboard", "show alerts"]
        );
    }

    #[test]
    fn clauses_strip_list_markers_and_keep_decimals() {
        let got = clauses("1. Measure 3.5 units\n- Cut board\n\n* Sand");
        assert_eq!(got, vec!["Measure 3.5 units", "Cut board", "Sand"]);
    }

    #[test]
    fn sentences_keep_arrows() {
        let got = sentences("User -> API: login. API -> DB: query");
        assert_eq!(got, vec!["User -> API: login", "API -> DB: query"]);
    }

    #[test]
    fn clauses_keep_question_marks() {
        let got = clauses("Is it valid? Save it");
        assert_eq!(got, vec!["Is it valid?", "Save it"]);
    }

    #[test]
    fn clauses_empty() {
        assert!(clauses("   \n ").is_empty());
    }

    #[test]
    fn split_list_on_commas_and_and() {
        assert_eq!(split_list("name, email and age"), vec!["name", "email", "age"]);
    }

    #[test]
    fn truncate_on_word_boundary() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("the quick brown fox", 12), "the quick");
    }

    #[test]
    fn case_helpers() {
        assert_eq!(pascal_case("order service"), "OrderService");
        assert_eq!(capitalize("idle"), "Idle");
        assert_eq!(singular("Orders"), "Order");
        assert_eq!(singular("Categories"), "Category");
        assert_eq!(singular("Address"), "Address");
        assert_eq!(singular("Status"), "Status");
    }

    #[test]
    fn section_heading_variants() {
        assert_eq!(section_heading("Section Build"), Some("Build".to_string()));
        assert_eq!(section_heading("phase 2"), Some("Phase 2".to_string()));
        assert_eq!(section_heading("Design:"), Some("Design".to_string()));
        assert_eq!(section_heading("Write code"), None);
    }

    #[test]
    fn split_heading_variants() {
        assert_eq!(split_heading("Phase 1: Design"), (Some("Phase 1".to_string()), Some("Design")));
        assert_eq!(split_heading("Section Build"), (Some("Build".to_string()), None));
        assert_eq!(split_heading("Write code"), (None, Some("Write code")));
    }

    #[test]
    fn title_and_body_split() {
        let cs = vec!["Launch".to_string(), "Plan".to_string()];
        let (title, body) = title_and_body(&cs);
        assert_eq!(title.as_deref(), Some("Launch"));
        assert_eq!(body.len(), 1);
    }
}
