//! Header tokens and cheap structural facts about diagram sources

/// Header tokens accepted as the first significant line
pub const KNOWN_HEADERS: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "gantt",
    "pie",
    "erDiagram",
    "journey",
    "quadrantChart",
    "gitGraph",
    "mindmap",
    "timeline",
];

/// Whether a line is a comment or directive (`%% ...`, `%%{init}%%`)
#[inline]
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with("%%")
}

/// Whether a line carries content
#[inline]
pub(crate) fn is_significant(line: &str) -> bool {
    !line.trim().is_empty() && !is_comment(line)
}

/// First whitespace-separated token of a line, without a trailing `:`
pub(crate) fn first_token(line: &str) -> &str {
    line.split_whitespace()
        .next()
        .map_or("", |token| token.trim_end_matches(':'))
}

/// Whether `line` opens with a known header token
pub(crate) fn has_known_header(line: &str) -> bool {
    KNOWN_HEADERS.contains(&first_token(line))
}
