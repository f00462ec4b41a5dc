//! Sequence diagram format

use crate::base::{sanitize_id, sanitize_label, DiagramConfig, DiagramFormat};
use crate::scan;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static ARROW_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<from>[\w ]+?)\s*(?:->>|-->>|->|→)\s*(?P<to>[\w ]+?)\s*(?::\s*(?P<text>.+))?$")
        .expect("arrow message regex is valid")
});

static VERB_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:the\s+)?(?P<from>[A-Za-z][\w]*)\s+(?P<verb>sends|requests|calls|asks|queries|returns|responds|replies|notifies|forwards|submits|fetches|posts|publishes|validates|checks)\s+(?P<rest>.+)$",
    )
    .expect("verb message regex is valid")
});

static RECEIVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:to|from|with)\s+(?:the\s+)?(?P<to>[A-Za-z][\w]*)")
        .expect("receiver regex is valid")
});

const REPLY_VERBS: &[&str] = &["returns", "responds", "replies"];

/// Message arrow kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Solid arrow `->>`
    Request,
    /// Dotted arrow `-->>`
    Reply,
}

/// Single message between participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Sender
    pub from: String,
    /// Receiver
    pub to: String,
    /// Message text
    pub text: String,
    /// Arrow kind
    pub kind: MessageKind,
}

/// Sequence structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    /// Participants in first-mention order
    pub participants: Vec<String>,
    /// Messages in order
    pub messages: Vec<Message>,
}

impl Interaction {
    fn participant(&mut self, name: &str) -> String {
        let id = sanitize_id(&scan::capitalize(name));
        if !self.participants.contains(&id) {
            self.participants.push(id.clone());
        }
        id
    }
}

/// Sequence diagram handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceHandler;

impl SequenceHandler {
    fn skeleton() -> Interaction {
        Interaction {
            participants: vec!["User".to_string(), "System".to_string()],
            messages: vec![
                Message {
                    from: "User".to_string(),
                    to: "System".to_string(),
                    text: "Request".to_string(),
                    kind: MessageKind::Request,
                },
                Message {
                    from: "System".to_string(),
                    to: "User".to_string(),
                    text: "Response".to_string(),
                    kind: MessageKind::Reply,
                },
            ],
        }
    }

    fn scan_sentence(model: &mut Interaction, sentence: &str) {
        if let Some(caps) = ARROW_MESSAGE.captures(sentence) {
            let from = model.participant(&caps["from"]);
            let to = model.participant(&caps["to"]);
            let text = caps
                .name("text")
                .map_or_else(|| "message".to_string(), |m| m.as_str().to_string());
            let kind = if sentence.contains("-->>") {
                MessageKind::Reply
            } else {
                MessageKind::Request
            };
            model.messages.push(Message { from, to, text, kind });
            return;
        }

        let Some(caps) = VERB_MESSAGE.captures(sentence) else {
            return;
        };
        let rest = &caps["rest"];
        let Some(receiver) = RECEIVER.captures(rest) else {
            return;
        };
        let verb = caps["verb"].to_lowercase();
        let from = model.participant(&caps["from"]);
        let to = model.participant(&receiver["to"]);
        let object = RECEIVER.replace(rest, "").trim().to_string();
        let text = if object.is_empty() {
            verb.clone()
        } else {
            format!("{verb} {object}")
        };
        let kind = if REPLY_VERBS.contains(&verb.as_str()) {
            MessageKind::Reply
        } else {
            MessageKind::Request
        };
        model.messages.push(Message {
            from,
            to,
            text: scan::truncate(&text, 60),
            kind,
        });
    }
}

impl Handler for SequenceHandler {}

impl DiagramFormat for SequenceHandler {
    type Elements = Interaction;

    const KEY: &'static str = "sequence";
    const HEADER: &'static str = "sequenceDiagram";

    fn parse(&self, description: &str) -> Interaction {
        let mut model = Interaction {
            participants: Vec::new(),
            messages: Vec::new(),
        };
        for sentence in scan::sentences(description) {
            Self::scan_sentence(&mut model, &sentence);
        }
        if model.messages.is_empty() {
            return Self::skeleton();
        }
        model
    }

    fn render(&self, model: &Interaction, header: &str, config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        if config.flag("autonumber") {
            out.push_str("\n    autonumber");
        }
        for participant in &model.participants {
            let _ = write!(out, "\n    participant {participant}");
        }
        for message in &model.messages {
            let arrow = match message.kind {
                MessageKind::Request => "->>",
                MessageKind::Reply => "-->>",
            };
            let _ = write!(
                out,
                "\n    {}{}{}: {}",
                message.from,
                arrow,
                message.to,
                sanitize_label(&message.text)
            );
        }
        out
    }
}
