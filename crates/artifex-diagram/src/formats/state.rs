//! State diagram format

use crate::base::{
    plain_text, sanitize_id, sanitize_label, DiagramConfig, DiagramFormat, DirectionStyle,
    FormatCapabilities,
};
use crate::scan;
use artifex_model::Direction;
use artifex_registry::Handler;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

static FROM_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^from\s+(?P<from>.+?)\s+to\s+(?P<to>.+?)(?:(?:\s*:\s*|\s+(?:on|when|after|via)\s+)(?P<event>.+))?$")
        .expect("from-to regex is valid")
});

static CHAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:->|→|\bgoes to\b|\bmoves to\b|\btransitions to\b|\bbecomes\b)\s*")
        .expect("chain regex is valid")
});

static EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<state>.+?)(?:\s*:\s*|\s+(?:on|when|after|via)\s+)(?P<event>.+)$")
        .expect("event regex is valid")
});

/// Named state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateNode {
    /// Sanitized identifier
    pub id: String,
    /// Display label
    pub label: String,
}

/// Transition between two state ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Source state id
    pub from: String,
    /// Target state id
    pub to: String,
    /// Triggering event
    pub event: Option<String>,
}

/// State machine structure
///
/// The first state is the initial state; states without outgoing
/// transitions are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateMachine {
    /// States in first-mention order
    pub states: Vec<StateNode>,
    /// Transitions in description order
    pub transitions: Vec<Transition>,
}

impl StateMachine {
    fn state(&mut self, raw: &str) -> String {
        let label = raw.trim().trim_start_matches("the ").trim().to_string();
        let id = sanitize_id(&scan::pascal_case(&label));
        if !self.states.iter().any(|s| s.id == id) {
            self.states.push(StateNode {
                id: id.clone(),
                label: scan::capitalize(&label),
            });
        }
        id
    }

    fn transition(&mut self, from: &str, to: &str, event: Option<&str>) {
        let from = self.state(from);
        let to = self.state(to);
        let event = event
            .map(plain_text)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self.transitions.push(Transition { from, to, event });
    }

    /// States with no outgoing transition
    #[must_use]
    pub fn final_states(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|s| !self.transitions.iter().any(|t| t.from == s.id))
            .map(|s| s.id.as_str())
            .collect()
    }
}

/// State diagram handler
#[derive(Debug, Clone, Copy, Default)]
pub struct StateHandler;

impl StateHandler {
    fn skeleton() -> StateMachine {
        let mut machine = StateMachine {
            states: Vec::new(),
            transitions: Vec::new(),
        };
        machine.transition("Idle", "Active", Some("start"));
        machine.transition("Active", "Done", Some("finish"));
        machine
    }

    fn scan_sentence(machine: &mut StateMachine, sentence: &str) -> bool {
        if let Some(caps) = FROM_TO.captures(sentence) {
            let event = caps.name("event").map(|m| m.as_str());
            machine.transition(&caps["from"], &caps["to"], event);
            return true;
        }

        let parts: Vec<&str> = CHAIN.split(sentence).map(str::trim).collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            return false;
        }
        let mut prev = parts[0].to_string();
        for part in &parts[1..] {
            let (target, event) = match EVENT.captures(part) {
                Some(caps) => (
                    caps["state"].to_string(),
                    Some(caps["event"].to_string()),
                ),
                None => ((*part).to_string(), None),
            };
            machine.transition(&prev, &target, event.as_deref());
            prev = target;
        }
        true
    }
}

impl Handler for StateHandler {}

impl DiagramFormat for StateHandler {
    type Elements = StateMachine;

    const KEY: &'static str = "state";
    const HEADER: &'static str = "stateDiagram-v2";

    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::directional(
            &[Direction::TB, Direction::BT, Direction::LR, Direction::RL],
            None,
            DirectionStyle::Statement,
        )
    }

    fn parse(&self, description: &str) -> StateMachine {
        let mut machine = StateMachine {
            states: Vec::new(),
            transitions: Vec::new(),
        };
        let mut leftovers = Vec::new();
        for sentence in scan::sentences(description) {
            if !Self::scan_sentence(&mut machine, &sentence) {
                leftovers.push(sentence);
            }
        }

        // No explicit transitions: treat the clauses as a linear lifecycle.
        if machine.transitions.is_empty() {
            let steps: Vec<String> = leftovers
                .iter()
                .flat_map(|s| scan::clauses(s))
                .map(|c| scan::truncate(&c, 40))
                .collect();
            for pair in steps.windows(2) {
                machine.transition(&pair[0], &pair[1], None);
            }
        }

        if machine.transitions.is_empty() {
            return Self::skeleton();
        }
        machine
    }

    fn render(&self, machine: &StateMachine, header: &str, _config: &DiagramConfig<'_>) -> String {
        let mut out = header.to_string();
        for state in &machine.states {
            if state.label != state.id {
                let _ = write!(
                    out,
                    "\n    state \"{}\" as {}",
                    sanitize_label(&state.label),
                    state.id
                );
            }
        }
        if let Some(initial) = machine.states.first() {
            let _ = write!(out, "\n    [*] --> {}", initial.id);
        }
        for t in &machine.transitions {
            let _ = write!(out, "\n    {} --> {}", t.from, t.to);
            if let Some(event) = &t.event {
                let _ = write!(out, " : {event}");
            }
        }
        for id in machine.final_states() {
            let _ = write!(out, "\n    {id} --> [*]");
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
        StateHandler.generate(&DiagramConfig {
            description,
            direction,
            features: &features,
        })
    }

    #[test]
    fn arrow_chain_with_events() {
        let machine = DiagramFormat::parse(&StateHandler, "Idle -> Running on start -> Stopped : halt");
        let ids: Vec<_> = machine.states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Idle", "Running", "Stopped"]);
        assert_eq!(machine.transitions[0].event.as_deref(), Some("start"));
        assert_eq!(machine.transitions[1].event.as_deref(), Some("halt"));
        assert_eq!(machine.final_states(), vec!["Stopped"]);
    }

    #[test]
    fn from_to_sentences() {
        let machine = DiagramFormat::parse(
            &StateHandler,
            "From draft to review when submitted. From review to published",
        );
        assert_eq!(machine.transitions.len(), 2);
        assert_eq!(machine.transitions[0].event.as_deref(), Some("submitted"));
        assert_eq!(machine.transitions[1].event, None);
    }

    #[test]
    fn states_without_transitions_form_lifecycle() {
        let machine = DiagramFormat::parse(&StateHandler, "Created. Paid. Shipped");
        assert_eq!(machine.transitions.len(), 2);
    }

    #[test]
    fn done_is_not_split_on_embedded_on() {
        let machine = DiagramFormat::parse(&StateHandler, "Idle -> Done");
        assert_eq!(machine.states[1].id, "Done");
        assert_eq!(machine.transitions[0].event, None);
    }

    #[test]
    fn render_start_end_and_labels() {
        let code = generate("waiting for payment -> paid", Some(Direction::LR));
        assert!(code.starts_with("stateDiagram-v2\n    direction LR"));
        assert!(code.contains("state \"Waiting for payment\" as WaitingForPayment"));
        assert!(code.contains("[*] --> WaitingForPayment"));
        assert!(code.contains("WaitingForPayment --> Paid"));
        assert!(code.contains("Paid --> [*]"));
    }

    #[test]
    fn skeleton_for_empty() {
        let code = generate("", None);
        assert!(code.contains("[*] --> Idle"));
        assert!(code.contains("Done --> [*]"));
    }
}
