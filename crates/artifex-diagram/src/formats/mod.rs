//! Concrete diagram formats
//!
//! One module per sub-type. Each handler is stateless; [`default_handlers`]
//! registers one instance of each under its canonical key.

use crate::base::DiagramHandler;
use artifex_registry::{HandlerRegistry, RegistryError};
use std::sync::Arc;

mod class;
mod er;
mod flowchart;
mod gantt;
mod git_graph;
mod journey;
mod mindmap;
mod pie;
mod quadrant;
mod sequence;
mod state;
mod timeline;

pub use class::{ClassDef, ClassHandler, ClassModel, Relation, RelationKind};
pub use er::{Cardinality, Entity, ErHandler, ErModel, Relationship};
pub use flowchart::{FlowEdge, FlowGraph, FlowNode, FlowchartHandler, NodeShape};
pub use gantt::{GanttHandler, Schedule, Section, Task};
pub use git_graph::{GitGraphHandler, GitHistory, GitOp};
pub use journey::{sentiment, JourneyHandler, JourneyModel, Stage, Step};
pub use mindmap::{MindNode, MindmapHandler};
pub use pie::{PieHandler, PieModel, Slice};
pub use quadrant::{Point, QuadrantHandler, QuadrantModel};
pub use sequence::{Interaction, Message, MessageKind, SequenceHandler};
pub use state::{StateHandler, StateMachine, StateNode, Transition};
pub use timeline::{Period, TimelineHandler, TimelineModel};

/// Sub-type aliases accepted for the `diagram` capability
pub const ALIASES: &[(&str, &str)] = &[
    ("graph", "flowchart"),
    ("flow", "flowchart"),
    ("sequenceDiagram", "sequence"),
    ("classDiagram", "class"),
    ("stateDiagram", "state"),
    ("stateDiagram-v2", "state"),
    ("erDiagram", "er"),
    ("entity-relationship", "er"),
    ("userJourney", "journey"),
    ("quadrantChart", "quadrant"),
    ("gitgraph", "git-graph"),
    ("gitGraph", "git-graph"),
    ("git", "git-graph"),
];

/// Registry holding every built-in format under its canonical key
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateKey`] if two formats share a key.
pub fn default_handlers() -> Result<HandlerRegistry<dyn DiagramHandler>, RegistryError> {
    let handlers: [Arc<dyn DiagramHandler>; 12] = [
        Arc::new(FlowchartHandler),
        Arc::new(SequenceHandler),
        Arc::new(ClassHandler),
        Arc::new(StateHandler),
        Arc::new(GanttHandler),
        Arc::new(PieHandler),
        Arc::new(ErHandler),
        Arc::new(JourneyHandler),
        Arc::new(QuadrantHandler),
        Arc::new(GitGraphHandler),
        Arc::new(MindmapHandler),
        Arc::new(TimelineHandler),
    ];

    let mut registry = HandlerRegistry::new("diagram");
    for handler in handlers {
        registry.register(handler.key(), handler)?;
    }
    Ok(registry)
}
