//! Flow-authoring data model and canvas editor.
//!
//! A flow is a directed graph of automated WhatsApp actions authored on the
//! dashboard canvas. This module holds the node/edge wire types, the
//! in-memory [`FlowCanvas`] editor and the [`FlowDraft`] produced on save.
//!
//! The graph is never executed. No validation is applied to node content,
//! and the graph may be cyclic, disconnected, or carry dangling edges after
//! a node is deleted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of generated node ids (`node_1`, `node_2`, ...).
pub const NODE_ID_PREFIX: &str = "node_";

/// Prefix of generated edge ids (`edge_1`, `edge_2`, ...).
pub const EDGE_ID_PREFIX: &str = "edge_";

/// Default greeting placed in new message nodes.
pub const DEFAULT_MESSAGE_CONTENT: &str = "Hello! How can I help you today?";

/// Maximum length of a flow name.
pub const MAX_FLOW_NAME_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// The kind of step a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Trigger,
    Message,
    Question,
    Condition,
    Delay,
}

impl NodeKind {
    /// All node kinds, in palette order.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Trigger,
        NodeKind::Message,
        NodeKind::Question,
        NodeKind::Condition,
        NodeKind::Delay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Message => "message",
            NodeKind::Question => "question",
            NodeKind::Condition => "condition",
            NodeKind::Delay => "delay",
        }
    }

    /// Payload a freshly dropped node of this kind starts with.
    pub fn default_data(self) -> Value {
        match self {
            NodeKind::Trigger => json!({ "label": "Trigger", "keywords": [] }),
            NodeKind::Message => json!({ "content": DEFAULT_MESSAGE_CONTENT, "buttons": [] }),
            NodeKind::Question => {
                json!({ "question": "What would you like to know?", "variable": "answer" })
            }
            NodeKind::Condition => json!({ "variable": "", "operator": "equals", "value": "" }),
            NodeKind::Delay => json!({ "duration": 5, "unit": "minutes" }),
        }
    }
}

impl FromStr for NodeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown node kind '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Graph wire types
// ---------------------------------------------------------------------------

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single step on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique within the document.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    /// Kind-specific payload. Free-form, never validated.
    #[serde(default = "empty_object")]
    pub data: Value,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub animated: bool,
    /// Remaining style metadata from the editor (`style`, `markerEnd`,
    /// handles, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

// ---------------------------------------------------------------------------
// Save payload
// ---------------------------------------------------------------------------

/// Serialized flow document produced by [`FlowCanvas::save`].
///
/// `id` is set when the canvas was loaded from a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDraft {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Split a comma-separated keyword input into trimmed, non-empty keywords.
///
/// `"hello, hi ,"` becomes `["hello", "hi"]`.
pub fn parse_trigger_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Name used when a save collides with another document of the same owner.
pub fn disambiguated_name(name: &str, now: Timestamp) -> String {
    format!("{name} ({})", now.timestamp_millis())
}

/// Validate a flow name before persisting.
pub fn validate_flow_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Flow name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_FLOW_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Flow name must be at most {MAX_FLOW_NAME_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Canvas editor
// ---------------------------------------------------------------------------

/// One editing step, as sent by the canvas client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CanvasOp {
    AddNode {
        kind: NodeKind,
        #[serde(default)]
        position: Position,
    },
    UpdateNodeData {
        node_id: String,
        patch: Value,
    },
    DeleteNode {
        node_id: String,
    },
    Connect {
        source: String,
        target: String,
    },
    Rename {
        name: String,
    },
    SetTriggerKeywords {
        input: String,
    },
    SetActive {
        is_active: bool,
    },
}

/// In-memory editing state of one flow document.
#[derive(Debug, Clone)]
pub struct FlowCanvas {
    id: Option<DbId>,
    name: String,
    /// Keywords as loaded; replaced by `trigger_input` once that is edited.
    trigger_keywords: Vec<String>,
    trigger_input: Option<String>,
    is_active: bool,
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    next_node_seq: u64,
    next_edge_seq: u64,
}

impl FlowCanvas {
    /// Start an empty, unsaved canvas.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            trigger_keywords: Vec::new(),
            trigger_input: None,
            is_active: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            next_node_seq: 1,
            next_edge_seq: 1,
        }
    }

    /// Load a stored (or client-held) document into the editor.
    ///
    /// Id counters resume after the highest generated id already present.
    /// Stored keywords are kept verbatim until the keyword text is edited.
    pub fn from_draft(draft: FlowDraft) -> Self {
        let next_node_seq = next_seq(draft.nodes.iter().map(|n| n.id.as_str()), NODE_ID_PREFIX);
        let next_edge_seq = next_seq(draft.edges.iter().map(|e| e.id.as_str()), EDGE_ID_PREFIX);
        Self {
            id: draft.id,
            name: draft.name,
            trigger_keywords: draft.trigger_keywords,
            trigger_input: None,
            is_active: draft.is_active,
            nodes: draft.nodes,
            edges: draft.edges,
            next_node_seq,
            next_edge_seq,
        }
    }

    pub fn id(&self) -> Option<DbId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Raw comma-separated keyword text, parsed only on save.
    pub fn set_trigger_input(&mut self, input: impl Into<String>) {
        self.trigger_input = Some(input.into());
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Insert a node of `kind` at `position` with the kind's default payload.
    ///
    /// Returns the new node id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let id = format!("{NODE_ID_PREFIX}{}", self.next_node_seq);
        self.next_node_seq = self.next_node_seq.saturating_add(1);
        self.nodes.push(FlowNode {
            id: id.clone(),
            kind,
            position,
            data: kind.default_data(),
        });
        id
    }

    /// Shallow-merge the keys of `patch` into the node's `data`.
    pub fn update_node_data(&mut self, node_id: &str, patch: &Value) -> Result<(), CoreError> {
        let patch = patch
            .as_object()
            .ok_or_else(|| CoreError::Validation("Node data patch must be a JSON object".into()))?;
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| unknown_node(node_id))?;

        if !node.data.is_object() {
            node.data = empty_object();
        }
        if let Value::Object(data) = &mut node.data {
            for (key, value) in patch {
                data.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    /// Remove a node. Edges pointing at it are left as they are.
    pub fn delete_node(&mut self, node_id: &str) -> Result<FlowNode, CoreError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| unknown_node(node_id))?;
        Ok(self.nodes.remove(index))
    }

    /// Append an edge from `source` to `target`. Cycles and duplicates are
    /// accepted.
    ///
    /// Returns the new edge id.
    pub fn connect(&mut self, source: &str, target: &str) -> String {
        let id = format!("{EDGE_ID_PREFIX}{}", self.next_edge_seq);
        self.next_edge_seq = self.next_edge_seq.saturating_add(1);
        self.edges.push(FlowEdge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            animated: true,
            extra: Map::new(),
        });
        id
    }

    /// Apply a single client operation.
    pub fn apply(&mut self, op: CanvasOp) -> Result<(), CoreError> {
        match op {
            CanvasOp::AddNode { kind, position } => {
                self.add_node(kind, position);
            }
            CanvasOp::UpdateNodeData { node_id, patch } => self.update_node_data(&node_id, &patch)?,
            CanvasOp::DeleteNode { node_id } => {
                self.delete_node(&node_id)?;
            }
            CanvasOp::Connect { source, target } => {
                self.connect(&source, &target);
            }
            CanvasOp::Rename { name } => self.set_name(name),
            CanvasOp::SetTriggerKeywords { input } => self.set_trigger_input(input),
            CanvasOp::SetActive { is_active } => self.set_active(is_active),
        }
        Ok(())
    }

    /// Serialize the whole document for an explicit save.
    ///
    /// The canvas itself is left untouched so a failed save loses no edits.
    pub fn save(&self) -> Result<FlowDraft, CoreError> {
        validate_flow_name(&self.name)?;
        let mut draft = self.snapshot();
        draft.name = draft.name.trim().to_string();
        Ok(draft)
    }

    /// Current document state without name validation, for returning an
    /// unsaved graph to the client.
    pub fn snapshot(&self) -> FlowDraft {
        FlowDraft {
            id: self.id,
            name: self.name.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            trigger_keywords: self
                .trigger_input
                .as_deref()
                .map_or_else(|| self.trigger_keywords.clone(), parse_trigger_keywords),
            is_active: self.is_active,
        }
    }
}

fn unknown_node(node_id: &str) -> CoreError {
    CoreError::Validation(format!("Unknown node '{node_id}'"))
}

/// First free sequence number after the generated ids in `ids`.
fn next_seq<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
