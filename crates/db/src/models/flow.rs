//! Flow document models (canvas persistence).
//!
//! Nodes and edges are stored as JSONB arrays in the editor's own shape and
//! decoded into the typed [`FlowNode`] / [`FlowEdge`] structs from core.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use wabiz_core::flow::{FlowDraft, FlowEdge, FlowNode};
use wabiz_core::types::{DbId, OwnerId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `flows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub name: String,
    pub nodes: Json<Vec<FlowNode>>,
    pub edges: Json<Vec<FlowEdge>>,
    pub trigger_keywords: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Flow {
    /// Convert the stored row back into an editable draft.
    pub fn into_draft(self) -> FlowDraft {
        FlowDraft {
            id: Some(self.id),
            name: self.name,
            nodes: self.nodes.0,
            edges: self.edges.0,
            trigger_keywords: self.trigger_keywords,
            is_active: self.is_active,
        }
    }
}

/// Lightweight listing row (no graph payload).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub id: DbId,
    pub name: String,
    pub trigger_keywords: Vec<String>,
    pub is_active: bool,
    pub node_count: i32,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Save outcome
// ---------------------------------------------------------------------------

/// How [`crate::repositories::FlowRepo::save`] persisted a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new document was inserted under the requested name.
    Created,
    /// An existing document was updated in place.
    Updated,
    /// The requested name belonged to another document; a new document was
    /// inserted under a disambiguated name.
    Renamed,
}

/// Result of saving a draft.
#[derive(Debug, Clone, Serialize)]
pub struct SavedFlow {
    pub flow: Flow,
    pub outcome: SaveOutcome,
}
