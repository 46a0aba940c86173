// Batched change events emitted by the canvas
use serde::{Deserialize, Serialize};

use crate::model::{EdgeDraft, EdgeId, NodeId, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    /// A move. `dragging` is `Some(true)` for intermediate frames and
    /// `Some(false)` once the node settles.
    Position {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: Option<bool>,
    },
    Dimensions {
        id: NodeId,
        width: f64,
        height: f64,
    },
    Select {
        id: NodeId,
        selected: bool,
    },
    Remove {
        id: NodeId,
    },
}

impl NodeChange {
    /// Changes that close a logical edit and therefore deserve an undo step.
    pub fn settles(&self) -> bool {
        matches!(
            self,
            NodeChange::Remove { .. } | NodeChange::Position { dragging: Some(false), .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
}

/// A connection drawn between two node handles on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl From<Connection> for EdgeDraft {
    fn from(connection: Connection) -> Self {
        EdgeDraft {
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            ..EdgeDraft::new(connection.source, connection.target)
        }
    }
}
