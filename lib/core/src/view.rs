// Selection and connection-drawing state
use crate::model::{EdgeId, NodeId};

/// What the inspector is showing. A node and an edge are never selected at
/// the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

impl Selection {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Selection::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn edge_id(&self) -> Option<&str> {
        match self {
            Selection::Edge(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selection: Selection,
    /// UI hint: the user is drawing a connection.
    pub connection_mode: bool,
}

impl ViewState {
    pub fn select_node(&mut self, id: Option<NodeId>) {
        self.selection = id.map(Selection::Node).unwrap_or_default();
    }

    pub fn select_edge(&mut self, id: Option<EdgeId>) {
        self.selection = id.map(Selection::Edge).unwrap_or_default();
    }

    #[inline]
    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Drop the selection if it points at `id`.
    pub fn forget(&mut self, id: &str) {
        let hit = match &self.selection {
            Selection::Node(selected) | Selection::Edge(selected) => selected == id,
            Selection::None => false,
        };
        if hit {
            self.selection = Selection::None;
        }
    }
}
