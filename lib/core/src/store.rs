use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::changes::{Connection, EdgeChange, NodeChange};
use crate::history::{History, Snapshot, DEFAULT_HISTORY_LIMIT};
use crate::ids;
use crate::model::{
    CustomDetail, DetailId, Edge, EdgeDraft, EdgeId, HardwareType, MonitorRecord, Node, NodeData,
    NodeId, NodeKind, Patch, PersistedState, Position, Project, ProjectId, ProjectType,
};
use crate::view::{Selection, ViewState};
use crate::{Error, Result};

/// Configuration for a topology store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub history_limit: usize,
    /// Top-left corner of the region new nodes are dropped into.
    pub spawn_origin: Position,
    /// Width and height of that region.
    pub spawn_spread: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            spawn_origin: Position::new(250.0, 150.0),
            spawn_spread: 200.0,
        }
    }
}

/// Receiver for state the store wants persisted.
///
/// `state_changed` fires whenever the project list or the active pointer may
/// have changed; `push_requested` additionally asks for the collection to be
/// written to the remote store. Implementations must not call back into the
/// store.
pub trait ChangeSink: Send + Sync {
    fn state_changed(&self, state: &PersistedState);
    fn push_requested(&self, state: &PersistedState, revision: u64);
}

/// The single authoritative model of the open topology.
///
/// `nodes`/`edges` are the working copy of the active project and are
/// written back into `projects` after every mutation.
pub struct TopologyStore {
    config: StoreConfig,
    projects: Vec<Project>,
    current_project_id: Option<ProjectId>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    history: History,
    view: ViewState,
    revision: u64,
    sink: Option<Arc<dyn ChangeSink>>,
}

impl TopologyStore {
    pub fn new(config: StoreConfig) -> Self {
        let history = History::new(config.history_limit);
        Self {
            config,
            projects: Vec::new(),
            current_project_id: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            history,
            view: ViewState::default(),
            revision: 0,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn attach_sink(&mut self, sink: Arc<dyn ChangeSink>) {
        self.sink = Some(sink);
    }

    // ==================== Read view ====================

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[inline]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[inline]
    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_project_id.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.view.selection
    }

    /// The selected node, resolved against the live working copy.
    pub fn selected_node(&self) -> Option<&Node> {
        self.view.selection.node_id().and_then(|id| self.node(id))
    }

    pub fn selected_edge(&self) -> Option<&Edge> {
        self.view.selection.edge_id().and_then(|id| self.edge(id))
    }

    #[inline]
    pub fn connection_mode(&self) -> bool {
        self.view.connection_mode
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Monotonic counter of local edits.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            projects: self.projects.clone(),
            current_project_id: self.current_project_id.clone(),
        }
    }

    // ==================== Selection / view ====================

    pub fn select_node(&mut self, id: Option<&str>) {
        self.view.select_node(id.map(str::to_string));
    }

    pub fn select_edge(&mut self, id: Option<&str>) {
        self.view.select_edge(id.map(str::to_string));
    }

    pub fn set_connection_mode(&mut self, enabled: bool) {
        self.view.connection_mode = enabled;
    }

    // ==================== History ====================

    /// Capture the current `{nodes, edges}` as an undo step.
    pub fn take_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore_snapshot(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore_snapshot(next);
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.view.clear_selection();
        self.commit();
    }

    // ==================== Nodes ====================

    /// Place a new node at a randomized spot in the spawn region.
    pub fn add_node_from_data(&mut self, data: NodeData) -> NodeId {
        self.take_snapshot();

        let kind = if data.hardware_type == HardwareType::Shape {
            NodeKind::Shape
        } else if self.current_project().map(|p| &p.kind) == Some(&ProjectType::Electrical) {
            NodeKind::Electrical
        } else {
            NodeKind::Hardware
        };

        let mut rng = rand::rng();
        let spread = self.config.spawn_spread;
        let position = Position::new(
            self.config.spawn_origin.x + rng.random::<f64>() * spread,
            self.config.spawn_origin.y + rng.random::<f64>() * spread,
        );

        let node = Node::new(ids::next_node_id(), kind, position, data);
        let id = node.id.clone();
        self.nodes.push(node);
        self.commit();
        id
    }

    /// Insert a fully formed node as-is.
    pub fn add_node(&mut self, node: Node) {
        self.take_snapshot();
        self.nodes.push(node);
        self.commit();
    }

    /// Shallow-merge `patch` into the node's `data`.
    ///
    /// An unknown id is a no-op mutation: it still records history and syncs.
    pub fn update_node(&mut self, id: &str, patch: &Patch) -> Result<()> {
        let merged = match self.node(id) {
            Some(node) => Some(patch.apply(&node.data)?),
            None => None,
        };

        self.take_snapshot();
        if let Some(data) = merged {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
                node.data = data;
            }
        } else {
            debug!(node_id = id, "update for unknown node");
        }
        self.commit();
        Ok(())
    }

    /// Remove a node and every edge attached to it.
    pub fn delete_node(&mut self, id: &str) {
        self.take_snapshot();
        self.remove_node_cascading(id);
        self.commit();
    }

    fn remove_node_cascading(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| !e.touches(id));
        self.view.forget(id);
        if let Some(edge_id) = self.view.selection.edge_id() {
            if self.edge(edge_id).is_none() {
                self.view.clear_selection();
            }
        }
    }

    /// Apply a batch of canvas node events.
    ///
    /// Intermediate drag frames do not create undo steps; a batch that
    /// settles a drag or removes a node records exactly one.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        if changes.is_empty() {
            return;
        }
        if changes.iter().any(NodeChange::settles) {
            self.take_snapshot();
        }

        for change in changes {
            match change {
                NodeChange::Position { id, position, .. } => {
                    if let (Some(node), Some(position)) = (self.node_mut(id), position) {
                        node.position = *position;
                    }
                }
                NodeChange::Dimensions { id, width, height } => {
                    if let Some(node) = self.node_mut(id) {
                        node.extra.insert(
                            "measured".to_string(),
                            serde_json::json!({ "width": width, "height": height }),
                        );
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.node_mut(id) {
                        node.extra.insert("selected".to_string(), Value::Bool(*selected));
                    }
                }
                NodeChange::Remove { id } => self.remove_node_cascading(id),
            }
        }
        self.commit();
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    // ==================== Edges ====================

    pub fn add_edge_from_data(&mut self, draft: EdgeDraft) -> EdgeId {
        self.take_snapshot();
        let edge = draft.into_edge(ids::new_edge_id());
        let id = edge.id.clone();
        self.edges.push(edge);
        self.view.connection_mode = false;
        self.commit();
        id
    }

    /// Canvas drag-connect between two handles.
    pub fn connect(&mut self, connection: Connection) -> EdgeId {
        self.add_edge_from_data(connection.into())
    }

    /// Shallow-merge `patch` over the edge's top-level fields. The id is kept.
    pub fn update_edge(&mut self, id: &str, patch: &Patch) -> Result<()> {
        let merged = match self.edge(id) {
            Some(edge) => {
                let mut merged = patch.apply(edge)?;
                merged.id = edge.id.clone();
                if patch.get("animationType").is_some() || patch.get("lineType").is_some() {
                    merged.sync_render_data();
                }
                Some(merged)
            }
            None => None,
        };

        self.take_snapshot();
        if let Some(merged) = merged {
            if let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) {
                *edge = merged;
            }
        } else {
            debug!(edge_id = id, "update for unknown edge");
        }
        self.commit();
        Ok(())
    }

    pub fn delete_edge(&mut self, id: &str) {
        self.take_snapshot();
        self.edges.retain(|e| e.id != id);
        self.view.forget(id);
        self.commit();
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        if changes.is_empty() {
            return;
        }
        if changes.iter().any(|c| matches!(c, EdgeChange::Remove { .. })) {
            self.take_snapshot();
        }

        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
                        edge.extra.insert("selected".to_string(), Value::Bool(*selected));
                    }
                }
                EdgeChange::Remove { id } => {
                    self.edges.retain(|e| &e.id != id);
                    self.view.forget(id);
                }
            }
        }
        self.commit();
    }

    // ==================== Custom details ====================

    pub fn add_node_detail(
        &mut self,
        node_id: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<DetailId> {
        self.require_node(node_id)?;
        self.take_snapshot();

        let detail = CustomDetail {
            id: ids::new_detail_id(),
            key: key.into(),
            value: value.into(),
        };
        let id = detail.id.clone();
        if let Some(node) = self.node_mut(node_id) {
            node.data.custom_details.push(detail);
        }
        self.commit();
        Ok(id)
    }

    pub fn update_node_detail(
        &mut self,
        node_id: &str,
        detail_id: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.require_node(node_id)?;
        self.take_snapshot();

        let (key, value) = (key.into(), value.into());
        if let Some(node) = self.node_mut(node_id) {
            for detail in node.data.custom_details.iter_mut().filter(|d| d.id == detail_id) {
                detail.key = key.clone();
                detail.value = value.clone();
            }
        }
        self.commit();
        Ok(())
    }

    pub fn delete_node_detail(&mut self, node_id: &str, detail_id: &str) -> Result<()> {
        self.require_node(node_id)?;
        self.take_snapshot();
        if let Some(node) = self.node_mut(node_id) {
            node.data.custom_details.retain(|d| d.id != detail_id);
        }
        self.commit();
        Ok(())
    }

    fn require_node(&self, id: &str) -> Result<()> {
        match self.node(id) {
            Some(_) => Ok(()),
            None => Err(Error::NodeNotFound(id.to_string())),
        }
    }

    // ==================== Monitor link ====================

    /// Link a node to an external monitor, copying its status and latency,
    /// or unlink it with `None`.
    pub fn link_monitor(&mut self, node_id: &str, monitor: Option<&MonitorRecord>) -> Result<()> {
        let patch = match monitor {
            Some(monitor) => Patch::new()
                .set("uptimeKumaId", monitor.id.to_string())
                .set("status", serde_json::to_value(&monitor.status)?)
                .set("latency", serde_json::to_value(&monitor.latency)?),
            None => Patch::new().set("uptimeKumaId", Value::Null),
        };
        self.update_node(node_id, &patch)
    }

    // ==================== Import / export ====================

    /// Pretty-printed `{nodes, edges}` of the working copy.
    pub fn export_topology(&self) -> Result<String> {
        let topology = Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        };
        Ok(serde_json::to_string_pretty(&topology)?)
    }

    /// Export a stored project without opening it.
    pub fn export_project(&self, id: &str) -> Result<String> {
        if self.current_project_id.as_deref() == Some(id) {
            return self.export_topology();
        }
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        let topology = Snapshot {
            nodes: project.nodes.clone(),
            edges: project.edges.clone(),
        };
        Ok(serde_json::to_string_pretty(&topology)?)
    }

    /// Replace the working copy with an exported document.
    ///
    /// Fails without touching state if the text is not JSON, if `nodes` or
    /// `edges` is missing or not an array, or if an entry has the wrong shape.
    /// Values outside the known vocabularies (statuses, device types, line
    /// styles) are accepted as-is. The previous state is recorded as an undo
    /// step.
    pub fn import_topology(&mut self, json: &str) -> Result<()> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::MalformedImport(e.to_string()))?;

        for key in ["nodes", "edges"] {
            if !value.get(key).map_or(false, Value::is_array) {
                return Err(Error::MalformedImport(format!("`{}` must be an array", key)));
            }
        }
        let topology: Snapshot =
            serde_json::from_value(value).map_err(|e| Error::MalformedImport(e.to_string()))?;

        self.take_snapshot();
        self.nodes = topology.nodes;
        self.edges = topology.edges;
        self.view.clear_selection();
        self.commit();
        Ok(())
    }

    /// Empty the working copy.
    pub fn clear_all(&mut self) {
        self.take_snapshot();
        self.nodes.clear();
        self.edges.clear();
        self.view.clear_selection();
        self.commit();
    }

    // ==================== Projects ====================

    /// Create a project and make it active with an empty canvas.
    pub fn create_project(
        &mut self,
        name: &str,
        kind: ProjectType,
        description: Option<String>,
    ) -> ProjectId {
        self.take_snapshot();
        self.write_back(false);

        let name = if name.trim().is_empty() { "Untitled Project" } else { name };
        let project = Project {
            id: ids::new_project_id(),
            name: name.to_string(),
            kind,
            description,
            updated_at: ids::now_millis(),
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        let id = project.id.clone();
        self.projects.insert(0, project);

        self.current_project_id = Some(id.clone());
        self.nodes.clear();
        self.edges.clear();
        self.view.clear_selection();
        self.commit();
        id
    }

    /// Open a project. History does not cross project boundaries.
    pub fn select_project(&mut self, id: &str) -> Result<()> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        let (nodes, edges) = (project.nodes.clone(), project.edges.clone());

        self.write_back(false);
        self.current_project_id = Some(id.to_string());
        self.nodes = nodes;
        self.edges = edges;
        self.history.clear();
        self.view.clear_selection();
        self.revision += 1;
        self.notify_state();
        Ok(())
    }

    /// Remove a project. Not undoable. Returns whether it existed.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        let removed = self.projects.len() != before;

        if self.current_project_id.as_deref() == Some(id) {
            self.current_project_id = None;
            self.close_working_copy();
        }
        self.revision += 1;
        self.notify_push();
        removed
    }

    /// Save the working copy into its project and close it.
    pub fn back_to_dashboard(&mut self) {
        if self.current_project_id.is_none() {
            return;
        }
        self.write_back(true);
        self.current_project_id = None;
        self.close_working_copy();
        self.revision += 1;
        self.notify_push();
    }

    /// Forget everything, including projects.
    pub fn reset(&mut self) {
        self.projects.clear();
        self.current_project_id = None;
        self.close_working_copy();
        self.view = ViewState::default();
        self.notify_state();
    }

    fn close_working_copy(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.history.clear();
        self.view.clear_selection();
    }

    // ==================== Cache / remote reconciliation ====================

    /// Rehydrate from the client-side cache. The working copy is not cached
    /// and stays empty until the remote pull.
    pub fn restore(&mut self, state: PersistedState) {
        self.projects = state.projects;
        self.current_project_id = state.current_project_id;
        self.nodes.clear();
        self.edges.clear();
        self.history.clear();
        self.view.clear_selection();
    }

    /// Adopt the remote collection. For the active project the remote
    /// content replaces the working copy.
    pub fn adopt_remote(&mut self, projects: Vec<Project>) {
        let active = self
            .current_project_id
            .as_deref()
            .and_then(|id| projects.iter().find(|p| p.id == id))
            .map(|p| (p.nodes.clone(), p.edges.clone()));

        if let Some((nodes, edges)) = active {
            self.nodes = nodes;
            self.edges = edges;
        }
        self.projects = projects;
        self.notify_state();
    }

    // ==================== Commit / sync ====================

    fn commit(&mut self) {
        self.revision += 1;
        self.sync();
    }

    /// Flush the working copy into the active project and request a push.
    fn sync(&mut self) {
        if self.current_project_id.is_some() {
            self.write_back(true);
            self.notify_push();
        }
    }

    fn write_back(&mut self, stamp: bool) {
        let Some(id) = self.current_project_id.as_deref() else {
            return;
        };
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.nodes = self.nodes.clone();
            project.edges = self.edges.clone();
            if stamp {
                project.updated_at = ids::now_millis();
            }
        }
    }

    fn notify_state(&self) {
        if let Some(sink) = &self.sink {
            sink.state_changed(&self.persisted_state());
        }
    }

    fn notify_push(&self) {
        if let Some(sink) = &self.sink {
            let state = self.persisted_state();
            sink.state_changed(&state);
            sink.push_requested(&state, self.revision);
        }
    }
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionType, NodeStatus};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<Vec<PersistedState>>,
        pushes: Mutex<Vec<u64>>,
    }

    impl ChangeSink for RecordingSink {
        fn state_changed(&self, state: &PersistedState) {
            self.states.lock().push(state.clone());
        }

        fn push_requested(&self, _state: &PersistedState, revision: u64) {
            self.pushes.lock().push(revision);
        }
    }

    fn store_with_project(kind: ProjectType) -> TopologyStore {
        let mut store = TopologyStore::default();
        store.create_project("Lab", kind, None);
        store
    }

    fn add(store: &mut TopologyStore, hw: HardwareType, label: &str) -> NodeId {
        store.add_node_from_data(NodeData::new(hw, label))
    }

    #[test]
    fn test_node_kind_follows_project_type() {
        let mut store = store_with_project(ProjectType::Electrical);
        let ups = add(&mut store, HardwareType::Ups, "UPS");
        let label = add(&mut store, HardwareType::Shape, "Rack A");

        assert_eq!(store.node(&ups).unwrap().kind, NodeKind::Electrical);
        assert_eq!(store.node(&label).unwrap().kind, NodeKind::Shape);

        let mut store = store_with_project(ProjectType::Network);
        let r = add(&mut store, HardwareType::Router, "R1");
        assert_eq!(store.node(&r).unwrap().kind, NodeKind::Hardware);
    }

    #[test]
    fn test_spawn_position_stays_in_region() {
        let mut store = store_with_project(ProjectType::Network);
        for i in 0..20 {
            let id = add(&mut store, HardwareType::Pc, &format!("pc{}", i));
            let p = store.node(&id).unwrap().position;
            assert!((250.0..=450.0).contains(&p.x));
            assert!((150.0..=350.0).contains(&p.y));
        }
    }

    #[test]
    fn test_delete_node_cascades_edges() {
        let mut store = store_with_project(ProjectType::Network);
        let r1 = add(&mut store, HardwareType::Router, "R1");
        let p1 = add(&mut store, HardwareType::Pc, "P1");
        let p2 = add(&mut store, HardwareType::Pc, "P2");
        store.add_edge_from_data(EdgeDraft::new(&r1, &p1));
        store.add_edge_from_data(EdgeDraft::new(&p2, &r1));
        let keep = store.add_edge_from_data(EdgeDraft::new(&p1, &p2));

        store.select_node(Some(r1.as_str()));
        store.delete_node(&r1);

        assert!(store.edges().iter().all(|e| !e.touches(&r1)));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].id, keep);
        assert!(store.selected_node().is_none());
        assert_eq!(store.current_project().unwrap().edges.len(), 1);
    }

    #[test]
    fn test_add_edge_defaults_and_clears_connection_mode() {
        let mut store = store_with_project(ProjectType::Network);
        let a = add(&mut store, HardwareType::Switch, "SW");
        store.set_connection_mode(true);

        let id = store.add_edge_from_data(EdgeDraft::new(&a, &a));
        let edge = store.edge(&id).unwrap();
        assert_eq!(edge.source, edge.target);
        assert_eq!(edge.animation_type, crate::model::AnimationType::Dashed);
        assert_eq!(edge.line_type, crate::model::LineType::Bezier);
        assert!(!store.connection_mode());
    }

    #[test]
    fn test_update_node_refreshes_selection() {
        let mut store = store_with_project(ProjectType::Network);
        let id = add(&mut store, HardwareType::Server, "srv");
        store.select_node(Some(id.as_str()));

        store
            .update_node(&id, &Patch::new().set("label", "db01").set("os", "Debian"))
            .unwrap();

        let selected = store.selected_node().unwrap();
        assert_eq!(selected.data.label, "db01");
        assert_eq!(selected.data.os.as_deref(), Some("Debian"));
        assert_eq!(selected.data.hardware_type, HardwareType::Server);
    }

    #[test]
    fn test_update_unknown_id_still_records_history() {
        let mut store = store_with_project(ProjectType::Network);
        add(&mut store, HardwareType::Pc, "P1");
        let before = store.nodes().to_vec();
        let past = store.history().past_len();

        store.update_node("node_missing", &Patch::new().set("label", "x")).unwrap();
        store.update_edge("edge_missing", &Patch::new().set("label", "x")).unwrap();

        assert_eq!(store.nodes(), &before[..]);
        assert_eq!(store.history().past_len(), past + 2);
    }

    #[test]
    fn test_invalid_patch_leaves_history_untouched() {
        let mut store = store_with_project(ProjectType::Network);
        let id = add(&mut store, HardwareType::Pc, "P1");
        let past = store.history().past_len();

        let err = store.update_node(&id, &Patch::new().set("status", "exploded"));
        assert!(err.is_err());
        assert_eq!(store.history().past_len(), past);
    }

    #[test]
    fn test_update_edge_keeps_id() {
        let mut store = store_with_project(ProjectType::Network);
        let a = add(&mut store, HardwareType::Router, "R");
        let b = add(&mut store, HardwareType::Ont, "ONT");
        let id = store.add_edge_from_data(EdgeDraft::new(&a, &b));
        store.select_edge(Some(id.as_str()));

        let patch = Patch::new()
            .set("id", "edge_hijack")
            .set("connectionType", "fiber")
            .set("bandwidth", "1 Gbps");
        store.update_edge(&id, &patch).unwrap();

        let edge = store.selected_edge().unwrap();
        assert_eq!(edge.id, id);
        assert_eq!(edge.connection_type, ConnectionType::Fiber);
        assert_eq!(edge.bandwidth.as_deref(), Some("1 Gbps"));
    }

    #[test]
    fn test_custom_detail_crud() {
        let mut store = store_with_project(ProjectType::Network);
        let id = add(&mut store, HardwareType::Nas, "nas");

        let d1 = store.add_node_detail(&id, "rack", "A3").unwrap();
        let d2 = store.add_node_detail(&id, "owner", "ops").unwrap();
        assert_ne!(d1, d2);

        store.update_node_detail(&id, &d1, "rack", "B1").unwrap();
        store.delete_node_detail(&id, &d2).unwrap();

        let details = &store.node(&id).unwrap().data.custom_details;
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].value, "B1");

        assert!(matches!(
            store.add_node_detail("node_missing", "k", "v"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_drag_frames_snapshot_only_on_settle() {
        let mut store = store_with_project(ProjectType::Network);
        let id = add(&mut store, HardwareType::Laptop, "L");
        let past = store.history().past_len();

        for step in 0..10 {
            store.apply_node_changes(&[NodeChange::Position {
                id: id.clone(),
                position: Some(Position::new(step as f64, step as f64)),
                dragging: Some(true),
            }]);
        }
        assert_eq!(store.history().past_len(), past);

        store.apply_node_changes(&[NodeChange::Position {
            id: id.clone(),
            position: Some(Position::new(42.0, 7.0)),
            dragging: Some(false),
        }]);
        assert_eq!(store.history().past_len(), past + 1);
        assert_eq!(store.node(&id).unwrap().position, Position::new(42.0, 7.0));

        // One undo returns to the spot before the drag began.
        store.undo();
        assert_ne!(store.node(&id).unwrap().position, Position::new(9.0, 9.0));
    }

    #[test]
    fn test_remove_change_cascades() {
        let mut store = store_with_project(ProjectType::Network);
        let a = add(&mut store, HardwareType::Router, "R");
        let b = add(&mut store, HardwareType::Pc, "P");
        store.connect(Connection {
            source: a.clone(),
            target: b.clone(),
            source_handle: None,
            target_handle: None,
        });

        store.apply_node_changes(&[NodeChange::Remove { id: a.clone() }]);
        assert!(store.edges().is_empty());
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn test_link_monitor_copies_status() {
        let mut store = store_with_project(ProjectType::Network);
        let id = add(&mut store, HardwareType::Server, "web");
        let monitor = MonitorRecord {
            id: 7,
            name: "web".to_string(),
            status: NodeStatus::Warning,
            latency: Some(crate::model::Latency::Millis(182.0)),
        };

        store.link_monitor(&id, Some(&monitor)).unwrap();
        let data = &store.node(&id).unwrap().data;
        assert_eq!(data.uptime_kuma_id.as_deref(), Some("7"));
        assert_eq!(data.status, Some(NodeStatus::Warning));

        store.link_monitor(&id, None).unwrap();
        assert_eq!(store.node(&id).unwrap().data.uptime_kuma_id, None);
    }

    #[test]
    fn test_import_rejects_bad_shape() {
        let mut store = store_with_project(ProjectType::Network);
        add(&mut store, HardwareType::Pc, "P1");
        let before = (store.nodes().to_vec(), store.edges().to_vec());
        let past = store.history().past_len();

        for bad in ["not json", "{}", r#"{"nodes":[]}"#, r#"{"nodes":[],"edges":"bad"}"#] {
            assert!(matches!(store.import_topology(bad), Err(Error::MalformedImport(_))));
        }
        assert_eq!((store.nodes().to_vec(), store.edges().to_vec()), before);
        assert_eq!(store.history().past_len(), past);
    }

    #[test]
    fn test_import_is_undoable() {
        let mut store = store_with_project(ProjectType::Network);
        add(&mut store, HardwareType::Pc, "P1");
        let before = store.nodes().to_vec();

        store.import_topology(r#"{"nodes":[],"edges":[]}"#).unwrap();
        assert!(store.nodes().is_empty());
        assert!(store.undo());
        assert_eq!(store.nodes(), &before[..]);
    }

    #[test]
    fn test_select_project_resets_history_and_swaps_working_copy() {
        let mut store = TopologyStore::default();
        let first = store.create_project("First", ProjectType::Network, None);
        add(&mut store, HardwareType::Router, "R1");
        let second = store.create_project("Second", ProjectType::Electrical, None);
        assert!(store.nodes().is_empty());
        assert_eq!(store.projects()[0].id, second);

        store.select_project(&first).unwrap();
        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.nodes()[0].data.label, "R1");
        assert!(!store.history().can_undo());

        assert!(matches!(store.select_project("proj_nope"), Err(Error::ProjectNotFound(_))));
    }

    #[test]
    fn test_back_to_dashboard_flushes_and_closes() {
        let sink = Arc::new(RecordingSink::default());
        let mut store = TopologyStore::default().with_sink(sink.clone());
        let id = store.create_project("Home", ProjectType::Network, Some("flat".into()));
        add(&mut store, HardwareType::Cloud, "WAN");

        store.back_to_dashboard();
        assert_eq!(store.current_project_id(), None);
        assert!(store.nodes().is_empty());

        let last = sink.states.lock().last().cloned().unwrap();
        assert_eq!(last.current_project_id, None);
        let saved = last.projects.iter().find(|p| p.id == id).unwrap();
        assert_eq!(saved.nodes.len(), 1);
        assert!(!sink.pushes.lock().is_empty());
    }

    #[test]
    fn test_delete_active_project_clears_pointer() {
        let sink = Arc::new(RecordingSink::default());
        let mut store = TopologyStore::default().with_sink(sink.clone());
        let id = store.create_project("Tmp", ProjectType::Network, None);
        let pushes = sink.pushes.lock().len();

        assert!(store.delete_project(&id));
        assert!(!store.delete_project(&id));
        assert_eq!(store.current_project_id(), None);
        assert!(store.projects().is_empty());
        assert_eq!(sink.pushes.lock().len(), pushes + 2);
    }

    #[test]
    fn test_selection_changes_do_not_sync() {
        let sink = Arc::new(RecordingSink::default());
        let mut store = TopologyStore::default().with_sink(sink.clone());
        store.create_project("Lab", ProjectType::Network, None);
        let id = add(&mut store, HardwareType::Pc, "P1");
        let (pushes, past) = (sink.pushes.lock().len(), store.history().past_len());

        store.select_node(Some(id.as_str()));
        store.select_edge(None);
        store.set_connection_mode(true);

        assert_eq!(sink.pushes.lock().len(), pushes);
        assert_eq!(store.history().past_len(), past);
    }

    #[test]
    fn test_no_push_without_active_project() {
        let sink = Arc::new(RecordingSink::default());
        let mut store = TopologyStore::default().with_sink(sink.clone());
        add(&mut store, HardwareType::Pc, "loose");
        assert!(sink.pushes.lock().is_empty());
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn test_adopt_remote_replaces_active_working_copy() {
        let mut store = TopologyStore::default();
        let id = store.create_project("Lab", ProjectType::Network, None);
        add(&mut store, HardwareType::Pc, "stale");

        let mut remote = store.projects()[0].clone();
        remote.nodes.clear();
        remote.nodes.push(Node::new(
            "node_remote",
            NodeKind::Hardware,
            Position::default(),
            NodeData::new(HardwareType::Firewall, "fw"),
        ));
        store.adopt_remote(vec![remote]);

        assert_eq!(store.current_project_id(), Some(id.as_str()));
        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.nodes()[0].id, "node_remote");
    }

    #[test]
    fn test_clear_all_is_undoable_and_reset_forgets_projects() {
        let mut store = store_with_project(ProjectType::Network);
        let a = add(&mut store, HardwareType::Router, "R1");
        let b = add(&mut store, HardwareType::Switch, "SW");
        store.add_edge_from_data(EdgeDraft::new(&a, &b));
        store.select_node(Some(a.as_str()));

        store.clear_all();
        assert!(store.nodes().is_empty());
        assert!(store.edges().is_empty());
        assert_eq!(store.selection(), &Selection::None);
        assert!(store.projects()[0].nodes.is_empty());

        assert!(store.undo());
        assert_eq!(store.nodes().len(), 2);

        store.reset();
        assert!(store.projects().is_empty());
        assert!(store.current_project_id().is_none());
        assert!(store.nodes().is_empty());
        assert!(!store.history().can_undo());
    }

    #[test]
    fn test_import_accepts_unknown_status_and_negative_ports() {
        let mut store = store_with_project(ProjectType::Network);
        let doc = r#"{
            "nodes": [{
                "id": "node_1",
                "type": "hardware",
                "position": { "x": 0, "y": 0 },
                "data": { "label": "cam", "hardwareType": "cctv", "status": "pending", "ports": -1 }
            }],
            "edges": []
        }"#;

        store.import_topology(doc).unwrap();
        let data = &store.node("node_1").unwrap().data;
        assert_eq!(data.status, Some(NodeStatus::Other("pending".to_string())));
        assert_eq!(data.ports, Some(-1));

        let exported: Value = serde_json::from_str(&store.export_topology().unwrap()).unwrap();
        assert_eq!(exported["nodes"][0]["data"]["status"], "pending");
    }

    #[test]
    fn test_edge_render_data_follows_style_fields() {
        let mut store = store_with_project(ProjectType::Network);
        let a = add(&mut store, HardwareType::Router, "R1");
        let b = add(&mut store, HardwareType::Switch, "SW");
        let edge = store.add_edge_from_data(EdgeDraft::new(&a, &b));

        let created = serde_json::to_value(store.edge(&edge).unwrap()).unwrap();
        assert_eq!(created["type"], "animated");
        assert_eq!(created["data"]["lineType"], "bezier");
        assert_eq!(created["data"]["animationType"], "dashed");

        let patch = Patch::new().set("lineType", "smoothstep").set("animationType", "dot");
        store.update_edge(&edge, &patch).unwrap();
        let updated = serde_json::to_value(store.edge(&edge).unwrap()).unwrap();
        assert_eq!(updated["data"]["lineType"], "smoothstep");
        assert_eq!(updated["data"]["animationType"], "dot");

        store.update_edge(&edge, &Patch::new().set("label", "uplink")).unwrap();
        let relabelled = serde_json::to_value(store.edge(&edge).unwrap()).unwrap();
        assert_eq!(relabelled["data"]["lineType"], "smoothstep");
    }

    #[test]
    fn test_export_project_does_not_switch() {
        let mut store = TopologyStore::default();
        let first = store.create_project("First", ProjectType::Network, None);
        add(&mut store, HardwareType::Nas, "NAS");
        let second = store.create_project("Second", ProjectType::Network, None);
        let revision = store.revision();

        let json = store.export_project(&first).unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["nodes"].as_array().map(Vec::len), Some(1));
        assert_eq!(store.current_project_id(), Some(second.as_str()));
        assert_eq!(store.revision(), revision);
        assert!(matches!(store.export_project("missing"), Err(Error::ProjectNotFound(_))));
    }
}
