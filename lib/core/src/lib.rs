//! # netdraft Core
//!
//! Core library for the netdraft topology designer.
//!
//! This crate owns the in-memory model of the open project and every way to
//! change it:
//!
//! - [`Node`], [`Edge`], [`Project`] - the entity model
//! - [`History`] - bounded undo/redo over `{nodes, edges}` snapshots
//! - [`TopologyStore`] - the mutation API, selection state and the hook
//!   ([`ChangeSink`]) through which changes reach persistence
//!
//! ## Example
//!
//! ```rust
//! use netdraft_core::{EdgeDraft, HardwareType, NodeData, ProjectType, TopologyStore};
//!
//! let mut store = TopologyStore::default();
//! store.create_project("Lab", ProjectType::Network, None);
//!
//! let r1 = store.add_node_from_data(NodeData::new(HardwareType::Router, "R1"));
//! let p1 = store.add_node_from_data(NodeData::new(HardwareType::Pc, "P1"));
//! store.add_edge_from_data(EdgeDraft::new(&r1, &p1));
//!
//! store.delete_node(&r1);
//! assert!(store.edges().is_empty());
//!
//! store.undo();
//! assert_eq!(store.edges().len(), 1);
//! ```

pub mod changes;
pub mod error;
pub mod history;
pub mod ids;
pub mod model;
pub mod store;
pub mod view;

pub use changes::{Connection, EdgeChange, NodeChange};
pub use error::{Error, Result};
pub use history::{History, Snapshot, DEFAULT_HISTORY_LIMIT};
pub use model::{
    AnimationType, ApplicationInfo, ApplicationStatus, ConnectionType, CustomDetail, DetailId,
    Edge, EdgeDraft, EdgeId, EdgeNetworkInfo, ElectricalPort, HardwareType, Latency, LineType,
    MonitorRecord, Node, NodeData, NodeId, NodeKind, NodeStatus, Patch, PersistedState,
    PortDirection, Position, Project, ProjectId, ProjectType, VlanInfo,
};
pub use store::{ChangeSink, StoreConfig, TopologyStore};
pub use view::{Selection, ViewState};
