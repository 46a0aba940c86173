//! # netdraft
//!
//! Client-side state engine for network and electrical topology diagrams.
//!
//! netdraft keeps the open project's nodes and edges in memory, records
//! bounded undo/redo history, tracks selection, and mirrors every change into
//! a local cache slot and, debounced, into a remote `/projects` endpoint.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! netdraft --server http://localhost:3001/api list
//! netdraft create "Homelab" --kind network
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use netdraft::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let remote = Arc::new(HttpRemote::new("http://localhost:3001/api"));
//! let mut session = Session::open(remote, SessionConfig::default()).await?;
//!
//! let store = session.store_mut();
//! store.create_project("Homelab", ProjectType::Network, None);
//! let router = store.add_node_from_data(NodeData::new(HardwareType::Router, "R1"));
//! let nas = store.add_node_from_data(NodeData::new(HardwareType::Nas, "NAS"));
//! store.add_edge_from_data(EdgeDraft::new(&router, &nas));
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`netdraft-core`](https://docs.rs/netdraft-core) - Entity model, history, mutation API, selection
//! - [`netdraft-storage`](https://docs.rs/netdraft-storage) - Sync engine, remote stores, cache slot, sessions

// Re-export core types
pub use netdraft_core::{
    ChangeSink, Connection, Edge, EdgeChange, EdgeDraft, Error, HardwareType, History, MonitorRecord,
    Node, NodeChange, NodeData, NodeKind, NodeStatus, Patch, PersistedState, Position, Project,
    ProjectType, Result, Selection, Snapshot, StoreConfig, TopologyStore,
};

// Re-export storage
pub use netdraft_storage::{
    HttpRemote, LocalCache, MemoryRemote, RemoteStore, Session, SessionConfig, SyncConfig,
    SyncEngine, SyncStats,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EdgeDraft, Error, HardwareType, HttpRemote, MemoryRemote, NodeData, NodeKind, Patch,
        ProjectType, RemoteStore, Result, Session, SessionConfig, StoreConfig, SyncConfig,
        TopologyStore,
    };
}

/// Entity model, re-exported in full.
pub mod model {
    pub use netdraft_core::model::*;
}
