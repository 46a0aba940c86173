// Topology entities: nodes, edges, projects and their metadata
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{Error, Result};

pub type NodeId = String;
pub type EdgeId = String;
pub type ProjectId = String;
pub type DetailId = String;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareType {
    Router,
    Switch,
    Server,
    Pc,
    Laptop,
    Cloud,
    Isp,
    Cctv,
    Accesspoint,
    Ont,
    Mikrotik,
    Proxmox,
    Docker,
    Nas,
    Firewall,
    PowerStrip,
    Adapter,
    Dock,
    Kvm,
    MonitorDisplay,
    Peripheral,
    Controller,
    Hub,
    PowerSource,
    Ups,
    Shape,
    /// A device type this build does not know; round-trips unchanged.
    #[serde(untagged)]
    Other(String),
}

/// Rendering family of a node. Serialized under `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Hardware,
    Electrical,
    Shape,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
    Warning,
    /// Monitor statuses outside the three above, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Network,
    Electrical,
    #[serde(untagged)]
    Other(String),
}

impl ProjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectType::Network => "network",
            ProjectType::Electrical => "electrical",
            ProjectType::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Running,
    Stopped,
    Error,
    #[serde(untagged)]
    Other(String),
}

/// A service hosted on a server-like node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
    Both,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricalPort {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: PortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDetail {
    pub id: DetailId,
    pub key: String,
    pub value: String,
}

/// Monitor latency as reported upstream: either milliseconds or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Latency {
    Millis(f64),
    Text(String),
}

/// Typed metadata carried by every node.
///
/// Keys the model does not know about are kept in `extra` so that data written
/// by other clients survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    pub hardware_type: HardwareType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isp_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vlans: Vec<VlanInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub electrical_ports: Vec<ElectricalPort>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_details: Vec<CustomDetail>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_kuma_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<Latency>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    #[must_use]
    pub fn new(hardware_type: HardwareType, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hardware_type,
            status: None,
            description: None,
            ip: None,
            subnet_mask: None,
            mac_address: None,
            dns: None,
            public_ip: None,
            bandwidth: None,
            ports: None,
            isp_type: None,
            account_id: None,
            location: None,
            os: None,
            serial_number: None,
            cpu: None,
            ram: None,
            storage: None,
            vlans: Vec::new(),
            applications: Vec::new(),
            electrical_ports: Vec::new(),
            custom_details: Vec::new(),
            uptime_kuma_id: None,
            latency: None,
            extra: Map::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Ethernet,
    Fiber,
    Wireless,
    Serial,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    #[default]
    Dashed,
    Dot,
    None,
    #[serde(untagged)]
    Other(String),
}

impl AnimationType {
    pub fn as_str(&self) -> &str {
        match self {
            AnimationType::Dashed => "dashed",
            AnimationType::Dot => "dot",
            AnimationType::None => "none",
            AnimationType::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Bezier,
    Smoothstep,
    #[serde(untagged)]
    Other(String),
}

impl LineType {
    pub fn as_str(&self) -> &str {
        match self {
            LineType::Bezier => "bezier",
            LineType::Smoothstep => "smoothstep",
            LineType::Other(kind) => kind,
        }
    }
}

/// Link-level addressing attached to an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeNetworkInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<String>,
    #[serde(default)]
    pub animation_type: AnimationType,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_info: Option<EdgeNetworkInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    #[inline]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Copy `animationType` and `lineType` into the `data` object, which is
    /// what the edge renderer reads. Other keys under `data` are kept.
    pub fn sync_render_data(&mut self) {
        let data = self
            .extra
            .entry("data")
            .or_insert_with(|| Value::Object(Map::new()));
        if !data.is_object() {
            *data = Value::Object(Map::new());
        }
        if let Value::Object(fields) = data {
            fields.insert("animationType".to_string(), Value::from(self.animation_type.as_str()));
            fields.insert("lineType".to_string(), Value::from(self.line_type.as_str()));
        }
    }
}

/// Caller-supplied fields for a new edge. Unset styling falls back to
/// dashed bezier, unset connection type to ethernet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeDraft {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub label: Option<String>,
    pub connection_type: Option<ConnectionType>,
    pub bandwidth: Option<String>,
    pub animation_type: Option<AnimationType>,
    pub line_type: Option<LineType>,
    pub network_info: Option<EdgeNetworkInfo>,
}

impl EdgeDraft {
    #[must_use]
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_connection_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = Some(connection_type);
        self
    }

    pub(crate) fn into_edge(self, id: EdgeId) -> Edge {
        let mut extra = Map::new();
        extra.insert("type".to_string(), Value::from("animated"));
        extra.insert("style".to_string(), json!({ "stroke": "#6366f1", "strokeWidth": 2 }));

        let mut edge = Edge {
            id,
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            label: self.label,
            connection_type: self.connection_type.unwrap_or_default(),
            bandwidth: self.bandwidth,
            animation_type: self.animation_type.unwrap_or_default(),
            line_type: self.line_type.unwrap_or_default(),
            network_info: self.network_info,
            extra,
        };
        edge.sync_render_data();
        edge
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A record from the external uptime monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub id: u64,
    pub name: String,
    pub status: NodeStatus,
    #[serde(default)]
    pub latency: Option<Latency>,
}

/// The slice of engine state mirrored into the client-side cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub current_project_id: Option<ProjectId>,
}

/// A shallow, field-level update.
///
/// Each key replaces the whole field of the same (camelCase) name on the
/// target; nested collections such as `vlans` are replaced, never merged
/// item by item. A `null` value clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Map<String, Value>);

impl Patch {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::InvalidPatch(format!("expected a JSON object, got {}", other))),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Merge this patch over `target`, returning the updated value.
    pub fn apply<T>(&self, target: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut value = serde_json::to_value(target)?;
        if let Value::Object(fields) = &mut value {
            for (key, field) in &self.0 {
                fields.insert(key.clone(), field.clone());
            }
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidPatch(e.to_string()))
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
