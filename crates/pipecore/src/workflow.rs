use crate::config::NodeConfig;
use crate::error::GraphError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type WorkflowId = Uuid;
pub type NodeId = Uuid;
pub type ConnectionId = Uuid;

/// Closed set of node type tags the engine ships behaviors or defaults for.
///
/// The tag field on [`NodeSpec`] stays an open string so legacy or
/// forward-compatible tags still resolve (to the pass-through behavior)
/// instead of aborting a run.
pub mod kind {
    pub const TIMER: &str = "TIMER";
    pub const DATA_COLLECT: &str = "DATA_COLLECT";
    pub const TRANSFORM: &str = "TRANSFORM";
    pub const SCRIPT: &str = "SCRIPT";
    pub const STRATEGY: &str = "STRATEGY";
    pub const FILTER: &str = "FILTER";
    pub const EXECUTION: &str = "EXECUTION";
    pub const STORAGE: &str = "STORAGE";
    pub const DATABASE_QUERY: &str = "DATABASE_QUERY";
    pub const HTTP_REQUEST: &str = "HTTP_REQUEST";
    pub const SOURCE: &str = "SOURCE";
}

/// Complete workflow definition
///
/// The engine only ever reads a workflow as a snapshot; all mutation goes
/// through the explicit editing operations below, each of which touches
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkflowStatus,
    pub updated_at: DateTime<Utc>,
    pub nodes: Vec<NodeSpec>,
    pub connections: Vec<Connection>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            status: WorkflowStatus::Draft,
            updated_at: Utc::now(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_node(&mut self, node: NodeSpec) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        self.updated_at = Utc::now();
        id
    }

    /// Removes a node and every connection referencing it.
    pub fn remove_node(&mut self, id: NodeId) {
        self.nodes.retain(|n| n.id != id);
        self.connections
            .retain(|c| c.source != id && c.target != id);
        self.updated_at = Utc::now();
    }

    /// Adds a directed edge. Self-loops and references to nodes not in the
    /// node set are rejected here, before the edge ever reaches the graph.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<ConnectionId, GraphError> {
        let connection = Connection {
            id: Uuid::new_v4(),
            source,
            target,
        };
        if source == target {
            return Err(GraphError::SelfLoop {
                connection: connection.id,
                node: source,
            });
        }
        for end in [source, target] {
            if self.find_node(end).is_none() {
                return Err(GraphError::DanglingReference {
                    connection: connection.id,
                    node: end,
                });
            }
        }
        let id = connection.id;
        self.connections.push(connection);
        self.updated_at = Utc::now();
        Ok(id)
    }

    pub fn disconnect(&mut self, id: ConnectionId) {
        self.connections.retain(|c| c.id != id);
        self.updated_at = Utc::now();
    }

    pub fn find_node(&self, id: NodeId) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Node specification in a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    pub kind: String,
    pub label: String,
    pub config: NodeConfig,
    /// Canvas placement, irrelevant to execution
    pub position: Option<Position>,
}

impl NodeSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            id: Uuid::new_v4(),
            label: kind.clone(),
            kind,
            config: NodeConfig::default(),
            position: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// Directed dependency edge between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
}

/// Node position in the visual editor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Lifecycle status of a stored workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Active,
    Draft,
    Archived,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_self_loop() {
        let mut wf = Workflow::new("loop");
        let a = wf.add_node(NodeSpec::new(kind::TIMER));
        let err = wf.connect(a, a).unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop { node, .. } if node == a));
        assert!(wf.connections.is_empty());
    }

    #[test]
    fn connect_rejects_dangling_reference() {
        let mut wf = Workflow::new("dangling");
        let a = wf.add_node(NodeSpec::new(kind::TIMER));
        let ghost = Uuid::new_v4();
        let err = wf.connect(a, ghost).unwrap_err();
        assert!(matches!(err, GraphError::DanglingReference { node, .. } if node == ghost));
    }

    #[test]
    fn remove_node_cascades_connections() {
        let mut wf = Workflow::new("cascade");
        let a = wf.add_node(NodeSpec::new(kind::TIMER));
        let b = wf.add_node(NodeSpec::new(kind::SCRIPT));
        let c = wf.add_node(NodeSpec::new(kind::STORAGE));
        wf.connect(a, b).unwrap();
        wf.connect(b, c).unwrap();
        wf.remove_node(b);
        assert!(wf.find_node(b).is_none());
        assert!(wf.connections.is_empty());
    }
}
