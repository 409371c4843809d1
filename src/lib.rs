use serde::{Deserialize, Serialize};

pub mod codec;

pub const NODES_HEADER: &str = "NODES:";
pub const EDGES_SENTINEL: &str = "~EDGES:";
pub const FIELD_DELIMITER: char = '|';
pub const NODE_FIELD_COUNT: usize = 7;
pub const DEFAULT_NODE_KIND: &str = "default";
pub const DEFAULT_NODE_COLOR: &str = "#ffffff";
pub const SYNTHESIZED_EDGE_PREFIX: &str = "e";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Presentation hint projected from a node's color, for direct consumption
/// by a rendering layer. Not part of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub background: String,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: DEFAULT_NODE_KIND.to_string(),
            label: label.into(),
            color: DEFAULT_NODE_COLOR.to_string(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn style(&self) -> NodeStyle {
        let background = if self.color.trim().is_empty() {
            DEFAULT_NODE_COLOR.to_string()
        } else {
            self.color.clone()
        };
        NodeStyle { background }
    }
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            source: source.into(),
            target: target.into(),
            label: String::new(),
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
