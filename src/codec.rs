use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::*;

impl Graph {
    /// Serializes the graph into the compact TOON text form.
    ///
    /// Known format limitation: `|` is the field separator and is not
    /// escaped. A `|` inside `id`, `kind`, `label` or `color` corrupts field
    /// alignment on decode. `description` is safe because it is the last
    /// field on a node line and the decoder consumes it as rest-of-line.
    pub fn encode(&self) -> String {
        let mut lines = Vec::with_capacity(self.nodes.len() + self.edges.len() + 2);
        lines.push(NODES_HEADER.to_string());

        for node in &self.nodes {
            lines.push(format_node_line(node));
        }

        lines.push(EDGES_SENTINEL.to_string());

        for edge in &self.edges {
            lines.push(format_edge_line(edge));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Decodes a TOON reply, returning `None` when no usable graph can be
    /// recovered. Never panics; the diagnostic is logged at `warn` level.
    ///
    /// The usual input source is a generative model echoing the encoded
    /// text back, so the reply may be wrapped in prose, truncated, or
    /// partially mangled. Document-level structure (header and sentinel) is
    /// required; individual malformed lines are recovered with defaults.
    pub fn decode(text: &str) -> Option<Self> {
        match Self::try_decode(text) {
            Ok(graph) => Some(graph),
            Err(err) => {
                warn!("failed to decode TOON reply: {err:#}");
                None
            }
        }
    }

    /// Like [`Graph::decode`] but surfaces the structural diagnostic.
    pub fn try_decode(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();

        // Anchor search rather than strict prefix: model replies routinely
        // open with prose before the payload.
        let header_index = lines
            .iter()
            .position(|line| line.trim() == NODES_HEADER)
            .ok_or_else(|| anyhow!("reply does not contain a '{NODES_HEADER}' header line"))?;

        let body = lines[header_index + 1..].join("\n");
        let (node_section, edge_section) = body
            .split_once(EDGES_SENTINEL)
            .ok_or_else(|| anyhow!("reply is missing the '{EDGES_SENTINEL}' sentinel"))?;

        // Lines are parsed untrimmed so decode(encode(g)) preserves field
        // values byte for byte, padding included; trim is only used to
        // detect blank lines and blank identifiers.
        let mut nodes = Vec::new();
        for line in node_section.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(node) = parse_node_line(line) {
                nodes.push(node);
            }
        }

        let mut edges = Vec::new();
        for line in edge_section.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(edge) = parse_edge_line(line, edges.len()) {
                edges.push(edge);
            }
        }

        Ok(Self { nodes, edges })
    }

    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != node_id);
        let existed = before != self.nodes.len();
        if existed {
            self.edges
                .retain(|edge| edge.source != node_id && edge.target != node_id);
        }
        existed
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.id != edge_id);
        before != self.edges.len()
    }
}

fn format_node_line(node: &Node) -> String {
    let kind = if node.kind.is_empty() {
        DEFAULT_NODE_KIND
    } else {
        node.kind.as_str()
    };
    let color = if node.color.is_empty() {
        DEFAULT_NODE_COLOR
    } else {
        node.color.as_str()
    };

    format!(
        "{id}{d}{kind}{d}{label}{d}{x}{d}{y}{d}{color}{d}{description}",
        id = node.id,
        label = node.label,
        x = round_coordinate(node.x),
        y = round_coordinate(node.y),
        description = node.description,
        d = FIELD_DELIMITER,
    )
}

fn format_edge_line(edge: &Edge) -> String {
    format!(
        "{source}{d}{target}{d}{label}",
        source = edge.source,
        target = edge.target,
        label = edge.label,
        d = FIELD_DELIMITER,
    )
}

// Wire coordinates are integers; rounding is half away from zero so
// fractional canvas positions do not drift toward the origin.
fn round_coordinate(value: f32) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

fn parse_node_line(line: &str) -> Option<Node> {
    // splitn keeps embedded delimiters inside the trailing description.
    let mut fields = line.splitn(NODE_FIELD_COUNT, FIELD_DELIMITER);

    let id = fields.next().unwrap_or("");
    if id.trim().is_empty() {
        debug!("skipping node line without an identifier: '{line}'");
        return None;
    }

    let kind = fields.next().unwrap_or("");
    let label = fields.next().unwrap_or("");
    let x = parse_coordinate(fields.next(), "x", id);
    let y = parse_coordinate(fields.next(), "y", id);
    let color = fields.next().unwrap_or("");
    let description = fields.next().unwrap_or("");

    Some(Node {
        id: id.to_string(),
        kind: if kind.is_empty() {
            DEFAULT_NODE_KIND.to_string()
        } else {
            kind.to_string()
        },
        label: label.to_string(),
        x,
        y,
        color: if color.is_empty() {
            DEFAULT_NODE_COLOR.to_string()
        } else {
            color.to_string()
        },
        description: description.to_string(),
    })
}

fn parse_coordinate(field: Option<&str>, axis: &str, node_id: &str) -> f32 {
    let Some(raw) = field else {
        return 0.0;
    };
    let raw = raw.trim();
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => value.round(),
        _ => {
            debug!("node '{node_id}': unusable {axis} coordinate '{raw}', defaulting to 0");
            0.0
        }
    }
}

fn parse_edge_line(line: &str, index: usize) -> Option<Edge> {
    let mut fields = line.splitn(3, FIELD_DELIMITER);

    let source = fields.next().unwrap_or("");
    let target = fields.next().unwrap_or("");
    if source.trim().is_empty() || target.trim().is_empty() {
        debug!("skipping edge line without both endpoints: '{line}'");
        return None;
    }

    let label = fields.next().unwrap_or("");

    Some(Edge {
        id: format!("{SYNTHESIZED_EDGE_PREFIX}{index}"),
        source: source.to_string(),
        target: target.to_string(),
        label: label.to_string(),
    })
}
