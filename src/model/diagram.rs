// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use super::elements::{Edge, Node, DEFAULT_NODE_SIZE, DEFAULT_NODE_TEXT};
use super::geometry::{Point, Size};
use super::ids::{EdgeId, IdError, NodeId};
use crate::format::document::{
    parse_document, DiagramDocument, EdgeRecord, NodeRecord, RecordKind, SkippedRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cannot connect {a} to {b}: {problem}")]
    InvalidEndpoint {
        a: NodeId,
        b: NodeId,
        problem: EndpointProblem,
    },
    #[error("malformed diagram document: {reason}")]
    MalformedDocument { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointProblem {
    #[error("a node cannot be connected to itself")]
    SelfLoop,
    #[error("node {0} does not exist")]
    MissingNode(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("record #{index} could not be decoded: {message}")]
    Undecodable { index: usize, message: String },
    #[error("invalid id: {0}")]
    InvalidId(IdError),
    #[error("id is already in use")]
    DuplicateId,
    #[error("edge connects a node to itself")]
    SelfLoop,
    #[error("endpoint {0:?} does not resolve to a node")]
    MissingEndpoint(String),
}

/// A node or edge record discarded while rebuilding a diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub kind: RecordKind,
    pub id: Option<String>,
    pub reason: DropReason,
}

/// Recoverable problems found while loading a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub dropped: Vec<DroppedRecord>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }

    pub fn dropped_edges(&self) -> impl Iterator<Item = &DroppedRecord> {
        self.dropped.iter().filter(|d| d.kind == RecordKind::Edge)
    }

    pub fn dropped_nodes(&self) -> impl Iterator<Item = &DroppedRecord> {
        self.dropped.iter().filter(|d| d.kind == RecordKind::Node)
    }

    fn record(&mut self, kind: RecordKind, id: Option<String>, reason: DropReason) {
        warn!(?kind, id = id.as_deref().unwrap_or("<none>"), %reason, "dropping diagram record");
        self.dropped.push(DroppedRecord { kind, id, reason });
    }

    fn record_skipped(&mut self, skipped: SkippedRecord) {
        self.record(
            skipped.kind,
            skipped.id,
            DropReason::Undecodable {
                index: skipped.index,
                message: skipped.reason,
            },
        );
    }
}

/// What [`Diagram::delete_node`] removed, so the caller can tear down visuals.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: SmallVec<[Edge; 4]>,
}

/// One editable graph: the sole owner of its nodes and edges.
///
/// Nodes keep their creation order; later nodes paint on top and win hit tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in paint order (bottom first).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn create_node(&mut self, position: Point, text: Option<String>) -> &Node {
        let node_id = NodeId::generate();
        let text = text.unwrap_or_else(|| DEFAULT_NODE_TEXT.to_owned());
        debug!(node_id = %node_id, x = position.x, y = position.y, "create node");
        self.insert_node(Node::new(node_id, position, DEFAULT_NODE_SIZE, text))
    }

    fn insert_node(&mut self, node: Node) -> &Node {
        let node_id = node.node_id().clone();
        self.node_order.push(node_id.clone());
        self.nodes.entry(node_id).or_insert(node)
    }

    pub fn create_edge(&mut self, a: &NodeId, b: &NodeId) -> Result<&Edge, GraphError> {
        self.validate_endpoints(a, b)?;
        let edge_id = EdgeId::generate();
        debug!(edge_id = %edge_id, a = %a, b = %b, "create edge");
        Ok(self.insert_edge(Edge::new(edge_id, a.clone(), b.clone())))
    }

    fn validate_endpoints(&self, a: &NodeId, b: &NodeId) -> Result<(), GraphError> {
        let problem = if a == b {
            Some(EndpointProblem::SelfLoop)
        } else if !self.nodes.contains_key(a) {
            Some(EndpointProblem::MissingNode(a.clone()))
        } else if !self.nodes.contains_key(b) {
            Some(EndpointProblem::MissingNode(b.clone()))
        } else {
            None
        };

        match problem {
            Some(problem) => Err(GraphError::InvalidEndpoint {
                a: a.clone(),
                b: b.clone(),
                problem,
            }),
            None => Ok(()),
        }
    }

    // Endpoints must already be validated.
    fn insert_edge(&mut self, edge: Edge) -> &Edge {
        let edge_id = edge.edge_id().clone();
        if let Some(node) = self.nodes.get_mut(edge.a()) {
            node.attach_edge(edge_id.clone());
        }
        if let Some(node) = self.nodes.get_mut(edge.b()) {
            node.attach_edge(edge_id.clone());
        }
        self.edge_order.push(edge_id.clone());
        self.edges.entry(edge_id).or_insert(edge)
    }

    /// Removes a node and every edge touching it. Absent ids are a no-op.
    pub fn delete_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let incident = self.nodes.get(node_id)?.incident_edges().clone();

        let mut edges = SmallVec::new();
        for edge_id in &incident {
            if let Some(edge) = self.delete_edge(edge_id) {
                edges.push(edge);
            }
        }

        let node = self.nodes.remove(node_id)?;
        self.node_order.retain(|id| id != node_id);
        debug!(node_id = %node_id, cascaded = edges.len(), "delete node");
        Some(RemovedNode { node, edges })
    }

    /// Removes an edge and unhooks it from both endpoints. Absent ids are a no-op.
    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(edge_id)?;
        for endpoint in [edge.a(), edge.b()] {
            if let Some(node) = self.nodes.get_mut(endpoint) {
                node.detach_edge(edge_id);
            }
        }
        self.edge_order.retain(|id| id != edge_id);
        debug!(edge_id = %edge_id, "delete edge");
        Some(edge)
    }

    /// Updates the node position only. Callers re-render `incident_edges` themselves.
    pub fn move_node(&mut self, node_id: &NodeId, position: Point) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_position(position);
        Some(node)
    }

    pub fn set_node_text(&mut self, node_id: &NodeId, text: impl Into<String>) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_text(text.into());
        debug!(node_id = %node_id, "set node text");
        Some(node)
    }

    pub fn resize_node(&mut self, node_id: &NodeId, size: Size) -> Option<&Node> {
        let node = self.nodes.get_mut(node_id)?;
        node.set_size(size);
        Some(node)
    }

    /// Topmost node whose rectangle contains `point`.
    pub fn node_at(&self, point: Point) -> Option<&NodeId> {
        self.node_order
            .iter()
            .rev()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.rect().contains(point)))
    }

    /// Center-to-center segment of an edge.
    pub fn edge_segment(&self, edge_id: &EdgeId) -> Option<(Point, Point)> {
        let edge = self.edges.get(edge_id)?;
        let a = self.nodes.get(edge.a())?;
        let b = self.nodes.get(edge.b())?;
        Some((a.center(), b.center()))
    }

    /// Checks the bidirectional node/edge index.
    pub fn is_consistent(&self) -> bool {
        let edges_ok = self.edges.iter().all(|(edge_id, edge)| {
            edge.a() != edge.b()
                && [edge.a(), edge.b()].into_iter().all(|endpoint| {
                    self.nodes
                        .get(endpoint)
                        .is_some_and(|n| n.incident_edges().contains(edge_id))
                })
        });
        let nodes_ok = self.nodes.iter().all(|(node_id, node)| {
            node.incident_edges().iter().all(|edge_id| {
                self.edges
                    .get(edge_id)
                    .is_some_and(|edge| edge.touches(node_id))
            })
        });
        let order_ok =
            self.node_order.len() == self.nodes.len() && self.edge_order.len() == self.edges.len();
        edges_ok && nodes_ok && order_ok
    }

    pub fn to_document(&self) -> DiagramDocument {
        let nodes = self
            .nodes()
            .map(|node| NodeRecord {
                id: node.node_id().as_str().to_owned(),
                x: node.position().x,
                y: node.position().y,
                text: node.text().to_owned(),
                width: node.size().width,
                height: node.size().height,
            })
            .collect();
        let edges = self
            .edges()
            .map(|edge| EdgeRecord {
                id: edge.edge_id().as_str().to_owned(),
                a: edge.a().as_str().to_owned(),
                b: edge.b().as_str().to_owned(),
            })
            .collect();
        DiagramDocument { nodes, edges }
    }

    /// Rebuilds a diagram, nodes first, then edges against the node lookup.
    ///
    /// Records that would break an invariant are dropped and reported rather than failing the
    /// whole load.
    pub fn from_document(document: DiagramDocument) -> (Diagram, LoadReport) {
        let mut diagram = Diagram::new();
        let mut report = LoadReport::default();

        for record in document.nodes {
            let node_id = if record.id.is_empty() {
                NodeId::generate()
            } else {
                match NodeId::new(record.id.clone()) {
                    Ok(node_id) => node_id,
                    Err(err) => {
                        report.record(
                            RecordKind::Node,
                            Some(record.id),
                            DropReason::InvalidId(err),
                        );
                        continue;
                    }
                }
            };
            if diagram.nodes.contains_key(&node_id) {
                report.record(RecordKind::Node, Some(record.id), DropReason::DuplicateId);
                continue;
            }
            diagram.insert_node(Node::new(
                node_id,
                Point::new(record.x, record.y),
                Size::new(record.width, record.height),
                record.text,
            ));
        }

        for record in document.edges {
            let edge_id = if record.id.is_empty() {
                EdgeId::generate()
            } else {
                match EdgeId::new(record.id.clone()) {
                    Ok(edge_id) => edge_id,
                    Err(err) => {
                        report.record(
                            RecordKind::Edge,
                            Some(record.id),
                            DropReason::InvalidId(err),
                        );
                        continue;
                    }
                }
            };
            if diagram.edges.contains_key(&edge_id) {
                report.record(RecordKind::Edge, Some(record.id), DropReason::DuplicateId);
                continue;
            }

            let Some(a) = diagram.resolve_endpoint(&record.a) else {
                report.record(
                    RecordKind::Edge,
                    Some(record.id),
                    DropReason::MissingEndpoint(record.a),
                );
                continue;
            };
            let Some(b) = diagram.resolve_endpoint(&record.b) else {
                report.record(
                    RecordKind::Edge,
                    Some(record.id),
                    DropReason::MissingEndpoint(record.b),
                );
                continue;
            };
            if a == b {
                report.record(RecordKind::Edge, Some(record.id), DropReason::SelfLoop);
                continue;
            }

            diagram.insert_edge(Edge::new(edge_id, a, b));
        }

        (diagram, report)
    }

    fn resolve_endpoint(&self, raw: &str) -> Option<NodeId> {
        self.nodes.get_key_value(raw).map(|(id, _)| id.clone())
    }

    /// Parses the on-disk JSON and rebuilds the diagram.
    pub fn from_json(json: &str) -> Result<(Diagram, LoadReport), GraphError> {
        let parsed = parse_document(json).map_err(|err| GraphError::MalformedDocument {
            reason: err.to_string(),
        })?;

        let mut report = LoadReport::default();
        for skipped in parsed.skipped {
            report.record_skipped(skipped);
        }
        let (diagram, validation) = Diagram::from_document(parsed.document);
        report.dropped.extend(validation.dropped);

        Ok((diagram, report))
    }
}
