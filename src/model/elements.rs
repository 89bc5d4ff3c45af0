// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::geometry::{Point, Rect, Size};
use super::ids::{EdgeId, NodeId};

pub const DEFAULT_NODE_SIZE: Size = Size::new(160.0, 52.0);
pub const DEFAULT_NODE_TEXT: &str = "New Node";

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    node_id: NodeId,
    position: Point,
    size: Size,
    text: String,
    incident_edges: BTreeSet<EdgeId>,
}

impl Node {
    pub(super) fn new(node_id: NodeId, position: Point, size: Size, text: String) -> Self {
        Self {
            node_id,
            position,
            size,
            text,
            incident_edges: BTreeSet::new(),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Edges that currently reference this node. Maintained by [`super::Diagram`].
    pub fn incident_edges(&self) -> &BTreeSet<EdgeId> {
        &self.incident_edges
    }

    pub(super) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(super) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub(super) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(super) fn attach_edge(&mut self, edge_id: EdgeId) {
        self.incident_edges.insert(edge_id);
    }

    pub(super) fn detach_edge(&mut self, edge_id: &EdgeId) {
        self.incident_edges.remove(edge_id);
    }
}

/// An undirected connection. `a`/`b` only record storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    edge_id: EdgeId,
    a: NodeId,
    b: NodeId,
}

impl Edge {
    pub(super) fn new(edge_id: EdgeId, a: NodeId, b: NodeId) -> Self {
        Self { edge_id, a, b }
    }

    pub fn edge_id(&self) -> &EdgeId {
        &self.edge_id
    }

    pub fn a(&self) -> &NodeId {
        &self.a
    }

    pub fn b(&self) -> &NodeId {
        &self.b
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.a == node_id || &self.b == node_id
    }

    /// Returns the endpoint that is not `node_id`, if `node_id` is an endpoint.
    pub fn opposite(&self, node_id: &NodeId) -> Option<&NodeId> {
        if &self.a == node_id {
            Some(&self.b)
        } else if &self.b == node_id {
            Some(&self.a)
        } else {
            None
        }
    }
}
