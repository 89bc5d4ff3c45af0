// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Graph model.
//!
//! A [`Diagram`] owns its nodes and edges by id; each node keeps a non-owning index of the edges
//! touching it so deletes can cascade without scanning the whole graph.

pub mod diagram;
pub mod elements;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geometry;
pub mod ids;

pub use diagram::{
    Diagram, DropReason, DroppedRecord, EndpointProblem, GraphError, LoadReport, RemovedNode,
};
pub use elements::{Edge, Node, DEFAULT_NODE_SIZE, DEFAULT_NODE_TEXT};
pub use geometry::{Point, Rect, Size};
pub use ids::{AccountId, DiagramId, EdgeId, Id, IdError, NodeId};
