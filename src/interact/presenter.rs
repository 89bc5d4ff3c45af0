// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{Diagram, EdgeId, Node, NodeId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// Short user-facing status line produced for every handled or rejected action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Visual side of the editor.
///
/// The core only ever pushes updates through this trait and never reads anything back. Edge
/// geometry is passed as center-to-center segments so adapters need no graph lookups.
pub trait Presenter {
    /// Drops every visual and rebuilds from `diagram`.
    fn reset(&mut self, diagram: &Diagram);

    fn node_created(&mut self, node: &Node);

    /// Position, size or text of `node` changed.
    fn node_updated(&mut self, node: &Node);

    fn node_removed(&mut self, node_id: &NodeId);

    fn edge_created(&mut self, edge_id: &EdgeId, from: Point, to: Point);

    fn edge_updated(&mut self, edge_id: &EdgeId, from: Point, to: Point);

    fn edge_removed(&mut self, edge_id: &EdgeId);

    fn provisional_line(&mut self, from: Point, to: Point);

    fn clear_provisional_line(&mut self);

    fn selection_changed(&mut self, selected: Option<&NodeId>);

    /// Opens an inline text editor; the adapter answers with
    /// [`super::InputEvent::TextEditConfirmed`] or [`super::InputEvent::TextEditCancelled`].
    fn begin_text_edit(&mut self, node_id: &NodeId, current: &str);

    fn status(&mut self, message: &StatusMessage);
}

/// Headless presenter that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn reset(&mut self, _diagram: &Diagram) {}
    fn node_created(&mut self, _node: &Node) {}
    fn node_updated(&mut self, _node: &Node) {}
    fn node_removed(&mut self, _node_id: &NodeId) {}
    fn edge_created(&mut self, _edge_id: &EdgeId, _from: Point, _to: Point) {}
    fn edge_updated(&mut self, _edge_id: &EdgeId, _from: Point, _to: Point) {}
    fn edge_removed(&mut self, _edge_id: &EdgeId) {}
    fn provisional_line(&mut self, _from: Point, _to: Point) {}
    fn clear_provisional_line(&mut self) {}
    fn selection_changed(&mut self, _selected: Option<&NodeId>) {}
    fn begin_text_edit(&mut self, _node_id: &NodeId, _current: &str) {}
    fn status(&mut self, _message: &StatusMessage) {}
}
