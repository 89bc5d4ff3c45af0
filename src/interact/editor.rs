// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::event::{EditorCommand, EditorKey, InputEvent};
use super::presenter::{Presenter, StatusMessage};
use crate::model::{Diagram, EdgeId, GraphError, NodeId, Point, DEFAULT_NODE_SIZE};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Idle,
    /// A source node is chosen and a provisional line follows the pointer.
    Connecting { source: NodeId, pointer: Point },
}

/// Rejected actions. None of these are fatal; the diagram is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no node selected")]
    NoSelection,
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("node {0} no longer exists")]
    UnknownNode(NodeId),
    #[error("already connecting; pick a target node or press Esc")]
    AlreadyConnecting,
}

/// What a handled event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Nothing,
    NodeCreated(NodeId),
    SelectionChanged(Option<NodeId>),
    NodeMoved(NodeId),
    TextEditRequested(NodeId),
    TextUpdated(NodeId),
    ConnectionStarted(NodeId),
    ConnectionAborted,
    EdgeCreated(EdgeId),
    NodeDeleted { node_id: NodeId, edges: Vec<EdgeId> },
}

/// Interaction state machine over one diagram.
///
/// Every event runs to completion; pointer motion costs O(incident edges) of the moved node.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    diagram: Diagram,
    state: EditorState,
    selection: Option<NodeId>,
    dragging: Option<NodeId>,
    dirty: bool,
}

impl Editor {
    pub fn new(diagram: Diagram) -> Self {
        Self {
            diagram,
            ..Self::default()
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.state, EditorState::Connecting { .. })
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    /// True when the diagram changed since it was loaded or last marked saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Swaps in another diagram (open / new) and re-renders everything.
    pub fn replace_diagram(&mut self, diagram: Diagram, presenter: &mut dyn Presenter) -> Diagram {
        let previous = std::mem::replace(&mut self.diagram, diagram);
        self.state = EditorState::Idle;
        self.selection = None;
        self.dragging = None;
        self.dirty = false;
        presenter.clear_provisional_line();
        presenter.reset(&self.diagram);
        presenter.selection_changed(None);
        previous
    }

    /// Feeds one input event through the state machine.
    ///
    /// Rejections are also reported to the presenter as a warning status.
    pub fn handle(
        &mut self,
        event: InputEvent,
        presenter: &mut dyn Presenter,
    ) -> Result<Handled, EditorError> {
        let result = self.dispatch(event, presenter);
        report_rejection(&result, presenter);
        result
    }

    fn dispatch(
        &mut self,
        event: InputEvent,
        presenter: &mut dyn Presenter,
    ) -> Result<Handled, EditorError> {
        match event {
            InputEvent::PointerDown(point) => self.activate(point, presenter),
            InputEvent::PointerDrag(point) => Ok(self.drag(point, presenter)),
            InputEvent::PointerMove(point) => Ok(self.track_pointer(point, presenter)),
            InputEvent::PointerUp(_) => {
                self.dragging = None;
                Ok(Handled::Nothing)
            }
            InputEvent::DoubleActivate(point) => self.double_activate(point, presenter),
            InputEvent::SecondaryActivate(point) => Ok(self.request_text_edit(point, presenter)),
            InputEvent::Key(EditorKey::Delete)
            | InputEvent::Command(EditorCommand::DeleteSelection) => {
                self.delete_selection(presenter)
            }
            InputEvent::Key(EditorKey::Escape) => Ok(self.escape(presenter)),
            InputEvent::Command(EditorCommand::StartConnection) => {
                self.start_connection(presenter)
            }
            InputEvent::TextEditConfirmed { node_id, text } => {
                self.update_text(node_id, text, presenter)
            }
            InputEvent::TextEditCancelled => Ok(Handled::Nothing),
        }
    }

    fn activate(
        &mut self,
        point: Point,
        presenter: &mut dyn Presenter,
    ) -> Result<Handled, EditorError> {
        let hit = self.diagram.node_at(point).cloned();

        if let EditorState::Connecting { source, .. } = &self.state {
            let source = source.clone();
            self.state = EditorState::Idle;
            presenter.clear_provisional_line();

            // Clicking the source itself is surfaced as a self-loop rejection.
            let Some(target) = hit else {
                presenter.status(&StatusMessage::info("Connection aborted."));
                return Ok(Handled::ConnectionAborted);
            };
            let edge_id = self.create_connection(&source, &target, presenter)?;
            self.select(Some(target), presenter);
            return Ok(Handled::EdgeCreated(edge_id));
        }

        match hit {
            Some(node_id) => {
                self.dragging = Some(node_id.clone());
                self.select(Some(node_id.clone()), presenter);
                Ok(Handled::SelectionChanged(Some(node_id)))
            }
            None => {
                self.dragging = None;
                self.select(None, presenter);
                Ok(Handled::SelectionChanged(None))
            }
        }
    }

    fn double_activate(
        &mut self,
        point: Point,
        presenter: &mut dyn Presenter,
    ) -> Result<Handled, EditorError> {
        if self.is_connecting() || self.diagram.node_at(point).is_some() {
            return self.activate(point, presenter);
        }

        let origin = point - DEFAULT_NODE_SIZE.half();
        let node = self.diagram.create_node(origin, None);
        let node_id = node.node_id().clone();
        presenter.node_created(node);
        self.dirty = true;
        info!(node_id = %node_id, "created node");
        presenter.status(&StatusMessage::info(format!("Created node {node_id}")));
        self.select(Some(node_id.clone()), presenter);
        Ok(Handled::NodeCreated(node_id))
    }

    fn drag(&mut self, point: Point, presenter: &mut dyn Presenter) -> Handled {
        if self.is_connecting() {
            return self.track_pointer(point, presenter);
        }

        let Some(node_id) = self.dragging.clone() else {
            return Handled::Nothing;
        };
        if self.selection.as_ref() != Some(&node_id) {
            return Handled::Nothing;
        }

        let Some(node) = self.diagram.node(&node_id) else {
            self.dragging = None;
            return Handled::Nothing;
        };
        let origin = point - node.size().half();
        let Some(node) = self.diagram.move_node(&node_id, origin) else {
            return Handled::Nothing;
        };
        presenter.node_updated(node);

        let incident = node.incident_edges().clone();
        for edge_id in &incident {
            if let Some((from, to)) = self.diagram.edge_segment(edge_id) {
                presenter.edge_updated(edge_id, from, to);
            }
        }
        self.dirty = true;
        Handled::NodeMoved(node_id)
    }

    fn track_pointer(&mut self, point: Point, presenter: &mut dyn Presenter) -> Handled {
        let EditorState::Connecting { source, pointer } = &mut self.state else {
            return Handled::Nothing;
        };
        *pointer = point;
        if let Some(node) = self.diagram.node(source) {
            presenter.provisional_line(node.center(), point);
        }
        Handled::Nothing
    }

    fn request_text_edit(&mut self, point: Point, presenter: &mut dyn Presenter) -> Handled {
        let Some(node) = self.diagram.node_at(point).and_then(|id| self.diagram.node(id)) else {
            return Handled::Nothing;
        };
        presenter.begin_text_edit(node.node_id(), node.text());
        Handled::TextEditRequested(node.node_id().clone())
    }

    fn update_text(
        &mut self,
        node_id: NodeId,
        text: String,
        presenter: &mut dyn Presenter,
    ) -> Result<Handled, EditorError> {
        let Some(node) = self.diagram.set_node_text(&node_id, text) else {
            return Err(EditorError::UnknownNode(node_id));
        };
        presenter.node_updated(node);
        self.dirty = true;
        presenter.status(&StatusMessage::info(format!("Node '{node_id}' text updated.")));
        Ok(Handled::TextUpdated(node_id))
    }

    fn start_connection(&mut self, presenter: &mut dyn Presenter) -> Result<Handled, EditorError> {
        if self.is_connecting() {
            return Err(EditorError::AlreadyConnecting);
        }
        let Some(source) = self.selection.clone() else {
            return Err(EditorError::NoSelection);
        };
        let Some(node) = self.diagram.node(&source) else {
            self.selection = None;
            return Err(EditorError::UnknownNode(source));
        };

        let center = node.center();
        self.dragging = None;
        self.state = EditorState::Connecting {
            source: source.clone(),
            pointer: center,
        };
        presenter.provisional_line(center, center);
        debug!(source = %source, "connection mode");
        presenter.status(&StatusMessage::info(
            "Connection mode: click target node to connect.",
        ));
        Ok(Handled::ConnectionStarted(source))
    }

    fn abort_connection(&mut self, presenter: &mut dyn Presenter) -> Handled {
        self.state = EditorState::Idle;
        presenter.clear_provisional_line();
        presenter.status(&StatusMessage::info("Connection aborted."));
        Handled::ConnectionAborted
    }

    fn escape(&mut self, presenter: &mut dyn Presenter) -> Handled {
        if self.is_connecting() {
            return self.abort_connection(presenter);
        }
        Handled::Nothing
    }

    /// Connects two nodes directly, bypassing pointer hit tests.
    ///
    /// Fails with [`GraphError::InvalidEndpoint`] for self-loops and unknown nodes; the state
    /// machine stays where it was and the diagram is untouched.
    pub fn connect(
        &mut self,
        a: &NodeId,
        b: &NodeId,
        presenter: &mut dyn Presenter,
    ) -> Result<EdgeId, EditorError> {
        let result = self.create_connection(a, b, presenter);
        report_rejection(&result, presenter);
        result
    }

    fn create_connection(
        &mut self,
        a: &NodeId,
        b: &NodeId,
        presenter: &mut dyn Presenter,
    ) -> Result<EdgeId, EditorError> {
        let edge_id = self.diagram.create_edge(a, b)?.edge_id().clone();
        if let Some((from, to)) = self.diagram.edge_segment(&edge_id) {
            presenter.edge_created(&edge_id, from, to);
        }
        self.dirty = true;
        info!(edge_id = %edge_id, a = %a, b = %b, "created edge");
        presenter.status(&StatusMessage::info(format!(
            "Created edge {edge_id} between {a} and {b}"
        )));
        Ok(edge_id)
    }

    fn delete_selection(&mut self, presenter: &mut dyn Presenter) -> Result<Handled, EditorError> {
        let Some(node_id) = self.selection.clone() else {
            return Err(EditorError::NoSelection);
        };

        if self.is_connecting() {
            self.state = EditorState::Idle;
            presenter.clear_provisional_line();
        }
        self.dragging = None;
        self.select(None, presenter);

        let Some(removed) = self.diagram.delete_node(&node_id) else {
            return Err(EditorError::UnknownNode(node_id));
        };
        let edges: Vec<EdgeId> = removed.edges.iter().map(|e| e.edge_id().clone()).collect();
        for edge_id in &edges {
            presenter.edge_removed(edge_id);
        }
        presenter.node_removed(&node_id);
        self.dirty = true;
        info!(node_id = %node_id, edges = edges.len(), "deleted node");
        presenter.status(&StatusMessage::info(format!("Deleted node {node_id}")));
        Ok(Handled::NodeDeleted { node_id, edges })
    }

    fn select(&mut self, selection: Option<NodeId>, presenter: &mut dyn Presenter) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        presenter.selection_changed(self.selection.as_ref());
    }
}

fn report_rejection<T>(result: &Result<T, EditorError>, presenter: &mut dyn Presenter) {
    if let Err(err) = result {
        warn!(%err, "editor action rejected");
        presenter.status(&StatusMessage::warning(err.to_string()));
    }
}
