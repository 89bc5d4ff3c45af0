// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Retained visual state for the terminal canvas.
//!
//! [`Scene`] is the terminal's [`Presenter`]: it only ever changes in response to editor
//! callbacks, mirroring the items a canvas toolkit would keep. [`SceneView`] paints it.

use std::collections::{BTreeMap, VecDeque};

use chrono::{Local, NaiveTime};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use super::viewport::Viewport;
use crate::interact::{Presenter, Severity, StatusMessage};
use crate::model::{Diagram, EdgeId, Node, NodeId, Point, Rect as DiagramRect};

const STATUS_LOG_CAPACITY: usize = 64;

const NODE_STYLE: Style = Style::new().fg(Color::White);
const SELECTED_NODE_STYLE: Style = Style::new()
    .fg(Color::LightGreen)
    .add_modifier(Modifier::BOLD);
const EDGE_STYLE: Style = Style::new().fg(Color::Gray);
const PROVISIONAL_STYLE: Style = Style::new().fg(Color::Yellow);

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub rect: DiagramRect,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub at: NaiveTime,
    pub message: StatusMessage,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, NodeVisual>,
    node_order: Vec<NodeId>,
    edges: BTreeMap<EdgeId, (Point, Point)>,
    provisional: Option<(Point, Point)>,
    selection: Option<NodeId>,
    pending_text_edit: Option<(NodeId, String)>,
    log: VecDeque<StatusLine>,
}

impl Scene {
    pub fn node(&self, node_id: &NodeId) -> Option<&NodeVisual> {
        self.nodes.get(node_id)
    }

    /// Nodes bottom to top.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodeVisual)> + '_ {
        self.node_order
            .iter()
            .filter_map(|id| self.nodes.get_key_value(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeId, &(Point, Point))> + '_ {
        self.edges.iter()
    }

    pub fn provisional(&self) -> Option<(Point, Point)> {
        self.provisional
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    /// Hands out a text-edit request raised by the editor, once.
    pub fn take_text_edit(&mut self) -> Option<(NodeId, String)> {
        self.pending_text_edit.take()
    }

    /// Most recent status lines, newest last.
    pub fn recent_status(&self, count: usize) -> impl Iterator<Item = &StatusLine> + '_ {
        self.log.iter().skip(self.log.len().saturating_sub(count))
    }

    pub fn push_status(&mut self, message: StatusMessage) {
        if self.log.len() == STATUS_LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(StatusLine {
            at: Local::now().time(),
            message,
        });
    }

    fn insert_node(&mut self, node: &Node) {
        let visual = NodeVisual {
            rect: node.rect(),
            text: node.text().to_owned(),
        };
        if self
            .nodes
            .insert(node.node_id().clone(), visual)
            .is_none()
        {
            self.node_order.push(node.node_id().clone());
        }
    }
}

impl Presenter for Scene {
    fn reset(&mut self, diagram: &Diagram) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
        self.provisional = None;
        self.pending_text_edit = None;
        for node in diagram.nodes() {
            self.insert_node(node);
        }
        for edge in diagram.edges() {
            if let Some(segment) = diagram.edge_segment(edge.edge_id()) {
                self.edges.insert(edge.edge_id().clone(), segment);
            }
        }
    }

    fn node_created(&mut self, node: &Node) {
        self.insert_node(node);
    }

    fn node_updated(&mut self, node: &Node) {
        self.insert_node(node);
    }

    fn node_removed(&mut self, node_id: &NodeId) {
        self.nodes.remove(node_id);
        self.node_order.retain(|id| id != node_id);
        if self.selection.as_ref() == Some(node_id) {
            self.selection = None;
        }
    }

    fn edge_created(&mut self, edge_id: &EdgeId, from: Point, to: Point) {
        self.edges.insert(edge_id.clone(), (from, to));
    }

    fn edge_updated(&mut self, edge_id: &EdgeId, from: Point, to: Point) {
        self.edges.insert(edge_id.clone(), (from, to));
    }

    fn edge_removed(&mut self, edge_id: &EdgeId) {
        self.edges.remove(edge_id);
    }

    fn provisional_line(&mut self, from: Point, to: Point) {
        self.provisional = Some((from, to));
    }

    fn clear_provisional_line(&mut self) {
        self.provisional = None;
    }

    fn selection_changed(&mut self, selected: Option<&NodeId>) {
        self.selection = selected.cloned();
    }

    fn begin_text_edit(&mut self, node_id: &NodeId, current: &str) {
        self.pending_text_edit = Some((node_id.clone(), current.to_owned()));
    }

    fn status(&mut self, message: &StatusMessage) {
        self.push_status(message.clone());
    }
}

/// Paints a [`Scene`] through a [`Viewport`]: edges first, then nodes in paint order, then the
/// provisional connection line.
pub struct SceneView<'a> {
    pub scene: &'a Scene,
    pub viewport: Viewport,
}

impl Widget for SceneView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let viewport = Viewport {
            area,
            ..self.viewport
        };
        let mut canvas = Canvas { area, buf };

        for (from, to) in self.scene.edges.values() {
            canvas.line(
                viewport.cell_position(*from),
                viewport.cell_position(*to),
                "·",
                EDGE_STYLE,
            );
        }

        for (node_id, visual) in self.scene.nodes() {
            let style = if self.scene.selection.as_ref() == Some(node_id) {
                SELECTED_NODE_STYLE
            } else {
                NODE_STYLE
            };
            canvas.node_box(&viewport, visual, style);
        }

        if let Some((from, to)) = self.scene.provisional {
            canvas.line(
                viewport.cell_position(from),
                viewport.cell_position(to),
                "*",
                PROVISIONAL_STYLE,
            );
        }
    }
}

struct Canvas<'b> {
    area: Rect,
    buf: &'b mut Buffer,
}

impl Canvas<'_> {
    fn left(&self) -> i64 {
        i64::from(self.area.x)
    }

    fn top(&self) -> i64 {
        i64::from(self.area.y)
    }

    /// Exclusive.
    fn right(&self) -> i64 {
        i64::from(self.area.x) + i64::from(self.area.width)
    }

    /// Exclusive.
    fn bottom(&self) -> i64 {
        i64::from(self.area.y) + i64::from(self.area.height)
    }

    fn put(&mut self, (x, y): (i64, i64), symbol: &str, style: Style) {
        if x < self.left() || y < self.top() || x >= self.right() || y >= self.bottom() {
            return;
        }
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        self.buf.get_mut(x, y).set_symbol(symbol).set_style(style);
    }

    /// Draws the segment between two fractional cell positions, clipped to the area first so
    /// only visible cells are visited.
    fn line(&mut self, from: (f64, f64), to: (f64, f64), symbol: &str, style: Style) {
        let bounds = (
            self.left() as f64,
            self.top() as f64,
            self.right() as f64,
            self.bottom() as f64,
        );
        let Some((from, to)) = clip_segment(from, to, bounds) else {
            return;
        };
        // Clipped coordinates lie within the area, so these casts are exact.
        let from = (from.0.floor() as i64, from.1.floor() as i64);
        let to = (to.0.floor() as i64, to.1.floor() as i64);
        self.bresenham(from, to, symbol, style);
    }

    // Endpoints included.
    fn bresenham(&mut self, from: (i64, i64), to: (i64, i64), symbol: &str, style: Style) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put((x, y), symbol, style);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn node_box(&mut self, viewport: &Viewport, visual: &NodeVisual, style: Style) {
        let rect = visual.rect;
        let (left, top) = viewport.point_to_cell(rect.origin);
        let (right, bottom) = viewport.end_cell(Point::new(rect.right(), rect.bottom()));
        let right = right.max(left + 1);
        let bottom = bottom.max(top + 1);

        let rows = top.max(self.top())..=bottom.min(self.bottom() - 1);
        let columns = left.max(self.left())..=right.min(self.right() - 1);
        for y in rows {
            for x in columns.clone() {
                let symbol = match (x == left, x == right, y == top, y == bottom) {
                    (true, _, true, _) => "┌",
                    (_, true, true, _) => "┐",
                    (true, _, _, true) => "└",
                    (_, true, _, true) => "┘",
                    (_, _, true, _) | (_, _, _, true) => "─",
                    (true, _, _, _) | (_, true, _, _) => "│",
                    _ => " ",
                };
                self.put((x, y), symbol, style);
            }
        }

        let inner_width = right - left - 1;
        if inner_width <= 0 || bottom - top < 2 {
            return;
        }
        let y = top + (bottom - top) / 2;
        if y < self.top() || y >= self.bottom() {
            return;
        }
        let label: Vec<char> = visual
            .text
            .chars()
            .take(usize::try_from(inner_width).unwrap_or(usize::MAX))
            .collect();
        let label_width = i64::try_from(label.len()).unwrap_or(inner_width);
        let start = left + 1 + (inner_width - label_width) / 2;
        for (x, ch) in (start..).zip(label) {
            if x >= self.right() {
                break;
            }
            self.put((x, y), ch.encode_utf8(&mut [0; 4]), style);
        }
    }
}

/// Liang-Barsky clipping of `from -> to` against `[left, right) x [top, bottom)`.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (left, top, right, bottom): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    // Keep the far edges inside the last cell so flooring never lands past it.
    let right = right - 1e-6;
    let bottom = bottom - 1e-6;
    if right < left || bottom < top {
        return None;
    }

    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if !(dx.is_finite() && dy.is_finite()) {
        return None;
    }
    let mut enter = 0.0_f64;
    let mut exit = 1.0_f64;
    for (p, q) in [
        (-dx, from.0 - left),
        (dx, right - from.0),
        (-dy, from.1 - top),
        (dy, bottom - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
        if enter > exit {
            return None;
        }
    }

    let at = |t: f64| {
        (
            (from.0 + t * dx).clamp(left, right),
            (from.1 + t * dy).clamp(top, bottom),
        )
    };
    Some((at(enter), at(exit)))
}

pub fn status_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::new().fg(Color::Gray),
        Severity::Warning => Style::new().fg(Color::Yellow),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::widgets::Widget;

    use super::{clip_segment, Scene, SceneView};
    use crate::interact::{EditorCommand, Editor, InputEvent, Presenter, StatusMessage};
    use crate::model::fixtures::diamond;
    use crate::model::{Diagram, NodeId, Point};
    use crate::tui::viewport::Viewport;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.get(x, y).symbol().to_owned())
            .collect()
    }

    fn same_visuals(a: &Scene, b: &Scene) -> bool {
        a.nodes().eq(b.nodes()) && a.edges().eq(b.edges())
    }

    #[test]
    fn incremental_updates_match_a_full_rebuild() {
        let mut scene = Scene::default();
        let mut editor = Editor::new(diamond());
        editor.replace_diagram(diamond(), &mut scene);

        editor
            .handle(InputEvent::PointerDown(Point::new(100.0, 60.0)), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::PointerDrag(Point::new(260.0, 160.0)), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::PointerUp(Point::new(260.0, 160.0)), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::DoubleActivate(Point::new(700.0, 400.0)), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::Command(EditorCommand::StartConnection), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::PointerDown(Point::new(400.0, 260.0)), &mut scene)
            .unwrap();
        editor
            .handle(InputEvent::Command(EditorCommand::DeleteSelection), &mut scene)
            .unwrap();

        let mut rebuilt = Scene::default();
        rebuilt.reset(editor.diagram());
        assert!(same_visuals(&scene, &rebuilt));
        assert_eq!(scene.nodes().count(), 4);
        assert_eq!(scene.edges().count(), 2);
        assert_eq!(scene.selection(), None);
        assert_eq!(scene.provisional(), None);
    }

    #[test]
    fn text_edit_request_is_handed_out_once() {
        let mut scene = Scene::default();
        let node_id = NodeId::new("n1").unwrap();
        scene.begin_text_edit(&node_id, "Idea");

        assert_eq!(scene.take_text_edit(), Some((node_id, "Idea".to_owned())));
        assert_eq!(scene.take_text_edit(), None);
    }

    #[test]
    fn status_log_keeps_the_most_recent_lines() {
        let mut scene = Scene::default();
        for i in 0..100 {
            scene.status(&StatusMessage::info(format!("line {i}")));
        }

        let recent: Vec<_> = scene
            .recent_status(2)
            .map(|line| line.message.text.clone())
            .collect();
        assert_eq!(recent, vec!["line 98", "line 99"]);
        assert_eq!(scene.recent_status(1000).count(), 64);
    }

    #[test]
    fn renders_nodes_edges_and_labels() {
        let mut diagram = Diagram::new();
        let a = diagram
            .create_node(Point::new(0.0, 0.0), Some("Idea".to_owned()))
            .node_id()
            .clone();
        let b = diagram
            .create_node(Point::new(240.0, 0.0), Some("Next".to_owned()))
            .node_id()
            .clone();
        diagram.create_edge(&a, &b).unwrap();

        let mut scene = Scene::default();
        scene.reset(&diagram);

        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        SceneView {
            scene: &scene,
            viewport: Viewport::new(area),
        }
        .render(area, &mut buf);

        assert_eq!(row(&buf, 0).trim_end(), "┌──────────────────┐          ┌──────────────────┐");
        assert!(row(&buf, 1).contains("Idea"));
        assert!(row(&buf, 1).contains("Next"));
        assert!(row(&buf, 1).contains("··········"));
        assert_eq!(row(&buf, 3).trim_end(), "└──────────────────┘          └──────────────────┘");
        assert_eq!(row(&buf, 4).trim(), "");
    }

    #[test]
    fn rendering_clips_to_the_area() {
        let mut diagram = Diagram::new();
        diagram.create_node(Point::new(-400.0, -400.0), None);
        diagram.create_node(Point::new(5000.0, 5000.0), None);
        let mut scene = Scene::default();
        scene.reset(&diagram);
        scene.provisional_line(Point::new(-1000.0, 0.0), Point::new(1000.0, 40.0));

        let area = Rect::new(2, 2, 10, 4);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        SceneView {
            scene: &scene,
            viewport: Viewport::new(area),
        }
        .render(area, &mut buf);

        assert_eq!(row(&buf, 0).trim(), "");
        assert_eq!(row(&buf, 3), format!("  {}        ", "*".repeat(10)));
        assert_eq!(row(&buf, 7).trim(), "");
    }

    fn render_document(json: &str, area: Rect) -> Buffer {
        let (diagram, report) = Diagram::from_json(json).unwrap();
        assert!(report.is_clean());
        let mut scene = Scene::default();
        scene.reset(&diagram);

        let mut buf = Buffer::empty(area);
        SceneView {
            scene: &scene,
            viewport: Viewport::new(area),
        }
        .render(area, &mut buf);
        buf
    }

    #[test]
    fn edge_between_far_apart_nodes_is_clipped_to_the_area() {
        let buf = render_document(
            r#"{
                "nodes": [{"id": "a", "x": -1e12, "y": 0}, {"id": "b", "x": 1e12, "y": 0}],
                "edges": [{"id": "e", "a": "a", "b": "b"}]
            }"#,
            Rect::new(0, 0, 40, 10),
        );

        assert_eq!(row(&buf, 1), "·".repeat(40));
        assert_eq!(row(&buf, 0).trim(), "");
    }

    #[test]
    fn huge_node_only_paints_visible_cells() {
        let buf = render_document(
            r#"{
                "nodes": [{"id": "a", "x": 0, "y": 0, "width": 1e9, "height": 1e9, "text": "Big"}]
            }"#,
            Rect::new(0, 0, 40, 10),
        );

        assert_eq!(row(&buf, 0), format!("┌{}", "─".repeat(39)));
        assert_eq!(row(&buf, 5), format!("│{}", " ".repeat(39)));
    }

    #[test]
    fn clipping_keeps_segments_inside_and_rejects_misses() {
        let bounds = (0.0, 0.0, 10.0, 5.0);

        let (from, to) = clip_segment((-10.0, 2.5), (20.0, 2.5), bounds).unwrap();
        assert!(from.0.abs() < 1e-9);
        assert_eq!(from.1, 2.5);
        assert!(to.0 < 10.0 && to.0 > 9.99);
        assert_eq!(to.1, 2.5);

        assert_eq!(clip_segment((-10.0, 7.0), (20.0, 9.0), bounds), None);
        assert_eq!(clip_segment((-1e308, 1.0), (1e308, 1.0), bounds), None);
    }
}
