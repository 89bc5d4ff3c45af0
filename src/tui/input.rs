// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::viewport::Viewport;
use crate::interact::InputEvent;
use crate::model::Point;

pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Detects double clicks: two left presses on the same cell within [`DOUBLE_CLICK_WINDOW`].
#[derive(Debug, Default, Clone)]
pub struct ClickTracker {
    last: Option<(u16, u16, Instant)>,
}

impl ClickTracker {
    /// Records a press and reports whether it completes a double click.
    ///
    /// A completed double click is forgotten, so a third press starts over.
    pub fn register(&mut self, column: u16, row: u16, now: Instant) -> bool {
        let is_double = self.last.is_some_and(|(c, r, at)| {
            c == column && r == row && now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
        });
        self.last = if is_double {
            None
        } else {
            Some((column, row, now))
        };
        is_double
    }
}

/// Translates a terminal mouse event into an editor event in diagram space.
///
/// Events outside the viewport are ignored, except releases, which always end a drag.
pub fn pointer_event(
    mouse: &MouseEvent,
    viewport: &Viewport,
    clicks: &mut ClickTracker,
    now: Instant,
) -> Option<InputEvent> {
    let point = viewport.cell_to_point(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let point = point?;
            if clicks.register(mouse.column, mouse.row, now) {
                Some(InputEvent::DoubleActivate(point))
            } else {
                Some(InputEvent::PointerDown(point))
            }
        }
        MouseEventKind::Down(MouseButton::Right) => point.map(InputEvent::SecondaryActivate),
        MouseEventKind::Drag(MouseButton::Left) => point.map(InputEvent::PointerDrag),
        MouseEventKind::Moved => point.map(InputEvent::PointerMove),
        MouseEventKind::Up(MouseButton::Left) => {
            Some(InputEvent::PointerUp(point.unwrap_or(Point::new(0.0, 0.0))))
        }
        _ => None,
    }
}
