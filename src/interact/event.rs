// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{NodeId, Point};

/// Abstract input delivered by a presentation adapter. Coordinates are in diagram space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed ("activate").
    PointerDown(Point),
    /// Pointer motion while the primary button is held.
    PointerDrag(Point),
    /// Pointer motion with no button held.
    PointerMove(Point),
    PointerUp(Point),
    DoubleActivate(Point),
    SecondaryActivate(Point),
    Key(EditorKey),
    Command(EditorCommand),
    /// The inline editor opened by [`super::Presenter::begin_text_edit`] was confirmed.
    TextEditConfirmed { node_id: NodeId, text: String },
    TextEditCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    StartConnection,
    DeleteSelection,
}
