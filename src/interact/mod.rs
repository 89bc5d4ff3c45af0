// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pointer-driven interaction over a [`crate::model::Diagram`].
//!
//! Adapters translate device input into [`InputEvent`]s and render whatever the [`Editor`]
//! pushes through their [`Presenter`]. The editor never reads visuals back.

pub mod editor;
pub mod event;
pub mod presenter;

pub use editor::{Editor, EditorError, EditorState, Handled};
pub use event::{EditorCommand, EditorKey, InputEvent};
pub use presenter::{NullPresenter, Presenter, Severity, StatusMessage};
