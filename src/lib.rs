// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! MindMapr: a terminal mind-map editor.
//!
//! The graph model lives in [`model`], the pointer-driven editing state machine in [`interact`],
//! per-account persistence in [`store`], and [`session`] ties one account's store to an editor.
//! [`tui`] is the ratatui front end.

pub mod format;
pub mod interact;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;
pub mod tui;
