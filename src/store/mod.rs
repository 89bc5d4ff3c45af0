// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for account workspaces on disk.
//!
//! Each account owns a metadata index plus one JSON body per diagram. Both the TUI and the
//! one-shot CLI commands go through [`DocumentStore`].

pub mod workspace;

pub use workspace::{
    DiagramMeta, DocumentStore, ImportedDiagram, StoreError, WriteDurability, TIMESTAMP_FORMAT,
};
