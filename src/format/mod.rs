// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted formats.

pub mod document;

pub use document::{
    parse_document, to_json_pretty, DiagramDocument, DocumentError, EdgeRecord, NodeRecord,
    ParsedDocument, RecordKind, SkippedRecord,
};
