// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::diagram::Diagram;
use crate::format::document::{DiagramDocument, EdgeRecord, NodeRecord};

fn node(id: &str, x: f64, y: f64, text: &str) -> NodeRecord {
    NodeRecord {
        id: id.to_owned(),
        x,
        y,
        text: text.to_owned(),
        width: 160.0,
        height: 52.0,
    }
}

fn edge(id: &str, a: &str, b: &str) -> EdgeRecord {
    EdgeRecord {
        id: id.to_owned(),
        a: a.to_owned(),
        b: b.to_owned(),
    }
}

/// Four nodes laid out on a 2x2 grid, connected as a diamond (`a-b`, `a-c`, `b-d`, `c-d`).
pub(crate) fn diamond_document() -> DiagramDocument {
    DiagramDocument {
        nodes: vec![
            node("n-a", 40.0, 40.0, "Idea"),
            node("n-b", 320.0, 40.0, "Pros"),
            node("n-c", 40.0, 240.0, "Cons"),
            node("n-d", 320.0, 240.0, "Decision"),
        ],
        edges: vec![
            edge("e-ab", "n-a", "n-b"),
            edge("e-ac", "n-a", "n-c"),
            edge("e-bd", "n-b", "n-d"),
            edge("e-cd", "n-c", "n-d"),
        ],
    }
}

pub(crate) fn diamond() -> Diagram {
    Diagram::from_document(diamond_document()).0
}
