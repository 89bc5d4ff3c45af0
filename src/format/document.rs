// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON wire form of a single diagram body.
//!
//! Decoding is lenient per record: a node or edge entry that cannot be decoded is skipped and
//! reported instead of failing the whole document. Only a document that is not JSON, or whose
//! top-level shape is wrong, is rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::elements::{DEFAULT_NODE_SIZE, DEFAULT_NODE_TEXT};

/// Position used by records that carry no coordinates.
const DEFAULT_NODE_COORD: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Empty when the record carried no id; a fresh id is allocated on load.
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_coord")]
    pub x: f64,
    #[serde(default = "default_coord")]
    pub y: f64,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
}

fn default_coord() -> f64 {
    DEFAULT_NODE_COORD
}

fn default_text() -> String {
    DEFAULT_NODE_TEXT.to_owned()
}

fn default_width() -> f64 {
    DEFAULT_NODE_SIZE.width
}

fn default_height() -> f64 {
    DEFAULT_NODE_SIZE.height
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Node,
    Edge,
}

/// A record that could not be decoded into a [`NodeRecord`] / [`EdgeRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub index: usize,
    /// The record's `id`, when it had a readable one.
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub document: DiagramDocument,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("document field `{field}` must be an array")]
    FieldNotArray { field: &'static str },
}

pub fn parse_document(json: &str) -> Result<ParsedDocument, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    parse_document_value(value)
}

pub fn parse_document_value(value: Value) -> Result<ParsedDocument, DocumentError> {
    let Value::Object(mut root) = value else {
        return Err(DocumentError::NotAnObject);
    };

    let mut skipped = Vec::new();
    let nodes = decode_records::<NodeRecord>(
        root.remove("nodes"),
        "nodes",
        RecordKind::Node,
        &mut skipped,
    )?;
    let edges = decode_records::<EdgeRecord>(
        root.remove("edges"),
        "edges",
        RecordKind::Edge,
        &mut skipped,
    )?;

    Ok(ParsedDocument {
        document: DiagramDocument { nodes, edges },
        skipped,
    })
}

fn decode_records<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
    field: &'static str,
    kind: RecordKind,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<T>, DocumentError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(DocumentError::FieldNotArray { field }),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let id = item.get("id").and_then(Value::as_str).map(str::to_owned);
        match serde_json::from_value::<T>(item) {
            Ok(record) => out.push(record),
            Err(err) => skipped.push(SkippedRecord {
                kind,
                index,
                id,
                reason: err.to_string(),
            }),
        }
    }
    Ok(out)
}

/// Pretty JSON with a trailing newline, the on-disk form.
pub fn to_json_pretty(document: &DiagramDocument) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(document)?;
    out.push('\n');
    Ok(out)
}
