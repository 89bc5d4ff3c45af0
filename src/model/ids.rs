// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;
use uuid::Uuid;

/// Longest accepted id, in bytes. A `~hex` encoded id of this length plus `.json` still fits a
/// 255-byte file name.
pub const MAX_ID_LEN: usize = 120;

/// Opaque identifier of a node, edge, diagram or account; `T` only tags the kind.
///
/// Any string is accepted as long as it is a usable path segment: diagram and account ids
/// become file and directory names in the workspace. Hand-written documents may use short ids
/// like `"n1"`; ids minted here are hyphenated UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        check_segment(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().hyphenated().to_string(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// Lets `BTreeMap<Id<T>, _>` be queried with a raw `&str` from a document record.
impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain '/'")]
    ContainsSlash,
    #[error("id is {len} bytes long, at most {MAX_ID_LEN} are allowed")]
    TooLong { len: usize },
}

fn check_segment(value: &str) -> Result<(), IdError> {
    match value {
        "" => Err(IdError::Empty),
        v if v.contains('/') => Err(IdError::ContainsSlash),
        v if v.len() > MAX_ID_LEN => Err(IdError::TooLong { len: v.len() }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagramIdTag {}
pub type DiagramId = Id<DiagramIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountIdTag {}
pub type AccountId = Id<AccountIdTag>;
