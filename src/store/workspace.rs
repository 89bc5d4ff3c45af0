// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::format::{to_json_pretty, DiagramDocument};
use crate::model::{AccountId, Diagram, DiagramId, GraphError, IdError, LoadReport};

mod helpers;

use helpers::{
    create_dir_all_safe, encode_persisted_id_segment, remove_file_if_exists, write_atomic,
};

pub const INDEX_FILENAME: &str = "maps_index.json";
pub const MAPS_DIRNAME: &str = "maps";
pub const BODY_EXTENSION: &str = "json";

/// Local wall-clock format used for `created` / `modified` in the index.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("diagram {diagram_id} not found for account {account}")]
    NotFound {
        account: AccountId,
        diagram_id: DiagramId,
    },
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {field} {value:?}: {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: IdError,
    },
    #[error("malformed diagram at {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: GraphError,
    },
    #[error("refusing to follow symlink at {}", .path.display())]
    SymlinkRefused { path: PathBuf },
}

/// Index entry for one stored diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMeta {
    pub diagram_id: DiagramId,
    pub title: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

/// Result of [`DocumentStore::import_diagram`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDiagram {
    pub meta: DiagramMeta,
    pub diagram: Diagram,
    pub report: LoadReport,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync.
    #[default]
    BestEffort,

    /// Additionally syncs file contents and the containing directory. Exact guarantees are
    /// platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IndexEntryJson {
    title: String,
    #[serde(with = "timestamp")]
    created: NaiveDateTime,
    #[serde(with = "timestamp")]
    modified: NaiveDateTime,
}

type IndexJson = BTreeMap<String, IndexEntryJson>;

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub(super) fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Per-account diagram storage rooted at a data directory.
///
/// Layout: `<root>/<account>/maps_index.json` plus one body per diagram at
/// `<root>/<account>/maps/<diagram-id>.json`. Every file write goes through a temp file and an
/// atomic rename; saves write the body before the index.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    durability: WriteDurability,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn account_dir(&self, account: &AccountId) -> PathBuf {
        self.root.join(encode_persisted_id_segment(account.as_str()))
    }

    pub fn index_path(&self, account: &AccountId) -> PathBuf {
        self.account_dir(account).join(INDEX_FILENAME)
    }

    pub fn body_path(&self, account: &AccountId, diagram_id: &DiagramId) -> PathBuf {
        self.account_dir(account).join(MAPS_DIRNAME).join(format!(
            "{}.{BODY_EXTENSION}",
            encode_persisted_id_segment(diagram_id.as_str())
        ))
    }

    /// Ensures the account directory, its `maps/` folder and an index file exist.
    pub fn create_account_workspace(&self, account: &AccountId) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let account_segment = encode_persisted_id_segment(account.as_str());
        create_dir_all_safe(&self.root, &Path::new(&account_segment).join(MAPS_DIRNAME))?;

        let index_path = self.index_path(account);
        match fs::symlink_metadata(&index_path) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(account = %account, "initializing account workspace");
                self.write_index(account, &IndexJson::new())
            }
            Err(source) => Err(StoreError::Io {
                path: index_path,
                source,
            }),
        }
    }

    /// All diagrams of `account`, most recently modified first (ties by id).
    ///
    /// Index entries whose key is not a valid diagram id are skipped.
    pub fn list_diagrams(&self, account: &AccountId) -> Result<Vec<DiagramMeta>, StoreError> {
        let index = self.load_index(account)?;
        let mut metas: Vec<DiagramMeta> = index
            .into_iter()
            .filter_map(|(raw_id, entry)| match DiagramId::new(raw_id.clone()) {
                Ok(diagram_id) => Some(meta_from_entry(diagram_id, entry)),
                Err(err) => {
                    warn!(account = %account, id = %raw_id, %err, "skipping index entry");
                    None
                }
            })
            .collect();

        metas.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.diagram_id.cmp(&b.diagram_id))
        });
        Ok(metas)
    }

    pub fn diagram_meta(
        &self,
        account: &AccountId,
        diagram_id: &DiagramId,
    ) -> Result<Option<DiagramMeta>, StoreError> {
        let mut index = self.load_index(account)?;
        Ok(index
            .remove(diagram_id.as_str())
            .map(|entry| meta_from_entry(diagram_id.clone(), entry)))
    }

    /// Reads and rebuilds a stored diagram.
    ///
    /// Fails with [`StoreError::NotFound`] when either the index entry or the body is missing.
    /// Records that do not survive validation are dropped and listed in the report.
    pub fn load_diagram(
        &self,
        account: &AccountId,
        diagram_id: &DiagramId,
    ) -> Result<(Diagram, LoadReport), StoreError> {
        let not_found = || StoreError::NotFound {
            account: account.clone(),
            diagram_id: diagram_id.clone(),
        };

        if !self.load_index(account)?.contains_key(diagram_id.as_str()) {
            return Err(not_found());
        }

        let body_path = self.body_path(account, diagram_id);
        let body = match fs::read_to_string(&body_path) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: body_path,
                    source,
                })
            }
        };

        let (diagram, report) =
            Diagram::from_json(&body).map_err(|source| StoreError::Malformed {
                path: body_path.clone(),
                source,
            })?;
        debug!(
            account = %account,
            diagram_id = %diagram_id,
            nodes = diagram.node_count(),
            edges = diagram.edge_count(),
            dropped = report.dropped.len(),
            "loaded diagram"
        );
        Ok((diagram, report))
    }

    /// Writes the body, then upserts the index entry with `modified = now`.
    ///
    /// `title` is only used when the diagram has no index entry yet.
    pub fn save_diagram(
        &self,
        account: &AccountId,
        diagram_id: &DiagramId,
        title: &str,
        document: &DiagramDocument,
    ) -> Result<DiagramMeta, StoreError> {
        self.save_diagram_at(account, diagram_id, title, document, now())
    }

    /// [`Self::save_diagram`] with an explicit timestamp.
    pub fn save_diagram_at(
        &self,
        account: &AccountId,
        diagram_id: &DiagramId,
        title: &str,
        document: &DiagramDocument,
        now: NaiveDateTime,
    ) -> Result<DiagramMeta, StoreError> {
        self.create_account_workspace(account)?;

        let body_path = self.body_path(account, diagram_id);
        let body = to_json_pretty(document).map_err(|source| StoreError::Json {
            path: body_path.clone(),
            source,
        })?;
        write_atomic(
            &self.account_dir(account),
            &body_path,
            body.as_bytes(),
            self.durability,
        )?;

        let mut index = self.load_index(account)?;
        let entry = index
            .entry(diagram_id.as_str().to_owned())
            .and_modify(|entry| entry.modified = now)
            .or_insert_with(|| IndexEntryJson {
                title: title.to_owned(),
                created: now,
                modified: now,
            })
            .clone();
        self.write_index(account, &index)?;

        info!(
            account = %account,
            diagram_id = %diagram_id,
            title = %entry.title,
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "saved diagram"
        );
        Ok(meta_from_entry(diagram_id.clone(), entry))
    }

    /// Allocates a fresh id and stores an empty diagram under `title`.
    pub fn create_diagram(
        &self,
        account: &AccountId,
        title: &str,
    ) -> Result<DiagramMeta, StoreError> {
        self.create_diagram_at(account, title, now())
    }

    pub fn create_diagram_at(
        &self,
        account: &AccountId,
        title: &str,
        now: NaiveDateTime,
    ) -> Result<DiagramMeta, StoreError> {
        let diagram_id = DiagramId::generate();
        self.save_diagram_at(account, &diagram_id, title, &DiagramDocument::default(), now)
    }

    /// Removes the index entry, then the body. Returns `false` when there was nothing to remove.
    pub fn delete_diagram(
        &self,
        account: &AccountId,
        diagram_id: &DiagramId,
    ) -> Result<bool, StoreError> {
        let mut index = self.load_index(account)?;
        let had_entry = index.remove(diagram_id.as_str()).is_some();
        if had_entry {
            self.write_index(account, &index)?;
        }

        let had_body = remove_file_if_exists(&self.body_path(account, diagram_id))?;
        if had_entry || had_body {
            info!(account = %account, diagram_id = %diagram_id, "deleted diagram");
        }
        Ok(had_entry || had_body)
    }

    /// Imports an external diagram file under its file stem.
    ///
    /// The document is validated through [`Diagram::from_json`]; the repaired form is what gets
    /// stored. An existing diagram with the same id is overwritten but keeps its title.
    pub fn import_diagram(
        &self,
        account: &AccountId,
        path: &Path,
    ) -> Result<ImportedDiagram, StoreError> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let diagram_id = DiagramId::new(stem.clone()).map_err(|source| StoreError::InvalidId {
            field: "diagram id",
            value: stem.clone(),
            source,
        })?;

        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (diagram, report) =
            Diagram::from_json(&json).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let meta = self.save_diagram(account, &diagram_id, &stem, &diagram.to_document())?;
        info!(
            account = %account,
            diagram_id = %diagram_id,
            source = %path.display(),
            dropped = report.dropped.len(),
            "imported diagram"
        );
        Ok(ImportedDiagram {
            meta,
            diagram,
            report,
        })
    }

    fn load_index(&self, account: &AccountId) -> Result<IndexJson, StoreError> {
        let index_path = self.index_path(account);
        let raw = match fs::read_to_string(&index_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(IndexJson::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: index_path,
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: index_path,
            source,
        })
    }

    fn write_index(&self, account: &AccountId, index: &IndexJson) -> Result<(), StoreError> {
        let index_path = self.index_path(account);
        let raw = serde_json::to_string_pretty(index).map_err(|source| StoreError::Json {
            path: index_path.clone(),
            source,
        })?;
        write_atomic(
            &self.account_dir(account),
            &index_path,
            format!("{raw}\n").as_bytes(),
            self.durability,
        )
    }
}

fn meta_from_entry(diagram_id: DiagramId, entry: IndexEntryJson) -> DiagramMeta {
    DiagramMeta {
        diagram_id,
        title: entry.title,
        created: entry.created,
        modified: entry.modified,
    }
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests;
