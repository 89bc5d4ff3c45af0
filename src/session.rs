// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One account's editing session: the store, the open diagram and its editor.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::interact::{Editor, Presenter};
use crate::model::{AccountId, Diagram, DiagramId, LoadReport};
use crate::store::{DiagramMeta, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("a title is required to save a new diagram")]
    TitleRequired,
    #[error("title must not be blank")]
    BlankTitle,
}

/// Holds the in-memory diagram of one account until it is saved.
///
/// `current` is `None` for a diagram that was never saved; its first save allocates the id and
/// fixes the title.
#[derive(Debug)]
pub struct EditSession {
    store: DocumentStore,
    account: AccountId,
    current: Option<DiagramMeta>,
    editor: Editor,
}

impl EditSession {
    pub fn new(store: DocumentStore, account: AccountId) -> Result<Self, SessionError> {
        store.create_account_workspace(&account)?;
        info!(account = %account, root = %store.root().display(), "session started");
        Ok(Self {
            store,
            account,
            current: None,
            editor: Editor::default(),
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Metadata of the open diagram, `None` while it has never been saved.
    pub fn current(&self) -> Option<&DiagramMeta> {
        self.current.as_ref()
    }

    /// Whether the next [`Self::save`] needs a title.
    pub fn needs_title(&self) -> bool {
        self.current.is_none()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn list(&self) -> Result<Vec<DiagramMeta>, SessionError> {
        Ok(self.store.list_diagrams(&self.account)?)
    }

    /// Stores an empty diagram under `title` and opens it.
    pub fn new_diagram(
        &mut self,
        title: &str,
        presenter: &mut dyn Presenter,
    ) -> Result<DiagramMeta, SessionError> {
        let title = checked_title(title)?;
        let meta = self.store.create_diagram(&self.account, title)?;
        self.editor.replace_diagram(Diagram::new(), presenter);
        self.current = Some(meta.clone());
        info!(
            account = %self.account,
            diagram_id = %meta.diagram_id,
            title = %meta.title,
            "new diagram"
        );
        Ok(meta)
    }

    /// Discards the open diagram and starts an unsaved, empty one.
    pub fn start_blank(&mut self, presenter: &mut dyn Presenter) {
        self.editor.replace_diagram(Diagram::new(), presenter);
        self.current = None;
    }

    pub fn open(
        &mut self,
        diagram_id: &DiagramId,
        presenter: &mut dyn Presenter,
    ) -> Result<LoadReport, SessionError> {
        let (diagram, report) = self.store.load_diagram(&self.account, diagram_id)?;
        let meta = self
            .store
            .diagram_meta(&self.account, diagram_id)?
            .ok_or_else(|| StoreError::NotFound {
                account: self.account.clone(),
                diagram_id: diagram_id.clone(),
            })?;

        self.editor.replace_diagram(diagram, presenter);
        self.current = Some(meta);
        info!(
            account = %self.account,
            diagram_id = %diagram_id,
            dropped = report.dropped.len(),
            "opened diagram"
        );
        Ok(report)
    }

    /// Persists the open diagram.
    ///
    /// `title` is only consulted on the first save of a diagram; afterwards the stored title is
    /// kept.
    pub fn save(&mut self, title: Option<&str>) -> Result<DiagramMeta, SessionError> {
        let (diagram_id, title) = match &self.current {
            Some(meta) => (meta.diagram_id.clone(), meta.title.clone()),
            None => {
                let title = checked_title(title.ok_or(SessionError::TitleRequired)?)?;
                (DiagramId::generate(), title.to_owned())
            }
        };

        let document = self.editor.diagram().to_document();
        let meta = self
            .store
            .save_diagram(&self.account, &diagram_id, &title, &document)?;
        self.editor.mark_saved();
        self.current = Some(meta.clone());
        Ok(meta)
    }

    /// Deletes a stored diagram. Deleting the open one leaves an empty, unsaved diagram behind.
    pub fn delete(
        &mut self,
        diagram_id: &DiagramId,
        presenter: &mut dyn Presenter,
    ) -> Result<bool, SessionError> {
        let removed = self.store.delete_diagram(&self.account, diagram_id)?;
        if self
            .current
            .as_ref()
            .is_some_and(|meta| &meta.diagram_id == diagram_id)
        {
            self.start_blank(presenter);
        }
        Ok(removed)
    }

    /// Imports an external file and opens it.
    pub fn import(
        &mut self,
        path: &Path,
        presenter: &mut dyn Presenter,
    ) -> Result<(DiagramMeta, LoadReport), SessionError> {
        let imported = self.store.import_diagram(&self.account, path)?;
        self.editor.replace_diagram(imported.diagram, presenter);
        self.current = Some(imported.meta.clone());
        Ok((imported.meta, imported.report))
    }
}

fn checked_title(title: &str) -> Result<&str, SessionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SessionError::BlankTitle);
    }
    Ok(title)
}
