// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{StoreError, WriteDurability};

/// Maps an id to a file-name segment that is safe on every platform.
///
/// Ids that are already safe are used verbatim; anything else becomes `~` followed by the
/// lowercase hex of its UTF-8 bytes, so the mapping stays deterministic and injective.
pub(super) fn encode_persisted_id_segment(segment: &str) -> String {
    if !needs_safe_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_safe_segment_encoding(segment: &str) -> bool {
    if segment.is_empty() || segment.starts_with('~') || segment.starts_with('.') {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let base = segment.split('.').next().unwrap_or(segment);
    if is_windows_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => base
            .strip_prefix("COM")
            .or_else(|| base.strip_prefix("LPT"))
            .is_some_and(|num| matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")),
    }
}

/// Wraps an io error with the path it happened on.
fn io_at(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Metadata of a non-symlink entry at `path`, `None` when nothing is there.
fn exists_refusing_symlink(path: &Path) -> Result<Option<fs::Metadata>, StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => Err(StoreError::SymlinkRefused {
            path: path.to_path_buf(),
        }),
        Ok(md) => Ok(Some(md)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_at(path)(source)),
    }
}

/// Creates `root/relative` one component at a time, refusing to walk through symlinks.
pub(super) fn create_dir_all_safe(root: &Path, relative: &Path) -> Result<(), StoreError> {
    let mut current = root.to_path_buf();
    let parts = relative.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part),
        _ => None,
    });
    for part in parts {
        current.push(part);
        match exists_refusing_symlink(&current)? {
            Some(md) if md.is_dir() => {}
            Some(_) => {
                let source = io::Error::new(io::ErrorKind::AlreadyExists, "expected directory");
                return Err(io_at(&current)(source));
            }
            None => fs::create_dir(&current).map_err(io_at(&current))?,
        }
    }
    Ok(())
}

#[cfg(windows)]
fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to).or_else(|err| match err.kind() {
        io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied => {
            let _ = fs::remove_file(to);
            fs::rename(from, to)
        }
        _ => Err(err),
    })
}

#[cfg(not(windows))]
fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Sibling temp name for `file_name`; hidden and unique per write.
fn temp_sibling(parent: &Path, file_name: &OsStr) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    parent.join(format!(
        ".mindmapr.tmp.{}.{nanos}",
        file_name.to_string_lossy()
    ))
}

/// Replaces `path` (somewhere below `account_dir`) with `contents` via temp file and rename.
///
/// With [`WriteDurability::Durable`] the temp file is fsynced before the rename and the
/// parent directory after it.
pub(super) fn write_atomic(
    account_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(io_at(path)(io::Error::new(io::ErrorKind::InvalidInput, "not a file path")));
    };

    fs::create_dir_all(account_dir).map_err(io_at(account_dir))?;
    if let Ok(below_account) = parent.strip_prefix(account_dir) {
        create_dir_all_safe(account_dir, below_account)?;
    }
    exists_refusing_symlink(path)?;

    let durable = durability == WriteDurability::Durable;
    let tmp_path = temp_sibling(parent, file_name);
    {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .map_err(io_at(&tmp_path))?;
        file.write_all(contents).map_err(io_at(&tmp_path))?;
        if durable {
            file.sync_all().map_err(io_at(&tmp_path))?;
        }
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_at(path)(source));
    }

    #[cfg(unix)]
    if durable {
        fs::File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(io_at(parent))?;
    }

    Ok(())
}

/// Returns whether a file was actually removed.
pub(super) fn remove_file_if_exists(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(io_at(path)(source)),
    }
}
