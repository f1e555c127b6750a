/*
 * maildir.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Smistaposta, a notmuch tag to maildir folder synchronizer.
 *
 * Smistaposta is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Smistaposta is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Smistaposta.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Maildir filesystem primitives: folder creation (cur/new/tmp), delivery
//! names, byte-exact copy, removal.
//!
//! A maildir basename carries an info suffix after delivery: `:2,<flags>`
//! for flags and `,S=<size>` for size, e.g. `1733356800.12345.host,S=4523:2,S`.
//! Copies are written under a fresh delivery name with that suffix stripped,
//! so the destination starts unflagged and the same message copied twice
//! lands on the same name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// Subdirectories every maildir folder carries.
pub const MAILDIR_SUBDIRS: [&str; 3] = ["cur", "new", "tmp"];

/// Create a folder and its cur/new/tmp subdirectories. Idempotent.
pub fn ensure_maildir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SyncError::fs(dir, e))?;
    for sub in MAILDIR_SUBDIRS {
        let p = dir.join(sub);
        fs::create_dir_all(&p).map_err(|e| SyncError::fs(p, e))?;
    }
    Ok(())
}

/// True if the directory is a maildir folder (has cur, new and tmp).
pub fn is_maildir(dir: &Path) -> bool {
    dir.is_dir()
        && dir.join("cur").is_dir()
        && dir.join("new").is_dir()
        && dir.join("tmp").is_dir()
}

/// Basename with the info suffix stripped: everything from the first `:`
/// or `,` goes. `1733356800.1.host,S=45:2,S` becomes `1733356800.1.host`.
pub fn delivery_name(filename: &str) -> &str {
    match filename.find([':', ',']) {
        Some(i) => &filename[..i],
        None => filename,
    }
}

/// Destination path for a copy of `source` into a folder: the folder's
/// `cur` plus the source's delivery name. `None` when the source path has
/// no usable filename.
pub fn delivery_path(folder_dir: &Path, source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    Some(folder_dir.join("cur").join(delivery_name(name)))
}

/// Copy message bytes exactly. The destination directory must exist.
pub fn copy_message(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest).map_err(|e| SyncError::fs(dest, e))?;
    Ok(())
}

/// Remove one message file.
pub fn remove_message(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| SyncError::fs(path, e))
}
