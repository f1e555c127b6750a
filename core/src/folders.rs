/*
 * folders.rs
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

//! Tag name <-> folder name translation, and the structured decomposition of
//! an on-disk path back into its folder.
//!
//! Overridden tags (inbox, trash, ...) map to their designated folder; every
//! other tag maps textually, `/` in the tag becoming `.` in the folder name,
//! so a hierarchical tag stays a single directory. The two functions are
//! inverses for any tag that is not an override key and contains no `.`.

use std::path::{Component, Path, PathBuf};

use crate::config::SyncConfig;
use crate::maildir::MAILDIR_SUBDIRS;

/// Hierarchy separator in tag names.
const TAG_SEPARATOR: char = '/';
/// Hierarchy separator in folder names (a folder stays one directory).
const FOLDER_SEPARATOR: char = '.';

/// Folder name for a tag: override table first, textual mapping otherwise.
pub fn tag_to_folder(config: &SyncConfig, tag: &str) -> String {
    if let Some(folder) = config.folder_overrides.get(tag) {
        return folder.clone();
    }
    tag.replace(TAG_SEPARATOR, &FOLDER_SEPARATOR.to_string())
}

/// Tag name for a folder: reverse override lookup first, textual otherwise.
pub fn folder_to_tag(config: &SyncConfig, folder: &str) -> String {
    for (tag, designated) in &config.folder_overrides {
        if designated == folder {
            return tag.clone();
        }
    }
    folder.replace(FOLDER_SEPARATOR, &TAG_SEPARATOR.to_string())
}

/// Absolute directory of a folder: `<mail_root>/<subtree>/<folder>`.
pub fn folder_dir(config: &SyncConfig, folder: &str) -> PathBuf {
    config.subtree_dir().join(folder)
}

/// Folder name a path lives in, if the path has the managed shape
/// `<mail_root>/<subtree>/<folder>/<cur|new|tmp>/<file>`. Anything else
/// (outside the root, wrong subtree, missing cur/new/tmp component, deeper
/// nesting) is not managed by this tool and yields `None`.
pub fn folder_of_path(config: &SyncConfig, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(&config.mail_root).ok()?;
    let comps: Vec<&str> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    if comps.len() != 4 {
        return None;
    }
    if comps[0] != config.subtree {
        return None;
    }
    if !MAILDIR_SUBDIRS.contains(&comps[2]) {
        return None;
    }
    Some(comps[1].to_string())
}
