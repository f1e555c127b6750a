/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Smistaposta.
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

//! Run configuration: mail root, managed subtree, archive folder, ignored
//! tags, folder overrides. Loaded from a TOML file (~/.smistaposta.toml by
//! default), every field optional. The struct is immutable for the duration
//! of a run and passed by reference through planner and apply; there is no
//! process-global state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Configuration for one sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root of all mail storage (the notmuch database path).
    #[serde(default = "default_mail_root")]
    pub mail_root: PathBuf,

    /// Directory under the mail root whose folders this tool manages.
    /// Everything outside it is never touched.
    #[serde(default = "default_subtree")]
    pub subtree: String,

    /// Folder (under the subtree) receiving messages with no classifying tag.
    #[serde(default = "default_archive_folder")]
    pub archive_folder: String,

    /// Status tags that never drive foldering decisions.
    #[serde(default = "default_ignored_tags")]
    pub ignored_tags: Vec<String>,

    /// Tags with a designated folder name, overriding the textual mapping.
    #[serde(default = "default_folder_overrides")]
    pub folder_overrides: BTreeMap<String, String>,
}

fn default_mail_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|h| h.join(".mail"))
        .unwrap_or_else(|| PathBuf::from(".mail"))
}

fn default_subtree() -> String {
    "vrvis".to_string()
}

fn default_archive_folder() -> String {
    "Archive".to_string()
}

fn default_ignored_tags() -> Vec<String> {
    ["unread", "new", "attachment", "signed", "replied", "archives", "flagged", "important"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_folder_overrides() -> BTreeMap<String, String> {
    [
        ("inbox", "Inbox"),
        ("trash", "Trash"),
        ("spam", "Junk"),
        ("sent", "Sent"),
        ("draft", "Drafts"),
    ]
    .iter()
    .map(|(t, f)| (t.to_string(), f.to_string()))
    .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mail_root: default_mail_root(),
            subtree: default_subtree(),
            archive_folder: default_archive_folder(),
            ignored_tags: default_ignored_tags(),
            folder_overrides: default_folder_overrides(),
        }
    }
}

/// Default config file path: ~/.smistaposta.toml.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|h| h.join(".smistaposta.toml"))
}

impl SyncConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: SyncConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, from the default path if it exists,
    /// or fall back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }
        if let Some(p) = default_config_path() {
            if p.exists() {
                return Self::load(&p);
            }
        }
        Ok(Self::default())
    }

    /// Reject values that would break the on-disk layout.
    pub fn validate(&self) -> Result<()> {
        if self.subtree.is_empty() || self.subtree.contains('/') {
            return Err(SyncError::Config(format!(
                "subtree must be a single directory name, got {:?}",
                self.subtree
            )));
        }
        if self.archive_folder.is_empty() || self.archive_folder.contains('/') {
            return Err(SyncError::Config(format!(
                "archive_folder must be a single directory name, got {:?}",
                self.archive_folder
            )));
        }
        for folder in self.folder_overrides.values() {
            if folder.is_empty() || folder.contains('/') {
                return Err(SyncError::Config(format!(
                    "override folder must be a single directory name, got {:?}",
                    folder
                )));
            }
        }
        Ok(())
    }

    /// Absolute path of the managed subtree.
    pub fn subtree_dir(&self) -> PathBuf {
        self.mail_root.join(&self.subtree)
    }

    /// True if the tag is a status tag that never drives foldering.
    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t == tag)
    }
}
