/*
 * error.rs
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

//! Errors from planning or applying a sync run.
//!
//! Three failure sources: the tag index (notmuch queries and updates), the
//! filesystem (create/copy/remove on the mail store), and the final re-index
//! command. Configuration problems get their own variant so the CLI can tell
//! a bad config file apart from a bad run.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The tag index could not be queried or updated.
    #[error("index error: {0}")]
    Index(String),

    /// A filesystem operation on the mail store failed.
    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The final re-index command failed to run or exited non-zero.
    #[error("re-index failed: {0}")]
    Reindex(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Filesystem error tagged with the path it happened on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Index(format!("unparsable index output: {}", err))
    }
}

/// Result type alias using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;
