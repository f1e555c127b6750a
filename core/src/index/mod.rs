/*
 * mod.rs
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

//! The tag index boundary: enumerate tags, query messages by tag membership
//! and folder location, keep registered paths in step with the filesystem.
//!
//! Messages and tags are owned by the index; this crate only moves files and
//! tells the index about it. Two implementations: `NotmuchIndex` drives the
//! notmuch command line tool, `MemoryIndex` holds everything in memory.

mod memory;
mod notmuch;

pub use memory::MemoryIndex;
pub use notmuch::NotmuchIndex;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::message_id::MessageId;

/// One message as the index sees it: stable id, full tag set, every
/// registered file location.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    /// All tags, including status tags the configuration ignores.
    pub tags: Vec<String>,
    /// All registered paths, inside and outside the managed subtree.
    pub paths: Vec<PathBuf>,
}

/// Predicates a query can combine. Every query is implicitly restricted to
/// messages with at least one path inside the managed subtree.
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    /// Message must carry this tag.
    pub tagged: Option<String>,
    /// Message must carry none of these tags.
    pub not_tagged: Vec<String>,
    /// Message must have no path inside this folder.
    pub not_in_folder: Option<String>,
}

/// The external tag index. Implementations are scoped to one mail root and
/// one managed subtree for their whole lifetime.
pub trait TagIndex {
    /// All tags carried by messages in the managed subtree, unfiltered.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Messages in the managed subtree matching the query.
    fn query(&self, query: &MessageQuery) -> Result<Vec<Message>>;

    /// Tell the index about a file that now exists on disk.
    fn register_path(&mut self, path: &Path) -> Result<()>;

    /// Tell the index about a file that no longer exists on disk.
    fn unregister_path(&mut self, path: &Path) -> Result<()>;
}
