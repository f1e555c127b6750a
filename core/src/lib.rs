/*
 * lib.rs
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

//! Core engine for Smistaposta.
//!
//! Smistaposta keeps a maildir subtree in step with notmuch tags: every
//! message gets a copy under the folder of each of its classifying tags,
//! messages carrying no classifying tag are filed under an archive
//! folder, and paths no tag justifies are retired only after their
//! replacements exist. The work is split between a pure [`Planner`] and
//! an [`apply`] step so a run can be inspected before it touches the
//! filesystem.

pub mod config;
pub mod error;
pub mod folders;
pub mod index;
pub mod maildir;
pub mod message_id;
pub mod sync;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use index::{MemoryIndex, Message, MessageQuery, NotmuchIndex, TagIndex};
pub use message_id::MessageId;
pub use sync::{apply, CopyAction, Planner, RemoveAction, SyncPlan, SyncReport};
