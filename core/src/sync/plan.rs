/*
 * plan.rs
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

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::folders::{folder_dir, folder_of_path, tag_to_folder};
use crate::index::{Message, MessageQuery, TagIndex};
use crate::maildir::delivery_path;
use crate::sync::{CopyAction, RemoveAction, SyncPlan};

/// Computes a `SyncPlan` from the index without touching the filesystem.
///
/// All queries run against the index state at planning time, so every
/// removal candidate is a path that existed before any copy in the same
/// plan. Running the planner again after a plan has been applied yields
/// an empty plan.
pub struct Planner<'a, I> {
    config: &'a SyncConfig,
    index: &'a I,
}

impl<'a, I: TagIndex> Planner<'a, I> {
    pub fn new(config: &'a SyncConfig, index: &'a I) -> Self {
        Self { config, index }
    }

    /// Full plan: every classifying tag reconciled, then untagged
    /// messages swept into the archive folder.
    pub fn plan(&self) -> Result<SyncPlan> {
        let mut plan = SyncPlan::default();
        for tag in self.classifying_tags()? {
            plan.merge(self.reconcile_tag(&tag)?);
        }
        plan.merge(self.archive_untagged()?);
        Ok(plan)
    }

    /// Plan copies of every message carrying `tag` that is not yet filed
    /// under the tag's folder, plus removals of the paths none of the
    /// message's classifying tags justify.
    pub fn reconcile_tag(&self, tag: &str) -> Result<SyncPlan> {
        let folder = tag_to_folder(self.config, tag);
        debug!("reconciling tag {} into folder {}", tag, folder);
        let dir = folder_dir(self.config, &folder);
        let query = MessageQuery {
            tagged: Some(tag.to_string()),
            not_tagged: Vec::new(),
            not_in_folder: Some(folder),
        };
        let mut plan = SyncPlan::default();
        for msg in self.index.query(&query)? {
            self.place(&msg, &dir, &mut plan)?;
        }
        Ok(plan)
    }

    /// Plan the archival of every message whose tags all belong to the
    /// ignore set. Removals are the message's paths as they stand now,
    /// the archive copy is never among them.
    pub fn archive_untagged(&self) -> Result<SyncPlan> {
        let archive = &self.config.archive_folder;
        debug!("sweeping untagged messages into {}", archive);
        let dir = folder_dir(self.config, archive);
        let query = MessageQuery {
            tagged: None,
            not_tagged: self.classifying_tags()?,
            not_in_folder: Some(archive.clone()),
        };
        let mut plan = SyncPlan::default();
        for msg in self.index.query(&query)? {
            self.place(&msg, &dir, &mut plan)?;
        }
        Ok(plan)
    }

    fn classifying_tags(&self) -> Result<Vec<String>> {
        Ok(self
            .index
            .list_tags()?
            .into_iter()
            .filter(|t| !self.config.is_ignored(t))
            .collect())
    }

    /// Schedule one copy of `msg` into `dir` and the retirement of its
    /// stale paths. Messages the index reports without any path are
    /// skipped, there is nothing to copy.
    fn place(&self, msg: &Message, dir: &Path, plan: &mut SyncPlan) -> Result<()> {
        let source = match msg.paths.first() {
            Some(path) => path.clone(),
            None => return Ok(()),
        };
        let dest = delivery_path(dir, &source).ok_or_else(|| {
            SyncError::Index(format!(
                "message {} has unusable path {}",
                msg.id,
                source.display()
            ))
        })?;
        for path in self.stale_paths(msg) {
            plan.removals.push(RemoveAction {
                id: msg.id.clone(),
                path,
            });
        }
        plan.push_copy(CopyAction {
            id: msg.id.clone(),
            source,
            dest,
        });
        Ok(())
    }

    /// Paths of `msg` inside the managed subtree whose folder none of the
    /// message's classifying tags map to. Paths outside the subtree, and
    /// paths that do not decompose into the managed folder shape, are not
    /// ours to retire.
    fn stale_paths(&self, msg: &Message) -> Vec<PathBuf> {
        let kept: BTreeSet<String> = msg
            .tags
            .iter()
            .filter(|t| !self.config.is_ignored(t))
            .map(|t| tag_to_folder(self.config, t))
            .collect();
        let subtree = self.config.subtree_dir();
        msg.paths
            .iter()
            .filter(|p| p.starts_with(&subtree))
            .filter(|p| match folder_of_path(self.config, p) {
                Some(folder) => !kept.contains(&folder),
                None => false,
            })
            .cloned()
            .collect()
    }
}
