/*
 * memory.rs
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

//! In-memory TagIndex, used by the test suite and usable anywhere a real
//! notmuch database is not wanted.
//!
//! Messages are seeded with `add_message`. `register_path` resolves which
//! message a new file belongs to by content, the same identity notmuch
//! uses, so it only works for paths that exist on disk; queries and
//! `unregister_path` never touch the filesystem.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::folders::folder_of_path;
use crate::index::{Message, MessageQuery, TagIndex};
use crate::message_id::MessageId;

struct Record {
    id: MessageId,
    tags: BTreeSet<String>,
    paths: BTreeSet<PathBuf>,
}

/// Tag index held entirely in memory.
pub struct MemoryIndex {
    config: SyncConfig,
    records: Vec<Record>,
}

impl MemoryIndex {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Seed one message with its tags and current paths.
    pub fn add_message<I, S>(&mut self, id: impl Into<MessageId>, tags: I, paths: Vec<PathBuf>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.records.push(Record {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            paths: paths.into_iter().collect(),
        });
    }

    /// Registered paths of one message, sorted. `None` for unknown ids.
    pub fn paths_of(&self, id: &MessageId) -> Option<Vec<PathBuf>> {
        self.records
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.paths.iter().cloned().collect())
    }

    fn in_subtree(&self, record: &Record) -> bool {
        let subtree = self.config.subtree_dir();
        record.paths.iter().any(|p| p.starts_with(&subtree))
    }

    fn matches(&self, record: &Record, query: &MessageQuery) -> bool {
        if !self.in_subtree(record) {
            return false;
        }
        if let Some(tag) = &query.tagged {
            if !record.tags.contains(tag) {
                return false;
            }
        }
        if query.not_tagged.iter().any(|t| record.tags.contains(t)) {
            return false;
        }
        if let Some(folder) = &query.not_in_folder {
            let inside = record
                .paths
                .iter()
                .any(|p| folder_of_path(&self.config, p).as_deref() == Some(folder));
            if inside {
                return false;
            }
        }
        true
    }
}

impl TagIndex for MemoryIndex {
    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags = BTreeSet::new();
        for r in self.records.iter().filter(|r| self.in_subtree(r)) {
            tags.extend(r.tags.iter().cloned());
        }
        Ok(tags.into_iter().collect())
    }

    fn query(&self, query: &MessageQuery) -> Result<Vec<Message>> {
        Ok(self
            .records
            .iter()
            .filter(|r| self.matches(r, query))
            .map(|r| Message {
                id: r.id.clone(),
                tags: r.tags.iter().cloned().collect(),
                paths: r.paths.iter().cloned().collect(),
            })
            .collect())
    }

    fn register_path(&mut self, path: &Path) -> Result<()> {
        let content = fs::read(path).map_err(|e| {
            SyncError::Index(format!("cannot read registered path {}: {}", path.display(), e))
        })?;
        let owner = self.records.iter().position(|r| {
            r.paths
                .iter()
                .any(|p| fs::read(p).map(|bytes| bytes == content).unwrap_or(false))
        });
        match owner {
            Some(i) => {
                self.records[i].paths.insert(path.to_path_buf());
                Ok(())
            }
            None => Err(SyncError::Index(format!(
                "registered path {} matches no known message",
                path.display()
            ))),
        }
    }

    fn unregister_path(&mut self, path: &Path) -> Result<()> {
        for r in &mut self.records {
            if r.paths.remove(path) {
                return Ok(());
            }
        }
        Err(SyncError::Index(format!(
            "path not registered: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        let mut c = SyncConfig::default();
        c.mail_root = PathBuf::from("/mail");
        c
    }

    fn seeded() -> MemoryIndex {
        let mut ix = MemoryIndex::new(config());
        ix.add_message(
            "a@x",
            ["inbox", "unread"],
            vec![PathBuf::from("/mail/vrvis/Inbox/cur/1")],
        );
        ix.add_message(
            "b@x",
            ["payslip"],
            vec![PathBuf::from("/mail/vrvis/old/cur/2")],
        );
        ix.add_message(
            "c@x",
            ["other"],
            vec![PathBuf::from("/mail/elsewhere/cur/3")],
        );
        ix
    }

    #[test]
    fn list_tags_covers_subtree_messages_only() {
        let ix = seeded();
        let tags = ix.list_tags().unwrap();
        assert_eq!(tags, vec!["inbox", "payslip", "unread"]);
    }

    #[test]
    fn query_by_tag_and_folder() {
        let ix = seeded();
        let hits = ix
            .query(&MessageQuery {
                tagged: Some("payslip".to_string()),
                not_tagged: Vec::new(),
                not_in_folder: Some("payslip".to_string()),
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "b@x");

        // already placed: inbox message has a path in Inbox
        let hits = ix
            .query(&MessageQuery {
                tagged: Some("inbox".to_string()),
                not_tagged: Vec::new(),
                not_in_folder: Some("Inbox".to_string()),
            })
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn query_excludes_listed_tags() {
        let ix = seeded();
        let hits = ix
            .query(&MessageQuery {
                tagged: None,
                not_tagged: vec!["inbox".to_string(), "payslip".to_string()],
                not_in_folder: None,
            })
            .unwrap();
        assert!(hits.is_empty(), "both subtree messages carry excluded tags");
    }

    #[test]
    fn messages_outside_subtree_are_invisible() {
        let ix = seeded();
        let hits = ix
            .query(&MessageQuery {
                tagged: Some("other".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn register_matches_by_content() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = SyncConfig::default();
        c.mail_root = tmp.path().to_path_buf();
        let original = tmp.path().join("vrvis/Inbox/cur/1");
        fs::create_dir_all(original.parent().unwrap()).unwrap();
        fs::write(&original, b"unique body").unwrap();

        let mut ix = MemoryIndex::new(c);
        ix.add_message("a@x", ["inbox"], vec![original.clone()]);

        let copy = tmp.path().join("vrvis/work/cur/1");
        fs::create_dir_all(copy.parent().unwrap()).unwrap();
        fs::write(&copy, b"unique body").unwrap();
        ix.register_path(&copy).unwrap();
        assert_eq!(
            ix.paths_of(&MessageId::new("a@x")).unwrap(),
            vec![original, copy]
        );

        let stranger = tmp.path().join("vrvis/work/cur/2");
        fs::write(&stranger, b"different body").unwrap();
        assert!(ix.register_path(&stranger).is_err());
    }

    #[test]
    fn unregister_unknown_path_is_an_error() {
        let mut ix = seeded();
        let p = PathBuf::from("/mail/vrvis/Inbox/cur/1");
        ix.unregister_path(&p).unwrap();
        assert!(ix.unregister_path(&p).is_err());
    }
}
