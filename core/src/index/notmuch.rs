/*
 * notmuch.rs
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

//! TagIndex over the notmuch command line tool.
//!
//! Queries run `notmuch search --format=json` with `--output=messages`,
//! `--output=tags` or `--output=files`. Query strings use exact quoted
//! `path:`/`folder:`/`tag:` terms, never regex, so a tag name that happens
//! to be a regex metacharacter or a prefix of another folder cannot match
//! the wrong thing. The notmuch configuration (database location) comes
//! from the user's environment, the same place `notmuch new` reads it.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::index::{Message, MessageQuery, TagIndex};
use crate::message_id::MessageId;

/// Tag index backed by the `notmuch` binary.
pub struct NotmuchIndex {
    subtree: String,
}

impl NotmuchIndex {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            subtree: config.subtree.clone(),
        }
    }

    /// Full `notmuch new` (hooks included), the final step of a run.
    pub fn reindex(&self) -> Result<()> {
        let output = Command::new("notmuch")
            .arg("new")
            .output()
            .map_err(|e| SyncError::Reindex(format!("failed to run notmuch new: {}", e)))?;
        if !output.status.success() {
            return Err(SyncError::Reindex(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    /// Incremental quiet scan: picks up files written since the last scan
    /// and expunges entries whose files are gone. notmuch has no per-file
    /// add/remove command, so this is how paths get (un)registered.
    fn scan_quiet(&self) -> Result<()> {
        let output = Command::new("notmuch")
            .args(["new", "--quiet", "--no-hooks"])
            .output()
            .map_err(|e| SyncError::Index(format!("failed to run notmuch new: {}", e)))?;
        if !output.status.success() {
            return Err(SyncError::Index(format!(
                "notmuch new failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    /// `notmuch search <args> -- <query>`, parsed as a JSON string array.
    fn run_search(&self, args: &[&str], query: &str) -> Result<Vec<String>> {
        let output = Command::new("notmuch")
            .arg("search")
            .args(args)
            .arg("--")
            .arg(query)
            .output()
            .map_err(|e| SyncError::Index(format!("failed to run notmuch: {}", e)))?;
        if !output.status.success() {
            return Err(SyncError::Index(format!(
                "notmuch search failed for {}: {}",
                query,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let items: Vec<String> = serde_json::from_str(&stdout)?;
        Ok(items)
    }
}

impl TagIndex for NotmuchIndex {
    fn list_tags(&self) -> Result<Vec<String>> {
        let query = build_query(&self.subtree, &MessageQuery::default());
        self.run_search(&["--format=json", "--output=tags"], &query)
    }

    fn query(&self, query: &MessageQuery) -> Result<Vec<Message>> {
        let q = build_query(&self.subtree, query);
        let ids = self.run_search(&["--format=json", "--output=messages"], &q)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let id = MessageId::new(id);
            let term = id.query_term();
            let tags = self.run_search(&["--format=json", "--output=tags"], &term)?;
            let paths = self
                .run_search(&["--format=json", "--output=files"], &term)?
                .into_iter()
                .map(PathBuf::from)
                .collect();
            out.push(Message { id, tags, paths });
        }
        Ok(out)
    }

    fn register_path(&mut self, _path: &Path) -> Result<()> {
        self.scan_quiet()
    }

    fn unregister_path(&mut self, _path: &Path) -> Result<()> {
        self.scan_quiet()
    }
}

/// Quote a value for a notmuch boolean term (embedded quotes doubled).
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Build the query string: subtree restriction plus the optional predicates.
fn build_query(subtree: &str, query: &MessageQuery) -> String {
    let mut q = format!("path:{}", quote(&format!("{}/**", subtree)));
    if let Some(tag) = &query.tagged {
        q.push_str(" and tag:");
        q.push_str(&quote(tag));
    }
    for tag in &query.not_tagged {
        q.push_str(" and not tag:");
        q.push_str(&quote(tag));
    }
    if let Some(folder) = &query.not_in_folder {
        q.push_str(" and not folder:");
        q.push_str(&quote(&format!("{}/{}", subtree, folder)));
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_restriction_is_always_present() {
        let q = build_query("vrvis", &MessageQuery::default());
        assert_eq!(q, "path:\"vrvis/**\"");
    }

    #[test]
    fn reconcile_query_shape() {
        let q = build_query(
            "vrvis",
            &MessageQuery {
                tagged: Some("project/x".to_string()),
                not_tagged: Vec::new(),
                not_in_folder: Some("project.x".to_string()),
            },
        );
        assert_eq!(
            q,
            "path:\"vrvis/**\" and tag:\"project/x\" and not folder:\"vrvis/project.x\""
        );
    }

    #[test]
    fn archive_query_excludes_every_tag() {
        let q = build_query(
            "vrvis",
            &MessageQuery {
                tagged: None,
                not_tagged: vec!["payslip".to_string(), "inbox".to_string()],
                not_in_folder: Some("Archive".to_string()),
            },
        );
        assert_eq!(
            q,
            "path:\"vrvis/**\" and not tag:\"payslip\" and not tag:\"inbox\" \
             and not folder:\"vrvis/Archive\""
        );
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }
}
