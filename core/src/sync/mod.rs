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

//! Synchronization of tags to folders, split into a pure planning step
//! and a filesystem-touching apply step.
//!
//! `Planner` reads the index and produces a `SyncPlan`: the copies that
//! place each message in the folders its tags call for, and the removals
//! that retire paths no surviving tag justifies. `apply` executes a plan,
//! all copies first, then removals, so that no message loses its last
//! path before the replacement exists.

use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::message_id::MessageId;

mod apply;
mod plan;

pub use apply::apply;
pub use plan::Planner;

/// Copy one message file into a folder it is not in yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAction {
    pub id: MessageId,
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Delete one path and drop it from the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveAction {
    pub id: MessageId,
    pub path: PathBuf,
}

/// Everything one synchronization run intends to do.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub copies: Vec<CopyAction>,
    pub removals: Vec<RemoveAction>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty() && self.removals.is_empty()
    }

    /// Fold another plan in. A path already scheduled for removal is not
    /// scheduled twice, a message placed in several folders loses its old
    /// path only once, and copy destinations stay distinct per message.
    pub fn merge(&mut self, other: SyncPlan) {
        for copy in other.copies {
            self.push_copy(copy);
        }
        for removal in other.removals {
            if !self.removals.iter().any(|r| r.path == removal.path) {
                self.removals.push(removal);
            }
        }
    }

    /// Schedule one copy. The same message headed for the same destination
    /// twice is recorded once. A destination already claimed by a different
    /// message gets a numbered variant of the delivery name instead, two
    /// messages sharing a source basename must end up as two files.
    pub fn push_copy(&mut self, mut action: CopyAction) {
        if self
            .copies
            .iter()
            .any(|c| c.id == action.id && c.dest == action.dest)
        {
            return;
        }
        if self.dest_claimed(&action.dest, &action.id) {
            let base = action.dest.clone();
            for n in 1.. {
                let candidate = numbered_variant(&base, n);
                if !self.dest_claimed(&candidate, &action.id) {
                    action.dest = candidate;
                    break;
                }
            }
        }
        self.copies.push(action);
    }

    fn dest_claimed(&self, dest: &Path, id: &MessageId) -> bool {
        self.copies.iter().any(|c| c.dest == *dest && c.id != *id)
    }
}

/// `<name>-<n>` beside `<name>` in the same directory.
fn numbered_variant(dest: &Path, n: u32) -> PathBuf {
    let mut name = dest.file_name().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(format!("-{}", n));
    dest.with_file_name(name)
}

/// What actually happened when a plan was applied.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub copied: usize,
    pub removed: usize,
    /// Removals skipped because a copy of the same message failed.
    pub skipped: usize,
    pub errors: Vec<SyncError>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.skipped == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removal(path: &str) -> RemoveAction {
        RemoveAction {
            id: MessageId::new("a@x"),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn merge_deduplicates_removals() {
        let mut plan = SyncPlan::default();
        plan.merge(SyncPlan {
            copies: Vec::new(),
            removals: vec![removal("/mail/vrvis/old/cur/1")],
        });
        plan.merge(SyncPlan {
            copies: Vec::new(),
            removals: vec![removal("/mail/vrvis/old/cur/1"), removal("/mail/vrvis/old/cur/2")],
        });
        assert_eq!(plan.removals.len(), 2);
    }

    #[test]
    fn empty_plan_reports_empty() {
        assert!(SyncPlan::default().is_empty());
    }

    fn copy(id: &str, source: &str, dest: &str) -> CopyAction {
        CopyAction {
            id: MessageId::new(id),
            source: PathBuf::from(source),
            dest: PathBuf::from(dest),
        }
    }

    #[test]
    fn colliding_destinations_get_distinct_names() {
        let mut plan = SyncPlan::default();
        plan.push_copy(copy("a@x", "/mail/vrvis/old/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        plan.push_copy(copy("b@x", "/mail/vrvis/old2/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        plan.push_copy(copy("c@x", "/mail/vrvis/old3/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        let dests: Vec<_> = plan.copies.iter().map(|c| c.dest.clone()).collect();
        assert_eq!(
            dests,
            vec![
                PathBuf::from("/mail/vrvis/payslip/cur/1.host"),
                PathBuf::from("/mail/vrvis/payslip/cur/1.host-1"),
                PathBuf::from("/mail/vrvis/payslip/cur/1.host-2"),
            ]
        );
    }

    #[test]
    fn merge_keeps_destinations_distinct_across_plans() {
        let mut plan = SyncPlan::default();
        plan.push_copy(copy("a@x", "/mail/vrvis/old/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        plan.merge(SyncPlan {
            copies: vec![copy("b@x", "/mail/vrvis/old2/cur/1.host", "/mail/vrvis/payslip/cur/1.host")],
            removals: Vec::new(),
        });
        assert_eq!(plan.copies[1].dest, PathBuf::from("/mail/vrvis/payslip/cur/1.host-1"));
    }

    #[test]
    fn same_message_same_destination_is_recorded_once() {
        let mut plan = SyncPlan::default();
        plan.push_copy(copy("a@x", "/mail/vrvis/old/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        plan.push_copy(copy("a@x", "/mail/vrvis/old/cur/1.host", "/mail/vrvis/payslip/cur/1.host"));
        assert_eq!(plan.copies.len(), 1);
    }
}
