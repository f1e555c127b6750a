/*
 * apply.rs
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

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{error, info, warn};

use crate::error::{Result, SyncError};
use crate::index::TagIndex;
use crate::maildir::{copy_message, ensure_maildir, remove_message};
use crate::message_id::MessageId;
use crate::sync::{CopyAction, RemoveAction, SyncPlan, SyncReport};

/// Execute a plan. All copies run first, then all removals, so a failed
/// copy can never mean a lost message: the removals belonging to a
/// message whose copy failed are skipped, everything else proceeds, and
/// every failure lands in the report instead of aborting the run.
pub fn apply<I: TagIndex>(index: &mut I, plan: &SyncPlan) -> SyncReport {
    let mut report = SyncReport::default();
    let mut failed: HashSet<MessageId> = HashSet::new();

    for action in &plan.copies {
        info!(
            "copying message {} from {} to {}",
            action.id,
            action.source.display(),
            action.dest.display()
        );
        match run_copy(index, action) {
            Ok(()) => report.copied += 1,
            Err(err) => {
                error!("copy of message {} failed: {}", action.id, err);
                failed.insert(action.id.clone());
                report.errors.push(err);
            }
        }
    }

    for action in &plan.removals {
        if failed.contains(&action.id) {
            warn!(
                "keeping {} because a copy of message {} failed",
                action.path.display(),
                action.id
            );
            report.skipped += 1;
            continue;
        }
        info!("removing message path {}", action.path.display());
        match run_removal(index, action) {
            Ok(()) => report.removed += 1,
            Err(err) => {
                error!("removal of {} failed: {}", action.path.display(), err);
                report.errors.push(err);
            }
        }
    }

    report
}

fn run_copy<I: TagIndex>(index: &mut I, action: &CopyAction) -> Result<()> {
    if let Some(folder) = action.dest.parent().and_then(Path::parent) {
        ensure_maildir(folder)?;
    }
    if action.dest.exists() {
        // an occupied destination is acceptable only when it already
        // holds exactly the bytes this copy would write
        let existing = fs::read(&action.dest).map_err(|e| SyncError::fs(&action.dest, e))?;
        let wanted = fs::read(&action.source).map_err(|e| SyncError::fs(&action.source, e))?;
        if existing != wanted {
            return Err(SyncError::fs(
                &action.dest,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination holds a different message",
                ),
            ));
        }
    } else {
        copy_message(&action.source, &action.dest)?;
    }
    index.register_path(&action.dest)
}

fn run_removal<I: TagIndex>(index: &mut I, action: &RemoveAction) -> Result<()> {
    remove_message(&action.path)?;
    index.unregister_path(&action.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::index::MemoryIndex;
    use crate::message_id::MessageId;
    use std::fs;
    use std::path::PathBuf;

    struct Fixture {
        _tmp: tempfile::TempDir,
        config: SyncConfig,
        index: MemoryIndex,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SyncConfig::default();
        config.mail_root = tmp.path().to_path_buf();
        let index = MemoryIndex::new(config.clone());
        Fixture {
            _tmp: tmp,
            config,
            index,
        }
    }

    fn deliver(config: &SyncConfig, rel: &str, body: &[u8]) -> PathBuf {
        let path = config.mail_root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn copies_run_before_removals() {
        let mut fx = fixture();
        let source = deliver(&fx.config, "vrvis/Inbox/cur/1", b"one");
        fx.index
            .add_message("a@x", ["payslip"], vec![source.clone()]);
        let dest = fx.config.mail_root.join("vrvis/payslip/cur/1");

        let plan = SyncPlan {
            copies: vec![CopyAction {
                id: MessageId::new("a@x"),
                source: source.clone(),
                dest: dest.clone(),
            }],
            // removing the copy source only works if the copy ran first
            removals: vec![RemoveAction {
                id: MessageId::new("a@x"),
                path: source.clone(),
            }],
        };
        let report = apply(&mut fx.index, &plan);

        assert!(report.is_clean(), "errors: {:?}", report.errors);
        assert_eq!(report.copied, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(fs::read(&dest).unwrap(), b"one");
        assert!(!source.exists());
        assert_eq!(
            fx.index.paths_of(&MessageId::new("a@x")).unwrap(),
            vec![dest]
        );
    }

    #[test]
    fn failed_copy_keeps_the_message_paths() {
        let mut fx = fixture();
        let source = deliver(&fx.config, "vrvis/Inbox/cur/1", b"one");
        fx.index
            .add_message("a@x", ["payslip"], vec![source.clone()]);
        // a plain file where the folder should go makes the copy fail
        deliver(&fx.config, "vrvis/payslip", b"in the way");

        let plan = SyncPlan {
            copies: vec![CopyAction {
                id: MessageId::new("a@x"),
                source: source.clone(),
                dest: fx.config.mail_root.join("vrvis/payslip/cur/1"),
            }],
            removals: vec![RemoveAction {
                id: MessageId::new("a@x"),
                path: source.clone(),
            }],
        };
        let report = apply(&mut fx.index, &plan);

        assert_eq!(report.copied, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(source.exists(), "sole copy must survive a failed copy");
        assert_eq!(
            fx.index.paths_of(&MessageId::new("a@x")).unwrap(),
            vec![source]
        );
    }

    #[test]
    fn occupied_destination_with_other_bytes_fails_the_copy() {
        let mut fx = fixture();
        let source = deliver(&fx.config, "vrvis/Inbox/cur/1.host", b"mine");
        let squatter = deliver(&fx.config, "vrvis/payslip/cur/1.host", b"someone else's");
        fx.index
            .add_message("a@x", ["payslip"], vec![source.clone()]);

        let plan = SyncPlan {
            copies: vec![CopyAction {
                id: MessageId::new("a@x"),
                source: source.clone(),
                dest: squatter.clone(),
            }],
            removals: vec![RemoveAction {
                id: MessageId::new("a@x"),
                path: source.clone(),
            }],
        };
        let report = apply(&mut fx.index, &plan);

        assert_eq!(report.copied, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(source.exists());
        assert_eq!(fs::read(&squatter).unwrap(), b"someone else's");
    }

    #[test]
    fn occupied_destination_with_same_bytes_is_fine() {
        let mut fx = fixture();
        let source = deliver(&fx.config, "vrvis/Inbox/cur/1.host", b"same bytes");
        let dest = deliver(&fx.config, "vrvis/payslip/cur/1.host", b"same bytes");
        fx.index
            .add_message("a@x", ["payslip"], vec![source.clone()]);

        let plan = SyncPlan {
            copies: vec![CopyAction {
                id: MessageId::new("a@x"),
                source: source.clone(),
                dest: dest.clone(),
            }],
            removals: vec![RemoveAction {
                id: MessageId::new("a@x"),
                path: source.clone(),
            }],
        };
        let report = apply(&mut fx.index, &plan);

        assert!(report.is_clean(), "errors: {:?}", report.errors);
        assert_eq!(
            fx.index.paths_of(&MessageId::new("a@x")).unwrap(),
            vec![dest]
        );
    }

    #[test]
    fn removal_errors_do_not_abort_the_rest() {
        let mut fx = fixture();
        let missing = fx.config.mail_root.join("vrvis/old/cur/gone");
        let real = deliver(&fx.config, "vrvis/old/cur/2", b"two");
        fx.index
            .add_message("a@x", Vec::<String>::new(), vec![missing.clone(), real.clone()]);

        let plan = SyncPlan {
            copies: Vec::new(),
            removals: vec![
                RemoveAction {
                    id: MessageId::new("a@x"),
                    path: missing,
                },
                RemoveAction {
                    id: MessageId::new("a@x"),
                    path: real.clone(),
                },
            ],
        };
        let report = apply(&mut fx.index, &plan);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.removed, 1);
        assert!(!real.exists());
    }
}
