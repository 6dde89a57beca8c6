// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! JSONL check journal: append-only log of every persisted check record.
//!
//! - One `CheckRecord` per line
//! - Rotation once the file exceeds the size limit (default 100 MB)
//! - Rotated files named `.1`, `.2`, ... (max 5 rotations)

use anyhow::{Context, Result};
use billcheck::CheckRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default journal size before rotation (100 MB).
pub const MAX_JOURNAL_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of rotated journal files to keep.
pub const MAX_ROTATIONS: u32 = 5;

/// Append-only JSONL journal with automatic rotation.
pub struct CheckJournal {
    file: File,
    path: PathBuf,
    max_size: u64,
    /// Approximate current size (re-read on open).
    current_size: u64,
}

impl CheckJournal {
    /// Open or create the journal file.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_limit(path, MAX_JOURNAL_SIZE)
    }

    /// Open with a custom rotation threshold.
    pub fn open_with_limit(path: &Path, max_size: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let file = open_append(path)?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            file,
            path: path.to_path_buf(),
            max_size,
            current_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line.
    pub fn append(&mut self, record: &CheckRecord) -> Result<()> {
        if self.current_size >= self.max_size {
            self.rotate()?;
        }

        let json = serde_json::to_string(record)?;
        writeln!(self.file, "{json}").context("failed to write journal entry")?;
        self.current_size += json.len() as u64 + 1;
        Ok(())
    }

    /// Shift `journal.jsonl` to `.1`, `.1` to `.2`, and so on.
    fn rotate(&mut self) -> Result<()> {
        self.file.flush()?;

        let oldest = rotation_path(&self.path, MAX_ROTATIONS);
        if oldest.exists() {
            let _ = std::fs::remove_file(&oldest);
        }
        for i in (1..MAX_ROTATIONS).rev() {
            let from = rotation_path(&self.path, i);
            if from.exists() {
                let _ = std::fs::rename(&from, rotation_path(&self.path, i + 1));
            }
        }
        let _ = std::fs::rename(&self.path, rotation_path(&self.path, 1));

        self.file = open_append(&self.path).context("failed to reopen journal after rotation")?;
        self.current_size = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open check journal: {}", path.display()))
}

/// Path of the `index`th rotated file: `checks.jsonl.1`, `checks.jsonl.2`, ...
pub fn rotation_path(base: &Path, index: u32) -> PathBuf {
    let name = format!(
        "{}.{index}",
        base.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("checks.jsonl")
    );
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billcheck::{ClientMeta, OutcomeStatus};
    use chrono::Utc;

    fn record(id: &str) -> CheckRecord {
        CheckRecord {
            id: id.to_string(),
            provider_id: "ptcl".into(),
            bill_number: "1234567890".into(),
            customer_reference: None,
            result: None,
            outcome_status: OutcomeStatus::Error,
            requested_at: Utc::now(),
            client_meta: ClientMeta::default(),
        }
    }

    fn lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/checks.jsonl");
        let mut journal = CheckJournal::open(&path).unwrap();
        journal.append(&record("a")).unwrap();
        journal.append(&record("b")).unwrap();

        let entries = lines(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "a");
        assert_eq!(entries[1]["outcomeStatus"], "error");
    }

    #[test]
    fn test_reopen_continues_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.jsonl");
        CheckJournal::open(&path).unwrap().append(&record("a")).unwrap();
        CheckJournal::open(&path).unwrap().append(&record("b")).unwrap();
        assert_eq!(lines(&path).len(), 2);
    }

    #[test]
    fn test_rotates_when_over_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.jsonl");
        let mut journal = CheckJournal::open_with_limit(&path, 1).unwrap();

        journal.append(&record("first")).unwrap();
        journal.append(&record("second")).unwrap();
        journal.append(&record("third")).unwrap();

        assert_eq!(lines(&path)[0]["id"], "third");
        assert_eq!(lines(&rotation_path(&path, 1))[0]["id"], "second");
        assert_eq!(lines(&rotation_path(&path, 2))[0]["id"], "first");
    }

    #[test]
    fn test_keeps_at_most_max_rotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.jsonl");
        let mut journal = CheckJournal::open_with_limit(&path, 1).unwrap();
        for i in 0..(MAX_ROTATIONS + 3) {
            journal.append(&record(&i.to_string())).unwrap();
        }
        assert!(rotation_path(&path, MAX_ROTATIONS).exists());
        assert!(!rotation_path(&path, MAX_ROTATIONS + 1).exists());
    }

    #[test]
    fn test_rotation_path_naming() {
        let p = Path::new("/var/log/billcheck/checks.jsonl");
        assert_eq!(
            rotation_path(p, 3),
            PathBuf::from("/var/log/billcheck/checks.jsonl.3")
        );
    }
}
