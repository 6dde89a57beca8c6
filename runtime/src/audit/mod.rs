// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Check auditing: a JSONL journal layered over any record store.

pub mod journal;

pub use journal::CheckJournal;

use async_trait::async_trait;
use billcheck::{
    CheckRecord, NewCheckRecord, NewReminder, RecordStore, ReminderPatch, ReminderRecord,
    StoreError,
};
use std::sync::Mutex;
use tracing::warn;

/// Record store that mirrors every persisted check into a [`CheckJournal`].
///
/// The wrapped store stays authoritative: a journal write failure is logged
/// and does not fail the check.
pub struct JournaledStore<S> {
    inner: S,
    journal: Mutex<CheckJournal>,
}

impl<S: RecordStore> JournaledStore<S> {
    pub fn new(inner: S, journal: CheckJournal) -> Self {
        Self {
            inner,
            journal: Mutex::new(journal),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn journal(&self, record: &CheckRecord) {
        let mut journal = match self.journal.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = journal.append(record) {
            warn!(check_id = %record.id, path = %journal.path().display(), error = %format!("{e:#}"), "failed to journal check");
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for JournaledStore<S> {
    async fn append_check(&self, record: NewCheckRecord) -> Result<CheckRecord, StoreError> {
        let stored = self.inner.append_check(record).await?;
        self.journal(&stored);
        Ok(stored)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<CheckRecord>, StoreError> {
        self.inner.list_recent(limit).await
    }

    async fn list_by_provider(&self, provider_id: &str) -> Result<Vec<CheckRecord>, StoreError> {
        self.inner.list_by_provider(provider_id).await
    }

    async fn append_reminder(&self, reminder: NewReminder) -> Result<ReminderRecord, StoreError> {
        self.inner.append_reminder(reminder).await
    }

    async fn list_reminders(&self) -> Result<Vec<ReminderRecord>, StoreError> {
        self.inner.list_reminders().await
    }

    async fn update_reminder(
        &self,
        id: &str,
        patch: ReminderPatch,
    ) -> Result<Option<ReminderRecord>, StoreError> {
        self.inner.update_reminder(id, patch).await
    }
}
