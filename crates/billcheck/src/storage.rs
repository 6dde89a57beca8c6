//! Record storage for bill checks and reminders.
//!
//! [`RecordStore`] is the injected persistence seam; [`MemoryStore`] is the
//! in-process implementation used by the server and tests.

use crate::error::StoreError;
use crate::types::{
    CheckRecord, NewCheckRecord, NewReminder, ReminderPatch, ReminderRecord,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed persistence for check and reminder records.
///
/// Implementations must tolerate concurrent `append_check` calls; each call
/// assigns its own id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a check record and return it with its generated id.
    async fn append_check(&self, record: NewCheckRecord) -> Result<CheckRecord, StoreError>;
    /// At most `limit` checks, most recent `requested_at` first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<CheckRecord>, StoreError>;
    /// Checks recorded against one provider, oldest first.
    async fn list_by_provider(&self, provider_id: &str) -> Result<Vec<CheckRecord>, StoreError>;

    async fn append_reminder(&self, reminder: NewReminder) -> Result<ReminderRecord, StoreError>;
    async fn list_reminders(&self) -> Result<Vec<ReminderRecord>, StoreError>;
    /// Apply a partial update; `None` when no reminder has this id.
    async fn update_reminder(
        &self,
        id: &str,
        patch: ReminderPatch,
    ) -> Result<Option<ReminderRecord>, StoreError>;
}

/// Generate a fresh record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Default)]
struct Tables {
    /// Append order doubles as the tie-breaker for equal timestamps.
    checks: Vec<CheckRecord>,
    reminders: Vec<ReminderRecord>,
    reminder_index: HashMap<String, usize>,
}

/// In-memory [`RecordStore`] with process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted check records.
    pub async fn check_count(&self) -> usize {
        self.tables.read().await.checks.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_check(&self, record: NewCheckRecord) -> Result<CheckRecord, StoreError> {
        let stored = CheckRecord::from_new(new_record_id(), record);
        self.tables.write().await.checks.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<CheckRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut ordered: Vec<(usize, &CheckRecord)> = tables.checks.iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| {
            b.requested_at
                .cmp(&a.requested_at)
                .then_with(|| ib.cmp(ia))
        });
        Ok(ordered
            .into_iter()
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn list_by_provider(&self, provider_id: &str) -> Result<Vec<CheckRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .checks
            .iter()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn append_reminder(&self, reminder: NewReminder) -> Result<ReminderRecord, StoreError> {
        let record = ReminderRecord {
            id: new_record_id(),
            provider_id: reminder.provider_id,
            bill_number: reminder.bill_number,
            customer_reference: reminder.customer_reference,
            email: reminder.email,
            phone: reminder.phone,
            reminder_day: reminder.reminder_day,
            active: reminder.active,
            created_at: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        let pos = tables.reminders.len();
        tables.reminder_index.insert(record.id.clone(), pos);
        tables.reminders.push(record.clone());
        Ok(record)
    }

    async fn list_reminders(&self) -> Result<Vec<ReminderRecord>, StoreError> {
        Ok(self.tables.read().await.reminders.clone())
    }

    async fn update_reminder(
        &self,
        id: &str,
        patch: ReminderPatch,
    ) -> Result<Option<ReminderRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(&pos) = tables.reminder_index.get(id) else {
            return Ok(None);
        };
        let reminder = &mut tables.reminders[pos];
        reminder.apply(patch);
        Ok(Some(reminder.clone()))
    }
}
