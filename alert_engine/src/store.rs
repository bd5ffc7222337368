use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use domain::{BalanceSnapshot, Condition, ReminderEntry, UnknownCondition};
use metrics::counter;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    UnknownCondition(#[from] UnknownCondition),
    #[error("recipient must not be empty")]
    EmptyRecipient,
}

/// In-memory reminder buckets keyed by condition. One lock guards every
/// bucket, so an entry is either fully registered or not visible at all.
#[derive(Clone, Default)]
pub struct ReminderStore {
    buckets: Arc<RwLock<HashMap<Condition, Vec<ReminderEntry>>>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Duplicate (email, condition) pairs are kept as separate entries.
    pub async fn register(
        &self,
        email: &str,
        condition_tag: &str,
        threshold: Option<f64>,
        snapshot: BalanceSnapshot,
    ) -> Result<ReminderEntry, StoreError> {
        let condition: Condition = condition_tag.parse()?;
        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::EmptyRecipient);
        }
        let entry = ReminderEntry {
            id: Uuid::new_v4(),
            email: email.to_string(),
            condition,
            threshold,
            last_balance: snapshot,
            created_at: Utc::now(),
        };
        self.buckets
            .write()
            .await
            .entry(condition)
            .or_default()
            .push(entry.clone());
        counter!("reminders_registered_total", "condition" => condition.tag()).increment(1);
        info!(reminder_id = %entry.id, %condition, "reminder registered");
        Ok(entry)
    }

    /// Entries of one bucket in registration order.
    pub async fn list(&self, condition: Condition) -> Vec<ReminderEntry> {
        self.buckets
            .read()
            .await
            .get(&condition)
            .cloned()
            .unwrap_or_default()
    }

    /// Every entry of every bucket, read under one lock. Buckets follow
    /// `Condition::ALL`; entries keep registration order.
    pub async fn snapshot(&self) -> Vec<ReminderEntry> {
        let buckets = self.buckets.read().await;
        Condition::ALL
            .iter()
            .filter_map(|condition| buckets.get(condition))
            .flat_map(|entries| entries.iter().cloned())
            .collect()
    }

    pub async fn list_tag(&self, condition_tag: &str) -> Result<Vec<ReminderEntry>, StoreError> {
        let condition: Condition = condition_tag.parse()?;
        Ok(self.list(condition).await)
    }

    pub async fn len(&self) -> usize {
        self.buckets.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replaces the stored snapshot of one entry. Returns false if it no longer exists.
    pub async fn update_baseline(
        &self,
        condition: Condition,
        id: Uuid,
        snapshot: BalanceSnapshot,
    ) -> bool {
        let mut buckets = self.buckets.write().await;
        match buckets
            .get_mut(&condition)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == id))
        {
            Some(entry) => {
                entry.last_balance = snapshot;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_rejects_unknown_tag() {
        let store = ReminderStore::new();
        let err = store
            .register("a@example.com", "total_above_100", None, BalanceSnapshot::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UnknownCondition(UnknownCondition("total_above_100".to_string()))
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn register_rejects_blank_recipient() {
        let store = ReminderStore::new();
        let err = store
            .register("  ", "custom", Some(10.0), BalanceSnapshot::default())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::EmptyRecipient);
    }

    #[tokio::test]
    async fn duplicates_are_kept_in_registration_order() {
        let store = ReminderStore::new();
        let first = store
            .register("a@example.com", "custom", Some(100.0), BalanceSnapshot::default())
            .await
            .unwrap();
        let second = store
            .register("a@example.com", "custom", Some(100.0), BalanceSnapshot::default())
            .await
            .unwrap();
        store
            .register("b@example.com", "hydra_increase", None, BalanceSnapshot::default())
            .await
            .unwrap();

        let custom = store.list(Condition::Custom).await;
        assert_eq!(custom.len(), 2);
        assert_eq!(custom[0].id, first.id);
        assert_eq!(custom[1].id, second.id);
        assert_eq!(store.list_tag("hydra_increase").await.unwrap().len(), 1);
        assert!(store.list(Condition::TotalBelow).await.is_empty());
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn snapshot_orders_by_condition_then_registration() {
        let store = ReminderStore::new();
        for (email, tag) in [
            ("a@example.com", "custom"),
            ("b@example.com", "total_above_51"),
            ("c@example.com", "custom"),
            ("d@example.com", "hydra_increase"),
        ] {
            store
                .register(email, tag, Some(1.0), BalanceSnapshot::default())
                .await
                .unwrap();
        }
        let emails: Vec<_> = store
            .snapshot()
            .await
            .into_iter()
            .map(|e| e.email)
            .collect();
        assert_eq!(
            emails,
            ["b@example.com", "d@example.com", "a@example.com", "c@example.com"]
        );
    }

    #[tokio::test]
    async fn update_baseline_targets_single_entry() {
        let store = ReminderStore::new();
        let a = store
            .register("a@example.com", "total_below_51", None, BalanceSnapshot::default())
            .await
            .unwrap();
        let b = store
            .register("b@example.com", "total_below_51", None, BalanceSnapshot::default())
            .await
            .unwrap();
        let next = BalanceSnapshot {
            total_usd_value: 40.0,
            ..Default::default()
        };

        assert!(store.update_baseline(Condition::TotalBelow, a.id, next).await);
        assert!(!store.update_baseline(Condition::Custom, b.id, next).await);

        let entries = store.list(Condition::TotalBelow).await;
        assert_eq!(entries[0].last_balance.total_usd_value, 40.0);
        assert_eq!(entries[1].last_balance.total_usd_value, 0.0);
    }

    #[tokio::test]
    async fn concurrent_registrations_are_all_visible() {
        let store = ReminderStore::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .register(
                        &format!("user{i}@example.com"),
                        "coinbase_increase",
                        None,
                        BalanceSnapshot::default(),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let entries = store.list_tag("coinbase_increase").await.unwrap();
        assert_eq!(entries.len(), 32);
        assert!(entries.iter().all(|e| e.email.starts_with("user")));
    }
}
