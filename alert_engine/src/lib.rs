pub mod conditions;
pub mod evaluator;
pub mod source;
pub mod store;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use conditions::{compose_body, evaluate, Trigger};
pub use evaluator::{PassSummary, ReminderEvaluator};
pub use source::{SimulatedBalances, SnapshotSource};
pub use store::{ReminderStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivers one notification. Failures are returned, never panicked.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl NotificationSender for LoggingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(%recipient, %subject, %body, "reminder notification");
        Ok(())
    }
}
