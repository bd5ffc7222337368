use std::{sync::Arc, time::Duration};

use anyhow::Context;
use domain::ReminderEntry;
use metrics::counter;
use tokio::{task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    conditions::{compose_body, evaluate, Trigger},
    source::SnapshotSource,
    store::ReminderStore,
    NotificationSender, NotifyError,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub evaluated: usize,
    pub fired: usize,
    pub failed: usize,
}

/// Samples a snapshot, checks every registered reminder against it and
/// notifies the ones whose condition holds.
pub struct ReminderEvaluator {
    store: ReminderStore,
    source: Arc<dyn SnapshotSource>,
    notifier: Arc<dyn NotificationSender>,
    total_threshold: f64,
    send_timeout: Duration,
}

impl ReminderEvaluator {
    pub fn new(
        store: ReminderStore,
        source: Arc<dyn SnapshotSource>,
        notifier: Arc<dyn NotificationSender>,
        total_threshold: f64,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            total_threshold,
            send_timeout,
        }
    }

    pub fn spawn(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(interval, shutdown).await })
    }

    /// Runs passes until `shutdown` is cancelled. Cancellation is observed
    /// between passes and during the sleep, never inside a pass.
    pub async fn run(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        info!(interval_secs = interval.as_secs(), "reminder evaluator started");
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            match self.run_once().await {
                Ok(summary) if summary.evaluated > 0 => info!(
                    evaluated = summary.evaluated,
                    fired = summary.fired,
                    failed = summary.failed,
                    "reminder pass complete"
                ),
                Ok(_) => debug!("reminder pass complete, no entries"),
                Err(err) => warn!(error = %err, "reminder pass failed"),
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(interval) => {}
            }
        }
        info!("reminder evaluator stopped");
    }

    /// One SAMPLING + EVALUATING step. The entry set is read once, under a
    /// single lock, before the first send; entries registered while the pass
    /// runs are picked up by the next one.
    pub async fn run_once(&self) -> anyhow::Result<PassSummary> {
        let current = self
            .source
            .sample()
            .await
            .context("sampling balances")?;

        let mut summary = PassSummary::default();
        for entry in self.store.snapshot().await {
            let condition = entry.condition;
            summary.evaluated += 1;
            let Some(trigger) = evaluate(
                condition,
                &current,
                &entry.last_balance,
                entry.threshold,
                self.total_threshold,
            ) else {
                continue;
            };
            match self.notify(&entry, &trigger).await {
                Ok(()) => {
                    summary.fired += 1;
                    counter!(
                        "reminder_notifications_total",
                        "condition" => condition.tag(),
                        "outcome" => "sent"
                    )
                    .increment(1);
                    self.store
                        .update_baseline(condition, entry.id, current)
                        .await;
                    info!(
                        reminder_id = %entry.id,
                        %condition,
                        balance = trigger.balance,
                        "reminder fired"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    counter!(
                        "reminder_notifications_total",
                        "condition" => condition.tag(),
                        "outcome" => "failed"
                    )
                    .increment(1);
                    warn!(
                        reminder_id = %entry.id,
                        %condition,
                        error = %err,
                        "reminder notification failed, baseline kept"
                    );
                }
            }
        }
        Ok(summary)
    }

    async fn notify(&self, entry: &ReminderEntry, trigger: &Trigger) -> Result<(), NotifyError> {
        let body = compose_body(entry.condition, trigger.balance, entry.threshold);
        match tokio::time::timeout(
            self.send_timeout,
            self.notifier.send(&entry.email, &trigger.subject, &body),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.send_timeout)),
        }
    }
}
