use std::sync::Arc;

use alert_engine::{ReminderStore, SnapshotSource};
use indexer::PortfolioService;

use crate::services::HederaMirrorClient;

#[derive(Clone)]
pub struct AppState {
    pub portfolio: Arc<dyn PortfolioService>,
    pub reminders: ReminderStore,
    /// Shared with the reminder worker; each read advances it.
    pub balances: Arc<dyn SnapshotSource>,
    /// `None` when no Hedera account is configured.
    pub hedera: Option<Arc<HederaMirrorClient>>,
}

#[allow(dead_code)]
fn _assert_state_bounds() {
    fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
    assert_bounds::<AppState>();
}
