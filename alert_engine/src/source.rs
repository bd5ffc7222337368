use async_trait::async_trait;
use domain::{BalanceSnapshot, CoinbaseBalance, HydraBalance};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::Mutex;

/// HBAR per USD used to derive the native hydra amount.
const HBAR_USD: f64 = 0.05;

/// Produces the balance snapshot the reminder loop evaluates against.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn sample(&self) -> anyhow::Result<BalanceSnapshot>;
}

/// Random-walk balances seeded at hydra $50.00 and coinbase $2.50.
/// Every sample becomes the starting point of the next one.
pub struct SimulatedBalances {
    inner: Mutex<Walk>,
}

struct Walk {
    current: BalanceSnapshot,
    rng: StdRng,
}

impl SimulatedBalances {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Walk starting from `start` instead of the default balances.
    pub fn starting_at(start: BalanceSnapshot, seed: u64) -> Self {
        Self {
            inner: Mutex::new(Walk {
                current: start,
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    fn from_rng(rng: StdRng) -> Self {
        let hydra_usd = 50.0;
        let coinbase_usd = 2.5;
        Self {
            inner: Mutex::new(Walk {
                current: BalanceSnapshot {
                    total_usd_value: hydra_usd + coinbase_usd,
                    hydra: HydraBalance {
                        balance_hbar: hydra_usd / HBAR_USD,
                        usd_value: hydra_usd,
                    },
                    coinbase: CoinbaseBalance {
                        balance_usd: coinbase_usd,
                    },
                },
                rng,
            }),
        }
    }

    /// Last sample handed out, without advancing the walk.
    pub async fn current(&self) -> BalanceSnapshot {
        self.inner.lock().await.current
    }
}

impl Default for SimulatedBalances {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for SimulatedBalances {
    async fn sample(&self) -> anyhow::Result<BalanceSnapshot> {
        let mut walk = self.inner.lock().await;
        let prev = walk.current;
        // Unbounded walk: values may drift below zero over long runs.
        let hydra_usd = prev.hydra.usd_value + walk.rng.gen_range(-0.5..=0.5);
        let hbar = prev.hydra.usd_value / HBAR_USD + walk.rng.gen_range(-10.0..=10.0);
        let coinbase_usd = prev.coinbase.balance_usd + walk.rng.gen_range(-0.1..=0.1);

        let next = BalanceSnapshot {
            total_usd_value: hydra_usd + coinbase_usd,
            hydra: HydraBalance {
                balance_hbar: hbar,
                usd_value: hydra_usd,
            },
            coinbase: CoinbaseBalance {
                balance_usd: coinbase_usd,
            },
        };
        walk.current = next;
        Ok(next)
    }
}
