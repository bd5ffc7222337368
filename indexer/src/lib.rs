pub mod aggregator;
pub mod catalog;
pub mod keys;

use std::time::Duration;

use async_trait::async_trait;
use domain::{ChainInfo, PortfolioSnapshot};
use ethers::types::U256;
use thiserror::Error;
use tracing::warn;

pub use aggregator::PortfolioAggregator;
pub use catalog::{default_catalog, ChainConfig, TokenConfig};
pub use keys::{checksum_address, derive_address, parse_address, KeyError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("invalid wallet address format: {0}")]
    InvalidAddress(String),
    #[error("rpc request failed: {0}")]
    Rpc(String),
    #[error("rpc request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected rpc response: {0}")]
    Decode(String),
}

/// Read-only balance queries against one network.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn chain(&self) -> &ChainConfig;

    /// Native balance in whole units. The address is validated before any request.
    async fn native_balance(&self, address: &str) -> Result<f64, ChainError>;

    /// Raw `balanceOf(address)` result for one token contract.
    async fn token_balance(&self, address: &str, token: &TokenConfig) -> Result<U256, ChainError>;
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price_usd(&self, price_id: &str) -> anyhow::Result<f64>;

    /// Price or 0 when unknown. A zero price drops the asset from USD totals.
    async fn price_or_zero(&self, price_id: &str) -> f64 {
        match self.price_usd(price_id).await {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            Ok(price) => {
                warn!(price, %price_id, "oracle returned unusable price, using 0");
                0.0
            }
            Err(err) => {
                warn!(error = %err, %price_id, "price lookup failed, using 0");
                0.0
            }
        }
    }
}

#[async_trait]
pub trait PortfolioService: Send + Sync {
    /// Validates the key, then scans every configured chain. Chain and token
    /// failures are reported inside the snapshot; only key errors abort.
    async fn aggregate_portfolio(&self, private_key: &str) -> Result<PortfolioSnapshot, KeyError>;

    fn chains(&self) -> Vec<ChainInfo>;
}
