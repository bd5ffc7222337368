use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{round_cents, ChainBalance, ChainInfo, FailedLookup, PortfolioSnapshot, TokenHolding};
use ethers::{types::U256, utils::format_units};
use futures_util::future::join_all;
use metrics::counter;
use tracing::{info, warn};

use crate::{checksum_address, derive_address, ChainAdapter, KeyError, PortfolioService, PriceOracle};

/// Fans out to every chain adapter and prices the results.
#[derive(Clone)]
pub struct PortfolioAggregator {
    adapters: Vec<Arc<dyn ChainAdapter>>,
    oracle: Arc<dyn PriceOracle>,
}

struct ChainReport {
    native: ChainBalance,
    tokens: Vec<TokenHolding>,
    failed: Vec<FailedLookup>,
}

impl PortfolioAggregator {
    pub fn new(adapters: Vec<Arc<dyn ChainAdapter>>, oracle: Arc<dyn PriceOracle>) -> Self {
        Self { adapters, oracle }
    }

    pub async fn aggregate(&self, private_key: &str) -> Result<PortfolioSnapshot, KeyError> {
        let address = checksum_address(&derive_address(private_key)?);

        // Chains are independent reads; every scan finishes before the snapshot is built.
        let reports = join_all(
            self.adapters
                .iter()
                .map(|adapter| self.scan_chain(adapter.as_ref(), &address)),
        )
        .await;

        let mut chains = Vec::with_capacity(reports.len());
        let mut tokens = Vec::new();
        let mut failed_lookups = Vec::new();
        for report in reports {
            chains.push(report.native);
            tokens.extend(report.tokens);
            failed_lookups.extend(report.failed);
        }

        let mut snapshot = PortfolioSnapshot {
            address,
            chains,
            tokens,
            failed_lookups,
            total_usd_value: 0.0,
            timestamp: Utc::now(),
        };
        snapshot.total_usd_value = round_cents(snapshot.component_usd_sum());
        counter!("portfolio_aggregations_total").increment(1);
        info!(
            address = %snapshot.address,
            chains = snapshot.chains.len(),
            tokens = snapshot.tokens.len(),
            failed = snapshot.failed_lookups.len(),
            total_usd_value = snapshot.total_usd_value,
            "portfolio aggregated"
        );
        Ok(snapshot)
    }

    async fn scan_chain(&self, adapter: &dyn ChainAdapter, address: &str) -> ChainReport {
        let chain = adapter.chain();
        let native = match adapter.native_balance(address).await {
            Ok(balance) => {
                let usd_value = if balance > 0.0 {
                    balance * self.oracle.price_or_zero(&chain.native_price_id).await
                } else {
                    0.0
                };
                ChainBalance {
                    chain: chain.name.clone(),
                    network: chain.network.clone(),
                    native_symbol: chain.native_symbol.clone(),
                    native_balance: balance,
                    usd_value,
                }
            }
            Err(err) => {
                warn!(error = %err, chain = %chain.name, "native balance unavailable");
                counter!("portfolio_chain_failures_total", "chain" => chain.name.clone())
                    .increment(1);
                ChainBalance::unavailable(&chain.name, &chain.network, &chain.native_symbol)
            }
        };

        let mut tokens = Vec::new();
        let mut failed = Vec::new();
        for token in &chain.tokens {
            let raw = match adapter.token_balance(address, token).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(
                        error = %err,
                        chain = %chain.name,
                        token = %token.symbol,
                        "token balance lookup failed, skipping"
                    );
                    failed.push(FailedLookup {
                        chain: chain.name.clone(),
                        symbol: token.symbol.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if raw.is_zero() {
                continue;
            }
            let balance = to_units(raw, token.decimals);
            let usd_value = if token.stable {
                balance
            } else {
                balance * self.oracle.price_or_zero(&token.price_id).await
            };
            tokens.push(TokenHolding {
                chain: chain.name.clone(),
                symbol: token.symbol.clone(),
                contract_address: checksum_address(&token.address),
                decimals: token.decimals,
                raw_balance: raw.to_string(),
                balance,
                usd_value,
            });
        }

        ChainReport {
            native,
            tokens,
            failed,
        }
    }
}

#[async_trait]
impl PortfolioService for PortfolioAggregator {
    async fn aggregate_portfolio(&self, private_key: &str) -> Result<PortfolioSnapshot, KeyError> {
        self.aggregate(private_key).await
    }

    fn chains(&self) -> Vec<ChainInfo> {
        self.adapters.iter().map(|a| a.chain().info()).collect()
    }
}

/// raw / 10^decimals as a float.
pub fn to_units(raw: U256, decimals: u8) -> f64 {
    format_units(raw, decimals as i32)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(0.0)
}
