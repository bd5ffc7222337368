use std::sync::Arc;

use alert_engine::{
    LoggingNotifier, NotificationSender, ReminderEvaluator, ReminderStore, SimulatedBalances,
    SnapshotSource,
};
use anyhow::{Context, Result};
use indexer::{default_catalog, ChainAdapter, PortfolioAggregator, PriceOracle};
use tracing::info;

use crate::{
    config::AppConfig,
    services::{
        CoingeckoPriceOracle, FallbackPriceOracle, HederaMirrorClient, RpcChainAdapter,
        StaticPriceOracle, WebhookNotifier,
    },
    state::AppState,
};

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let adapters = build_adapters(config)?;
    let oracle = build_oracle(config)?;
    let portfolio = Arc::new(PortfolioAggregator::new(adapters, oracle));
    let balances: Arc<dyn SnapshotSource> = Arc::new(SimulatedBalances::new());

    Ok(AppState {
        portfolio,
        reminders: ReminderStore::new(),
        balances,
        hedera: build_hedera(config)?,
    })
}

/// Worker over the same store and balance source the HTTP handlers use.
pub fn build_evaluator(config: &AppConfig, state: &AppState) -> Result<Arc<ReminderEvaluator>> {
    Ok(Arc::new(ReminderEvaluator::new(
        state.reminders.clone(),
        state.balances.clone(),
        build_notifier(config)?,
        config.reminder_total_threshold,
        config.notify_timeout,
    )))
}

pub fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn ChainAdapter>>> {
    default_catalog(&config.chain_rpc_urls)
        .into_iter()
        .map(|chain| {
            let name = chain.name.clone();
            info!(chain = %name, rpc_url = %chain.rpc_url, tokens = chain.tokens.len(), "chain configured");
            RpcChainAdapter::new(chain, config.rpc_timeout)
                .map(|adapter| Arc::new(adapter) as Arc<dyn ChainAdapter>)
                .with_context(|| format!("invalid rpc url for {name}"))
        })
        .collect()
}

pub fn build_oracle(config: &AppConfig) -> Result<Arc<dyn PriceOracle>> {
    let coingecko: Arc<dyn PriceOracle> = Arc::new(CoingeckoPriceOracle::new(
        &config.coingecko_api_base,
        config.price_timeout,
        config.price_cache_ttl,
    )?);
    let fixed = StaticPriceOracle::new(config.token_prices.clone());
    if fixed.is_empty() {
        return Ok(coingecko);
    }
    Ok(Arc::new(FallbackPriceOracle::new(Arc::new(fixed), coingecko)))
}

pub fn build_hedera(config: &AppConfig) -> Result<Option<Arc<HederaMirrorClient>>> {
    let Some(account_id) = &config.hedera_account_id else {
        info!("HEDERA_ACCOUNT_ID not set, hedera lookups disabled");
        return Ok(None);
    };
    info!(base_url = %config.hedera_base_url, %account_id, "hedera mirror node configured");
    let client = HederaMirrorClient::new(
        &config.hedera_base_url,
        account_id,
        config.hedera_api_key.clone(),
        config.hedera_timeout,
    )?;
    Ok(Some(Arc::new(client)))
}

pub fn build_notifier(config: &AppConfig) -> Result<Arc<dyn NotificationSender>> {
    match &config.notify_webhook_url {
        Some(url) => {
            info!(%url, "notifications delivered via webhook");
            Ok(Arc::new(WebhookNotifier::new(url, config.notify_timeout)?))
        }
        None => {
            info!("NOTIFY_WEBHOOK_URL not set, notifications are logged only");
            Ok(Arc::new(LoggingNotifier))
        }
    }
}
