use std::{collections::HashMap, env, time::Duration};

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_origins: Vec<String>,
    /// Chain name (`ethereum`, `polygon`, ...) to RPC endpoint.
    pub chain_rpc_urls: HashMap<String, String>,
    pub rpc_timeout: Duration,
    pub coingecko_api_base: String,
    pub price_timeout: Duration,
    pub price_cache_ttl: Duration,
    /// Price-feed id to fixed USD price, consulted before CoinGecko.
    pub token_prices: HashMap<String, f64>,
    pub reminder_interval: Duration,
    pub reminder_total_threshold: f64,
    pub notify_webhook_url: Option<String>,
    pub notify_timeout: Duration,
    pub enable_reminder_worker: bool,
    pub hedera_base_url: String,
    /// Mirror-node lookups are disabled when unset.
    pub hedera_account_id: Option<String>,
    pub hedera_api_key: Option<String>,
    pub hedera_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .context("PORT must be a valid u16")?,
            frontend_origins: parse_origins(),
            chain_rpc_urls: parse_chain_urls("CHAIN_RPC_URLS"),
            rpc_timeout: parse_duration_seconds("RPC_TIMEOUT_SECS", 5),
            coingecko_api_base: env::var("COINGECKO_API_BASE")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            price_timeout: parse_duration_seconds("PRICE_TIMEOUT_SECS", 5),
            price_cache_ttl: parse_duration_seconds("PRICE_CACHE_TTL_SECS", 60),
            token_prices: parse_token_prices("TOKEN_PRICES"),
            reminder_interval: parse_duration_seconds("REMINDER_INTERVAL_SECS", 30),
            reminder_total_threshold: parse_f64("REMINDER_TOTAL_THRESHOLD", 51.0),
            notify_webhook_url: parse_optional("NOTIFY_WEBHOOK_URL"),
            notify_timeout: parse_duration_seconds("NOTIFY_TIMEOUT_SECS", 5),
            enable_reminder_worker: parse_bool("ENABLE_REMINDER_WORKER", true),
            hedera_base_url: env::var("HEDERA_BASE_URL").unwrap_or_else(|_| {
                "https://mainnet-public.mirrornode.hedera.com/api/v1".to_string()
            }),
            hedera_account_id: parse_optional("HEDERA_ACCOUNT_ID"),
            hedera_api_key: parse_optional("HEDERA_API_KEY"),
            hedera_timeout: parse_duration_seconds("HEDERA_TIMEOUT_SECS", 5),
        })
    }
}

fn parse_optional(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|v| non_blank(&v))
}

fn non_blank(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_origins() -> Vec<String> {
    match env::var("FRONTEND_ORIGINS") {
        Ok(list) => split_origins(&list),
        Err(_) => vec!["http://localhost:5173".to_string()],
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_duration_seconds(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

fn parse_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "on"))
        .unwrap_or(default)
}

fn parse_token_prices(key: &str) -> HashMap<String, f64> {
    env::var(key)
        .map(|raw| token_prices_from(&raw))
        .unwrap_or_default()
}

fn token_prices_from(raw: &str) -> HashMap<String, f64> {
    raw.split(',')
        .filter_map(|item| {
            let (id, value) = item.split_once('=')?;
            let price = value.trim().parse::<f64>().ok()?;
            let id = id.trim().to_lowercase();
            if id.is_empty() || !price.is_finite() || price < 0.0 {
                return None;
            }
            Some((id, price))
        })
        .collect()
}

fn parse_chain_urls(key: &str) -> HashMap<String, String> {
    env::var(key)
        .map(|raw| chain_urls_from(&raw))
        .unwrap_or_default()
}

fn chain_urls_from(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|item| {
            let (chain, url) = item.split_once('=')?;
            let chain = chain.trim().to_lowercase();
            let url = url.trim();
            if chain.is_empty() || url.is_empty() {
                return None;
            }
            Some((chain, url.to_string()))
        })
        .collect()
}
