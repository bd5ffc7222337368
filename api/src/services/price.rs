use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use indexer::PriceOracle;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

/// CoinGecko `/simple/price` client. One attempt per lookup, bounded by the
/// client timeout; successful prices are cached for `ttl`.
#[derive(Clone)]
pub struct CoingeckoPriceOracle {
    client: Client,
    api_base: String,
    cache: Arc<RwLock<HashMap<String, CachedPrice>>>,
    ttl: Duration,
}

#[derive(Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

impl CoingeckoPriceOracle {
    pub fn new(api_base: &str, timeout: Duration, ttl: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building coingecko http client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        })
    }

    async fn cached_price(&self, id: &str) -> Option<f64> {
        let cache = self.cache.read().await;
        cache
            .get(id)
            .filter(|entry| entry.fetched_at.elapsed() <= self.ttl)
            .map(|entry| entry.price)
    }

    async fn store_price(&self, id: &str, price: f64) {
        self.cache.write().await.insert(
            id.to_string(),
            CachedPrice {
                price,
                fetched_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl PriceOracle for CoingeckoPriceOracle {
    async fn price_usd(&self, price_id: &str) -> Result<f64> {
        let id = price_id.to_lowercase();
        if let Some(price) = self.cached_price(&id).await {
            return Ok(price);
        }
        let url = format!("{}/simple/price", self.api_base);
        let resp = self
            .client
            .get(url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .context("coingecko request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("coingecko returned status {status}"));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to decode coingecko price response")?;
        let price = body
            .get(&id)
            .and_then(|entry| entry.get("usd"))
            .and_then(|value| value.as_f64())
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| anyhow!("coingecko price missing for {id}"))?;
        self.store_price(&id, price).await;
        debug!(%id, price, "coingecko price fetched");
        Ok(price)
    }
}

/// Fixed prices keyed by price-feed id.
#[derive(Clone, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<String, f64>,
}

impl StaticPriceOracle {
    pub fn new(prices: HashMap<String, f64>) -> Self {
        let prices = prices
            .into_iter()
            .map(|(id, price)| (id.to_lowercase(), price))
            .collect();
        Self { prices }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn price_usd(&self, price_id: &str) -> Result<f64> {
        self.prices
            .get(&price_id.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow!("no static price for {price_id}"))
    }
}

/// Asks `primary` first and `fallback` when the primary errors or reports 0.
pub struct FallbackPriceOracle {
    primary: Arc<dyn PriceOracle>,
    fallback: Arc<dyn PriceOracle>,
}

impl FallbackPriceOracle {
    pub fn new(primary: Arc<dyn PriceOracle>, fallback: Arc<dyn PriceOracle>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl PriceOracle for FallbackPriceOracle {
    async fn price_usd(&self, price_id: &str) -> Result<f64> {
        match self.primary.price_usd(price_id).await {
            Ok(price) if price > 0.0 => return Ok(price),
            Ok(_) => debug!(%price_id, "primary oracle returned 0, trying fallback"),
            Err(err) => debug!(%price_id, error = %err, "primary oracle failed, trying fallback"),
        }
        self.fallback
            .price_usd(price_id)
            .await
            .with_context(|| format!("price lookup failed for {price_id}"))
    }
}
