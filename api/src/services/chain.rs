use std::{future::Future, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, U256,
    },
    utils::{format_units, keccak256},
};
use indexer::{parse_address, ChainAdapter, ChainConfig, ChainError, TokenConfig};
use tracing::debug;

/// JSON-RPC backed adapter for one EVM network. Every request is bounded by `timeout`.
pub struct RpcChainAdapter {
    chain: ChainConfig,
    provider: Provider<Http>,
    timeout: Duration,
}

impl RpcChainAdapter {
    pub fn new(chain: ChainConfig, timeout: Duration) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(chain.rpc_url.as_str())?.interval(Duration::from_millis(500));
        Ok(Self {
            chain,
            provider,
            timeout,
        })
    }

    async fn bounded<T, E, F>(&self, request: F) -> Result<T, ChainError>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ChainError::Rpc(err.to_string())),
            Err(_) => Err(ChainError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl ChainAdapter for RpcChainAdapter {
    fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    async fn native_balance(&self, address: &str) -> Result<f64, ChainError> {
        let owner = parse_address(address)?;
        let wei = self.bounded(self.provider.get_balance(owner, None)).await?;
        let balance = format_units(wei, 18)
            .map_err(|err| ChainError::Decode(err.to_string()))?
            .parse::<f64>()
            .map_err(|err| ChainError::Decode(err.to_string()))?;
        debug!(chain = %self.chain.name, balance, "native balance fetched");
        Ok(balance)
    }

    async fn token_balance(&self, address: &str, token: &TokenConfig) -> Result<U256, ChainError> {
        let owner = parse_address(address)?;
        let tx = TypedTransaction::Legacy(TransactionRequest {
            to: Some(token.address.into()),
            data: Some(balance_of_calldata(owner)),
            ..Default::default()
        });
        let result = self.bounded(self.provider.call(&tx, None)).await?;
        let raw = decode_uint(&result)?;
        debug!(
            chain = %self.chain.name,
            token = %token.symbol,
            raw = %raw,
            "token balance fetched"
        );
        Ok(raw)
    }
}

/// `balanceOf(address)` selector followed by the left-padded owner.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&keccak256("balanceOf(address)")[..4]);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(owner.as_bytes());
    Bytes::from(data)
}

fn decode_uint(result: &[u8]) -> Result<U256, ChainError> {
    if result.len() < 32 {
        return Err(ChainError::Decode(format!(
            "balanceOf returned {} bytes",
            result.len()
        )));
    }
    Ok(U256::from_big_endian(&result[..32]))
}
