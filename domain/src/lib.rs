use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Native balance reported for a chain that could not be queried.
pub const BALANCE_UNAVAILABLE: f64 = -1.0;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChainBalance {
    pub chain: String,
    pub network: String,
    pub native_symbol: String,
    /// Non-negative when known, [`BALANCE_UNAVAILABLE`] otherwise.
    pub native_balance: f64,
    pub usd_value: f64,
}

impl ChainBalance {
    pub fn unavailable(chain: &str, network: &str, native_symbol: &str) -> Self {
        Self {
            chain: chain.to_string(),
            network: network.to_string(),
            native_symbol: native_symbol.to_string(),
            native_balance: BALANCE_UNAVAILABLE,
            usd_value: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.native_balance >= 0.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenHolding {
    pub chain: String,
    pub symbol: String,
    pub contract_address: String,
    pub decimals: u8,
    /// Raw `balanceOf` result in base units, as a decimal string.
    pub raw_balance: String,
    pub balance: f64,
    pub usd_value: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FailedLookup {
    pub chain: String,
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PortfolioSnapshot {
    pub address: String,
    pub chains: Vec<ChainBalance>,
    pub tokens: Vec<TokenHolding>,
    #[serde(default)]
    pub failed_lookups: Vec<FailedLookup>,
    pub total_usd_value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PortfolioSnapshot {
    /// Unrounded sum of every chain and token USD value.
    pub fn component_usd_sum(&self) -> f64 {
        let native: f64 = self.chains.iter().map(|c| c.usd_value).sum();
        let tokens: f64 = self.tokens.iter().map(|t| t.usd_value).sum();
        native + tokens
    }

    pub fn chain(&self, name: &str) -> Option<&ChainBalance> {
        self.chains.iter().find(|c| c.chain == name)
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubWallet {
    Hydra,
    Coinbase,
}

impl SubWallet {
    pub fn name(self) -> &'static str {
        match self {
            SubWallet::Hydra => "hydra",
            SubWallet::Coinbase => "coinbase",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SubWallet::Hydra => "Hydra",
            SubWallet::Coinbase => "Coinbase",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct HydraBalance {
    pub balance_hbar: f64,
    pub usd_value: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct CoinbaseBalance {
    pub balance_usd: f64,
}

/// Balance sample the reminder loop evaluates conditions against.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct BalanceSnapshot {
    pub total_usd_value: f64,
    pub hydra: HydraBalance,
    pub coinbase: CoinbaseBalance,
}

impl BalanceSnapshot {
    pub fn sub_wallet_usd(&self, wallet: SubWallet) -> f64 {
        match wallet {
            SubWallet::Hydra => self.hydra.usd_value,
            SubWallet::Coinbase => self.coinbase.balance_usd,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown condition '{0}'")]
pub struct UnknownCondition(pub String);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    TotalAbove,
    SubWalletIncrease(SubWallet),
    TotalBelow,
    Custom,
}

impl Condition {
    /// Every condition, in evaluation order.
    pub const ALL: [Condition; 5] = [
        Condition::TotalAbove,
        Condition::SubWalletIncrease(SubWallet::Hydra),
        Condition::SubWalletIncrease(SubWallet::Coinbase),
        Condition::TotalBelow,
        Condition::Custom,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Condition::TotalAbove => "total_above_51",
            Condition::SubWalletIncrease(SubWallet::Hydra) => "hydra_increase",
            Condition::SubWalletIncrease(SubWallet::Coinbase) => "coinbase_increase",
            Condition::TotalBelow => "total_below_51",
            Condition::Custom => "custom",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.tag() == value.trim())
            .ok_or_else(|| UnknownCondition(value.to_string()))
    }
}

impl TryFrom<String> for Condition {
    type Error = UnknownCondition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.tag().to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReminderEntry {
    pub id: Uuid,
    pub email: String,
    pub condition: Condition,
    pub threshold: Option<f64>,
    pub last_balance: BalanceSnapshot,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub email: String,
    pub condition: String,
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Baseline for increase conditions. Required: a missing baseline would
    /// make every increase reminder fire on its first evaluation.
    #[serde(rename = "currentBalances")]
    pub current_balances: BalanceSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderAck {
    pub message: String,
    pub id: Uuid,
}

/// Balance of a Hedera account as reported by the mirror node.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HederaAccountBalance {
    pub account_id: String,
    /// Raw balance in tinybars (1 HBAR = 10^8 tinybars).
    pub balance: i64,
    pub balance_hbar: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HederaTransfer {
    pub account: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct HederaTransaction {
    pub transaction_id: String,
    pub consensus_timestamp: String,
    pub name: String,
    pub result: String,
    pub charged_tx_fee: i64,
    pub transfers: Vec<HederaTransfer>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenInfo {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    pub stable: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainInfo {
    pub name: String,
    pub network: String,
    pub chain_id: u64,
    pub native_symbol: String,
    pub tokens: Vec<TokenInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_tags_round_trip_through_from_str() {
        for condition in Condition::ALL {
            assert_eq!(condition.tag().parse::<Condition>(), Ok(condition));
        }
        assert_eq!(
            "total_above_50".parse::<Condition>(),
            Err(UnknownCondition("total_above_50".to_string()))
        );
    }

    #[test]
    fn balance_snapshot_accepts_partial_payload() {
        let snapshot: BalanceSnapshot =
            serde_json::from_str(r#"{"total_usd_value": 52.3, "hydra": {"usd_value": 50.0}}"#)
                .expect("partial snapshot");
        assert_eq!(snapshot.total_usd_value, 52.3);
        assert_eq!(snapshot.sub_wallet_usd(SubWallet::Hydra), 50.0);
        assert_eq!(snapshot.sub_wallet_usd(SubWallet::Coinbase), 0.0);
    }

    #[test]
    fn reminder_request_requires_current_balances() {
        let missing = serde_json::from_str::<ReminderRequest>(
            r#"{"email": "a@example.com", "condition": "hydra_increase"}"#,
        );
        assert!(missing.is_err());

        let request: ReminderRequest = serde_json::from_str(
            r#"{"email": "a@example.com", "condition": "hydra_increase",
                "currentBalances": {"total_usd_value": 52.5, "hydra": {"usd_value": 50.0}}}"#,
        )
        .expect("request with baseline");
        assert_eq!(request.threshold, None);
        assert_eq!(request.current_balances.sub_wallet_usd(SubWallet::Hydra), 50.0);
    }

    #[test]
    fn hedera_transaction_tolerates_missing_fields() {
        let tx: HederaTransaction = serde_json::from_str(
            r#"{"transaction_id": "0.0.1-1700000000-1", "name": "CRYPTOTRANSFER",
                "transfers": [{"account": "0.0.98", "amount": 5000}], "memo_base64": ""}"#,
        )
        .expect("mirror transaction");
        assert_eq!(tx.name, "CRYPTOTRANSFER");
        assert_eq!(tx.charged_tx_fee, 0);
        assert_eq!(tx.transfers[0].amount, 5000);
    }

    #[test]
    fn unavailable_chain_is_distinct_from_zero() {
        let failed = ChainBalance::unavailable("bsc", "BSC Mainnet", "BNB");
        assert!(!failed.is_available());
        let empty = ChainBalance {
            native_balance: 0.0,
            ..failed.clone()
        };
        assert!(empty.is_available());
    }

    #[test]
    fn round_cents_keeps_two_decimals() {
        assert_eq!(round_cents(52.346), 52.35);
        assert_eq!(round_cents(52.3449), 52.34);
        assert_eq!(round_cents(0.004), 0.0);
    }
}
