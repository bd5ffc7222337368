use std::{collections::HashMap, str::FromStr};

use domain::{ChainInfo, TokenInfo};
use ethers::types::Address;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
    /// Price-feed id, e.g. `wrapped-bitcoin`.
    pub price_id: String,
    /// Pegged 1:1 to USD; never sent to the oracle.
    pub stable: bool,
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub name: String,
    pub network: String,
    pub chain_id: u64,
    pub native_symbol: String,
    pub native_price_id: String,
    pub rpc_url: String,
    pub tokens: Vec<TokenConfig>,
}

impl ChainConfig {
    pub fn info(&self) -> ChainInfo {
        ChainInfo {
            name: self.name.clone(),
            network: self.network.clone(),
            chain_id: self.chain_id,
            native_symbol: self.native_symbol.clone(),
            tokens: self
                .tokens
                .iter()
                .map(|t| TokenInfo {
                    symbol: t.symbol.clone(),
                    address: format!("{:#x}", t.address),
                    decimals: t.decimals,
                    stable: t.stable,
                })
                .collect(),
        }
    }
}

const STABLE_SYMBOLS: &[&str] = &["USDC", "USDT", "DAI", "BUSD"];

const POLYGON_TOKENS: &[(&str, &str)] = &[
    ("USDC", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    ("USDT", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
    ("DAI", "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
    ("WETH", "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"),
    ("WBTC", "0x1BFD67037B42Cf73acF2047067bd4F2C47D9BfD6"),
    ("AAVE", "0xD6DF932A45C0f255f85145f286eA0b292B21C90B"),
    ("CRV", "0x172370d5Cd63279eFa6d502DAB29171933a610AF"),
    ("LINK", "0x53E0bca35eC356BD5ddDFebbD1Fc0fD03FaBad39"),
    ("UNI", "0xb33EaAd8d922B1083446DC23f610c2567fB5180f"),
    ("SUSHI", "0x0b3F868E0BE5597D5DB7fEBbE9e4c5e4440C5b7a"),
    ("COMP", "0x8505b9d2254A7Ae468c0E9dd10Cea3A837aef5dc"),
    ("YFI", "0xDA537104D6A5edd53c6fBba9A898708E465260b6"),
    ("SNX", "0x50B728D8D964fd00C2d0AAD81718b71311feF68a"),
    ("BAL", "0x9a71012B13CA4d3D0Cdc72A177DF3ef03b0E76A3"),
    ("REN", "0x0A3A18Fc912882E0B8c353db795F37f0B3943Fc3"),
];

const ARBITRUM_TOKENS: &[(&str, &str)] = &[
    ("USDC", "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"),
    ("USDT", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
    ("DAI", "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1"),
    ("WETH", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
    ("WBTC", "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f"),
    ("LINK", "0xf97f4df75117a78c1A5a0DBb814Af92458539FB4"),
    ("UNI", "0xFa7F8980b0f1E64A2062791cc3b0871572f1F7f0"),
    ("AAVE", "0xba5DdD1F9d7F570dc94a51479a000E3BCE967196"),
    ("CRV", "0x11cDb42B0EB46D95f990BeDD4695A6e3fA034978"),
    ("SUSHI", "0xd4d42F0b6DEF4CE0383636770eF773390d85c61A"),
];

const BSC_TOKENS: &[(&str, &str)] = &[
    ("USDC", "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
    ("USDT", "0x55d398326f99059fF775485246999027B3197955"),
    ("BUSD", "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56"),
    ("CAKE", "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"),
    ("WBNB", "0xbb4CdB9CBd36B01bD1cBaEF60aF814a3f6F0Ee75"),
];

/// Mainnet chains and token allowlists scanned by default.
/// `rpc_overrides` maps chain name to an RPC URL replacing the public endpoint.
pub fn default_catalog(rpc_overrides: &HashMap<String, String>) -> Vec<ChainConfig> {
    let rpc = |name: &str, default: &str| {
        rpc_overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    vec![
        ChainConfig {
            name: "ethereum".to_string(),
            network: "Ethereum Mainnet".to_string(),
            chain_id: 1,
            native_symbol: "ETH".to_string(),
            native_price_id: "ethereum".to_string(),
            rpc_url: rpc("ethereum", "https://eth.llamarpc.com"),
            tokens: Vec::new(),
        },
        ChainConfig {
            name: "polygon".to_string(),
            network: "Polygon Mainnet".to_string(),
            chain_id: 137,
            native_symbol: "MATIC".to_string(),
            native_price_id: "matic-network".to_string(),
            rpc_url: rpc("polygon", "https://polygon-rpc.com"),
            tokens: build_tokens(137, POLYGON_TOKENS),
        },
        ChainConfig {
            name: "arbitrum".to_string(),
            network: "Arbitrum One".to_string(),
            chain_id: 42161,
            native_symbol: "ETH".to_string(),
            native_price_id: "ethereum".to_string(),
            rpc_url: rpc("arbitrum", "https://arb1.arbitrum.io/rpc"),
            tokens: build_tokens(42161, ARBITRUM_TOKENS),
        },
        ChainConfig {
            name: "bsc".to_string(),
            network: "BSC Mainnet".to_string(),
            chain_id: 56,
            native_symbol: "BNB".to_string(),
            native_price_id: "binancecoin".to_string(),
            rpc_url: rpc("bsc", "https://bsc-dataseed1.binance.org"),
            tokens: build_tokens(56, BSC_TOKENS),
        },
    ]
}

fn build_tokens(chain_id: u64, entries: &[(&str, &str)]) -> Vec<TokenConfig> {
    entries
        .iter()
        .filter_map(|(symbol, address)| match Address::from_str(address) {
            Ok(address) => Some(TokenConfig {
                symbol: symbol.to_string(),
                address,
                decimals: token_decimals(chain_id, symbol),
                price_id: price_id(symbol),
                stable: STABLE_SYMBOLS.contains(symbol),
            }),
            Err(err) => {
                warn!(error = %err, %symbol, chain_id, "skipping token with bad address");
                None
            }
        })
        .collect()
}

/// BEP-20 stables on BSC use 18 decimals, unlike their 6-decimal ERC-20 twins.
pub fn token_decimals(chain_id: u64, symbol: &str) -> u8 {
    if chain_id == 56 {
        return 18;
    }
    match symbol {
        "USDC" | "USDT" => 6,
        "WBTC" => 8,
        _ => 18,
    }
}

pub fn price_id(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "ETH" | "WETH" => "ethereum".to_string(),
        "WBTC" => "wrapped-bitcoin".to_string(),
        "BNB" | "WBNB" => "binancecoin".to_string(),
        "MATIC" => "matic-network".to_string(),
        "USDC" => "usd-coin".to_string(),
        "USDT" => "tether".to_string(),
        "DAI" => "dai".to_string(),
        "BUSD" => "binance-usd".to_string(),
        "AAVE" => "aave".to_string(),
        "CRV" => "curve-dao-token".to_string(),
        "LINK" => "chainlink".to_string(),
        "UNI" => "uniswap".to_string(),
        "SUSHI" => "sushi".to_string(),
        "COMP" => "compound-governance-token".to_string(),
        "YFI" => "yearn-finance".to_string(),
        "SNX" => "havven".to_string(),
        "BAL" => "balancer".to_string(),
        "REN" => "republic-protocol".to_string(),
        "CAKE" => "pancakeswap-token".to_string(),
        other => other.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_expected_chains_and_tokens() {
        let catalog = default_catalog(&HashMap::new());
        let names: Vec<_> = catalog.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ethereum", "polygon", "arbitrum", "bsc"]);
        let counts: Vec<_> = catalog.iter().map(|c| c.tokens.len()).collect();
        assert_eq!(counts, [0, 15, 10, 5]);
    }

    #[test]
    fn decimals_follow_chain_conventions() {
        assert_eq!(token_decimals(137, "USDC"), 6);
        assert_eq!(token_decimals(42161, "WBTC"), 8);
        assert_eq!(token_decimals(56, "USDT"), 18);
        assert_eq!(token_decimals(137, "LINK"), 18);
    }

    #[test]
    fn stable_flags_and_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("bsc".to_string(), "http://localhost:8545".to_string());
        let catalog = default_catalog(&overrides);
        let bsc = catalog.iter().find(|c| c.name == "bsc").unwrap();
        assert_eq!(bsc.rpc_url, "http://localhost:8545");
        let stables: Vec<_> = bsc
            .tokens
            .iter()
            .filter(|t| t.stable)
            .map(|t| t.symbol.as_str())
            .collect();
        assert_eq!(stables, ["USDC", "USDT", "BUSD"]);
    }
}
