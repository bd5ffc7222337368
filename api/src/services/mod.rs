mod chain;
mod hedera;
mod notify;
mod price;

pub use chain::{balance_of_calldata, RpcChainAdapter};
pub use hedera::HederaMirrorClient;
pub use notify::WebhookNotifier;
pub use price::{CoingeckoPriceOracle, FallbackPriceOracle, StaticPriceOracle};
