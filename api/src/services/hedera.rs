use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use domain::{HederaAccountBalance, HederaTransaction};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

const TINYBARS_PER_HBAR: f64 = 100_000_000.0;

/// Read-only client for one account on a Hedera mirror node REST API.
#[derive(Clone)]
pub struct HederaMirrorClient {
    client: Client,
    base_url: String,
    account_id: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct AccountResponse {
    #[serde(default)]
    balance: AccountBalanceField,
}

#[derive(Deserialize, Default)]
struct AccountBalanceField {
    #[serde(default)]
    balance: i64,
}

#[derive(Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<HederaTransaction>,
}

impl HederaMirrorClient {
    pub fn new(
        base_url: &str,
        account_id: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building hedera mirror http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            api_key,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub async fn account_balance(&self) -> Result<HederaAccountBalance> {
        let resp = self
            .get(&format!("/accounts/{}", self.account_id))
            .send()
            .await
            .context("hedera account request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("mirror node returned status {status} for account"));
        }
        let body: AccountResponse = resp
            .json()
            .await
            .context("failed to decode hedera account response")?;
        let balance = body.balance.balance;
        debug!(account_id = %self.account_id, tinybars = balance, "hedera balance fetched");
        Ok(HederaAccountBalance {
            account_id: self.account_id.clone(),
            balance,
            balance_hbar: balance as f64 / TINYBARS_PER_HBAR,
        })
    }

    /// Most recent page of transactions as returned by the mirror node.
    pub async fn transactions(&self) -> Result<Vec<HederaTransaction>> {
        let resp = self
            .get(&format!("/accounts/{}/transactions", self.account_id))
            .send()
            .await
            .context("hedera transactions request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("mirror node returned status {status} for transactions"));
        }
        let body: TransactionsResponse = resp
            .json()
            .await
            .context("failed to decode hedera transactions response")?;
        debug!(account_id = %self.account_id, count = body.transactions.len(), "hedera transactions fetched");
        Ok(body.transactions)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn client(server: &MockServer, api_key: Option<&str>) -> HederaMirrorClient {
        HederaMirrorClient::new(
            &format!("{}/api/v1/", server.uri()),
            "0.0.1234",
            api_key.map(str::to_string),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn balance_converts_tinybars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/0.0.1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "account": "0.0.1234",
                "balance": {"balance": 250_000_000, "timestamp": "1700000000.000000000", "tokens": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let balance = client(&server, None).account_balance().await.unwrap();
        assert_eq!(
            balance,
            HederaAccountBalance {
                account_id: "0.0.1234".to_string(),
                balance: 250_000_000,
                balance_hbar: 2.5,
            }
        );
    }

    #[tokio::test]
    async fn api_key_is_sent_as_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/0.0.1234"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": {"balance": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let balance = client(&server, Some("secret")).account_balance().await.unwrap();
        assert_eq!(balance.balance, 1);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client(&server, None);
        let err = client.account_balance().await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(client.transactions().await.is_err());
    }

    #[tokio::test]
    async fn transactions_are_listed_in_mirror_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/0.0.1234/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transactions": [
                    {
                        "transaction_id": "0.0.1234-1700000001-0",
                        "consensus_timestamp": "1700000001.000000001",
                        "name": "CRYPTOTRANSFER",
                        "result": "SUCCESS",
                        "charged_tx_fee": 84_000,
                        "transfers": [
                            {"account": "0.0.1234", "amount": -100_084_000},
                            {"account": "0.0.98", "amount": 100_000_000}
                        ]
                    },
                    {"transaction_id": "0.0.1234-1700000000-0", "name": "TOKENASSOCIATE"}
                ],
                "links": {"next": null}
            })))
            .mount(&server)
            .await;

        let txs = client(&server, None).transactions().await.unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].result, "SUCCESS");
        assert_eq!(txs[0].transfers[1].amount, 100_000_000);
        assert_eq!(txs[1].name, "TOKENASSOCIATE");
        assert!(txs[1].transfers.is_empty());
    }
}
