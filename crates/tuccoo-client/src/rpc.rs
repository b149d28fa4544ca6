//! Solana JSON-RPC over HTTP.
//!
//! Every read uses the `confirmed` commitment. Transfers are signed locally
//! and submitted base58-encoded with `sendTransaction`.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use tuccoo_core::address::Pubkey;
use tuccoo_core::constants::{DEFAULT_COMMITMENT, DEFAULT_RPC_URL};
use tuccoo_core::crypto::KeyPair;
use tuccoo_core::transaction::{Blockhash, Transaction};

use crate::error::DashboardError;
use crate::provider::{ConfirmationStatus, WalletProvider};

/// Connection settings for [`RpcProvider`].
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// How long `confirm_transaction` polls before giving up.
    pub confirm_timeout: Duration,
    /// Delay between signature status polls.
    pub poll_interval: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl RpcConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// `{"context": {...}, "value": T}` wrapper used by most Solana methods.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Result of `getLatestBlockhash`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// One entry of `getSignatureStatuses`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationStatus>,
}

/// Interpret one status poll.
///
/// `None` means keep polling; `Some` is the final answer.
pub fn classify_status(
    signature: &str,
    status: Option<&SignatureStatus>,
) -> Option<Result<ConfirmationStatus, DashboardError>> {
    let status = status?;
    if let Some(err) = &status.err {
        return Some(Err(DashboardError::TransactionFailed {
            signature: signature.to_string(),
            reason: err.to_string(),
        }));
    }
    match status.confirmation_status {
        Some(s) if s.is_confirmed() => Some(Ok(s)),
        _ => None,
    }
}

/// [`WalletProvider`] backed by a Solana JSON-RPC node.
pub struct RpcProvider {
    client: HttpClient,
    config: RpcConfig,
}

impl RpcProvider {
    pub fn new(config: RpcConfig) -> Result<Self, DashboardError> {
        let client = HttpClientBuilder::default()
            .request_timeout(config.request_timeout)
            .build(&config.url)
            .map_err(|e| DashboardError::rpc("connect", e))?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        args: Vec<Value>,
    ) -> Result<T, DashboardError> {
        let mut params = ArrayParams::new();
        for arg in args {
            params
                .insert(arg)
                .map_err(|e| DashboardError::rpc(method, e))?;
        }
        debug!(method, "rpc request");
        self.client
            .request(method, params)
            .await
            .map_err(|e| DashboardError::rpc(method, e))
    }

    /// Most recent blockhash and the last height at which it is valid.
    pub async fn latest_blockhash(&self) -> Result<LatestBlockhash, DashboardError> {
        let resp: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                vec![json!({ "commitment": DEFAULT_COMMITMENT })],
            )
            .await?;
        Ok(resp.value)
    }

    /// Current status of one signature, `None` if the node has not seen it.
    pub async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, DashboardError> {
        let resp: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                vec![json!([signature]), json!({ "searchTransactionHistory": false })],
            )
            .await?;
        Ok(resp.value.into_iter().next().flatten())
    }
}

#[async_trait]
impl WalletProvider for RpcProvider {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, DashboardError> {
        let resp: WithContext<u64> = self
            .call(
                "getBalance",
                vec![
                    json!(address.encode()),
                    json!({ "commitment": DEFAULT_COMMITMENT }),
                ],
            )
            .await?;
        Ok(resp.value)
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        let signature: String = self
            .call(
                "requestAirdrop",
                vec![
                    json!(address.encode()),
                    json!(lamports),
                    json!({ "commitment": DEFAULT_COMMITMENT }),
                ],
            )
            .await?;
        info!(%address, lamports, %signature, "airdrop requested");
        Ok(signature)
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
    ) -> Result<ConfirmationStatus, DashboardError> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        loop {
            let status = self.signature_status(signature).await?;
            if let Some(result) = classify_status(signature, status.as_ref()) {
                if let Err(e) = &result {
                    warn!(%signature, error = %e, "transaction failed on chain");
                }
                return result;
            }
            if Instant::now() >= deadline {
                return Err(DashboardError::ConfirmationTimeout(signature.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn submit_transfer(
        &self,
        from: &KeyPair,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        let latest = self.latest_blockhash().await?;
        let blockhash: Blockhash = latest.blockhash.parse()?;
        let tx = Transaction::signed_transfer(from, to, lamports, blockhash)?;
        let expected = tx.id()?;

        let signature: String = self
            .call(
                "sendTransaction",
                vec![
                    json!(tx.to_base58()),
                    json!({
                        "encoding": "base58",
                        "preflightCommitment": DEFAULT_COMMITMENT,
                    }),
                ],
            )
            .await?;
        if signature != expected {
            warn!(%signature, %expected, "node returned an unexpected signature");
        }
        info!(from = %from.pubkey(), %to, lamports, %signature, "transfer submitted");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_devnet() {
        let cfg = RpcConfig::default();
        assert_eq!(cfg.url, "https://api.devnet.solana.com");
        assert!(cfg.confirm_timeout > cfg.poll_interval);
    }

    #[test]
    fn with_url_keeps_timeouts() {
        let cfg = RpcConfig::with_url("http://127.0.0.1:8899");
        assert_eq!(cfg.url, "http://127.0.0.1:8899");
        assert_eq!(cfg.request_timeout, RpcConfig::default().request_timeout);
    }

    #[tokio::test]
    async fn provider_builds_for_http_url() {
        let provider = RpcProvider::new(RpcConfig::with_url("http://127.0.0.1:8899")).unwrap();
        assert_eq!(provider.url(), "http://127.0.0.1:8899");
    }

    #[tokio::test]
    async fn provider_rejects_bad_url() {
        let err = RpcProvider::new(RpcConfig::with_url("not a url")).err().unwrap();
        assert!(matches!(err, DashboardError::Rpc { method: "connect", .. }));
    }

    #[test]
    fn parse_balance_response() {
        let raw = json!({ "context": { "slot": 1 }, "value": 1_500_000_000u64 });
        let resp: WithContext<u64> = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.value, 1_500_000_000);
    }

    #[test]
    fn parse_latest_blockhash() {
        let raw = json!({
            "context": { "slot": 2792 },
            "value": {
                "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                "lastValidBlockHeight": 3090
            }
        });
        let resp: WithContext<LatestBlockhash> = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.value.last_valid_block_height, 3090);
        assert!(resp.value.blockhash.parse::<Blockhash>().is_ok());
    }

    #[test]
    fn parse_signature_statuses() {
        let raw = json!({
            "context": { "slot": 82 },
            "value": [
                { "slot": 72, "confirmations": 10, "err": null, "status": { "Ok": null },
                  "confirmationStatus": "confirmed" },
                null
            ]
        });
        let resp: WithContext<Vec<Option<SignatureStatus>>> = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.value.len(), 2);
        assert_eq!(
            resp.value[0].as_ref().unwrap().confirmation_status,
            Some(ConfirmationStatus::Confirmed)
        );
        assert!(resp.value[1].is_none());
    }

    #[test]
    fn classify_unknown_keeps_polling() {
        assert!(classify_status("sig", None).is_none());
    }

    #[test]
    fn classify_processed_keeps_polling() {
        let status = SignatureStatus {
            err: None,
            confirmation_status: Some(ConfirmationStatus::Processed),
        };
        assert!(classify_status("sig", Some(&status)).is_none());
    }

    #[test]
    fn classify_confirmed_and_finalized() {
        for s in [ConfirmationStatus::Confirmed, ConfirmationStatus::Finalized] {
            let status = SignatureStatus {
                err: None,
                confirmation_status: Some(s),
            };
            assert_eq!(classify_status("sig", Some(&status)).unwrap().unwrap(), s);
        }
    }

    #[test]
    fn classify_error_fails() {
        let status = SignatureStatus {
            err: Some(json!({ "InstructionError": [0, { "Custom": 1 }] })),
            confirmation_status: Some(ConfirmationStatus::Confirmed),
        };
        let err = classify_status("sig", Some(&status)).unwrap().unwrap_err();
        assert!(matches!(err, DashboardError::TransactionFailed { .. }));
        assert!(err.to_string().contains("InstructionError"));
    }

    mod stub {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};

        use axum::extract::State;
        use axum::routing::post;
        use axum::{Json, Router};

        use super::*;

        pub const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";

        /// A JSON-RPC node that answers status polls from a script.
        #[derive(Clone, Default)]
        pub struct Node {
            /// One status per poll; the last one repeats.
            pub statuses: Arc<Vec<Value>>,
            pub polls: Arc<AtomicUsize>,
            pub sent: Arc<Mutex<Vec<Value>>>,
        }

        impl Node {
            pub fn with_statuses(statuses: Vec<Value>) -> Self {
                Self {
                    statuses: Arc::new(statuses),
                    ..Self::default()
                }
            }

            pub fn polls(&self) -> usize {
                self.polls.load(Ordering::SeqCst)
            }

            /// Serve on an ephemeral port and return a provider pointed at it.
            pub async fn provider(&self) -> RpcProvider {
                let app = Router::new().route("/", post(handle)).with_state(self.clone());
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                let addr = listener.local_addr().unwrap();
                tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

                RpcProvider::new(RpcConfig {
                    url: format!("http://{addr}"),
                    request_timeout: Duration::from_secs(5),
                    confirm_timeout: Duration::from_millis(300),
                    poll_interval: Duration::from_millis(20),
                })
                .unwrap()
            }
        }

        async fn handle(State(node): State<Node>, Json(req): Json<Value>) -> Json<Value> {
            let id = req["id"].clone();
            let result = match req["method"].as_str().unwrap_or_default() {
                "getSignatureStatuses" => {
                    let n = node.polls.fetch_add(1, Ordering::SeqCst);
                    let status = node
                        .statuses
                        .get(n)
                        .or(node.statuses.last())
                        .cloned()
                        .unwrap_or(Value::Null);
                    json!({ "context": { "slot": n }, "value": [status] })
                }
                "getLatestBlockhash" => json!({
                    "context": { "slot": 1 },
                    "value": { "blockhash": BLOCKHASH, "lastValidBlockHeight": 100 }
                }),
                "sendTransaction" => {
                    let wire = bs58::decode(req["params"][0].as_str().unwrap())
                        .into_vec()
                        .unwrap();
                    node.sent.lock().unwrap().push(req["params"].clone());
                    json!(bs58::encode(&wire[1..65]).into_string())
                }
                other => {
                    return Json(json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32601, "message": format!("method not found: {other}") }
                    }));
                }
            };
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
        }
    }

    fn status(confirmation: &str) -> Value {
        json!({ "slot": 5, "confirmations": 0, "err": null, "confirmationStatus": confirmation })
    }

    #[tokio::test]
    async fn confirm_times_out_while_only_processed() {
        let node = stub::Node::with_statuses(vec![Value::Null, status("processed")]);
        let provider = node.provider().await;

        let err = provider.confirm_transaction("sig").await.unwrap_err();
        assert!(matches!(err, DashboardError::ConfirmationTimeout(ref s) if s == "sig"));
        assert!(node.polls() > 2);
    }

    #[tokio::test]
    async fn confirm_polls_until_confirmed() {
        let node = stub::Node::with_statuses(vec![
            Value::Null,
            status("processed"),
            status("confirmed"),
        ]);
        let provider = node.provider().await;

        let status = provider.confirm_transaction("sig").await.unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed);
        assert_eq!(node.polls(), 3);
    }

    #[tokio::test]
    async fn confirm_reports_on_chain_failure() {
        let node = stub::Node::with_statuses(vec![json!({
            "slot": 5,
            "err": { "InstructionError": [0, { "Custom": 1 }] },
            "confirmationStatus": "processed"
        })]);
        let provider = node.provider().await;

        let err = provider.confirm_transaction("sig").await.unwrap_err();
        assert!(matches!(err, DashboardError::TransactionFailed { .. }));
        assert_eq!(node.polls(), 1);
    }

    #[tokio::test]
    async fn submit_transfer_sends_signed_base58() {
        let node = stub::Node::default();
        let provider = node.provider().await;
        let from = KeyPair::from_seed(&[3u8; 32]);
        let to = Pubkey::new([9u8; 32]);

        let signature = provider.submit_transfer(&from, &to, 5_000).await.unwrap();

        let sent = node.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][1]["encoding"], "base58");
        assert_eq!(sent[0][1]["preflightCommitment"], "confirmed");

        let wire = bs58::decode(sent[0][0].as_str().unwrap()).into_vec().unwrap();
        assert_eq!(wire[0], 1);
        let sig: [u8; 64] = wire[1..65].try_into().unwrap();
        assert_eq!(signature, bs58::encode(sig).into_string());
        assert!(tuccoo_core::crypto::verify(&from.pubkey(), &wire[65..], &sig).is_ok());

        let blockhash = bs58::decode(stub::BLOCKHASH).into_vec().unwrap();
        assert!(wire.windows(32).any(|w| w == blockhash.as_slice()));
    }

    #[tokio::test]
    async fn rpc_error_names_the_method() {
        let node = stub::Node::default();
        let provider = node.provider().await;
        let err = provider.get_balance(&Pubkey::new([1u8; 32])).await.unwrap_err();
        assert!(matches!(err, DashboardError::Rpc { method: "getBalance", .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalCall);
    }
}
