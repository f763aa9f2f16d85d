use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerStats};
use crate::config::{GatewayConfig, IdentityConfig};
use crate::error::{GatewayError, Result};
use crate::traits::{LedgerEvent, LedgerGateway, SubmitResult};

#[derive(Clone, Debug)]
struct RetryConfig {
    max_retries: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
        }
    }
}

const STREAM_RECONNECT_BACKOFF_SECS: u64 = 5;

/// `reqwest`-based transport to the gateway peer, identified by mutual TLS.
/// One instance per configured identity (spec §4.1 invariant).
pub struct GatewayClient {
    identity: IdentityConfig,
    config: GatewayConfig,
    http: OnceCell<reqwest::Client>,
    retry: RetryConfig,
    breaker: Arc<CircuitBreaker>,
}

impl GatewayClient {
    pub fn new(identity: IdentityConfig, config: GatewayConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(
            config.circuit_failure_threshold,
            config.circuit_min_volume,
            Duration::from_secs(config.circuit_open_duration_secs),
        ));
        Self {
            identity,
            config,
            http: OnceCell::new(),
            retry: RetryConfig::default(),
            breaker,
        }
    }

    async fn build_client(&self) -> Result<reqwest::Client> {
        let cert = tokio::fs::read(&self.identity.signing_cert_path)
            .await
            .map_err(|e| GatewayError::Config(format!("reading signing cert: {e}")))?;
        let key = tokio::fs::read(&self.identity.signing_key_path)
            .await
            .map_err(|e| GatewayError::Config(format!("reading signing key: {e}")))?;
        let ca = tokio::fs::read(&self.identity.peer_tls_ca_path)
            .await
            .map_err(|e| GatewayError::Config(format!("reading peer CA: {e}")))?;

        let mut pem_bundle = cert;
        pem_bundle.extend_from_slice(b"\n");
        pem_bundle.extend_from_slice(&key);

        let identity = reqwest::Identity::from_pem(&pem_bundle)
            .map_err(|e| GatewayError::Config(format!("loading client identity: {e}")))?;
        let ca_cert = reqwest::Certificate::from_pem(&ca)
            .map_err(|e| GatewayError::Config(format!("loading peer CA: {e}")))?;

        let mut builder = reqwest::Client::builder()
            .identity(identity)
            .add_root_certificate(ca_cert)
            .timeout(Duration::from_secs(self.config.submit_timeout_secs))
            .tcp_keepalive(Duration::from_secs(self.config.keep_alive_secs));

        if let Some(sni) = &self.identity.tls_sni_override {
            builder = builder.resolve(sni, "127.0.0.1:0".parse().unwrap());
        }

        builder
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))
    }

    async fn client(&self) -> Result<&reqwest::Client> {
        self.http
            .get_or_try_init(|| self.build_client())
            .await
    }

    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut delay_ms = self.retry.initial_delay_ms;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if !e.is_retryable() || attempt >= self.retry.max_retries {
                        match e.log_level() {
                            tracing::Level::ERROR => {
                                tracing::error!("gateway request failed after {} attempts: {}", attempt, e)
                            }
                            tracing::Level::WARN => {
                                warn!("gateway request failed after {} attempts: {}", attempt, e)
                            }
                            _ => info!("gateway request failed after {} attempts: {}", attempt, e),
                        }
                        return Err(e);
                    }

                    debug!(
                        "gateway request failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, self.retry.max_retries, delay_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = ((delay_ms as f64) * self.retry.backoff_multiplier) as u64;
                    delay_ms = delay_ms.min(self.retry.max_delay_ms);
                }
            }
        }
    }
}

#[async_trait]
impl LedgerGateway for GatewayClient {
    async fn connect(&self) -> Result<()> {
        self.client().await?;
        info!(msp_id = %self.identity.msp_id, channel = %self.config.channel_name, "gateway channel ready");
        Ok(())
    }

    async fn submit(&self, contract: &str, function: &str, args: &[String]) -> Result<SubmitResult> {
        if !self.breaker.allow_request() {
            return Err(GatewayError::CircuitOpen);
        }

        let client = self.client().await?;
        let url = format!(
            "{}/channels/{}/chaincodes/{}/contracts/{}/submit",
            self.identity.peer_endpoint, self.config.channel_name, self.config.chaincode_name, contract
        );

        let result = self
            .retry_request(|| async {
                let resp = client
                    .post(&url)
                    .json(&serde_json::json!({ "function": function, "args": args }))
                    .send()
                    .await?;

                let status = resp.status();
                if !status.is_success() {
                    let message = resp.text().await.unwrap_or_default();
                    return Err(GatewayError::Chaincode { message });
                }

                let body: Value = resp.json().await?;
                let tx_id = body
                    .get("txId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let block_number = body.get("blockNumber").and_then(Value::as_i64).unwrap_or(0);
                let payload = body.get("payload").cloned().unwrap_or(Value::Null);

                Ok(SubmitResult {
                    tx_id,
                    block_number,
                    payload,
                })
            })
            .await;

        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(e) if matches!(e, GatewayError::CircuitOpen) => {}
            Err(_) => self.breaker.record_failure(),
        }

        result
    }

    async fn evaluate(&self, contract: &str, function: &str, args: &[String]) -> Result<Value> {
        let client = self.client().await?;
        let url = format!(
            "{}/channels/{}/chaincodes/{}/contracts/{}/evaluate",
            self.identity.peer_endpoint, self.config.channel_name, self.config.chaincode_name, contract
        );

        self.retry_request(|| async {
            let resp = client
                .post(&url)
                .json(&serde_json::json!({ "function": function, "args": args }))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(GatewayError::Chaincode { message });
            }
            Ok(resp.json().await?)
        })
        .await
    }

    fn stream_events(
        &self,
        start_block: i64,
    ) -> Pin<Box<dyn Stream<Item = Result<LedgerEvent>> + Send>> {
        let peer_endpoint = self.identity.peer_endpoint.clone();
        let channel_name = self.config.channel_name.clone();

        let state = StreamState {
            cursor: start_block,
            client: None,
            peer_endpoint,
            channel_name,
        };

        Box::pin(stream::unfold(state, |mut st| async move {
            loop {
                if st.client.is_none() {
                    st.client = reqwest::Client::builder().build().ok();
                }
                let Some(client) = st.client.clone() else {
                    tokio::time::sleep(Duration::from_secs(STREAM_RECONNECT_BACKOFF_SECS)).await;
                    continue;
                };

                let url = format!(
                    "{}/channels/{}/events?fromBlock={}",
                    st.peer_endpoint, st.channel_name, st.cursor
                );

                match client.get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => match resp.json::<Vec<EventWire>>().await {
                        Ok(events) if !events.is_empty() => {
                            let next_cursor = events.last().map(|e| e.block_number + 1).unwrap_or(st.cursor);
                            let batch: Vec<Result<LedgerEvent>> = events
                                .into_iter()
                                .map(|e| {
                                    Ok(LedgerEvent {
                                        block_number: e.block_number,
                                        tx_id: e.tx_id,
                                        event_name: e.event_name,
                                        payload: e.payload,
                                    })
                                })
                                .collect();
                            st.cursor = next_cursor;
                            return Some((stream::iter(batch), st));
                        }
                        Ok(_) => {
                            tokio::time::sleep(Duration::from_millis(500)).await;
                            continue;
                        }
                        Err(e) => {
                            warn!("event stream decode error, reconnecting: {}", e);
                            st.client = None;
                            tokio::time::sleep(Duration::from_secs(STREAM_RECONNECT_BACKOFF_SECS)).await;
                            continue;
                        }
                    },
                    Ok(resp) => {
                        warn!(status = %resp.status(), "event stream returned non-success, reconnecting");
                        tokio::time::sleep(Duration::from_secs(STREAM_RECONNECT_BACKOFF_SECS)).await;
                        continue;
                    }
                    Err(e) => {
                        warn!("event stream transport error, reconnecting from block {}: {}", st.cursor, e);
                        st.client = None;
                        tokio::time::sleep(Duration::from_secs(STREAM_RECONNECT_BACKOFF_SECS)).await;
                        continue;
                    }
                }
            }
        })
        .flatten())
    }

    fn circuit_breaker_stats(&self) -> CircuitBreakerStats {
        self.breaker.stats()
    }
}

#[derive(Clone)]
struct StreamState {
    cursor: i64,
    client: Option<reqwest::Client>,
    peer_endpoint: String,
    channel_name: String,
}

#[derive(serde::Deserialize)]
struct EventWire {
    block_number: i64,
    tx_id: String,
    event_name: String,
    payload: Value,
}

#[cfg(test)]
impl GatewayClient {
    /// Bypasses `build_client`'s mTLS file loading so tests can point the
    /// transport at a plain-HTTP `wiremock` server.
    fn new_for_test(config: GatewayConfig, http: reqwest::Client) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(
            config.circuit_failure_threshold,
            config.circuit_min_volume,
            Duration::from_secs(config.circuit_open_duration_secs),
        ));
        let client = Self {
            identity: IdentityConfig {
                peer_endpoint: String::new(),
                peer_tls_ca_path: String::new(),
                msp_id: "test-msp".to_string(),
                signing_cert_path: String::new(),
                signing_key_path: String::new(),
                tls_sni_override: None,
            },
            config,
            http: OnceCell::new(),
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                backoff_multiplier: 1.0,
            },
            breaker,
        };
        client.http.set(http).expect("fresh OnceCell");
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(peer_endpoint: String) -> (IdentityConfig, GatewayConfig) {
        (
            IdentityConfig {
                peer_endpoint,
                peer_tls_ca_path: String::new(),
                msp_id: "org1-admin".to_string(),
                signing_cert_path: String::new(),
                signing_key_path: String::new(),
                tls_sni_override: None,
            },
            GatewayConfig {
                channel_name: "ledgerflow-channel".to_string(),
                chaincode_name: "ledgerflow-cc".to_string(),
                keep_alive_secs: 30,
                submit_timeout_secs: 5,
                circuit_failure_threshold: 0.5,
                circuit_min_volume: 5,
                circuit_open_duration_secs: 30,
            },
        )
    }

    #[tokio::test]
    async fn submit_returns_tx_id_and_block_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/channels/ledgerflow-channel/chaincodes/ledgerflow-cc/contracts/Tokenomics/submit",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "txId": "tx-123",
                "blockNumber": 42,
                "payload": {"ok": true},
            })))
            .mount(&server)
            .await;

        let (_identity, config) = test_config(server.uri());
        let client = GatewayClient::new_for_test(config, reqwest::Client::new());

        let result = client
            .submit("Tokenomics", "TransferTokens", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(result.tx_id, "tx-123");
        assert_eq!(result.block_number, 42);
        assert_eq!(client.circuit_breaker_stats().successes, 1);
    }

    #[tokio::test]
    async fn submit_failure_records_circuit_breaker_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("chaincode panic"))
            .mount(&server)
            .await;

        let (_identity, config) = test_config(server.uri());
        let client = GatewayClient::new_for_test(config, reqwest::Client::new());

        let err = client
            .submit("Tokenomics", "TransferTokens", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Chaincode { .. }));
        assert_eq!(client.circuit_breaker_stats().failures, 1);
    }

    #[tokio::test]
    async fn circuit_open_rejects_submit_without_a_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (_identity, config) = test_config(server.uri());
        let client = GatewayClient::new_for_test(config, reqwest::Client::new());

        for _ in 0..5 {
            let _ = client.submit("Tokenomics", "TransferTokens", &[]).await;
        }
        assert!(matches!(
            client.submit("Tokenomics", "TransferTokens", &[]).await,
            Err(GatewayError::CircuitOpen)
        ));
    }

    #[tokio::test]
    async fn evaluate_is_not_gated_by_the_breaker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/channels/ledgerflow-channel/chaincodes/ledgerflow-cc/contracts/Identity/evaluate",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"balance": "100"})))
            .mount(&server)
            .await;

        let (_identity, config) = test_config(server.uri());
        let client = GatewayClient::new_for_test(config, reqwest::Client::new());

        let value = client.evaluate("Identity", "GetBalance", &["acct-1".to_string()]).await.unwrap();
        assert_eq!(value["balance"], "100");
        assert_eq!(client.circuit_breaker_stats().successes, 0);
    }
}
