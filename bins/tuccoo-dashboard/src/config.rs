//! Dashboard configuration loaded from environment variables.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tuccoo_client::RpcConfig;
use tuccoo_core::amount::{format_sol, parse_sol};
use tuccoo_core::constants::DEFAULT_RPC_URL;

#[derive(Clone, Debug)]
pub struct Config {
    /// Solana JSON-RPC endpoint.
    pub rpc_url: String,
    /// Address to bind the HTTP server.
    pub bind_addr: String,
    /// Amount requested per airdrop, in lamports.
    pub airdrop_lamports: u64,
    /// How long to wait for a signature to reach `confirmed`.
    pub confirm_timeout_secs: u64,
    /// Browser origins allowed to call the API. Always includes the UI's own.
    pub allowed_origins: Vec<HeaderValue>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = lookup("TUCCOO_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let bind_addr = lookup("TUCCOO_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        let airdrop_sol = lookup("TUCCOO_AIRDROP_SOL").unwrap_or_else(|| "1".to_string());
        let airdrop_lamports = parse_sol(&airdrop_sol)
            .context("TUCCOO_AIRDROP_SOL must be a positive SOL amount")?;

        let confirm_timeout_secs: u64 = lookup("TUCCOO_CONFIRM_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse()
            .context("TUCCOO_CONFIRM_TIMEOUT_SECS must be a positive integer")?;
        anyhow::ensure!(
            confirm_timeout_secs > 0,
            "TUCCOO_CONFIRM_TIMEOUT_SECS must be a positive integer"
        );

        let mut origins = default_origins(&bind_addr);
        if let Some(extra) = lookup("TUCCOO_ALLOWED_ORIGINS") {
            origins.extend(
                extra
                    .split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty()),
            );
        }
        let mut allowed_origins = Vec::with_capacity(origins.len());
        for origin in origins {
            anyhow::ensure!(origin != "*", "TUCCOO_ALLOWED_ORIGINS must list explicit origins");
            let value = HeaderValue::from_str(&origin)
                .with_context(|| format!("Invalid origin in TUCCOO_ALLOWED_ORIGINS: {origin}"))?;
            if !allowed_origins.contains(&value) {
                allowed_origins.push(value);
            }
        }

        Ok(Config {
            rpc_url,
            bind_addr,
            airdrop_lamports,
            confirm_timeout_secs,
            allowed_origins,
        })
    }

    /// Whether a browser `Origin` header names an allowed origin.
    pub fn allows_origin(&self, origin: &HeaderValue) -> bool {
        self.allowed_origins.contains(origin)
    }

    /// Airdrop size in SOL (for display).
    pub fn airdrop_sol(&self) -> String {
        format_sol(self.airdrop_lamports)
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            confirm_timeout: Duration::from_secs(self.confirm_timeout_secs),
            ..RpcConfig::with_url(self.rpc_url.clone())
        }
    }
}

/// Origins the embedded UI is served from for a given bind address.
fn default_origins(bind_addr: &str) -> Vec<String> {
    let mut origins = vec![format!("http://{bind_addr}")];
    if let Some(port) = bind_addr.strip_prefix("127.0.0.1:") {
        origins.push(format!("http://localhost:{port}"));
    } else if let Some(port) = bind_addr.strip_prefix("localhost:") {
        origins.push(format!("http://127.0.0.1:{port}"));
    }
    origins
}
