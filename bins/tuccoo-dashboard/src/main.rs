//! tuccoo-dashboard: Solana devnet wallet dashboard.
//!
//! Serves a three-tab web UI at `/` (Airdrop, Send SOL, Generate) and the
//! JSON API it drives under `/api`. Recovery phrases and derived keys live
//! only in this process's memory.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

mod config;
mod routes;

use config::Config;
use tuccoo_client::{ConnectedWallet, Dashboard, RpcProvider, WalletProvider};
use tuccoo_wallet::SharedSession;

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Airdrop, balance and transfer actions.
    pub dashboard: Arc<Dashboard<Arc<dyn WalletProvider>>>,
    /// Recovery phrase and derived wallets.
    pub session: SharedSession,
    /// The wallet the Airdrop and Send tabs act for.
    pub wallet: Arc<Mutex<Option<ConnectedWallet>>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WalletProvider>, config: Config) -> Self {
        let dashboard = Dashboard::new(provider).with_airdrop_lamports(config.airdrop_lamports);
        Self {
            dashboard: Arc::new(dashboard),
            session: SharedSession::default(),
            wallet: Arc::new(Mutex::new(None)),
            config: Arc::new(config),
        }
    }

    /// Snapshot of the connected wallet, released before any network call.
    pub async fn connected(&self) -> Option<ConnectedWallet> {
        self.wallet.lock().await.clone()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load dashboard configuration")?;

    info!(
        rpc = %config.rpc_url,
        bind = %config.bind_addr,
        airdrop_sol = %config.airdrop_sol(),
        confirm_timeout_secs = config.confirm_timeout_secs,
        "Starting tuccoo-dashboard"
    );

    let provider = RpcProvider::new(config.rpc_config())
        .with_context(|| format!("Failed to create RPC client for {}", config.rpc_url))?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(Arc::new(provider), config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    info!("Listening on http://{bind_addr}");

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
