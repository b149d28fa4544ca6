//! Axum router and HTTP handlers.
//!
//! Every response body carries a `notice`: the short text the UI shows as
//! a transient notification. Failures leave server state unchanged.

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use tuccoo_client::{ConnectedWallet, DashboardError, ErrorKind};
use tuccoo_core::address::Pubkey;
use tuccoo_core::amount::format_sol;
use tuccoo_core::error::ValidationError;
use tuccoo_wallet::WalletError;

use crate::AppState;

// Embed the web UI at compile time.
const INDEX_HTML: &str = include_str!("static/index.html");

type ApiResponse = (StatusCode, Json<Value>);

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// The UI and API. Browsers may only call the API from the configured
/// origins: other origins get no CORS grant and are refused outright.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(web_ui))
        .route("/api/wallet", get(api_wallet))
        .route("/api/wallet/connect", post(api_connect))
        .route("/api/wallet/disconnect", post(api_disconnect))
        .route("/api/balance", get(api_balance))
        .route("/api/airdrop", post(api_airdrop))
        .route("/api/send", post(api_send))
        .route("/api/seed", get(api_seed))
        .route("/api/seed/generate", post(api_seed_generate))
        .route("/api/seed/derive", post(api_seed_derive))
        .layer(middleware::from_fn_with_state(state.clone(), reject_foreign_origin))
        .layer(cors)
        .with_state(state)
}

/// Refuse requests whose `Origin` is not one of ours. Same-origin page loads
/// and non-browser clients send no `Origin` and pass through.
async fn reject_foreign_origin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match req.headers().get(header::ORIGIN) {
        Some(origin) if !state.config.allows_origin(origin) => {
            warn!(?origin, method = %req.method(), path = %req.uri().path(), "Rejected cross-origin request");
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "cross-origin request rejected", "notice": "Forbidden" })),
            )
                .into_response()
        }
        _ => next.run(req).await,
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Precondition => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::ExternalCall => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: &DashboardError, notice: &str) -> ApiResponse {
    (
        status_for(err.kind()),
        Json(json!({ "error": err.to_string(), "notice": notice })),
    )
}

fn wallet_json(wallet: Option<&ConnectedWallet>) -> Value {
    match wallet {
        Some(w) => json!({
            "connected": true,
            "address": w.address(),
            "short": w.address().short(),
            "account": w.account(),
            "can_sign": w.can_sign(),
        }),
        None => json!({ "connected": false }),
    }
}

// ---------------------------------------------------------------------------
// Wallet connection
// ---------------------------------------------------------------------------

/// Serve the embedded web UI.
async fn web_ui() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /api/wallet`: the connected wallet, if any.
async fn api_wallet(State(state): State<AppState>) -> ApiResponse {
    let wallet = state.connected().await;
    (StatusCode::OK, Json(wallet_json(wallet.as_ref())))
}

#[derive(Deserialize)]
struct ConnectRequest {
    /// Watch an arbitrary address.
    #[serde(default)]
    address: Option<String>,
    /// Connect a wallet derived in this session.
    #[serde(default)]
    account: Option<u32>,
}

/// `POST /api/wallet/connect`: connect a derived account or watch an address.
async fn api_connect(State(state): State<AppState>, Json(req): Json<ConnectRequest>) -> ApiResponse {
    let wallet = if let Some(account) = req.account {
        match state.session.keypair(account).await {
            Some(keypair) => ConnectedWallet::derived(account, keypair),
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("no wallet derived at account {account}"),
                        "notice": "Derive a wallet first",
                    })),
                );
            }
        }
    } else {
        let address = req.address.unwrap_or_default();
        if address.trim().is_empty() {
            let err = DashboardError::from(ValidationError::MissingField("address"));
            return error_response(&err, "Enter an address");
        }
        match Pubkey::decode(&address) {
            Ok(pk) => ConnectedWallet::watch(pk),
            Err(e) => {
                let err = DashboardError::from(ValidationError::InvalidAddress(e));
                return error_response(&err, "Invalid address");
            }
        }
    };

    info!(address = %wallet.address(), account = ?wallet.account(), "Wallet connected");
    let mut body = wallet_json(Some(&wallet));
    body["notice"] = json!("Wallet connected");
    *state.wallet.lock().await = Some(wallet);
    (StatusCode::OK, Json(body))
}

/// `POST /api/wallet/disconnect`
async fn api_disconnect(State(state): State<AppState>) -> ApiResponse {
    *state.wallet.lock().await = None;
    (
        StatusCode::OK,
        Json(json!({ "connected": false, "notice": "Wallet disconnected" })),
    )
}

// ---------------------------------------------------------------------------
// Airdrop tab
// ---------------------------------------------------------------------------

/// `GET /api/balance`: refresh the connected wallet's balance.
async fn api_balance(State(state): State<AppState>) -> ApiResponse {
    let wallet = state.connected().await;
    match state.dashboard.refresh_balance(wallet.as_ref()).await {
        Ok(lamports) => (
            StatusCode::OK,
            Json(json!({
                "address": wallet.as_ref().map(ConnectedWallet::address),
                "lamports": lamports,
                "sol": format_sol(lamports),
                "notice": "Balance Updated",
            })),
        ),
        Err(e @ DashboardError::NotConnected) => error_response(&e, "Wallet not connected yet"),
        Err(e) => {
            warn!(error = %e, "Balance refresh failed");
            error_response(&e, "Refresh Failed")
        }
    }
}

/// `POST /api/airdrop`: request the configured airdrop.
async fn api_airdrop(State(state): State<AppState>) -> ApiResponse {
    let wallet = state.connected().await;
    match state.dashboard.request_airdrop(wallet.as_ref()).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({
                "signature": receipt.signature,
                "address": receipt.address,
                "lamports": receipt.lamports,
                "balance": receipt.balance,
                "sol": format_sol(receipt.balance),
                "notice": "Airdrop Successful",
            })),
        ),
        Err(e @ DashboardError::NotConnected) => error_response(&e, "Wallet not connected yet"),
        Err(e) => error_response(&e, "Airdrop Failed"),
    }
}

// ---------------------------------------------------------------------------
// Send tab
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SendRequest {
    #[serde(default)]
    to: String,
    /// Decimal SOL, e.g. `"0.25"`.
    #[serde(default)]
    amount: String,
}

/// `POST /api/send`: sign and submit a transfer from the connected wallet.
async fn api_send(State(state): State<AppState>, Json(req): Json<SendRequest>) -> ApiResponse {
    let wallet = state.connected().await;
    match state
        .dashboard
        .send_transfer(wallet.as_ref(), &req.to, &req.amount)
        .await
    {
        Ok(receipt) => {
            let notice = format!("Sent! Tx Sig: {}", receipt.signature);
            (
                StatusCode::OK,
                Json(json!({
                    "signature": receipt.signature,
                    "from": receipt.from,
                    "to": receipt.to,
                    "lamports": receipt.lamports,
                    "status": receipt.status,
                    "notice": notice,
                })),
            )
        }
        Err(e @ DashboardError::NotConnected) => error_response(&e, "Wallet not connected"),
        Err(e @ DashboardError::WatchOnly(_)) => {
            error_response(&e, "Connect a derived wallet to send")
        }
        Err(e @ DashboardError::Validation(ValidationError::MissingField(_))) => {
            error_response(&e, "Fill all fields")
        }
        Err(e @ DashboardError::Validation(_)) => {
            let notice = e.to_string();
            error_response(&e, &notice)
        }
        Err(e) => error_response(&e, "Transaction failed"),
    }
}

// ---------------------------------------------------------------------------
// Generate tab
// ---------------------------------------------------------------------------

/// `GET /api/seed`: current phrase and derived wallets.
async fn api_seed(State(state): State<AppState>) -> ApiResponse {
    let (snapshot, phrase) = state.session.view().await;
    (
        StatusCode::OK,
        Json(json!({
            "has_phrase": snapshot.has_phrase,
            "phrase": phrase.as_ref().map(|p| p.reveal()),
            "next_index": snapshot.next_index,
            "derived_keys": snapshot.derived_keys,
        })),
    )
}

/// `POST /api/seed/generate`: replace the phrase and clear derived wallets.
async fn api_seed_generate(State(state): State<AppState>) -> ApiResponse {
    match state.session.generate_phrase().await {
        Ok(phrase) => {
            info!("Seed phrase regenerated");
            (
                StatusCode::OK,
                Json(json!({
                    "has_phrase": true,
                    "phrase": phrase.reveal(),
                    "next_index": 0,
                    "derived_keys": Vec::<Pubkey>::new(),
                    "notice": "Seed phrase generated",
                })),
            )
        }
        Err(e) => error_response(&DashboardError::from(e), "Failed to generate seed phrase"),
    }
}

/// `POST /api/seed/derive`: derive the next wallet from the phrase.
async fn api_seed_derive(State(state): State<AppState>) -> ApiResponse {
    let (derived, snapshot) = match state.session.derive_next().await {
        Ok(result) => result,
        Err(WalletError::NoPhrase) => {
            let err = DashboardError::from(WalletError::NoPhrase);
            return error_response(&err, "Generate a seed phrase first");
        }
        Err(e) => {
            warn!(error = %e, "Derivation failed");
            return error_response(&DashboardError::from(e), "Failed to derive wallet");
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "pubkey": derived.pubkey,
            "index": derived.index,
            "path": derived.path,
            "next_index": snapshot.next_index,
            "derived_keys": snapshot.derived_keys,
            "notice": "Wallet derived",
        })),
    )
}
