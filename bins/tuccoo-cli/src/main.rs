//! tuccoo-cli: Command-line wallet for the Solana devnet.
//!
//! Generates recovery phrases, derives `m/44'/501'/{n}'/0'` wallets, and
//! queries balances, requests airdrops and sends SOL through a JSON-RPC node.
//! Phrases are read without echo and never written to disk.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use tuccoo_client::{ConnectedWallet, Dashboard, RpcConfig, RpcProvider};
use tuccoo_core::address::Pubkey;
use tuccoo_core::amount::{format_sol, parse_sol};
use tuccoo_core::constants::DEFAULT_RPC_URL;
use tuccoo_wallet::{DerivationSession, Phrase, derive_wallet};

/// TUCCOO command-line wallet.
#[derive(Parser, Debug)]
#[command(name = "tuccoo-cli")]
#[command(version, about = "Solana devnet airdrop, transfer and HD wallet derivation.")]
struct Cli {
    /// Solana JSON-RPC endpoint URL.
    #[arg(long, global = true, env = "TUCCOO_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recovery phrase subcommands.
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
    /// Query the balance of an address.
    Balance(BalanceArgs),
    /// Request a devnet airdrop to an address.
    Airdrop(AirdropArgs),
    /// Send SOL from a derived wallet.
    Send(SendArgs),
}

#[derive(Subcommand, Debug)]
enum SeedAction {
    /// Generate a new 12-word phrase and derive its first wallets.
    Generate(CountArgs),
    /// Derive wallets from an existing phrase.
    Derive(CountArgs),
}

#[derive(Args, Debug)]
struct CountArgs {
    /// Number of wallets to derive, starting at account 0.
    #[arg(short, long, default_value_t = 1)]
    count: u32,
}

#[derive(Args, Debug)]
struct BalanceArgs {
    /// Base58 address.
    address: String,
}

#[derive(Args, Debug)]
struct AirdropArgs {
    /// Base58 address to fund.
    address: String,

    /// Amount in SOL.
    #[arg(long, default_value = "1")]
    sol: String,
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount to send in SOL (e.g., 0.25).
    #[arg(short, long)]
    amount: String,

    /// Account index of the sending wallet.
    #[arg(long, default_value_t = 0)]
    account: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!(rpc = %cli.rpc_url, "tuccoo-cli starting");

    match cli.command {
        Commands::Seed { action } => match action {
            SeedAction::Generate(args) => seed_generate(args),
            SeedAction::Derive(args) => seed_derive(args),
        },
        Commands::Balance(args) => balance(&cli.rpc_url, args).await,
        Commands::Airdrop(args) => airdrop(&cli.rpc_url, args).await,
        Commands::Send(args) => send(&cli.rpc_url, args).await,
    }
}

/// Generate a phrase, show it once, and derive the first wallets.
fn seed_generate(args: CountArgs) -> Result<()> {
    let mut session = DerivationSession::new();
    let phrase = session
        .generate_phrase()
        .context("Failed to generate seed phrase")?;

    println!("\n=== SEED PHRASE GENERATED ===");
    println!("\nRECOVERY PHRASE (BACK THIS UP, 12 WORDS):");
    println!("  {}", phrase.reveal());
    println!("\nWARNING: This phrase is not stored anywhere and will NOT be shown again.");
    println!("Anyone with this phrase can spend from every derived wallet.\n");

    print_derived(&mut session, args.count)
}

/// Derive wallets from a phrase entered at the prompt.
fn seed_derive(args: CountArgs) -> Result<()> {
    let phrase = read_phrase()?;
    let mut session = DerivationSession::with_phrase(phrase);
    print_derived(&mut session, args.count)
}

fn print_derived(session: &mut DerivationSession, count: u32) -> Result<()> {
    for _ in 0..count {
        session
            .derive_next_wallet()
            .context("Failed to derive wallet")?;
    }
    for wallet in session.wallets() {
        println!("#{:<3} {:<20} {}", wallet.index, wallet.path.to_string(), wallet.pubkey());
    }
    Ok(())
}

/// Show the balance of an address.
async fn balance(rpc_url: &str, args: BalanceArgs) -> Result<()> {
    let wallet = ConnectedWallet::watch(parse_address(&args.address)?);
    let dashboard = Dashboard::new(provider(rpc_url)?);

    let lamports = dashboard
        .refresh_balance(Some(&wallet))
        .await
        .context("Failed to fetch balance")?;

    println!("Address: {}", wallet.address());
    println!("Balance: {} SOL ({} lamports)", format_sol(lamports), lamports);
    Ok(())
}

/// Request an airdrop and wait for it to confirm.
async fn airdrop(rpc_url: &str, args: AirdropArgs) -> Result<()> {
    let wallet = ConnectedWallet::watch(parse_address(&args.address)?);
    let lamports = parse_sol(&args.sol).context("Invalid airdrop amount")?;
    let dashboard = Dashboard::new(provider(rpc_url)?).with_airdrop_lamports(lamports);

    println!("Requesting {} SOL for {}...", format_sol(lamports), wallet.address().short());
    let receipt = dashboard
        .request_airdrop(Some(&wallet))
        .await
        .context("Airdrop failed")?;

    println!("\n=== AIRDROP CONFIRMED ===");
    println!("Signature: {}", receipt.signature);
    println!("Balance: {} SOL", format_sol(receipt.balance));
    Ok(())
}

/// Derive the sending wallet from a prompted phrase and transfer SOL.
async fn send(rpc_url: &str, args: SendArgs) -> Result<()> {
    // Reject malformed input before prompting for the phrase.
    tuccoo_client::validate_transfer(&args.to, &args.amount)?;

    let phrase = read_phrase()?;
    let derived = derive_wallet(&phrase, args.account)
        .with_context(|| format!("Failed to derive account {}", args.account))?;
    let wallet = ConnectedWallet::derived(derived.index, derived.keypair);

    let dashboard = Dashboard::new(provider(rpc_url)?);
    let receipt = dashboard
        .send_transfer(Some(&wallet), &args.to, &args.amount)
        .await
        .context("Transaction failed")?;

    println!("\n=== TRANSACTION CONFIRMED ===");
    println!("Signature: {}", receipt.signature);
    println!("From: {} (account {})", receipt.from, args.account);
    println!("To: {}", receipt.to);
    println!("Amount: {} SOL ({} lamports)", format_sol(receipt.lamports), receipt.lamports);
    Ok(())
}

fn provider(rpc_url: &str) -> Result<RpcProvider> {
    RpcProvider::new(RpcConfig::with_url(rpc_url))
        .with_context(|| format!("Failed to create RPC client for {rpc_url}"))
}

fn parse_address(s: &str) -> Result<Pubkey> {
    Pubkey::decode(s).with_context(|| format!("Invalid address: {s}"))
}

/// Read a recovery phrase from the terminal without echo.
fn read_phrase() -> Result<Phrase> {
    let input = rpassword::prompt_password("Enter recovery phrase: ")
        .context("Failed to read recovery phrase")?;
    if input.trim().is_empty() {
        bail!("Recovery phrase is required");
    }
    Phrase::parse(&input).context("Invalid recovery phrase")
}
