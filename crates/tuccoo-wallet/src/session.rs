//! The wallet derivation session.
//!
//! A session holds an optional recovery phrase, the next account index and
//! the wallets derived so far. Regenerating the phrase resets the index and
//! the wallet list; deriving appends exactly one wallet and advances the
//! index by exactly one, both in the same commit, so
//! `derived_keys().len() == next_index()` holds between operations.
//!
//! Observers register with [`DerivationSession::subscribe`] and receive a
//! [`SessionEvent`] for every state change. Events never carry the phrase.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use tuccoo_core::address::Pubkey;
use tuccoo_core::crypto::KeyPair;

use crate::derivation::{DerivationPath, DerivedWallet, derive_wallet};
use crate::error::WalletError;
use crate::mnemonic::Phrase;

/// Buffered events per observer before slow observers start lagging.
const EVENT_CAPACITY: usize = 64;

/// A change to session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new phrase replaced the old one; the wallet list is now empty.
    PhraseGenerated,
    /// A wallet was appended.
    WalletDerived {
        index: u32,
        path: String,
        pubkey: Pubkey,
    },
}

/// Public view of a session, safe to log or serialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub has_phrase: bool,
    pub next_index: u32,
    pub derived_keys: Vec<Pubkey>,
}

/// The wallet a derivation appended, as seen at commit time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DerivedKey {
    pub index: u32,
    pub path: DerivationPath,
    pub pubkey: Pubkey,
}

/// In-memory derivation state for one user session.
pub struct DerivationSession {
    phrase: Option<Phrase>,
    next_index: u32,
    wallets: Vec<DerivedWallet>,
    events: broadcast::Sender<SessionEvent>,
}

impl DerivationSession {
    /// An empty session: no phrase, nothing derived.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            phrase: None,
            next_index: 0,
            wallets: Vec::new(),
            events,
        }
    }

    /// A session that starts from an existing phrase, with nothing derived.
    pub fn with_phrase(phrase: Phrase) -> Self {
        let mut session = Self::new();
        session.phrase = Some(phrase);
        session
    }

    /// Register an observer for state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Replace the phrase with a fresh 12-word one and reset derivation.
    ///
    /// On failure the previous state is left untouched.
    pub fn generate_phrase(&mut self) -> Result<&Phrase, WalletError> {
        let phrase = Phrase::generate()?;
        self.next_index = 0;
        self.wallets.clear();
        debug!("recovery phrase generated");
        self.notify(SessionEvent::PhraseGenerated);
        Ok(self.phrase.insert(phrase))
    }

    /// Derive the wallet at the next account index and append it.
    ///
    /// Fails with [`WalletError::NoPhrase`] if no phrase exists. Nothing is
    /// appended and the index does not move unless derivation succeeds.
    pub fn derive_next_wallet(&mut self) -> Result<Pubkey, WalletError> {
        let (phrase, index) = self.pending()?;
        let wallet = derive_wallet(&phrase, index)?;
        Ok(self.commit(wallet).pubkey)
    }

    /// Phrase and index for the next derivation.
    fn pending(&self) -> Result<(Phrase, u32), WalletError> {
        let phrase = self.phrase.clone().ok_or(WalletError::NoPhrase)?;
        Ok((phrase, self.next_index))
    }

    /// Append `wallet` and advance the index together.
    fn commit(&mut self, wallet: DerivedWallet) -> DerivedKey {
        debug_assert_eq!(wallet.index, self.next_index);
        let key = DerivedKey {
            index: wallet.index,
            path: wallet.path.clone(),
            pubkey: wallet.pubkey(),
        };
        info!(index = key.index, path = %key.path, pubkey = %key.pubkey, "wallet derived");
        self.wallets.push(wallet);
        self.next_index += 1;
        self.notify(SessionEvent::WalletDerived {
            index: key.index,
            path: key.path.to_string(),
            pubkey: key.pubkey,
        });
        key
    }

    fn notify(&self, event: SessionEvent) {
        // No observers is not an error.
        let _ = self.events.send(event);
    }

    pub fn has_phrase(&self) -> bool {
        self.phrase.is_some()
    }

    /// The current phrase, for display or copy. Handle with care.
    pub fn phrase(&self) -> Option<&Phrase> {
        self.phrase.as_ref()
    }

    /// The next account index that will be derived.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Public identifiers of every derived wallet, in derivation order.
    pub fn derived_keys(&self) -> Vec<Pubkey> {
        self.wallets.iter().map(DerivedWallet::pubkey).collect()
    }

    /// Paths used so far, in derivation order.
    pub fn derivation_paths(&self) -> Vec<DerivationPath> {
        self.wallets.iter().map(|w| w.path.clone()).collect()
    }

    pub fn wallets(&self) -> &[DerivedWallet] {
        &self.wallets
    }

    /// Signing keypair of the wallet derived at `index`.
    pub fn keypair(&self, index: u32) -> Option<&KeyPair> {
        self.wallets.get(index as usize).map(|w| &w.keypair)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_phrase: self.has_phrase(),
            next_index: self.next_index,
            derived_keys: self.derived_keys(),
        }
    }
}

impl Default for DerivationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DerivationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivationSession")
            .field("has_phrase", &self.has_phrase())
            .field("next_index", &self.next_index)
            .field("derived", &self.wallets.len())
            .finish()
    }
}

/// A session shared between concurrent tasks.
///
/// Derivations are serialized: while one is running, a second
/// `derive_next_wallet` is rejected with [`WalletError::DerivationInFlight`]
/// rather than queued, so two requests can never observe the same index.
/// Seed expansion runs on the blocking pool with the session locked.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<DerivationSession>>,
    deriving: Arc<Mutex<()>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SharedSession {
    pub fn new(session: DerivationSession) -> Self {
        let events = session.events.clone();
        Self {
            inner: Arc::new(Mutex::new(session)),
            deriving: Arc::new(Mutex::new(())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Generate a new phrase. Waits for an in-flight derivation to finish.
    pub async fn generate_phrase(&self) -> Result<Phrase, WalletError> {
        let mut session = self.inner.lock().await;
        session.generate_phrase().cloned()
    }

    /// Derive and append the next wallet, rejecting concurrent calls.
    pub async fn derive_next_wallet(&self) -> Result<Pubkey, WalletError> {
        self.derive_next().await.map(|(key, _)| key.pubkey)
    }

    /// Like [`derive_next_wallet`](Self::derive_next_wallet), also returning
    /// the appended wallet and the session state right after the commit.
    pub async fn derive_next(&self) -> Result<(DerivedKey, SessionSnapshot), WalletError> {
        let _in_flight = self
            .deriving
            .try_lock()
            .map_err(|_| WalletError::DerivationInFlight)?;
        let mut session = self.inner.lock().await;
        let (phrase, index) = session.pending()?;
        let wallet = tokio::task::spawn_blocking(move || derive_wallet(&phrase, index))
            .await
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))??;
        let key = session.commit(wallet);
        Ok((key, session.snapshot()))
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Snapshot and phrase read together. Handle the phrase with care.
    pub async fn view(&self) -> (SessionSnapshot, Option<Phrase>) {
        let session = self.inner.lock().await;
        (session.snapshot(), session.phrase().cloned())
    }

    /// Clone of the signing keypair derived at `index`.
    pub async fn keypair(&self, index: u32) -> Option<KeyPair> {
        self.inner.lock().await.keypair(index).cloned()
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new(DerivationSession::new())
    }
}
