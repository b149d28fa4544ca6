//! Derivation session scenarios.
//!
//! Covers the session invariants end to end: the index/list pairing,
//! reset on regeneration, determinism across sessions, the missing-phrase
//! precondition, and concurrent derivation through `SharedSession`.

use proptest::prelude::*;
use tuccoo_client::{DashboardError, ErrorKind};
use tuccoo_tests::helpers::{ZERO_PHRASE, phrase};
use tuccoo_wallet::{DerivationSession, Phrase, SessionEvent, SharedSession, WalletError};

// ---------------------------------------------------------------------------
// Single-owner session
// ---------------------------------------------------------------------------

#[test]
fn derive_returns_the_appended_key() {
    let mut session = DerivationSession::with_phrase(phrase(7));
    for expected_len in 1..=3u32 {
        let before = session.next_index();
        let pk = session.derive_next_wallet().unwrap();
        assert_eq!(session.next_index(), before + 1);
        assert_eq!(session.derived_keys().last(), Some(&pk));
        assert_eq!(session.derived_keys().len() as u32, expected_len);
    }
}

#[test]
fn generate_then_derive_three() {
    let mut session = DerivationSession::new();
    let words = session.generate_phrase().unwrap().word_count();
    assert_eq!(words, 12);

    for _ in 0..3 {
        session.derive_next_wallet().unwrap();
    }
    assert_eq!(session.derived_keys().len(), 3);
    let paths: Vec<String> = session
        .derivation_paths()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        paths,
        ["m/44'/501'/0'/0'", "m/44'/501'/1'/0'", "m/44'/501'/2'/0'"]
    );
}

#[test]
fn regenerate_always_resets() {
    let mut session = DerivationSession::with_phrase(phrase(1));
    session.derive_next_wallet().unwrap();
    session.derive_next_wallet().unwrap();

    session.generate_phrase().unwrap();
    assert_eq!(session.next_index(), 0);
    assert!(session.derived_keys().is_empty());

    // Regenerating an already empty session is also a clean reset.
    session.generate_phrase().unwrap();
    assert_eq!(session.next_index(), 0);
    assert!(session.derived_keys().is_empty());
}

#[test]
fn same_phrase_same_wallets() {
    let mut a = DerivationSession::with_phrase(Phrase::parse(ZERO_PHRASE).unwrap());
    let mut b = DerivationSession::with_phrase(Phrase::parse(ZERO_PHRASE).unwrap());
    for _ in 0..3 {
        a.derive_next_wallet().unwrap();
        b.derive_next_wallet().unwrap();
    }
    assert_eq!(a.derived_keys(), b.derived_keys());

    let keys = a.derived_keys();
    assert_ne!(keys[0], keys[1]);
    assert_ne!(keys[1], keys[2]);
}

#[test]
fn different_phrases_diverge() {
    let mut a = DerivationSession::with_phrase(phrase(1));
    let mut b = DerivationSession::with_phrase(phrase(2));
    assert_ne!(
        a.derive_next_wallet().unwrap(),
        b.derive_next_wallet().unwrap()
    );
}

#[test]
fn derive_before_generate_is_a_precondition_error() {
    let mut session = DerivationSession::new();
    let err = session.derive_next_wallet().unwrap_err();
    assert_eq!(err, WalletError::NoPhrase);
    assert_eq!(DashboardError::from(err).kind(), ErrorKind::Precondition);
    assert_eq!(session.next_index(), 0);
    assert!(session.derived_keys().is_empty());
}

#[test]
fn keypairs_follow_derived_keys() {
    let mut session = DerivationSession::with_phrase(phrase(3));
    session.derive_next_wallet().unwrap();
    session.derive_next_wallet().unwrap();
    for (i, pk) in session.derived_keys().iter().enumerate() {
        assert_eq!(session.keypair(i as u32).unwrap().pubkey(), *pk);
    }
}

#[test]
fn observer_sees_every_change_in_order() {
    let mut session = DerivationSession::new();
    let mut rx = session.subscribe();

    session.generate_phrase().unwrap();
    let first = session.derive_next_wallet().unwrap();
    session.generate_phrase().unwrap();

    assert_eq!(rx.try_recv().unwrap(), SessionEvent::PhraseGenerated);
    match rx.try_recv().unwrap() {
        SessionEvent::WalletDerived { index, pubkey, .. } => {
            assert_eq!(index, 0);
            assert_eq!(pubkey, first);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(rx.try_recv().unwrap(), SessionEvent::PhraseGenerated);
}

#[test]
fn events_never_carry_the_phrase() {
    let mut session = DerivationSession::new();
    let mut rx = session.subscribe();
    let words = session.generate_phrase().unwrap().reveal().to_string();
    session.derive_next_wallet().unwrap();

    while let Ok(event) = rx.try_recv() {
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains(&words));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// After any mix of derivations and regenerations the list length
    /// equals the index.
    #[test]
    fn index_matches_list_length(ops in proptest::collection::vec(0u8..4, 0..8)) {
        let mut session = DerivationSession::with_phrase(phrase(9));
        for op in ops {
            if op == 0 {
                session.generate_phrase().unwrap();
            } else {
                session.derive_next_wallet().unwrap();
            }
            prop_assert_eq!(session.derived_keys().len() as u32, session.next_index());
        }
    }
}

// ---------------------------------------------------------------------------
// Shared session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shared_concurrent_derivations_never_share_an_index() {
    let shared = SharedSession::new(DerivationSession::with_phrase(phrase(5)));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let s = shared.clone();
        handles.push(tokio::spawn(async move { s.derive_next_wallet().await }));
    }

    let mut ok = 0u32;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert_eq!(e, WalletError::DerivationInFlight),
        }
    }
    assert!(ok >= 1);

    let snap = shared.snapshot().await;
    assert_eq!(snap.next_index, ok);
    assert_eq!(snap.derived_keys.len() as u32, ok);

    let mut sorted = snap.derived_keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), snap.derived_keys.len());
}

#[tokio::test]
async fn shared_matches_plain_session() {
    let shared = SharedSession::new(DerivationSession::with_phrase(phrase(6)));
    let mut plain = DerivationSession::with_phrase(phrase(6));
    for _ in 0..3 {
        assert_eq!(
            shared.derive_next_wallet().await.unwrap(),
            plain.derive_next_wallet().unwrap()
        );
    }
}

#[tokio::test]
async fn shared_generate_resets_and_notifies() {
    let shared = SharedSession::new(DerivationSession::with_phrase(phrase(4)));
    let mut rx = shared.subscribe();
    shared.derive_next_wallet().await.unwrap();

    let fresh = shared.generate_phrase().await.unwrap();
    let (snap, phrase) = shared.view().await;
    assert_eq!(phrase, Some(fresh));
    assert_eq!(snap.next_index, 0);
    assert!(snap.derived_keys.is_empty());
    assert!(shared.keypair(0).await.is_none());

    assert!(matches!(rx.recv().await.unwrap(), SessionEvent::WalletDerived { .. }));
    assert_eq!(rx.recv().await.unwrap(), SessionEvent::PhraseGenerated);
}
