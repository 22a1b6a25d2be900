//! Dice sources.
//!
//! The engine never generates randomness itself; these are [`RandomSource`] implementations a
//! table can be wired to.
//!
//! ## Commit-Reveal
//!
//! [`HashChainDice`] makes every roll verifiable after the fact:
//!
//! 1. **Request** - derive `reveal = hash(master_secret || request_id)` and publish
//!    `commit = hash(reveal)` before the roll is fulfilled
//! 2. **Fulfil** - disclose the reveal; the dice are read from it by rejection sampling
//! 3. **Verify** - anyone can check `hash(reveal) == commit` and recompute the dice
//!
//! [`RngDice`] wraps any `rand` generator for simulations and tests.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use commonware_utils::hex;
use rand::{Rng, RngCore};

use crate::collaborators::RandomSource;

/// Length of commit and reveal values in bytes.
pub const COMMIT_REVEAL_LEN: usize = 32;

/// Bytes at or above this are rejected so each face is uniform (252 = 42 * 6).
const FACE_REJECTION_BOUND: u8 = 252;

/// A commit-reveal pair for one roll request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRevealPair {
    /// Published when the roll is requested.
    pub commit: [u8; COMMIT_REVEAL_LEN],
    /// Disclosed when the roll is fulfilled.
    pub reveal: [u8; COMMIT_REVEAL_LEN],
}

impl CommitRevealPair {
    pub fn verify(&self) -> bool {
        verify_commit_reveal(&self.commit, &self.reveal)
    }

    /// The dice this reveal produces.
    pub fn dice(&self) -> (u8, u8) {
        dice_from_reveal(&self.reveal)
    }
}

/// `commit = hash(reveal)`
pub fn compute_commit(reveal: &[u8; COMMIT_REVEAL_LEN]) -> [u8; COMMIT_REVEAL_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(reveal);
    hasher.finalize().0
}

pub fn verify_commit_reveal(
    commit: &[u8; COMMIT_REVEAL_LEN],
    reveal: &[u8; COMMIT_REVEAL_LEN],
) -> bool {
    commit == &compute_commit(reveal)
}

/// Reads two uniform faces from a reveal, rehashing if a block runs out of usable bytes.
pub fn dice_from_reveal(reveal: &[u8; COMMIT_REVEAL_LEN]) -> (u8, u8) {
    let mut block = *reveal;
    let mut faces = [0u8; 2];
    let mut found = 0;
    loop {
        for byte in block.iter() {
            if *byte < FACE_REJECTION_BOUND {
                faces[found] = byte % 6 + 1;
                found += 1;
                if found == faces.len() {
                    return (faces[0], faces[1]);
                }
            }
        }
        let mut hasher = Sha256::new();
        hasher.update(&block);
        block = hasher.finalize().0;
    }
}

/// Deterministic per-request reveals from a master secret.
#[derive(Clone)]
pub struct HashChain {
    master_secret: [u8; COMMIT_REVEAL_LEN],
}

impl HashChain {
    pub fn from_secret(master_secret: [u8; COMMIT_REVEAL_LEN]) -> Self {
        Self { master_secret }
    }

    /// Derive a master secret from arbitrary seed material.
    pub fn from_seed_bytes(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(b"craps_dice_chain");
        Self {
            master_secret: hasher.finalize().0,
        }
    }

    pub fn generate(&self, request_id: u64) -> CommitRevealPair {
        let reveal = self.derive_reveal(request_id);
        let commit = compute_commit(&reveal);
        CommitRevealPair { commit, reveal }
    }

    pub fn derive_reveal(&self, request_id: u64) -> [u8; COMMIT_REVEAL_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_secret);
        hasher.update(&request_id.to_be_bytes());
        hasher.finalize().0
    }
}

/// Commit-reveal dice source.
#[derive(Clone)]
pub struct HashChainDice {
    chain: HashChain,
    commits: BTreeMap<u64, [u8; COMMIT_REVEAL_LEN]>,
    revealed: BTreeMap<u64, CommitRevealPair>,
}

impl HashChainDice {
    pub fn new(chain: HashChain) -> Self {
        Self {
            chain,
            commits: BTreeMap::new(),
            revealed: BTreeMap::new(),
        }
    }

    /// The commitment published for a pending request.
    pub fn commitment(&self, request_id: u64) -> Option<&[u8; COMMIT_REVEAL_LEN]> {
        self.commits.get(&request_id)
    }

    /// The full pair for a request that has been polled.
    pub fn revealed(&self, request_id: u64) -> Option<&CommitRevealPair> {
        self.revealed.get(&request_id)
    }
}

impl RandomSource for HashChainDice {
    fn request(&mut self, request_id: u64) -> Result<()> {
        if self.commits.contains_key(&request_id) || self.revealed.contains_key(&request_id) {
            return Err(anyhow!("request {request_id} already issued"));
        }
        let pair = self.chain.generate(request_id);
        tracing::debug!(request_id, commit = %hex(&pair.commit), "dice committed");
        self.commits.insert(request_id, pair.commit);
        Ok(())
    }

    fn poll(&mut self, request_id: u64) -> Option<(u8, u8)> {
        let commit = self.commits.get(&request_id)?;
        let pair = self.chain.generate(request_id);
        if pair.commit != *commit {
            return None;
        }
        let dice = pair.dice();
        self.revealed.insert(request_id, pair);
        Some(dice)
    }

    fn release(&mut self, request_id: u64) {
        self.commits.remove(&request_id);
    }
}

/// Dice drawn from a `rand` generator at request time.
pub struct RngDice<R: RngCore> {
    rng: R,
    drawn: BTreeMap<u64, (u8, u8)>,
}

impl<R: RngCore> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            drawn: BTreeMap::new(),
        }
    }
}

impl<R: RngCore> RandomSource for RngDice<R> {
    fn request(&mut self, request_id: u64) -> Result<()> {
        let d1 = self.rng.gen_range(1..=6u8);
        let d2 = self.rng.gen_range(1..=6u8);
        self.drawn.insert(request_id, (d1, d2));
        Ok(())
    }

    fn poll(&mut self, request_id: u64) -> Option<(u8, u8)> {
        self.drawn.get(&request_id).copied()
    }

    fn release(&mut self, request_id: u64) {
        self.drawn.remove(&request_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn chain() -> HashChain {
        HashChain::from_seed_bytes(b"test table")
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = chain().generate(7);
        let b = chain().generate(7);
        assert_eq!(a, b);
        assert!(a.verify());
        assert_ne!(a.reveal, chain().generate(8).reveal);
    }

    #[test]
    fn test_tampered_reveal_fails_verification() {
        let mut pair = chain().generate(1);
        pair.reveal[0] ^= 0xff;
        assert!(!pair.verify());
    }

    #[test]
    fn test_dice_from_reveal_in_range() {
        let chain = chain();
        for request_id in 0..500 {
            let (d1, d2) = chain.generate(request_id).dice();
            assert!((1..=6).contains(&d1));
            assert!((1..=6).contains(&d2));
        }
    }

    #[test]
    fn test_dice_from_reveal_rejects_high_bytes() {
        let mut reveal = [255u8; COMMIT_REVEAL_LEN];
        reveal[30] = 5; // face 6
        reveal[31] = 6; // face 1
        assert_eq!(dice_from_reveal(&reveal), (6, 1));

        // No usable bytes: falls through to a rehash and still yields valid faces.
        let (d1, d2) = dice_from_reveal(&[255u8; COMMIT_REVEAL_LEN]);
        assert!((1..=6).contains(&d1) && (1..=6).contains(&d2));
    }

    #[test]
    fn test_hash_chain_dice_request_then_poll() {
        let mut dice = HashChainDice::new(chain());
        assert_eq!(dice.poll(1), None);
        dice.request(1).unwrap();
        let commit = *dice.commitment(1).unwrap();
        let faces = dice.poll(1).unwrap();
        let pair = dice.revealed(1).unwrap();
        assert_eq!(pair.commit, commit);
        assert!(verify_commit_reveal(&commit, &pair.reveal));
        assert_eq!(pair.dice(), faces);

        // Polling again before release yields the same faces.
        assert_eq!(dice.poll(1), Some(faces));
        dice.release(1);
        assert_eq!(dice.poll(1), None);
        assert!(dice.revealed(1).is_some());
        assert!(dice.request(1).is_err());
    }

    #[test]
    fn test_rng_dice_reproducible() {
        let mut a = RngDice::new(StdRng::seed_from_u64(3));
        let mut b = RngDice::new(StdRng::seed_from_u64(3));
        for request_id in 0..50 {
            a.request(request_id).unwrap();
            b.request(request_id).unwrap();
            let faces = a.poll(request_id).unwrap();
            assert_eq!(Some(faces), b.poll(request_id));
            assert_eq!(Some(faces), a.poll(request_id));
            a.release(request_id);
            assert_eq!(a.poll(request_id), None);
            assert!((1..=6).contains(&faces.0) && (1..=6).contains(&faces.1));
        }
    }
}
