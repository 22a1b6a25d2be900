//! In-memory collaborators for tests, benches, and simulations.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use anyhow::{anyhow, Result};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};

use crate::collaborators::{AccessPolicy, Custody, Operation, RandomSource};

/// Creates an account keypair for Ed25519 signatures used by players and operators
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// Creates a player identity
pub fn create_account(seed: u64) -> PublicKey {
    create_account_keypair(seed).1
}

/// Chip balances held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<PublicKey, u64>,
}

impl MemoryLedger {
    pub fn deposit(&mut self, player: &PublicKey, amount: u64) {
        let balance = self.balances.entry(player.clone()).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self, player: &PublicKey) -> u64 {
        self.balances.get(player).copied().unwrap_or(0)
    }

    /// Sum of every balance.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}

impl Custody for MemoryLedger {
    fn debit(&mut self, player: &PublicKey, amount: u64) -> Result<()> {
        let balance = self.balance(player);
        if balance < amount {
            return Err(anyhow!("balance {balance} below {amount}"));
        }
        self.balances.insert(player.clone(), balance - amount);
        Ok(())
    }

    fn credit(&mut self, player: &PublicKey, amount: u64) {
        self.deposit(player, amount);
    }
}

/// Authorizes everyone for everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn authorized(&self, _actor: &PublicKey, _operation: Operation) -> bool {
        true
    }
}

/// Operator operations require membership; betting is open to anyone.
#[derive(Clone, Debug, Default)]
pub struct AllowList {
    operators: BTreeSet<PublicKey>,
}

impl AllowList {
    pub fn new(operators: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }
}

impl AccessPolicy for AllowList {
    fn authorized(&self, actor: &PublicKey, operation: Operation) -> bool {
        !operation.is_operator() || self.operators.contains(actor)
    }
}

/// Replays a fixed queue of dice, one pair per request.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    queue: VecDeque<(u8, u8)>,
    issued: BTreeMap<u64, (u8, u8)>,
    fail_requests: bool,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            queue: rolls.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, d1: u8, d2: u8) {
        self.queue.push_back((d1, d2));
    }

    /// Makes every subsequent request fail.
    pub fn fail_requests(&mut self) {
        self.fail_requests = true;
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RandomSource for ScriptedDice {
    fn request(&mut self, request_id: u64) -> Result<()> {
        if self.fail_requests {
            return Err(anyhow!("dice source unavailable"));
        }
        let roll = self
            .queue
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted rolls left"))?;
        self.issued.insert(request_id, roll);
        Ok(())
    }

    fn poll(&mut self, request_id: u64) -> Option<(u8, u8)> {
        self.issued.get(&request_id).copied()
    }

    fn release(&mut self, request_id: u64) {
        self.issued.remove(&request_id);
    }
}
