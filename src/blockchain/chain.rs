use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use thiserror::Error;

use super::block::Block;
use super::crypto::{verify_signature, Address, DigitalSignature};
use super::pow::{Miner, MiningError, DEFAULT_DIFFICULTY};
use super::transaction::Transaction;

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Mining error: {0}")]
    Mining(#[from] MiningError),
}

/// Why a submission did not pass the signature gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The signature does not match the transaction under the sender's key
    InvalidSignature,

    /// The sender key could not be decoded into a public key
    MalformedPublicKey(String),

    /// The signature could not be decoded
    MalformedSignature(String),
}

/// Outcome of submitting a transaction to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// The transaction was mined into this block, now the tail
    Appended(Block),

    /// The transaction was dropped and the chain is unchanged
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_appended(&self) -> bool {
        matches!(self, Admission::Appended(_))
    }

    /// The appended block, if any
    pub fn block(&self) -> Option<&Block> {
        match self {
            Admission::Appended(block) => Some(block),
            Admission::Rejected(_) => None,
        }
    }
}

/// Ledger settings
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Number of leading zero hex digits a proof must have
    pub difficulty: usize,

    /// Attempt budget per block, unbounded when `None`
    pub max_attempts: Option<u64>,

    /// Amount issued by the genesis block
    pub genesis_amount: f64,

    /// Recipient of the genesis issuance
    pub genesis_holder: Address,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            difficulty: DEFAULT_DIFFICULTY,
            max_attempts: None,
            genesis_amount: 100.0,
            genesis_holder: Address::from("david"),
        }
    }
}

/// An append-only chain of mined blocks.
///
/// Cloning yields another handle to the same chain. Each admission runs
/// under one lock, so concurrent submitters are serialized in the order they
/// acquire it.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The chain of blocks, never empty
    chain: Arc<Mutex<Vec<Block>>>,

    /// Set to abort a search, cleared once that search stops
    cancel: Arc<AtomicBool>,

    config: LedgerConfig,
}

impl Ledger {
    /// Creates a new ledger with the default configuration
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Creates a new ledger holding only the genesis block
    pub fn with_config(config: LedgerConfig) -> Self {
        let genesis = Block::new(
            String::new(),
            Transaction::genesis(config.genesis_amount, config.genesis_holder.clone()),
        );

        info!(
            "Created ledger with genesis block {} (difficulty {})",
            genesis.hash(),
            config.difficulty
        );

        Ledger {
            chain: Arc::new(Mutex::new(vec![genesis])),
            cancel: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    fn lock_chain(&self) -> MutexGuard<'_, Vec<Block>> {
        // Only a single push mutates the chain, so a poisoned lock still
        // guards a consistent vector.
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Submits a signed transaction
    ///
    /// # Arguments
    ///
    /// * `transaction` - The transaction to record
    /// * `sender_key` - The signer's public key as an address
    /// * `signature` - Signature over `transaction.canonical_form()`
    ///
    /// # Returns
    ///
    /// `Admission::Appended` with the mined block, or `Admission::Rejected`
    /// when the signature gate fails. Mining failures leave the chain
    /// unchanged and are returned as errors.
    pub fn add_block(
        &self,
        transaction: Transaction,
        sender_key: &Address,
        signature: &DigitalSignature,
    ) -> Result<Admission, LedgerError> {
        let mut chain = self.lock_chain();

        if let Err(reason) = Self::check_signature(&transaction, sender_key, signature) {
            warn!("Rejected transaction from {}: {:?}", sender_key, reason);
            return Ok(Admission::Rejected(reason));
        }

        let prev_hash = match chain.last() {
            Some(tail) => tail.hash(),
            None => String::new(),
        };

        let mut block = Block::new(prev_hash, transaction);
        let solution = match self.miner().mine(block.seed()) {
            Ok(solution) => solution,
            Err(err) => {
                if let MiningError::Cancelled { .. } = err {
                    self.cancel.store(false, Ordering::Relaxed);
                }
                warn!("Dropped transaction from {}: {}", sender_key, err);
                return Err(err.into());
            }
        };
        block.set_nonce(solution);

        chain.push(block.clone());
        info!("Appended block {} at height {}", block.hash(), chain.len() - 1);

        Ok(Admission::Appended(block))
    }

    fn check_signature(
        transaction: &Transaction,
        sender_key: &Address,
        signature: &DigitalSignature,
    ) -> Result<(), RejectReason> {
        let public_key = sender_key
            .to_public_key()
            .map_err(|e| RejectReason::MalformedPublicKey(e.to_string()))?;

        let valid = verify_signature(
            transaction.canonical_form().as_bytes(),
            signature,
            &public_key,
        )
        .map_err(|e| RejectReason::MalformedSignature(e.to_string()))?;

        if valid {
            Ok(())
        } else {
            Err(RejectReason::InvalidSignature)
        }
    }

    fn miner(&self) -> Miner {
        Miner::new(self.config.difficulty)
            .with_max_attempts(self.config.max_attempts)
            .with_cancel_flag(self.cancel.clone())
    }

    /// Gets the last block in the chain
    pub fn tail(&self) -> Block {
        let chain = self.lock_chain();
        match chain.last() {
            Some(block) => block.clone(),
            None => unreachable!("ledger chain always holds the genesis block"),
        }
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.lock_chain().len()
    }

    /// Checks if the chain has no blocks
    pub fn is_empty(&self) -> bool {
        self.lock_chain().is_empty()
    }

    /// Snapshot of the whole chain
    pub fn blocks(&self) -> Vec<Block> {
        self.lock_chain().clone()
    }

    /// Flag that aborts the running search, or the next one if none is
    /// running. The ledger clears it once a search has been cancelled.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Audits the whole chain
    ///
    /// # Returns
    ///
    /// true if every block links to its predecessor's current hash and every
    /// non-genesis block carries a valid proof
    pub fn is_valid(&self) -> bool {
        let chain = self.lock_chain();

        let Some(genesis) = chain.first() else {
            return false;
        };
        if !genesis.is_genesis() {
            return false;
        }

        chain.windows(2).all(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            current.prev_hash == previous.hash() && current.has_valid_proof(self.config.difficulty)
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
