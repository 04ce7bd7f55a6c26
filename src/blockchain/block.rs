use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::pow;
use super::transaction::Transaction;

/// Upper bound (inclusive) of the random seed drawn for a new block
pub const MAX_SEED: u64 = 999_999_999;

/// A single transfer linked to its predecessor.
///
/// `seed` is the random nonce drawn at construction and never changes.
/// `nonce` starts equal to `seed` and is replaced by the proof-of-work
/// solution when the block is mined, so the proof can be checked from the
/// block alone with `pow::verify(seed, nonce, difficulty)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Hash of the previous block, empty for genesis
    pub prev_hash: String,

    /// The transfer recorded in this block
    pub transaction: Transaction,

    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Random initial nonce, also the mining seed
    seed: u64,

    /// Current nonce
    nonce: u64,
}

impl Block {
    /// Creates a new unmined block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `prev_hash` - The hash of the previous block
    /// * `transaction` - The transaction to record
    pub fn new(prev_hash: String, transaction: Transaction) -> Self {
        Self::with_timestamp(prev_hash, transaction, Utc::now().timestamp_millis())
    }

    /// Creates a new unmined block with an explicit timestamp
    pub fn with_timestamp(prev_hash: String, transaction: Transaction, timestamp: i64) -> Self {
        let seed = rand::thread_rng().gen_range(0..=MAX_SEED);

        Block {
            prev_hash,
            transaction,
            timestamp,
            seed,
            nonce: seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Only the mining path writes the nonce
    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    /// Calculates the hash of the block from its current fields
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the block as a hexadecimal string
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();

        let block_data = serde_json::json!({
            "prev_hash": self.prev_hash,
            "transaction": self.transaction.to_canonical_value(),
            "timestamp": self.timestamp,
            "seed": self.seed,
            "nonce": self.nonce,
        });

        hasher.update(block_data.to_string().as_bytes());

        format!("{:x}", hasher.finalize())
    }

    /// Checks the stored nonce against the proof-of-work predicate
    pub fn has_valid_proof(&self, difficulty: usize) -> bool {
        pow::verify(self.seed, self.nonce, difficulty)
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_empty()
    }

    /// Creation time as a calendar date
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
