//! Proof-of-work search.
//!
//! A solution for `seed` is the smallest `n >= 1` such that the MD5 digest of
//! the decimal string of `seed + n` starts with `difficulty` zero hex digits.

use log::info;
use md5::{Digest, Md5};
use thiserror::Error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of leading zero hex digits required by default
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Errors that can stop a proof-of-work search
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("Mining gave up after {attempts} attempts")]
    Timeout { attempts: u64 },

    #[error("Mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("Nonce space exhausted for seed {seed}")]
    Exhausted { seed: u64 },
}

/// MD5 hex digest of the decimal representation of `value`
pub fn checksum(value: u64) -> String {
    hex::encode(Md5::digest(value.to_string().as_bytes()))
}

/// Checks that `digest` starts with `difficulty` zero characters
pub fn meets_difficulty(digest: &str, difficulty: usize) -> bool {
    digest.len() >= difficulty && digest.bytes().take(difficulty).all(|b| b == b'0')
}

/// Checks that `solution` is a valid proof for `seed`
pub fn verify(seed: u64, solution: u64, difficulty: usize) -> bool {
    match seed.checked_add(solution) {
        Some(value) => meets_difficulty(&checksum(value), difficulty),
        None => false,
    }
}

/// Brute-force solver with an optional attempt budget and cancellation flag
#[derive(Debug, Clone)]
pub struct Miner {
    difficulty: usize,
    max_attempts: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Miner {
    /// Creates an unbounded miner
    pub fn new(difficulty: usize) -> Self {
        Miner {
            difficulty,
            max_attempts: None,
            cancel: None,
        }
    }

    /// Stops the search with `MiningError::Timeout` after `max_attempts` tries
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Stops the search with `MiningError::Cancelled` once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Searches linearly from 1 for the first solution for `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - The block's initial nonce
    ///
    /// # Returns
    ///
    /// The solution offset, to be added to `seed` when verifying
    pub fn mine(&self, seed: u64) -> Result<u64, MiningError> {
        info!("mining... (seed {}, difficulty {})", seed, self.difficulty);

        let mut solution: u64 = 1;
        let mut attempts: u64 = 0;

        loop {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(MiningError::Cancelled { attempts });
                }
            }

            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    return Err(MiningError::Timeout { attempts });
                }
            }

            let value = seed
                .checked_add(solution)
                .ok_or(MiningError::Exhausted { seed })?;
            attempts += 1;

            if meets_difficulty(&checksum(value), self.difficulty) {
                info!("solved: {} after {} attempts", solution, attempts);
                return Ok(solution);
            }

            solution = solution
                .checked_add(1)
                .ok_or(MiningError::Exhausted { seed })?;
        }
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}
