// Blockchain module
//
// This module contains the ledger implementation including:
// - Transaction structure and its canonical encoding
// - Block structure and hashing
// - Proof of work search
// - The ledger and its admission protocol
// - Wallets (keypairs and signing)

pub mod block;
pub mod chain;
pub mod crypto;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Admission, Ledger, LedgerConfig, LedgerError, RejectReason};
pub use crypto::{Address, CryptoError, DigitalSignature, Wallet};
pub use pow::{Miner, MiningError};
pub use transaction::Transaction;
