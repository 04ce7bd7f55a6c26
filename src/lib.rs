//! A minimal single-node proof-of-work ledger.
//!
//! Wallets sign transfers, the [`Ledger`] checks the signature, mines a
//! block on top of the current tail and appends it.

pub mod blockchain;

pub use blockchain::{
    Address, Admission, Block, Ledger, LedgerConfig, LedgerError, RejectReason, Transaction,
    Wallet,
};
