use ed25519_dalek::{Signature, SigningKey, Signer, Verifier, VerifyingKey};
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use std::fmt;

use super::chain::{Admission, Ledger, LedgerError};
use super::transaction::Transaction;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to generate keypair: {0}")]
    KeypairGenerationError(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// An identity on the ledger.
///
/// Usually the base58 encoding of an Ed25519 public key, but the ledger
/// treats it as an opaque string so markers such as `"genesis"` are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address(pub String);

impl Address {
    /// Creates a new address from a public key
    pub fn from_public_key(public_key: &VerifyingKey) -> Self {
        let bytes = public_key.as_bytes();
        let encoded = bs58::encode(bytes).into_string();
        Address(encoded)
    }

    /// Converts the address back to a public key
    pub fn to_public_key(&self) -> Result<VerifyingKey, CryptoError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        let key_bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey("Invalid public key length".to_string())
        })?;

        VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A base58-encoded Ed25519 signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Creates a new digital signature from a signature
    pub fn from_signature(signature: &Signature) -> Self {
        let bytes = signature.to_bytes();
        let encoded = bs58::encode(bytes).into_string();
        DigitalSignature(encoded)
    }

    /// Converts the digital signature to a signature
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        let signature_bytes: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidSignature("Invalid signature length".to_string())
        })?;

        Ok(Signature::from_bytes(&signature_bytes))
    }
}

/// A participant holding an Ed25519 keypair.
///
/// The keypair is fixed at construction. A wallet keeps no reference to any
/// ledger; it is handed one each time it submits a transfer.
#[derive(Debug, Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: Address,
}

impl Wallet {
    /// Creates a new wallet from fresh OS entropy
    ///
    /// # Returns
    ///
    /// The wallet, or `KeypairGenerationError` if the entropy source fails
    pub fn new() -> Result<Self, CryptoError> {
        let mut secret = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|e| CryptoError::KeypairGenerationError(e.to_string()))?;

        Self::from_secret_key(&secret)
    }

    /// Creates a wallet from an existing secret key
    pub fn from_secret_key(secret_key_bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_array: [u8; 32] = secret_key_bytes.try_into().map_err(|_| {
            CryptoError::InvalidPrivateKey("Invalid private key length".to_string())
        })?;

        let signing_key = SigningKey::from_bytes(&bytes_array);
        let verifying_key = signing_key.verifying_key();
        let address = Address::from_public_key(&verifying_key);

        Ok(Wallet {
            signing_key,
            verifying_key,
            address,
        })
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the wallet's public key
    pub fn public_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Signs a message with the wallet's private key
    pub fn sign(&self, message: &[u8]) -> DigitalSignature {
        let signature = self.signing_key.sign(message);
        DigitalSignature::from_signature(&signature)
    }

    /// Exports the wallet's secret key as bytes
    pub fn export_secret_key(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    /// Builds, signs and submits a transfer of `amount` to `payee`
    ///
    /// # Arguments
    ///
    /// * `ledger` - The ledger to submit to
    /// * `amount` - The amount to transfer
    /// * `payee` - The recipient's address
    ///
    /// # Returns
    ///
    /// The ledger's admission outcome
    pub fn send(
        &self,
        ledger: &Ledger,
        amount: f64,
        payee: &Address,
    ) -> Result<Admission, LedgerError> {
        let transaction = Transaction::new(amount, self.address.clone(), payee.clone());
        let signature = self.sign(transaction.canonical_form().as_bytes());

        debug!("{} sending {} to {}", self.address, amount, payee);

        ledger.add_block(transaction, &self.address, &signature)
    }
}

/// Verifies a signature against a message and public key
pub fn verify_signature(
    message: &[u8],
    signature: &DigitalSignature,
    public_key: &VerifyingKey,
) -> Result<bool, CryptoError> {
    let signature = signature.to_signature()?;

    match public_key.verify(message, &signature) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
