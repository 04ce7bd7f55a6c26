use serde::Serialize;
use serde_json::Value;

use super::crypto::Address;

/// Payer marker used by the issuance recorded in the genesis block
pub const GENESIS_ORIGIN: &str = "genesis";

/// A value transfer from `payer` to `payee`.
///
/// Fields are private so a transaction cannot change once built. Nothing is
/// validated: zero or negative amounts and arbitrary identities are accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    amount: f64,
    payer: Address,
    payee: Address,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount being transferred
    /// * `payer` - The sender's identity
    /// * `payee` - The recipient's identity
    pub fn new(amount: f64, payer: Address, payee: Address) -> Self {
        Transaction {
            amount,
            payer,
            payee,
        }
    }

    /// Creates the initial issuance from the genesis origin to `holder`
    pub fn genesis(amount: f64, holder: Address) -> Self {
        Self::new(amount, Address::from(GENESIS_ORIGIN), holder)
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn payer(&self) -> &Address {
        &self.payer
    }

    pub fn payee(&self) -> &Address {
        &self.payee
    }

    /// Checks if the transaction is the genesis issuance
    pub fn is_genesis(&self) -> bool {
        self.payer.0 == GENESIS_ORIGIN
    }

    /// JSON value used for both signing and block hashing.
    ///
    /// The amount is written as its decimal string, which keeps `NaN`, `inf`
    /// and `-inf` distinct.
    pub(crate) fn to_canonical_value(&self) -> Value {
        serde_json::json!({
            "amount": self.amount.to_string(),
            "payer": self.payer.0,
            "payee": self.payee.0,
        })
    }

    /// Deterministic encoding that signers and the ledger both operate on.
    ///
    /// Keys are emitted in sorted order, so the output only depends on the
    /// three field values.
    pub fn canonical_form(&self) -> String {
        self.to_canonical_value().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let transaction = Transaction::new(10.5, Address::from("A"), Address::from("B"));

        assert_eq!(transaction.amount(), 10.5);
        assert_eq!(transaction.payer(), &Address::from("A"));
        assert_eq!(transaction.payee(), &Address::from("B"));
        assert!(!transaction.is_genesis());
    }

    #[test]
    fn test_genesis_transaction() {
        let transaction = Transaction::genesis(100.0, Address::from("david"));

        assert_eq!(transaction.payer().as_str(), "genesis");
        assert_eq!(transaction.payee().as_str(), "david");
        assert!(transaction.is_genesis());
    }

    #[test]
    fn test_canonical_form_is_deterministic() {
        let transaction = Transaction::new(10.0, Address::from("A"), Address::from("B"));

        let first = transaction.canonical_form();
        let second = transaction.canonical_form();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(first, r#"{"amount":"10","payee":"B","payer":"A"}"#);
    }

    #[test]
    fn test_canonical_form_changes_with_each_field() {
        let base = Transaction::new(10.0, Address::from("A"), Address::from("B")).canonical_form();

        let amount = Transaction::new(11.0, Address::from("A"), Address::from("B")).canonical_form();
        let payer = Transaction::new(10.0, Address::from("C"), Address::from("B")).canonical_form();
        let payee = Transaction::new(10.0, Address::from("A"), Address::from("C")).canonical_form();

        assert_ne!(base, amount);
        assert_ne!(base, payer);
        assert_ne!(base, payee);
    }

    #[test]
    fn test_non_finite_amounts_differ() {
        let form = |amount: f64| {
            Transaction::new(amount, Address::from("A"), Address::from("B")).canonical_form()
        };

        let nan = form(f64::NAN);
        let inf = form(f64::INFINITY);
        let neg_inf = form(f64::NEG_INFINITY);

        assert_ne!(nan, inf);
        assert_ne!(nan, neg_inf);
        assert_ne!(inf, neg_inf);
        assert_ne!(form(0.0), form(-0.0));
        assert_eq!(inf, r#"{"amount":"inf","payee":"B","payer":"A"}"#);
    }

    #[test]
    fn test_swapped_parties_differ() {
        let forward = Transaction::new(5.0, Address::from("A"), Address::from("B"));
        let backward = Transaction::new(5.0, Address::from("B"), Address::from("A"));
        assert_ne!(forward.canonical_form(), backward.canonical_form());
    }

    #[test]
    fn test_no_validation() {
        let transaction = Transaction::new(-3.0, Address::from(""), Address::from(""));
        assert_eq!(transaction.amount(), -3.0);
        assert!(transaction.payer().as_str().is_empty());
    }
}
