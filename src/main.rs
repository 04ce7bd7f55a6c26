use anyhow::Context;
use log::{info, warn};

use pow_ledger::{Ledger, Transaction, Wallet};

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let ledger = Ledger::new();

    let satoshi = Wallet::new().context("failed to create wallet")?;
    let bob = Wallet::new().context("failed to create wallet")?;
    let alice = Wallet::new().context("failed to create wallet")?;

    satoshi.send(&ledger, 50.0, bob.address())?;
    bob.send(&ledger, 23.0, alice.address())?;
    alice.send(&ledger, 5.0, bob.address())?;

    // Alice pretends to be Bob
    let forged = Transaction::new(100.0, bob.address().clone(), alice.address().clone());
    let signature = alice.sign(forged.canonical_form().as_bytes());
    let outcome = ledger.add_block(forged, bob.address(), &signature)?;
    if !outcome.is_appended() {
        warn!("Forged transfer was not recorded");
    }

    info!(
        "Chain holds {} blocks, valid: {}",
        ledger.len(),
        ledger.is_valid()
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&ledger.blocks()).context("failed to render chain")?
    );

    Ok(())
}
