#![no_main]

use libfuzzer_sys::fuzz_target;

use tessera_transactions::{validate_transaction, Transaction};

// Decoding arbitrary bytes as a transaction must never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(tx) = Transaction::decode(data) {
        let _ = validate_transaction(&tx);
        let _ = tx.hash();
    }
});
