#![no_main]

use libfuzzer_sys::fuzz_target;

use tessera_ledger::Account;
use tessera_types::PublicKey;

// Decoding arbitrary bytes as an account must never panic. Whatever decodes
// must survive a re-encode.
fuzz_target!(|data: &[u8]| {
    let Ok(account) = Account::decode(PublicKey([7; 32]), data) else {
        return;
    };
    let _ = account.validate();
    let encoded = account.encode().expect("decoded account must encode");
    let again =
        Account::decode(PublicKey([7; 32]), &encoded).expect("re-encoded account must decode");
    assert_eq!(again, account);
});
