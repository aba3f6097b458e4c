#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tessera_ledger::Account;
use tessera_transactions::{
    apply_transaction, DelegatePayload, StakePayload, Transaction, TxPayload, UnstakePayload,
};
use tessera_types::{ProtocolParams, PublicKey, NATIVE_TOKEN};

#[derive(Debug, Arbitrary)]
enum Op {
    Delegate { fee: u16, amount: u64 },
    Stake { amount: u64 },
    Unstake { amount: u64 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    funding: u64,
    tx_fee: u64,
    ops: Vec<(Op, u16)>,
}

// Applying any sequence of staking transactions must never panic, and a
// rejected transaction must leave the account untouched.
// Accepted ones must survive an encode/decode cycle.
fuzz_target!(|input: Input| {
    let key = PublicKey([1; 32]);
    let params = ProtocolParams::default();
    let mut account = Account::new(key);
    if account
        .adjust_plaintext_balance(true, input.funding, NATIVE_TOKEN)
        .is_err()
    {
        return;
    }

    let mut height = 0u64;
    for (op, advance) in input.ops {
        height = height.saturating_add(u64::from(advance));
        let payload = match op {
            Op::Delegate { fee, amount } => TxPayload::Delegate(DelegatePayload {
                authority: PublicKey([2; 32]),
                fee,
                amount,
            }),
            Op::Stake { amount } => TxPayload::Stake(StakePayload { amount }),
            Op::Unstake { amount } => TxPayload::Unstake(UnstakePayload { amount }),
        };
        let tx = Transaction::new(key, account.nonce, input.tx_fee, payload);
        let before = account.clone();
        if apply_transaction(&mut account, &tx, height, &params).is_err() {
            assert_eq!(account, before, "failed apply mutated the account");
        } else {
            let encoded = account.encode().expect("applied account must encode");
            let decoded = Account::decode(key, &encoded).expect("applied account must decode");
            assert_eq!(decoded, account);
        }
    }
});
