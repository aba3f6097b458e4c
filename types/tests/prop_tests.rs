use proptest::prelude::*;

use tessera_types::{BlockHash, ChainTip, PublicKey, Timestamp, TokenId, TxHash};

proptest! {
    /// BlockHash roundtrip: new -> as_bytes -> new produces identical hash.
    #[test]
    fn block_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// TxHash::is_zero is true only for all-zero bytes.
    #[test]
    fn tx_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Display renders every byte as two lowercase hex digits.
    #[test]
    fn block_hash_display_is_full_hex(bytes in prop::array::uniform32(0u8..)) {
        let rendered = BlockHash::new(bytes).to_string();
        prop_assert_eq!(rendered.len(), 64);
        prop_assert!(rendered.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// PublicKey::from_slice accepts exactly 32 bytes.
    #[test]
    fn public_key_from_slice_length(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let parsed = PublicKey::from_slice(&bytes);
        prop_assert_eq!(parsed.is_some(), bytes.len() == 32);
    }

    /// ChainTip bincode serialization roundtrip.
    #[test]
    fn chain_tip_bincode_roundtrip(
        height in any::<u64>(),
        hash in prop::array::uniform32(0u8..),
        work in any::<u128>(),
        secs in any::<u64>(),
    ) {
        let tip = ChainTip::new(height, BlockHash::new(hash), work, Timestamp::new(secs));
        let encoded = bincode::serialize(&tip).unwrap();
        let decoded: ChainTip = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, tip);
    }

    /// TokenId bincode serialization roundtrip.
    #[test]
    fn token_id_bincode_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let token = TokenId::new(bytes);
        let encoded = bincode::serialize(&token).unwrap();
        let decoded: TokenId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, token);
    }

    /// Timestamp elapsed_since saturates to 0 when now < self.
    #[test]
    fn timestamp_elapsed_since_saturates(
        base in 1u64..1_000_000,
        deficit in 1u64..1_000_000,
    ) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_since(earlier), 0);
    }
}
