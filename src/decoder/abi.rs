//! Hand-written ABI decoding for raw `eth_call` return values.
//!
//! Every *event* is decoded through alloy's `sol!`/`SolEvent` machinery in
//! `events.rs`; this module exists only for the one case that isn't a
//! logged event — the `getOwners()` read-back used to backfill a
//! late-discovered wallet's owner list (`WalletRegistered`).

use alloy::primitives::U256;

const MAX_ARRAY_LEN: usize = 1000;
const WORD: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiDecodeError {
    #[error("return data shorter than one word")]
    Truncated,
    #[error("array length {0} exceeds the maximum of {MAX_ARRAY_LEN}")]
    LengthTooLarge(usize),
    #[error("return data too short for array of length {length}: need {needed} bytes, got {got}")]
    DataTooShort { length: usize, needed: usize, got: usize },
}

/// Decode the ABI-encoded return value of a `function f() returns
/// (address[])` call: a head word pointing at the array, then the
/// array's own length word, then one right-aligned address per 32-byte
/// slot.
pub fn decode_owners_return(data: &[u8]) -> Result<Vec<String>, AbiDecodeError> {
    if data.len() < WORD {
        return Err(AbiDecodeError::Truncated);
    }
    let offset = U256::from_be_slice(&data[0..WORD]).to::<usize>();
    decode_address_array(data, offset)
}

/// Decode an ABI dynamic `address[]` whose length word begins at
/// `offset` bytes into `data`. Shared by the `getOwners()` return-value
/// path above and by the calldata decoder's `setupRecovery(address[],
/// ...)` argument.
pub fn decode_address_array(data: &[u8], offset: usize) -> Result<Vec<String>, AbiDecodeError> {
    if data.len() < offset + WORD {
        return Err(AbiDecodeError::Truncated);
    }

    let length = U256::from_be_slice(&data[offset..offset + WORD]).to::<usize>();
    if length > MAX_ARRAY_LEN {
        return Err(AbiDecodeError::LengthTooLarge(length));
    }

    let needed = WORD + WORD * length;
    let available = data.len() - offset;
    if available < needed {
        return Err(AbiDecodeError::DataTooShort { length, needed, got: available });
    }

    let items_start = offset + WORD;
    let mut owners = Vec::with_capacity(length);
    for i in 0..length {
        let slot_start = items_start + i * WORD;
        let slot = &data[slot_start..slot_start + WORD];
        owners.push(format!("0x{}", hex::encode(&slot[12..32])));
    }

    Ok(owners)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_of(value: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..32].copy_from_slice(&value.to_be_bytes());
        w
    }

    fn address_word(last_byte: u8) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[31] = last_byte;
        w
    }

    fn build_owners_return(owners: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&word_of(32)); // offset: array starts right after this word
        buf.extend_from_slice(&word_of(owners.len() as u64)); // length
        for &o in owners {
            buf.extend_from_slice(&address_word(o));
        }
        buf
    }

    #[test]
    fn decodes_a_well_formed_owners_array() {
        let data = build_owners_return(&[0x11, 0x22, 0x33]);
        let owners = decode_owners_return(&data).expect("should decode");
        assert_eq!(owners.len(), 3);
        assert!(owners[0].ends_with("11"));
        assert!(owners[2].ends_with("33"));
    }

    #[test]
    fn empty_array_decodes_to_empty_vec() {
        let data = build_owners_return(&[]);
        let owners = decode_owners_return(&data).expect("should decode");
        assert!(owners.is_empty());
    }

    #[test]
    fn rejects_length_over_the_cap() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&word_of(32));
        buf.extend_from_slice(&word_of(1001));
        let err = decode_owners_return(&buf).unwrap_err();
        assert_eq!(err, AbiDecodeError::LengthTooLarge(1001));
    }

    #[test]
    fn rejects_data_shorter_than_the_declared_length_requires() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&word_of(32));
        buf.extend_from_slice(&word_of(5)); // claims 5 owners
        buf.extend_from_slice(&address_word(0xaa)); // but only provides 1
        let err = decode_owners_return(&buf).unwrap_err();
        assert!(matches!(err, AbiDecodeError::DataTooShort { length: 5, .. }));
    }

    #[test]
    fn rejects_truncated_head_word() {
        let err = decode_owners_return(&[0u8; 10]).unwrap_err();
        assert_eq!(err, AbiDecodeError::Truncated);
    }
}
