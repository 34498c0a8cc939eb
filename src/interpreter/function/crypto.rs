//! Hash function codes (spec §4.3, `0x0200`–`0x0207`; spec §9 placement
//! notes).
//!
//! Grounded on the RustCrypto `Digest` trait usage pattern, the same family
//! the teacher uses for its own `sha3` hashing, extended here to the
//! MD5/RIPEMD-160/SHA-256/HASH160 set this machine's consensus contract
//! requires.

use md5::Digest as _;

use crate::address;
use crate::consts::REGISTER_BLOCK_WORDS;
use crate::error::PanicReason;
use crate::state::MachineState;

/// Which digest to compute (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Rmd160,
    Sha256,
    Hash160,
}

fn digest_bytes(algorithm: HashAlgorithm, input: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Md5 => md5::Md5::digest(input).to_vec(),
        HashAlgorithm::Rmd160 => ripemd::Ripemd160::digest(input).to_vec(),
        HashAlgorithm::Sha256 => sha2::Sha256::digest(input).to_vec(),
        HashAlgorithm::Hash160 => {
            let sha = sha2::Sha256::digest(input);
            ripemd::Ripemd160::digest(sha).to_vec()
        }
    }
}

/// Read `length` bytes starting at data cell `start`, validating the range
/// first (spec §4.3 "getHashData preflight").
fn read_hash_data<'a>(state: &'a MachineState, start: u32, length: u32) -> Result<&'a [u8], PanicReason> {
    let (begin, end) = address::validate_hash_range(start, length, state.data.len())?;
    Ok(&state.data[begin..end])
}

/// Split a digest into B as big-endian 64-bit words (spec §8 scenario 7:
/// a SHA-256 digest over a known region lands in B1..B4 as the standard
/// digest split into four big-endian words).
///
/// RIPEMD-160's 20 bytes don't fill two whole words, so its remaining four
/// bytes are right-aligned into the *high* 32 bits of the next word, with
/// that word's low 32 bits left zero (spec §9), rather than left-aligned as
/// a short big-endian word would be.
fn digest_to_register_words(digest: &[u8]) -> [u64; REGISTER_BLOCK_WORDS] {
    let mut bytes = [0u8; REGISTER_BLOCK_WORDS * 8];
    let full_words = digest.len() / 8;
    bytes[..full_words * 8].copy_from_slice(&digest[..full_words * 8]);

    let remainder = &digest[full_words * 8..];
    // RIPEMD-160 (and HASH160, which is RIPEMD-160 of SHA-256) leave a
    // four-byte remainder; placing it at the front of the next big-endian
    // word puts it in that word's high 32 bits with the low 32 bits zero.
    bytes[full_words * 8..full_words * 8 + remainder.len()].copy_from_slice(remainder);

    let mut words = [0u64; REGISTER_BLOCK_WORDS];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
        *word = u64::from_be_bytes(chunk.try_into().expect("8-byte chunk"));
    }
    words
}

/// Which bits of each B word a digest of `digest_len` bytes actually fills.
/// `CHECK_*_WITH_B` must ignore the rest (spec §4.3), rather than requiring
/// them to be zero.
fn digest_word_mask(digest_len: usize) -> [u64; REGISTER_BLOCK_WORDS] {
    let mut mask = [0u64; REGISTER_BLOCK_WORDS];
    let full_words = digest_len / 8;
    for word in mask.iter_mut().take(full_words) {
        *word = u64::MAX;
    }
    let remainder = digest_len % 8;
    if remainder > 0 {
        mask[full_words] = u64::MAX << ((8 - remainder) * 8);
    }
    mask
}

/// `MD5_INTO_B` / `RMD160_INTO_B` / `SHA256_INTO_B` / `HASH160_INTO_B`:
/// hash `data[start·8 .. start·8+length)` and store the digest into B.
pub fn hash_into_b(
    state: &mut MachineState,
    algorithm: HashAlgorithm,
    start: u32,
    length: u32,
) -> Result<(), PanicReason> {
    let input = read_hash_data(state, start, length)?.to_vec();
    let digest = digest_bytes(algorithm, &input);
    state.reg_b = digest_to_register_words(&digest);
    Ok(())
}

/// `CHECK_*_WITH_B`: hash the named range and compare against B, returning
/// `1` if equal, `0` otherwise. Only the words (and, for RIPEMD-160/HASH160,
/// the half-word) a digest actually fills are compared; the padded slots a
/// shorter digest leaves untouched are ignored rather than required to be
/// zero.
pub fn check_hash_with_b(
    state: &MachineState,
    algorithm: HashAlgorithm,
    start: u32,
    length: u32,
) -> Result<u64, PanicReason> {
    let input = read_hash_data(state, start, length)?.to_vec();
    let digest = digest_bytes(algorithm, &input);
    let expected = digest_to_register_words(&digest);
    let mask = digest_word_mask(digest.len());

    let matches = expected
        .iter()
        .zip(state.reg_b.iter())
        .zip(mask.iter())
        .all(|((e, s), m)| e & m == s & m);
    Ok(u64::from(matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Flags, Header, Version};

    fn sample_with(data_words: &[u64]) -> MachineState {
        let header = Header {
            version: Version::V2,
            reserved: 0,
            num_code_pages: 1,
            num_data_pages: data_words.len() as u16,
            num_call_stack_pages: 1,
            num_user_stack_pages: 1,
            min_activation_amount: 0,
        };
        let mut state = MachineState {
            code: vec![0u8; header.code_len()].into_boxed_slice(),
            data: vec![0u8; header.data_len()].into_boxed_slice(),
            call_stack: Vec::new(),
            user_stack: Vec::new(),
            pc: 0,
            on_stop_address: 0,
            on_error_address: None,
            reg_a: [0; REGISTER_BLOCK_WORDS],
            reg_b: [0; REGISTER_BLOCK_WORDS],
            current_balance: 0,
            previous_balance: 0,
            steps: 0,
            current_block_height: 0,
            sleep_until_height: None,
            frozen_balance: None,
            flags: Flags::empty(),
            is_first_opcode_after_sleeping: false,
            header,
        };
        for (i, word) in data_words.iter().enumerate() {
            state.write_cell(i as u32, *word).unwrap();
        }
        state
    }

    #[test]
    fn sha256_matches_known_vector() {
        // "abc" padded into one 8-byte cell, little-endian, zero-padded.
        let mut word_bytes = [0u8; 8];
        word_bytes[..3].copy_from_slice(b"abc");
        let state = sample_with(&[u64::from_le_bytes(word_bytes)]);
        let mut state = state;
        hash_into_b(&mut state, HashAlgorithm::Sha256, 0, 3).unwrap();
        let expected = sha2::Sha256::digest(b"abc");
        let mut expected_bytes = [0u8; 32];
        expected_bytes.copy_from_slice(&expected);
        let mut got = [0u8; 32];
        for (i, word) in state.reg_b.iter().enumerate() {
            got[i * 8..i * 8 + 8].copy_from_slice(&word.to_be_bytes());
        }
        assert_eq!(got, expected_bytes);
    }

    #[test]
    fn hash160_is_ripemd_of_sha256() {
        let state = sample_with(&[0]);
        let mut a = state.clone();
        let mut b = state.clone();
        hash_into_b(&mut a, HashAlgorithm::Hash160, 0, 8).unwrap();
        let sha = sha2::Sha256::digest([0u8; 8]);
        let expected = ripemd::Ripemd160::digest(sha);
        hash_into_b(&mut b, HashAlgorithm::Rmd160, 0, 0).ok();
        let mut expected_bytes = [0u8; REGISTER_BLOCK_WORDS * 8];
        expected_bytes[..20].copy_from_slice(&expected);
        let mut got = [0u8; REGISTER_BLOCK_WORDS * 8];
        for (i, word) in a.reg_b.iter().enumerate() {
            got[i * 8..i * 8 + 8].copy_from_slice(&word.to_be_bytes());
        }
        assert_eq!(got, expected_bytes);
    }

    #[test]
    fn check_with_b_reports_match() {
        let mut state = sample_with(&[0]);
        hash_into_b(&mut state, HashAlgorithm::Md5, 0, 8).unwrap();
        assert_eq!(
            check_hash_with_b(&state, HashAlgorithm::Md5, 0, 8).unwrap(),
            1
        );
        state.reg_b[0] ^= 1;
        assert_eq!(
            check_hash_with_b(&state, HashAlgorithm::Md5, 0, 8).unwrap(),
            0
        );
    }

    #[test]
    fn check_with_b_ignores_padded_slots() {
        // MD5 fills only B1/B2; garbage in B3/B4 must not fail the check.
        let mut state = sample_with(&[0]);
        hash_into_b(&mut state, HashAlgorithm::Md5, 0, 8).unwrap();
        state.reg_b[2] = 0xDEAD_BEEF_DEAD_BEEF;
        state.reg_b[3] = 0xDEAD_BEEF_DEAD_BEEF;
        assert_eq!(
            check_hash_with_b(&state, HashAlgorithm::Md5, 0, 8).unwrap(),
            1
        );

        // RIPEMD-160/HASH160 fill B1/B2 plus the high 32 bits of B3; garbage
        // in B3's low 32 bits and all of B4 must not fail the check either.
        let mut state = sample_with(&[0]);
        hash_into_b(&mut state, HashAlgorithm::Hash160, 0, 8).unwrap();
        state.reg_b[2] |= 0x0000_0000_DEAD_BEEF;
        state.reg_b[3] = 0xDEAD_BEEF_DEAD_BEEF;
        assert_eq!(
            check_hash_with_b(&state, HashAlgorithm::Hash160, 0, 8).unwrap(),
            1
        );

        // But the meaningful high 32 bits of B3 still have to match.
        state.reg_b[2] ^= 1 << 63;
        assert_eq!(
            check_hash_with_b(&state, HashAlgorithm::Hash160, 0, 8).unwrap(),
            0
        );
    }
}
