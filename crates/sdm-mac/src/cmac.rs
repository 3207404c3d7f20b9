//! AES-CMAC restricted to messages of zero or one block.
//!
//! SDM only ever authenticates a 16-byte session vector or an empty message,
//! so the multi-block chaining of RFC 4493 is never exercised. Both supported
//! cases process a single final block against an all-zero chaining value:
//!
//! - 16-byte message: `AES(K, M ^ K1)`
//! - empty message: `AES(K, pad(M) ^ K2)` with ISO/IEC 9797-1 method 2 padding
//!
//! Any other message length is rejected instead of being silently extended.

use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, SdmError};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// One AES block.
pub type Block = [u8; BLOCK_SIZE];

/// Low byte of the GF(2^128) reduction polynomial x^128 + x^7 + x^2 + x + 1.
const RB: u8 = 0x87;

const ZERO_BLOCK: Block = [0u8; BLOCK_SIZE];

/// The two CMAC subkeys derived from a cipher key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Subkeys {
    pub k1: Block,
    pub k2: Block,
}

/// Multiply a 128-bit big-endian value by x in GF(2^128).
///
/// Shifts left by one bit across all bytes and folds the bit shifted out of
/// byte 0 back in as `0x87` on byte 15. The fold is applied through a mask so
/// the instruction sequence does not depend on the data.
pub fn double_gf128(data: &Block) -> Block {
    let mut out = ZERO_BLOCK;
    let mut carry = 0u8;
    for i in (0..BLOCK_SIZE).rev() {
        out[i] = (data[i] << 1) | carry;
        carry = data[i] >> 7;
    }

    // 0xFF when the top bit was set, 0x00 otherwise
    let mask = 0u8.wrapping_sub(data[0] >> 7);
    out[BLOCK_SIZE - 1] ^= RB & mask;
    out
}

/// Derive `(K1, K2)` for an AES-128 key.
pub fn derive_subkeys(key: &[u8]) -> Result<Subkeys> {
    let cipher = new_cipher(key)?;
    Ok(subkeys_for(&cipher))
}

/// Compute the CMAC of a zero- or one-block message.
pub fn block_cmac(key: &[u8], message: &[u8]) -> Result<Block> {
    BlockCmac::compute(key, message).map(|computation| computation.mac)
}

/// Every intermediate value of a single block CMAC computation.
///
/// Kept around so a verification trace can show each step.
pub struct BlockCmac {
    pub subkeys: Subkeys,
    /// Chaining value before the final block (always zero here).
    pub iv: Block,
    /// The message block as fed in, padded when the message was empty.
    pub block: Block,
    /// `block` XOR the selected subkey.
    pub last_block: Block,
    pub mac: Block,
}

impl BlockCmac {
    /// Run the computation, checking preconditions before touching the cipher.
    pub fn compute(key: &[u8], message: &[u8]) -> Result<Self> {
        if message.len() != BLOCK_SIZE && !message.is_empty() {
            return Err(SdmError::BlockLength(message.len()));
        }

        let cipher = new_cipher(key)?;
        let subkeys = subkeys_for(&cipher);

        let (block, last_block) = if message.len() == BLOCK_SIZE {
            let mut block = ZERO_BLOCK;
            block.copy_from_slice(message);
            (block, xor(&block, &subkeys.k1))
        } else {
            let block = pad(message);
            (block, xor(&block, &subkeys.k2))
        };

        let iv = ZERO_BLOCK;
        let mac = encrypt_block(&cipher, &xor(&last_block, &iv));

        Ok(Self {
            subkeys,
            iv,
            block,
            last_block,
            mac,
        })
    }
}

fn new_cipher(key: &[u8]) -> Result<Aes128> {
    Aes128::new_from_slice(key).map_err(|_| SdmError::KeyLength(key.len()))
}

fn subkeys_for(cipher: &Aes128) -> Subkeys {
    let mut l = encrypt_block(cipher, &ZERO_BLOCK);
    let k1 = double_gf128(&l);
    let k2 = double_gf128(&k1);
    l.zeroize();
    Subkeys { k1, k2 }
}

fn encrypt_block(cipher: &Aes128, block: &Block) -> Block {
    let mut out = *block;
    cipher.encrypt_block((&mut out).into());
    out
}

/// Append `0x80` then zeros up to one block. Caller guarantees `len < 16`.
fn pad(message: &[u8]) -> Block {
    let mut block = ZERO_BLOCK;
    block[..message.len()].copy_from_slice(message);
    block[message.len()] = 0x80;
    block
}

fn xor(a: &Block, b: &Block) -> Block {
    std::array::from_fn(|i| a[i] ^ b[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_fixed;
    use ::cmac::{Cmac, Mac};

    // RFC 4493 section 4
    const RFC_KEY: &str = "2B7E151628AED2A6ABF7158809CF4F3C";
    const RFC_K1: &str = "FBEED618357133667C85E08F7236A8DE";
    const RFC_K2: &str = "F7DDAC306AE266CCF90BC11EE46D513B";
    const RFC_M16: &str = "6BC1BEE22E409F96E93D7E117393172A";
    const RFC_MAC_EMPTY: &str = "BB1D6929E95937287FA37D129B756746";
    const RFC_MAC_16: &str = "070A16B46B4D4144F79BDD9DD04A287C";

    fn block(hex: &str) -> Block {
        decode_fixed::<BLOCK_SIZE>("test", hex).unwrap()
    }

    fn reference_cmac(key: &[u8], message: &[u8]) -> Block {
        let mut mac = <Cmac<Aes128> as Mac>::new_from_slice(key).unwrap();
        mac.update(message);
        mac.finalize().into_bytes().into()
    }

    #[test]
    fn test_double_without_carry_out_is_plain_shift() {
        let mut input = ZERO_BLOCK;
        input[0] = 0x40;
        input[15] = 0x01;

        let out = double_gf128(&input);

        let mut expected = ZERO_BLOCK;
        expected[0] = 0x80;
        expected[15] = 0x02;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_double_with_carry_out_folds_polynomial() {
        let mut input = ZERO_BLOCK;
        input[0] = 0x80;

        let out = double_gf128(&input);

        let mut expected = ZERO_BLOCK;
        expected[15] = 0x87;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_double_carries_between_bytes() {
        let mut input = ZERO_BLOCK;
        input[15] = 0x80;
        input[8] = 0xFF;

        let out = double_gf128(&input);

        assert_eq!(out[14], 0x01);
        assert_eq!(out[15], 0x00);
        assert_eq!(out[7], 0x01);
        assert_eq!(out[8], 0xFE);
    }

    #[test]
    fn test_rfc4493_subkeys() {
        let subkeys = derive_subkeys(&block(RFC_KEY)).unwrap();
        assert_eq!(subkeys.k1, block(RFC_K1));
        assert_eq!(subkeys.k2, block(RFC_K2));
    }

    #[test]
    fn test_rfc4493_empty_message() {
        let mac = block_cmac(&block(RFC_KEY), &[]).unwrap();
        assert_eq!(mac, block(RFC_MAC_EMPTY));
    }

    #[test]
    fn test_rfc4493_one_block_message() {
        let mac = block_cmac(&block(RFC_KEY), &block(RFC_M16)).unwrap();
        assert_eq!(mac, block(RFC_MAC_16));
    }

    #[test]
    fn test_intermediates_for_one_block() {
        let key = block(RFC_KEY);
        let message = block(RFC_M16);
        let computation = BlockCmac::compute(&key, &message).unwrap();

        assert_eq!(computation.iv, ZERO_BLOCK);
        assert_eq!(computation.block, message);
        assert_eq!(computation.last_block, xor(&message, &block(RFC_K1)));
    }

    #[test]
    fn test_intermediates_for_empty_message() {
        let computation = BlockCmac::compute(&block(RFC_KEY), &[]).unwrap();

        let mut padded = ZERO_BLOCK;
        padded[0] = 0x80;
        assert_eq!(computation.block, padded);
        assert_eq!(computation.last_block, xor(&padded, &block(RFC_K2)));
    }

    #[test]
    fn test_matches_reference_implementation() {
        for _ in 0..32 {
            let key: Block = rand::random();
            let message: Block = rand::random();
            assert_eq!(block_cmac(&key, &message).unwrap(), reference_cmac(&key, &message));
            assert_eq!(block_cmac(&key, &[]).unwrap(), reference_cmac(&key, &[]));
        }
    }

    #[test]
    fn test_rejects_partial_and_multi_block_messages() {
        let key = block(RFC_KEY);
        assert!(matches!(block_cmac(&key, &[0u8; 15]), Err(SdmError::BlockLength(15))));
        assert!(matches!(block_cmac(&key, &[0u8; 32]), Err(SdmError::BlockLength(32))));
    }

    #[test]
    fn test_rejects_wrong_key_length() {
        assert!(matches!(block_cmac(&[0u8; 15], &[]), Err(SdmError::KeyLength(15))));
        assert!(matches!(derive_subkeys(&[0u8; 32]), Err(SdmError::KeyLength(32))));
    }
}
