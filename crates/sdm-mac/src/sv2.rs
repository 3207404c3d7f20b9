//! Session vector 2 (SV2) construction.
//!
//! SV2 = `3C C3 00 01 00 80 || UID (7 bytes) || counter (3 bytes)`, one AES
//! block. The `3C C3` prefix marks MAC session key derivation.

use crate::cmac::{BLOCK_SIZE, Block};
use crate::codec::{bytes_to_hex, decode_fixed};
use crate::error::Result;

/// Fixed six-byte SV2 header.
pub const SV2_PREFIX: [u8; 6] = [0x3C, 0xC3, 0x00, 0x01, 0x00, 0x80];

/// Tag UID length in bytes.
pub const UID_LEN: usize = 7;

/// SDM read counter length in bytes.
pub const CTR_LEN: usize = 3;

/// The 16-byte block MACed with the master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionVector(Block);

impl SessionVector {
    /// Build SV2 from the `uid` (14 hex chars) and `ctr` (6 hex chars) URL values.
    pub fn build(uid: &str, ctr: &str) -> Result<Self> {
        let uid = decode_fixed::<UID_LEN>("uid", uid)?;
        let ctr = decode_fixed::<CTR_LEN>("ctr", ctr)?;
        Ok(Self::from_parts(&uid, &ctr))
    }

    pub fn from_parts(uid: &[u8; UID_LEN], ctr: &[u8; CTR_LEN]) -> Self {
        let mut sv2 = [0u8; BLOCK_SIZE];
        sv2[..SV2_PREFIX.len()].copy_from_slice(&SV2_PREFIX);
        sv2[SV2_PREFIX.len()..SV2_PREFIX.len() + UID_LEN].copy_from_slice(uid);
        sv2[BLOCK_SIZE - CTR_LEN..].copy_from_slice(&format_counter(ctr));
        Self(sv2)
    }

    pub fn as_bytes(&self) -> &Block {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

/// Reformat the counter as deployed validators do: drop the first two bytes
/// of the value as supplied and append two zero bytes.
///
/// For a big-endian counter below 256 this equals the little-endian encoding
/// the tag MACs. Larger counters lose their upper bytes, so counters that
/// differ only there share one SV2.
fn format_counter(ctr: &[u8; CTR_LEN]) -> [u8; CTR_LEN] {
    [ctr[2], 0x00, 0x00]
}
