//! The SDM MAC master key.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::{bytes_to_hex, decode_fixed};
use crate::error::Result;

/// Length of an AES-128 key in bytes.
pub const KEY_LEN: usize = 16;

/// 16-byte secret shared with the tag. Cleared from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from exactly 32 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self> {
        decode_fixed::<KEY_LEN>("master key", hex.trim()).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Uppercase hex form. Only meant for development traces.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}
