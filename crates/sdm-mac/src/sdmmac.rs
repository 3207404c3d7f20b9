//! Second-stage MAC and truncation to the 8-byte SDMMAC.

use crate::cmac::{Block, BlockCmac};
use crate::codec::bytes_to_hex;
use crate::error::Result;

/// SDMMAC length in bytes.
pub const SDMMAC_LEN: usize = 8;

/// The truncated MAC carried in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sdmmac([u8; SDMMAC_LEN]);

impl Sdmmac {
    pub fn as_bytes(&self) -> &[u8; SDMMAC_LEN] {
        &self.0
    }

    /// 16 uppercase hex characters.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

/// Output of the second stage.
pub struct SdmmacDerivation {
    /// CMAC of the empty message under the session key.
    pub stage: BlockCmac,
    pub sdmmac: Sdmmac,
}

/// Derive the SDMMAC from the first-stage MAC.
///
/// The first-stage MAC is the session key: the empty message is MACed under
/// it (padding plus K2'), and the odd-indexed bytes of the result are kept.
pub fn derive(full_cmac: &Block) -> Result<SdmmacDerivation> {
    let stage = BlockCmac::compute(full_cmac, &[])?;
    let sdmmac = Sdmmac(truncate(&stage.mac));
    Ok(SdmmacDerivation { stage, sdmmac })
}

/// Keep bytes 1, 3, 5, 7, 9, 11, 13, 15 in order.
pub fn truncate(mac: &Block) -> [u8; SDMMAC_LEN] {
    std::array::from_fn(|i| mac[2 * i + 1])
}
