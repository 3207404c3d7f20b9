//! SDM URL verification with constant-time comparison.

use subtle::ConstantTimeEq;

use crate::cmac::BlockCmac;
use crate::codec::{bytes_to_hex, decode_fixed};
use crate::config::VerifierConfig;
use crate::data::{Trace, Verification};
use crate::error::{Result, SdmError};
use crate::sdmmac::{self, SDMMAC_LEN, SdmmacDerivation};
use crate::sv2::SessionVector;

/// Verify the `uid`, `ctr` and `cmac` values of an SDM URL.
///
/// This function:
/// 1. Checks all three values are present and well-formed hex
/// 2. Builds SV2 and MACs it with the master key (the session key)
/// 3. MACs the empty message with the session key and truncates it
/// 4. Compares the result with `provided_mac`
///
/// # Returns
/// * `Ok(v)` with `v.matched() == true` if the MAC is genuine
/// * `Ok(v)` with `v.matched() == false` if it is not
/// * `Err` if an input is missing or malformed; no cipher work is done then
pub fn verify(
    uid: &str,
    ctr: &str,
    provided_mac: &str,
    config: &VerifierConfig,
) -> Result<Verification> {
    let uid = required("uid", uid)?;
    let ctr = required("ctr", ctr)?;
    let provided_mac = required("cmac", provided_mac)?;

    let sv2 = SessionVector::build(uid, ctr)?;
    decode_fixed::<SDMMAC_LEN>("cmac", provided_mac)?;

    let first = BlockCmac::compute(config.master_key.as_bytes(), sv2.as_bytes())?;
    let second = sdmmac::derive(&first.mac)?;

    let sdmmac = second.sdmmac.to_hex();
    let matched = macs_equal(&sdmmac, provided_mac);
    log::debug!("uid {} ctr {} matched={}", uid, ctr, matched);

    let trace = config
        .include_trace
        .then(|| build_trace(config, &sv2, &first, &second));

    Ok(Verification::new(
        matched,
        sdmmac,
        provided_mac.to_string(),
        sv2.to_hex(),
        bytes_to_hex(&first.mac),
        trace,
    ))
}

/// Like [`verify`], for values pulled out of a query string where any of
/// them may be absent.
pub fn verify_params(
    uid: Option<&str>,
    ctr: Option<&str>,
    provided_mac: Option<&str>,
    config: &VerifierConfig,
) -> Result<Verification> {
    verify(
        uid.ok_or(SdmError::MissingParameter("uid"))?,
        ctr.ok_or(SdmError::MissingParameter("ctr"))?,
        provided_mac.ok_or(SdmError::MissingParameter("cmac"))?,
        config,
    )
}

fn required<'a>(name: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(SdmError::MissingParameter(name));
    }
    Ok(value)
}

/// Exact, case-sensitive equality that does not short-circuit on content.
fn macs_equal(computed: &str, provided: &str) -> bool {
    computed.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn build_trace(
    config: &VerifierConfig,
    sv2: &SessionVector,
    first: &BlockCmac,
    second: &SdmmacDerivation,
) -> Trace {
    let cmac_calculation = vec![
        format!("1. SV2 construction: {}", sv2.to_hex()),
        format!("2. Master key: {}", config.master_key.to_hex()),
        format!("3. Subkey K1: {}", bytes_to_hex(&first.subkeys.k1)),
        format!("3. Subkey K2: {}", bytes_to_hex(&first.subkeys.k2)),
        format!("4. Initialization vector X: {}", bytes_to_hex(&first.iv)),
        format!("5. Processing block 1: {}", bytes_to_hex(&first.block)),
        format!(
            "6. Last block (XOR with K1): {}",
            bytes_to_hex(&first.last_block)
        ),
        format!("7. Final CMAC: {}", bytes_to_hex(&first.mac)),
    ];

    let sdmmac_calculation = vec![
        format!("1. Using CMAC as key: {}", bytes_to_hex(&first.mac)),
        format!(
            "2. Empty message padded: {} (XOR with K2: {})",
            bytes_to_hex(&second.stage.block),
            bytes_to_hex(&second.stage.last_block)
        ),
        format!(
            "3. CMAC of empty message: {}",
            bytes_to_hex(&second.stage.mac)
        ),
        format!("4. Extracted SDMMAC: {}", second.sdmmac.to_hex()),
    ];

    Trace {
        cmac_calculation,
        sdmmac_calculation,
    }
}
