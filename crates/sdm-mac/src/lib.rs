//! Verification of NTAG "Secure Dynamic Messaging" (SDM / SUN) URLs.
//!
//! A tag configured for SDM mirrors its UID, its read counter and a truncated
//! MAC into every URL it emits. This crate recomputes that MAC from the UID,
//! the counter and the 16-byte master key, and reports whether it matches.
//!
//! # Algorithm
//!
//! 1. `SV2 = 3CC300010080 || UID || counter`
//! 2. `session_key = AES-CMAC(master_key, SV2)`
//! 3. `mac = AES-CMAC(session_key, "")`
//! 4. `SDMMAC = mac[1] || mac[3] || ... || mac[15]`
//!
//! Only zero- and one-block messages ever reach CMAC, so [`cmac`] implements
//! exactly those two cases on top of AES-128.
//!
//! # Security Features
//!
//! - Master key and CMAC subkeys are zeroized on drop
//! - Constant-time comparison of the computed and supplied MAC
//! - The key never appears in `Debug` output; the trace that shows it is opt-in
//!
//! # Example
//!
//! ```rust
//! use sdm_mac::{MasterKey, VerifierConfig, verify};
//!
//! let key = MasterKey::from_hex("E4DAE5DB65C91EFDF74EF3EBA21B36C3").unwrap();
//! let config = VerifierConfig::new(key);
//!
//! let result = verify("048D58D2142290", "00000A", "82E278C1118CEE2F", &config).unwrap();
//! assert!(result.matched());
//! ```

pub mod cmac;
pub mod codec;
mod config;
mod data;
mod error;
mod key;
pub mod sdmmac;
pub mod sv2;
mod verify;

// Public re-exports
pub use config::VerifierConfig;
pub use data::{Trace, Verification};
pub use error::{ErrorKind, Result, SdmError};
pub use key::{KEY_LEN, MasterKey};
pub use sdmmac::Sdmmac;
pub use sv2::SessionVector;
pub use verify::{verify, verify_params};
