//! Verification results.

/// Outcome of checking one SDM URL.
///
/// A mismatch is still a successful verification; `matched()` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    matched: bool,
    sdmmac: String,
    provided_mac: String,
    sv2: String,
    full_cmac: String,
    trace: Option<Trace>,
}

/// Human-readable computation steps, every value in uppercase hex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub cmac_calculation: Vec<String>,
    pub sdmmac_calculation: Vec<String>,
}

impl Verification {
    pub(crate) fn new(
        matched: bool,
        sdmmac: String,
        provided_mac: String,
        sv2: String,
        full_cmac: String,
        trace: Option<Trace>,
    ) -> Self {
        Self {
            matched,
            sdmmac,
            provided_mac,
            sv2,
            full_cmac,
            trace,
        }
    }

    /// Whether the computed SDMMAC equals the supplied one.
    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Computed SDMMAC, 16 uppercase hex characters.
    pub fn sdmmac(&self) -> &str {
        &self.sdmmac
    }

    /// The MAC exactly as it appeared in the URL.
    pub fn provided_mac(&self) -> &str {
        &self.provided_mac
    }

    pub fn sv2(&self) -> &str {
        &self.sv2
    }

    /// First-stage MAC, i.e. the session key.
    pub fn full_cmac(&self) -> &str {
        &self.full_cmac
    }

    /// Present only when the config asked for it.
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}
