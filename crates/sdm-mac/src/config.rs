//! Configuration for SDM verification.

use crate::key::MasterKey;

/// Everything a verification needs besides the URL values.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Key the tag derives its session MAC key from.
    pub master_key: MasterKey,
    /// Attach the step-by-step trace (including the master key) to results.
    /// Development only.
    pub include_trace: bool,
}

impl VerifierConfig {
    /// Create a new config for the given key, with tracing off.
    pub fn new(master_key: MasterKey) -> Self {
        Self {
            master_key,
            include_trace: false,
        }
    }

    /// Enable or disable the diagnostic trace.
    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }
}
