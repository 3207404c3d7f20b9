//! HTTP service that checks the SDMMAC mirrored into NTAG424 DNA tag URLs.

pub mod configuration;
pub mod keys;
pub mod metric;
pub mod server;
pub mod validate;
