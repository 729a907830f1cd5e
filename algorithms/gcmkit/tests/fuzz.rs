//! Bolero Fuzz Tests
//!
//! These tests can be run as property tests via `cargo test`
//! or as full fuzz targets via `cargo bolero test [target_name]`.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used)]

/// Fuzz test module
#[cfg(test)]
mod fuzz {
    mod oracle;
    mod roundtrip;
    mod tamper;
}
