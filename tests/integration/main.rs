//! Integration tests for xray-segments.
//!
//! Everything runs in-process. The daemon is stood in for by a UDP socket
//! bound to an ephemeral loopback port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With crate log output
//! RUST_LOG=xray_segments=trace cargo test --test integration -- --nocapture
//! ```

mod common;
mod property_tests;
mod segment_tests;
mod submission_tests;
