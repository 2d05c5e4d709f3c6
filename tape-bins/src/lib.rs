//! Shared plumbing for the tape binaries

pub mod common;
