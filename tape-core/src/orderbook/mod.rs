//! Top-of-book state
//!
//! The simulator models exactly one resting level per side: its value is
//! event ordering and latency accounting, not depth microstructure. Quotes
//! overwrite the book; matches consume liquidity from it.

pub mod top_of_book;

pub use top_of_book::{BookStore, Level, TopOfBook};
