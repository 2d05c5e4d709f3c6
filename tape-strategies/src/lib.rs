//! Tape Strategies - Example Strategies for the Replay Simulator
//!
//! Reference implementations of the `tape_core::strategy::Strategy` contract.
//! Both run on their own worker thread, receive events through their mailbox,
//! and submit orders with the causing event's arrival timestamp as the
//! decision time.
//!
//! ## Available strategies
//!
//! ### [`FirstQuoteTaker`]
//!
//! Fires a single market order at the first quote it sees for its symbol
//! with liquidity on the opposite side, then goes quiet. Useful as a smoke
//! test of the full order path: it exercises submission, acknowledgement,
//! fill and metrics in one shot.
//!
//! ### [`MeanReversion`]
//!
//! Tracks a rolling mid-price average and leans against deviations: when the
//! mid stretches more than a configured number of basis points away from the
//! average, it sends a market order back toward it, then observes a cooldown
//! before re-arming.

pub mod first_quote_taker;
pub mod mean_reversion;

pub use first_quote_taker::FirstQuoteTaker;
pub use mean_reversion::{MeanReversion, MeanReversionParams};
