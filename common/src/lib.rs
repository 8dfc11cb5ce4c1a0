//! Ratewarden Common Types
//!
//! This crate contains the types shared across the Ratewarden workspace:
//! currency codes, exchange-rate snapshots, historical series with their
//! pagination window, and the timing constants used by the cache and the
//! upstream resilience policy.

pub mod currency;
pub mod rates;
pub mod time;

pub use currency::*;
pub use rates::*;
pub use time::*;
