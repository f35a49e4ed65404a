//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{Tolerance, headroom, round_money};
