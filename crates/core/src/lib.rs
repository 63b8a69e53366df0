//! `ordertally-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod id;
pub mod money;

pub use id::{CustomerId, OrderId, Sku};
pub use money::{format_amount, round_to_cents};
