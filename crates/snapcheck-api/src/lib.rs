//! Protocol and domain types for the snapcheck backend API
//!
//! This crate defines:
//! - Domain types the engine operates on (device snapshots, usage records,
//!   lock state, session)
//! - Wire types matching the backend's JSON bodies exactly
//! - Conversions from domain to wire form (all formatting rules live here)

mod types;
mod wire;

pub use types::*;
pub use wire::*;
