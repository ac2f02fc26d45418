//! Company registry search adapter.
//!
//! Turns a person/identifier query into an upstream registry request and the
//! upstream's varying response shapes into canonical
//! [`nzbn_core::types::Entity`] values.

pub mod client;
pub mod config;
pub mod normalize;

pub use client::{RegistryClient, RegistryError, RegistrySearch};
pub use config::{AuthStyle, RegistryConfig};
