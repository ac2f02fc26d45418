//! CRM token and transport gateway.
//!
//! Exchanges a long-lived refresh token for an access token and sends
//! authorized JSON requests to the CRM's record API. The [`CrmGateway`]
//! trait is the seam the import pipeline depends on.

pub mod client;
pub mod config;
pub mod gateway;

pub use client::CrmClient;
pub use config::{CrmConfig, CrmModules};
pub use gateway::{AccessToken, CrmError, CrmGateway, Method};
