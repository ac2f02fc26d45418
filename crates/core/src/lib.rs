//! Domain model, error taxonomy and field mapping for the registry-to-CRM
//! import service.
//!
//! This crate has no I/O. Transport crates (`nzbn-registry`, `nzbn-crm`)
//! and the import pipeline build on these types.

pub mod error;
pub mod field_mapping;
pub mod mapper;
pub mod types;
