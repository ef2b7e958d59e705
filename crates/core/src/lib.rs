//! Core business logic for Kassa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Everything here operates on snapshots handed in by the storage layer.
//!
//! # Modules
//!
//! - `account` - Account snapshots, numbering, and open/close rules
//! - `transfer` - Transfer validation, failure taxonomy, and feasibility previews

pub mod account;
pub mod transfer;
