//! HackDeck Core - Shared types library.
//!
//! This crate provides common types used across all HackDeck components:
//! - `platform` - Public-facing community API
//! - `admin` - Internal administration back-office
//! - `functions` - Transactional email functions
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no document
//! store access, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, sign-in methods,
//!   statuses, and profile completeness scoring

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
