//! HackDeck Store - vendor service clients and repositories.
//!
//! This crate wraps the two managed services the platform is built on:
//!
//! - [`firestore`] - REST client for the document database
//! - [`identity`] - REST client for the managed auth provider, behind the
//!   [`identity::AuthProvider`] trait so auth flows can be driven against an
//!   in-memory fake in tests
//!
//! On top of the clients it provides validated domain records ([`models`])
//! and per-collection repositories ([`db`]). Documents coming off the wire
//! are converted into tagged records at this boundary; malformed documents
//! surface as `RepositoryError::DataCorruption` rather than leaking
//! half-parsed data upward.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod db;
pub mod firestore;
pub mod identity;
pub mod models;
