//! Core types for HackDeck.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod completeness;
pub mod email;
pub mod id;
pub mod method;
pub mod status;

pub use completeness::{ProfileFacets, completeness_score};
pub use email::{Email, EmailError};
pub use id::*;
pub use method::{MethodParseError, SignInMethod};
pub use status::*;
