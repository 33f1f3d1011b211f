//! Admin services.

pub mod analytics;
