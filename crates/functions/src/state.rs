//! Application state shared across handlers.

use std::sync::Arc;

use crate::email::EmailService;

/// Shared state: the SMTP-backed email service.
#[derive(Clone)]
pub struct FnState {
    inner: Arc<EmailService>,
}

impl FnState {
    /// Create the state from a configured email service.
    #[must_use]
    pub fn new(email: EmailService) -> Self {
        Self {
            inner: Arc::new(email),
        }
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner
    }
}
