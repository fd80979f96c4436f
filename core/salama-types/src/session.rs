//! The signed-in user session.

use crate::codes::EmailAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A verified user session.
///
/// Created when identity verification succeeds (OTP or third-party login)
/// and persisted locally so the account view survives a reload. The server
/// owns the actual identity; this is only the client-side record of who is
/// signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Verified email address.
    pub email: EmailAddress,
    /// When the session was established.
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for a freshly verified email.
    #[must_use]
    pub fn new(email: EmailAddress) -> Self {
        Self {
            email,
            logged_in_at: Utc::now(),
        }
    }
}
