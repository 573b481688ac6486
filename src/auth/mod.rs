//! Session and credential management for the admin dashboard.
//!
//! This module provides:
//! - `SessionStore`: a shared, persisted cell holding the bearer token
//! - `CredentialVault`: OS-keychain storage for remembered logins
//!
//! The session is written only on login and on the unauthorized-logout
//! path; every request reads it through the same shared cell.

pub mod credentials;
pub mod session;

pub use credentials::CredentialVault;
pub use session::{SessionData, SessionStore};
