//! Client library for the Bayan admin dashboard.
//!
//! The backend is a REST service protected by a dual authentication
//! scheme: a bearer token issued at login plus a CSRF cookie required on
//! state-changing requests. [`ApiClient`] wraps every call with both,
//! renews an expired CSRF cookie a bounded number of times, and tears
//! the session down globally when the backend reports it dead.
//!
//! ```no_run
//! use bayan_admin::{ApiClient, SessionStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionStore::new("/tmp/bayan".into());
//! let client = ApiClient::new("https://bayan.example", session)?
//!     .with_unauthorized_hook(|| eprintln!("session expired, back to login"));
//!
//! client.login("admin@bayan.example", "secret").await?;
//! let blogs = client.list_blogs().await?;
//! println!("{} posts", blogs.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, DashboardSnapshot, ValidationErrors};
pub use auth::{CredentialVault, SessionData, SessionStore};
pub use config::Config;
