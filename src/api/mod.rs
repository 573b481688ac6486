//! REST API client module for the Bayan admin backend.
//!
//! The backend protects state-changing routes with a dual scheme: a
//! bearer token issued by `/api/admin/login` plus a CSRF cookie issued
//! by `/sanctum/csrf-cookie`. `ApiClient` manages both transparently.

pub mod client;
pub mod error;

pub use client::{ApiClient, DashboardSnapshot, UnauthorizedHook};
pub use error::{ApiError, ValidationErrors};
