//! Transport-free state for the marketplace front-ends.
//!
//! Nothing here performs I/O: views hand out tickets for the requests to
//! make and take the answers back, so the same logic drives the browser app,
//! the CLI and the tests.

pub mod admin;
pub mod auth_form;
pub mod browse;
pub mod detail;
pub mod error;
pub mod format;
pub mod images;
pub mod listing_form;
pub mod models;
pub mod profile;
pub mod request;
pub mod routes;
pub mod session;

pub use error::{ApiError, FieldErrors};
pub use models::*;
pub use request::{Generation, LoadState, RequestCounter};
pub use routes::{guard, guard_route, Capability, GuardDecision, Route};
pub use session::{MemoryTokenStore, Session, SessionState, TokenStore, TokenStoreError};
