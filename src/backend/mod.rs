//! Remote backend client subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway attempt:
//!     → http.rs (one HTTP round-trip per call)
//!         REST: /rest/{resource} with query.rs filter params
//!         Auth: /auth/{signin,signup,signout,me} envelope
//!     → session.rs (adopted session, bearer source,
//!       auth-change subscriptions)
//! ```
//!
//! The backend is an opaque network dependency: it can be slow,
//! rate-limited, or transiently down. Nothing in this module retries or
//! caches — resilience wraps around it at the gateway.

pub mod http;
pub mod query;
pub mod session;
pub mod types;

pub use http::BackendClient;
pub use query::{Filter, FilterValue};
pub use session::{AuthState, SessionStore, SubscriptionId};
pub use types::{BackendError, BackendResult, Credentials, Session};
