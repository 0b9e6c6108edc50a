//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BackstopConfig (validated)
//!     → gateway holds defaults behind arc-swap; per-call
//!       CallOverrides merge on top at call time
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Per-call overrides never mutate the shared defaults

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BackstopConfig;
pub use schema::CallConfig;
pub use schema::CallOverrides;
pub use schema::RateLimitConfig;
