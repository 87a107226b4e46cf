//! Session authentication primitives.
//!
//! Provides the building blocks the helpdesk service composes into its
//! session lifecycle:
//! - Credential verification (Argon2id)
//! - Typed, HS256-signed access and refresh tokens
//! - An injectable clock for every expiry decision
//!
//! Persistence of the active session lives in the service, not here; this
//! crate is pure computation.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{SystemClock, TokenCodec, TokenConfig, TokenPolicy};
//!
//! let config = TokenConfig {
//!     secret: "secret_key_at_least_32_bytes_long!".to_string(),
//!     policy: TokenPolicy::default(),
//! };
//! let codec = TokenCodec::new(&config, Arc::new(SystemClock)).unwrap();
//!
//! let access = codec.issue_access(42, "Staff", true).unwrap();
//! let claims = codec.verify_access(&access.token).unwrap();
//! assert_eq!(claims.sub, 42);
//! ```

pub mod clock;
pub mod jwt;
pub mod password;

pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::AccessClaims;
pub use jwt::IssuedToken;
pub use jwt::RefreshClaims;
pub use jwt::SessionClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenConfig;
pub use jwt::TokenError;
pub use jwt::TokenPolicy;
pub use password::PasswordError;
pub use password::PasswordHasher;
