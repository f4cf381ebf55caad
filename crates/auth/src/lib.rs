//! `classroll-auth`: identity, credentials and session tokens.
//!
//! This crate is decoupled from HTTP and storage: it knows how to validate a
//! signup, hash and verify passwords, and mint/verify session tokens.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use token::{Hs256Tokens, TokenError, TokenIssuer, TokenValidator};
pub use user::{NewUser, User, UserProfile};
