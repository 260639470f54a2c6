//! Session credential library
//!
//! Provides scoped credential storage, the exemption allow-list, and the
//! refresh-endpoint wire call for the session client. This crate is a
//! standalone leaf library with no knowledge of the request pipeline,
//! so it can be tested and used independently.
//!
//! Credential flow:
//! 1. A login layer obtains a token pair and stores it via
//!    `store::CredentialStore::set()`
//! 2. The session client reads the access token at request time via
//!    `store::CredentialStore::get()`
//! 3. On auth expiry the client calls `token::refresh_session()` with the
//!    stored refresh token
//! 4. The replacement pair is persisted via `store::CredentialStore::set()`
//! 5. On unrecoverable refresh failure the scope is wiped via
//!    `store::CredentialStore::clear()`

pub mod error;
pub mod exempt;
pub mod store;
pub mod token;

pub use error::{Error, Result};
pub use exempt::ExemptionPolicy;
pub use store::{CredentialPair, CredentialStore};
pub use token::{RefreshEnvelope, refresh_session};
