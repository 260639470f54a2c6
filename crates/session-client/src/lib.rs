//! Authenticated HTTP session client
//!
//! Wraps a `reqwest::Client` in a session layer that attaches the stored
//! bearer token to outgoing requests, renews expired credentials through
//! the refresh endpoint, and classifies failures into a uniform error
//! contract.
//!
//! The hard guarantee lives in [`coordinator`]: when many concurrent
//! requests hit an expired token at once, exactly one refresh call is
//! made; everyone else queues behind it and receives the same renewed
//! token. Each original request is then replayed at most once.
//!
//! Two independently-configured clients (say a "user" session and an
//! "admin" session) never share refresh state: every [`Client`] owns its
//! own coordinator, and the credential store partitions pairs by scope.

pub mod classify;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intercept;

pub use client::{Client, RequestDescriptor};
pub use config::SessionConfig;
pub use coordinator::SessionExpired;
pub use error::{SessionError, SessionResult};

pub use session_auth::{CredentialPair, CredentialStore, ExemptionPolicy};
