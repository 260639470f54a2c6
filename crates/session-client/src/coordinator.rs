//! Refresh coordination
//!
//! The core of the session layer: at most one refresh call is in flight
//! per client at any time. The first caller to observe an expired token
//! becomes the leader and performs the network refresh; callers arriving
//! while it runs park on a oneshot channel and receive the leader's
//! result. On failure everyone gets the same error, the scope's
//! credentials are cleared, and the session-expired signal fires exactly
//! once, no matter how many callers were waiting.
//!
//! The check-and-set on `in_flight` happens synchronously under a
//! `std::sync::Mutex` with no await inside the critical section, so two
//! callers can never both observe "not in flight" and both start a
//! refresh. The lock is never held across an await point.

use std::sync::Mutex;
use std::time::Duration;

use session_auth::{CredentialStore, token};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::SessionError;

type TokenResult = Result<String, SessionError>;

/// Fired once when a refresh fails and the session is invalidated.
/// Carries where the caller should send the user next.
#[derive(Debug, Clone)]
pub struct SessionExpired {
    pub scope: String,
    pub login_path: String,
}

/// Callback invoked on session invalidation.
pub type SessionListener = dyn Fn(SessionExpired) + Send + Sync;

/// Per-scope refresh state: the in-flight flag is the mutex, the waiters
/// are the callers queued behind it. Waiters are non-empty only while a
/// refresh is in flight; both reset together when it settles.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<TokenResult>>,
}

/// Everything the leader needs to perform one refresh cycle.
pub(crate) struct RefreshContext<'a> {
    pub http: &'a reqwest::Client,
    pub store: &'a CredentialStore,
    pub scope: &'a str,
    pub base_url: &'a str,
    pub refresh_path: &'a str,
    pub login_path: &'a str,
    pub timeout: Duration,
    pub listener: Option<&'a SessionListener>,
}

/// Serializes refresh attempts for one client instance.
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Obtain a fresh access token after an auth failure.
    ///
    /// Either leads a refresh or queues behind the in-flight one. All
    /// callers of one cycle settle with the same result.
    pub async fn fresh_access_token(&self, ctx: &RefreshContext<'_>) -> TokenResult {
        // Synchronous check-and-set: no await between observing
        // `in_flight` and claiming it.
        let waiter = {
            // A poisoned lock only means a panicked waiter push; the
            // state itself is still coherent.
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!(scope = ctx.scope, "refresh already in flight, queueing");
            return match rx.await {
                Ok(result) => result,
                // Leader dropped without settling (task cancelled)
                Err(_) => Err(SessionError::RefreshFailed {
                    scope: ctx.scope.to_string(),
                    message: "refresh was abandoned".into(),
                }),
            };
        }

        let result = self.run_refresh(ctx).await;

        // Settle: reset state and take the queue in one critical section.
        let waiters = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        debug!(
            scope = ctx.scope,
            waiters = waiters.len(),
            ok = result.is_ok(),
            "refresh settled, draining queue"
        );
        for tx in waiters {
            // A waiter that timed out and dropped its receiver is fine
            let _ = tx.send(result.clone());
        }

        if result.is_err() {
            self.invalidate_session(ctx).await;
        }

        result
    }

    /// The leader's refresh cycle: read the stored refresh token, call
    /// the endpoint (bypassing the interceptor pipeline), persist the
    /// replacement pair.
    async fn run_refresh(&self, ctx: &RefreshContext<'_>) -> TokenResult {
        let Some(pair) = ctx.store.get(ctx.scope).await else {
            // Nothing to refresh with: fail fast, zero network calls
            warn!(scope = ctx.scope, "auth expired but no refresh token stored");
            return Err(SessionError::RefreshFailed {
                scope: ctx.scope.to_string(),
                message: "no refresh token stored".into(),
            });
        };

        info!(scope = ctx.scope, "access token expired, refreshing session");
        match token::refresh_session(
            ctx.http,
            ctx.base_url,
            ctx.refresh_path,
            pair.refresh.expose(),
            ctx.timeout,
        )
        .await
        {
            Ok(new_pair) => {
                let access = new_pair.access.expose().clone();
                // Persistence failure is not fatal: the in-memory pair
                // was not replaced, but the fresh token is still valid
                // for the retries about to happen.
                if let Err(e) = ctx.store.set(ctx.scope, new_pair).await {
                    warn!(scope = ctx.scope, error = %e, "failed to persist refreshed credentials");
                }
                info!(scope = ctx.scope, "session refresh succeeded");
                Ok(access)
            }
            Err(e) => Err(SessionError::RefreshFailed {
                scope: ctx.scope.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Clear the scope's credentials and fire the signal. Runs only in
    /// the leader, after the queue has drained, so it happens exactly
    /// once per failed refresh cycle.
    async fn invalidate_session(&self, ctx: &RefreshContext<'_>) {
        ctx.store.clear(ctx.scope).await;
        warn!(
            scope = ctx.scope,
            login_path = ctx.login_path,
            "session invalidated, credentials cleared"
        );
        if let Some(listener) = ctx.listener {
            listener(SessionExpired {
                scope: ctx.scope.to_string(),
                login_path: ctx.login_path.to_string(),
            });
        }
    }
}
