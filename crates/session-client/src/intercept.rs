//! Request interception
//!
//! Decides, before every outgoing request, whether a bearer token should
//! be attached. Purely a read: the interceptor never refreshes. An
//! already-expired token is sent anyway and renewed reactively after the
//! failed call, trading one guaranteed failure for a pipeline with no
//! blocking on the send path.

use session_auth::{CredentialStore, ExemptionPolicy};

/// Read-only view over the store and policy for one scope.
pub(crate) struct RequestInterceptor<'a> {
    pub store: &'a CredentialStore,
    pub policy: &'a ExemptionPolicy,
    pub scope: &'a str,
}

impl RequestInterceptor<'_> {
    /// The bearer token to attach for `path`, if any.
    ///
    /// Exempt paths never get a token, regardless of store contents.
    pub async fn bearer_for(&self, path: &str) -> Option<String> {
        if self.policy.is_exempt(path) {
            return None;
        }
        let pair = self.store.get(self.scope).await?;
        Some(pair.access.expose().clone())
    }
}
