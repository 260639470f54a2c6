//! Exemption allow-list
//!
//! Credential-issuing endpoints (login, registration, password reset) and
//! the refresh endpoint itself must never carry a bearer header and must
//! never trigger the refresh flow, even on 401/403. Without this the
//! refresh endpoint could recurse into itself, and stale tokens would
//! leak into credential-issuing calls.

/// Default exempt path fragments for end-user scopes.
const USER_EXEMPT: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/password-reset",
    "/auth/refresh",
];

/// Default exempt path fragments for the administrative scope, which has
/// no self-service registration or password reset surface.
const ADMIN_EXEMPT: &[&str] = &["/auth/login", "/auth/refresh"];

/// Pure predicate deciding whether a request path skips auth handling.
///
/// Matching is substring-based: a fragment like `/auth/login` exempts
/// both `/auth/login` and `/admin/auth/login`.
#[derive(Debug, Clone)]
pub struct ExemptionPolicy {
    fragments: Vec<String>,
}

impl ExemptionPolicy {
    /// Policy with an explicit allow-list.
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    /// Default allow-list for a scope: the admin scope exempts login and
    /// refresh; every other scope additionally exempts registration and
    /// password reset.
    pub fn for_scope(scope: &str) -> Self {
        let defaults = if scope == "admin" {
            ADMIN_EXEMPT
        } else {
            USER_EXEMPT
        };
        Self::new(defaults.iter().map(|s| s.to_string()).collect())
    }

    /// Whether the given request path must skip token attachment and
    /// refresh handling.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.fragments.iter().any(|f| path.contains(f.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_defaults_cover_credential_endpoints() {
        let policy = ExemptionPolicy::for_scope("user");
        assert!(policy.is_exempt("/auth/login"));
        assert!(policy.is_exempt("/auth/register"));
        assert!(policy.is_exempt("/auth/password-reset"));
        assert!(policy.is_exempt("/auth/refresh"));
        assert!(!policy.is_exempt("/widgets"));
        assert!(!policy.is_exempt("/diaries/42"));
    }

    #[test]
    fn admin_defaults_exclude_registration() {
        let policy = ExemptionPolicy::for_scope("admin");
        assert!(policy.is_exempt("/admin/auth/login"));
        assert!(policy.is_exempt("/admin/auth/refresh"));
        assert!(!policy.is_exempt("/auth/register"));
        assert!(!policy.is_exempt("/admin/notices"));
    }

    #[test]
    fn matching_is_substring_based() {
        let policy = ExemptionPolicy::for_scope("user");
        assert!(policy.is_exempt("/api/v2/auth/login?next=/home"));
    }

    #[test]
    fn custom_allow_list_replaces_defaults() {
        let policy = ExemptionPolicy::new(vec!["/public".into()]);
        assert!(policy.is_exempt("/public/status"));
        assert!(!policy.is_exempt("/auth/login"));
    }
}
