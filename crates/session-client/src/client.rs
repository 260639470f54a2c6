//! Session client composition root
//!
//! Wires the interceptor, classifier, refresh coordinator, and retry
//! dispatch into one callable session object. Data flows one direction
//! per call: interceptor → transport → (success: return) / (failure:
//! classifier → coordinator → one retry → transport again).
//!
//! The retry-at-most-once invariant is enforced structurally: the
//! pipeline has exactly one retry branch and the retry's own auth
//! failure propagates as final instead of re-entering the coordinator.
//! There is no loop and no mutable retried flag to get wrong.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use session_auth::{CredentialStore, ExemptionPolicy};
use tracing::debug;

use crate::classify::classify;
use crate::config::SessionConfig;
use crate::coordinator::{RefreshContext, RefreshCoordinator, SessionExpired, SessionListener};
use crate::error::SessionResult;
use crate::intercept::RequestInterceptor;

/// One outgoing call attempt: everything needed to send it, and to send
/// it again. Owned by a single pipeline pass.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// An authenticated HTTP session for one scope.
///
/// Owns its refresh coordinator, so two clients never share refresh
/// state even when they share a credential store.
pub struct Client {
    http: reqwest::Client,
    config: SessionConfig,
    store: Arc<CredentialStore>,
    policy: ExemptionPolicy,
    coordinator: RefreshCoordinator,
    listener: Option<Box<SessionListener>>,
}

impl Client {
    /// Build a client from a validated config and a (possibly shared)
    /// credential store.
    pub fn new(config: SessionConfig, store: Arc<CredentialStore>) -> Self {
        let policy = match &config.exempt_paths {
            Some(paths) => ExemptionPolicy::new(paths.clone()),
            None => ExemptionPolicy::for_scope(&config.scope),
        };
        Self {
            http: reqwest::Client::new(),
            config,
            store,
            policy,
            coordinator: RefreshCoordinator::new(),
            listener: None,
        }
    }

    /// Install a callback fired once per failed refresh cycle, carrying
    /// the scope and its login entry path.
    pub fn with_session_listener(
        mut self,
        listener: impl Fn(SessionExpired) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn scope(&self) -> &str {
        &self.config.scope
    }

    pub async fn get(&self, path: &str) -> SessionResult<reqwest::Response> {
        self.request(RequestDescriptor::new(Method::GET, path)).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> SessionResult<reqwest::Response> {
        self.request(RequestDescriptor::new(Method::POST, path).with_body(body))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> SessionResult<reqwest::Response> {
        self.request(RequestDescriptor::new(Method::PUT, path).with_body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> SessionResult<reqwest::Response> {
        self.request(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    /// Run one request through the full pipeline.
    pub async fn request(&self, descriptor: RequestDescriptor) -> SessionResult<reqwest::Response> {
        let exempt = self.policy.is_exempt(&descriptor.path);

        let interceptor = RequestInterceptor {
            store: &self.store,
            policy: &self.policy,
            scope: &self.config.scope,
        };
        let bearer = interceptor.bearer_for(&descriptor.path).await;

        let outcome = self.send(&descriptor, bearer.as_deref()).await;
        match classify(outcome, exempt).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_auth_expired() => {
                // Classifier only yields AuthExpired for non-exempt
                // requests, so the refresh flow cannot recurse through
                // credential endpoints.
                debug!(
                    scope = %self.config.scope,
                    path = %descriptor.path,
                    "auth expired, entering refresh flow"
                );
                let fresh = self
                    .coordinator
                    .fresh_access_token(&self.refresh_context())
                    .await?;
                self.retry_once(&descriptor, &fresh).await
            }
            Err(err) => Err(err),
        }
    }

    /// Replay the original request exactly once with the fresh token.
    ///
    /// The token is injected directly rather than re-read from the store
    /// mid-transition, and a second auth failure classifies as final;
    /// it never re-enters the coordinator.
    async fn retry_once(
        &self,
        descriptor: &RequestDescriptor,
        access_token: &str,
    ) -> SessionResult<reqwest::Response> {
        debug!(path = %descriptor.path, "retrying with refreshed token");
        let outcome = self.send(descriptor, Some(access_token)).await;
        classify(outcome, false).await
    }

    /// Raw transport send with the per-request wall-clock timeout.
    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            descriptor.path
        );

        let mut request = self
            .http
            .request(descriptor.method.clone(), &url)
            .timeout(self.config.timeout())
            .headers(descriptor.headers.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        request.send().await
    }

    fn refresh_context(&self) -> RefreshContext<'_> {
        RefreshContext {
            http: &self.http,
            store: &self.store,
            scope: &self.config.scope,
            base_url: &self.config.base_url,
            refresh_path: &self.config.refresh_path,
            login_path: &self.config.login_path,
            timeout: self.config.refresh_timeout(),
            listener: self.listener.as_deref(),
        }
    }
}
