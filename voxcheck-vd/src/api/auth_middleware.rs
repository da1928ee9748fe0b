//! Authentication middleware for voxcheck-vd
//!
//! Installed with `route_layer` on the detection routes only; `/health`
//! stays open. The check itself is an `AuthStrategy` so deployments can
//! swap API-key auth for none (or something else) without touching the
//! router.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use voxcheck_common::api::{key_digest, validate_api_key, ApiAuthError, KeyDigest};

use crate::error::ApiError;

/// Decides whether a request may proceed, from its headers alone
pub trait AuthStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn authenticate(&self, headers: &HeaderMap) -> Result<(), ApiAuthError>;
}

/// Static shared key in a request header
pub struct ApiKeyAuth {
    header: HeaderName,
    digest: KeyDigest,
}

impl ApiKeyAuth {
    pub fn new(header: &str, key: &str) -> voxcheck_common::Result<Self> {
        let header = HeaderName::from_bytes(header.trim().as_bytes()).map_err(|e| {
            voxcheck_common::Error::Config(format!("Invalid API key header '{}': {}", header, e))
        })?;

        Ok(Self {
            header,
            digest: key_digest(key),
        })
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl AuthStrategy for ApiKeyAuth {
    fn name(&self) -> &'static str {
        "api-key"
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<(), ApiAuthError> {
        // A non-UTF-8 header value cannot match any configured key
        let presented = match headers.get(&self.header) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| ApiAuthError::InvalidKey)?),
        };
        validate_api_key(presented, &self.digest)
    }
}

/// Accepts every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthStrategy for NoAuth {
    fn name(&self) -> &'static str {
        "none"
    }

    fn authenticate(&self, _headers: &HeaderMap) -> Result<(), ApiAuthError> {
        Ok(())
    }
}

// ============================================================================
// Tower Layer Implementation
// ============================================================================

/// Tower layer applying an `AuthStrategy`
#[derive(Clone)]
pub struct AuthLayer {
    strategy: Arc<dyn AuthStrategy>,
}

impl AuthLayer {
    pub fn new(strategy: Arc<dyn AuthStrategy>) -> Self {
        Self { strategy }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            strategy: Arc::clone(&self.strategy),
        }
    }
}

/// Tower service that rejects unauthenticated requests with 401
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    strategy: Arc<dyn AuthStrategy>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let strategy = Arc::clone(&self.strategy);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if let Err(reason) = strategy.authenticate(request.headers()) {
                tracing::warn!(
                    strategy = strategy.name(),
                    path = request.uri().path(),
                    %reason,
                    "Rejected unauthenticated request"
                );
                return Ok(ApiError::Unauthorized.into_response());
            }

            inner.call(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: &'static str, value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn test_api_key_auth() {
        let auth = ApiKeyAuth::new("x-api-key", "sk_test_123456789").unwrap();

        assert!(auth.authenticate(&headers("x-api-key", "sk_test_123456789")).is_ok());
        assert_eq!(
            auth.authenticate(&headers("x-api-key", "nope")),
            Err(ApiAuthError::InvalidKey)
        );
        assert_eq!(auth.authenticate(&HeaderMap::new()), Err(ApiAuthError::MissingKey));
    }

    #[test]
    fn test_custom_header_name() {
        let auth = ApiKeyAuth::new("X-Voxcheck-Key", "k").unwrap();
        assert_eq!(auth.header().as_str(), "x-voxcheck-key");
        assert!(auth.authenticate(&headers("x-voxcheck-key", "k")).is_ok());
        assert!(auth.authenticate(&headers("x-api-key", "k")).is_err());
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        assert!(matches!(
            ApiKeyAuth::new("bad header", "k"),
            Err(voxcheck_common::Error::Config(_))
        ));
    }

    #[test]
    fn test_no_auth_accepts_everything() {
        assert!(NoAuth.authenticate(&HeaderMap::new()).is_ok());
    }
}
