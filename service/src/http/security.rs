//! Response security headers.
//!
//! The header set is computed once from [`SecurityHeadersConfig`] and shared
//! through an `Extension`. Headers a handler already set are left alone.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
    Extension,
};

use crate::config::SecurityHeadersConfig;

/// Precomputed headers added to every response.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders(HeaderMap);

impl SecurityHeaders {
    /// Values that are not valid header text are skipped with a warning.
    #[must_use]
    pub fn from_config(config: &SecurityHeadersConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));

        let configured = [
            (X_FRAME_OPTIONS, config.frame_options.to_uppercase()),
            (
                CONTENT_SECURITY_POLICY,
                config.content_security_policy.clone(),
            ),
            (REFERRER_POLICY, config.referrer_policy.clone()),
        ];
        for (name, value) in configured {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::warn!(header = %name, "skipping invalid security header value"),
            }
        }

        // Only meaningful behind HTTPS
        if config.hsts_enabled {
            let mut hsts = format!("max-age={}", config.hsts_max_age);
            if config.hsts_include_subdomains {
                hsts.push_str("; includeSubDomains");
            }
            if let Ok(value) = HeaderValue::from_str(&hsts) {
                headers.insert(STRICT_TRANSPORT_SECURITY, value);
            }
        }

        Self(headers)
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.0
    }

    /// Copy each header into `target` unless it is already present.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.0 {
            if !target.contains_key(name) {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Build the shared header set for the `Extension` layer.
#[must_use]
pub fn build_security_headers(config: &SecurityHeadersConfig) -> Arc<SecurityHeaders> {
    Arc::new(SecurityHeaders::from_config(config))
}

/// Adds [`SecurityHeaders`] to every response.
///
/// Layer it outside the routes, with the `Extension` carrying the headers
/// added after it so the extension is visible to the middleware.
pub async fn security_headers_middleware(
    Extension(headers): Extension<Arc<SecurityHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(response.headers_mut());
    response
}
