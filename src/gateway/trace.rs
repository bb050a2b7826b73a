//! Trace propagation hook.
//!
//! The bridge calls the configured [`TraceHook`] on every request before it
//! reaches the route table. The default hook does nothing; [`W3cTraceHook`]
//! lifts W3C trace-context headers into a [`TraceContext`] extension, which
//! [`forward_unary`](super::forward_unary) turns into gRPC metadata.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::{HeaderName, HeaderValue};
use tonic::metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue};

pub const TRACEPARENT: &str = "traceparent";
pub const TRACESTATE: &str = "tracestate";

/// Request-scoped interceptor run before dispatch.
pub trait TraceHook: Send + Sync + 'static {
    fn inject(&self, request: &mut Request);
}

/// Identity hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTraceHook;

impl TraceHook for NoopTraceHook {
    fn inject(&self, _request: &mut Request) {}
}

/// Trace headers captured from an inbound HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl TraceContext {
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Copy the captured headers into outgoing gRPC metadata.
    ///
    /// Values that are not valid ASCII metadata are skipped.
    pub fn apply(&self, metadata: &mut MetadataMap) {
        for (name, value) in &self.headers {
            let Ok(key) = MetadataKey::<Ascii>::from_bytes(name.as_str().as_bytes()) else {
                continue;
            };
            let Ok(value) = value.to_str() else {
                continue;
            };
            if let Ok(value) = MetadataValue::try_from(value) {
                metadata.insert(key, value);
            }
        }
    }
}

/// Captures `traceparent`, `tracestate` and any extra configured headers.
#[derive(Debug, Clone)]
pub struct W3cTraceHook {
    names: Vec<HeaderName>,
}

impl W3cTraceHook {
    pub fn new<I, S>(extra_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = vec![
            HeaderName::from_static(TRACEPARENT),
            HeaderName::from_static(TRACESTATE),
        ];
        for header in extra_headers {
            match HeaderName::try_from(header.as_ref().to_ascii_lowercase()) {
                Ok(name) if !names.contains(&name) => names.push(name),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        header = header.as_ref(),
                        error = %e,
                        "Ignoring invalid trace header name"
                    );
                }
            }
        }
        Self { names }
    }
}

impl Default for W3cTraceHook {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl TraceHook for W3cTraceHook {
    fn inject(&self, request: &mut Request) {
        let headers: Vec<_> = self
            .names
            .iter()
            .filter_map(|name| {
                request
                    .headers()
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();

        if !headers.is_empty() {
            request.extensions_mut().insert(TraceContext { headers });
        }
    }
}

/// Middleware invoking the hook; installed by the bridge on every route.
pub(crate) async fn trace_middleware(
    State(hook): State<Arc<dyn TraceHook>>,
    mut request: Request,
    next: Next,
) -> Response {
    hook.inject(&mut request);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn w3c_hook_captures_trace_headers() {
        let hook = W3cTraceHook::new(["X-B3-TraceId"]);
        let mut req = http::Request::builder()
            .header(TRACEPARENT, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
            .header("x-b3-traceid", "abc")
            .header("x-other", "ignored")
            .body(Body::empty())
            .unwrap();

        hook.inject(&mut req);

        let ctx = req.extensions().get::<TraceContext>().unwrap();
        assert!(ctx.get(TRACEPARENT).is_some());
        assert_eq!(ctx.get("x-b3-traceid").unwrap(), "abc");
        assert!(ctx.get("x-other").is_none());
        assert!(ctx.get(TRACESTATE).is_none());
    }

    #[test]
    fn w3c_hook_leaves_untraced_requests_alone() {
        let mut req = http::Request::builder().body(Body::empty()).unwrap();
        W3cTraceHook::default().inject(&mut req);
        assert!(req.extensions().get::<TraceContext>().is_none());
    }

    #[test]
    fn context_becomes_metadata() {
        let ctx = TraceContext {
            headers: vec![(
                HeaderName::from_static(TRACEPARENT),
                HeaderValue::from_static("00-abc-def-01"),
            )],
        };
        let mut md = MetadataMap::new();
        ctx.apply(&mut md);
        assert_eq!(md.get(TRACEPARENT).unwrap(), "00-abc-def-01");
    }
}
