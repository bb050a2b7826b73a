//! Gateway router assembly.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use axum::Router;
use http::StatusCode;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::mux::GatewayMux;
use super::trace::{trace_middleware, TraceHook};

/// Generates a UUID v4 `x-request-id` for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        http::HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Wraps the route table with the cross-cutting behaviour every gateway
/// request goes through.
pub struct GatewayBridge {
    mux: GatewayMux,
    hook: Arc<dyn TraceHook>,
    request_timeout: Duration,
}

impl GatewayBridge {
    pub fn new(mux: GatewayMux, hook: Arc<dyn TraceHook>, request_timeout: Duration) -> Self {
        Self {
            mux,
            hook,
            request_timeout,
        }
    }

    /// Build the final router.
    ///
    /// Layers, outermost first: panic isolation, request id, HTTP tracing,
    /// request id propagation, timeout, trace hook.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        self.mux
            .into_router()
            .fallback(not_found)
            .layer(axum::middleware::from_fn_with_state(self.hook, trace_middleware))
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(CatchPanicLayer::custom(panic_response))
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "No matching route found")
}

/// 500 with the panic payload as body. The listener keeps serving.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic".to_string()
    };

    tracing::error!(panic = %message, "Gateway handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}
