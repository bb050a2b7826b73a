//! HTTP → gRPC forwarding over the loopback connection.

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use http::header::CONTENT_TYPE;
use http::StatusCode;
use tonic::{Code, Status};

use super::loopback::LoopbackConnection;
use super::trace::TraceContext;

/// gRPC's default maximum message size.
const MAX_FORWARD_BODY: usize = 4 * 1024 * 1024;

/// Route a `POST` to the unary method at `grpc_path` (`/pkg.Service/Method`).
///
/// The HTTP body is sent as the request message; the response message is
/// returned as an `application/octet-stream` body. Errors come back as the
/// mapped HTTP status with the gRPC message as body.
pub fn forward_unary(loopback: &LoopbackConnection, grpc_path: &'static str) -> MethodRouter {
    let loopback = loopback.clone();
    post(move |request: Request| {
        let loopback = loopback.clone();
        async move { forward(&loopback, grpc_path, request).await }
    })
}

async fn forward(loopback: &LoopbackConnection, grpc_path: &str, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let payload = match axum::body::to_bytes(body, MAX_FORWARD_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = grpc_path, error = %e, "Failed to read gateway request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response();
        }
    };

    let mut call = tonic::Request::new(payload);
    if let Some(trace) = parts.extensions.get::<TraceContext>() {
        trace.apply(call.metadata_mut());
    }

    match loopback.unary(grpc_path, call).await {
        Ok(response) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "application/octet-stream")],
            Body::from(response.into_inner()),
        )
            .into_response(),
        Err(status) => status_response(&status),
    }
}

fn status_response(status: &Status) -> Response {
    let http_status = http_status_for(status.code());
    if http_status.is_server_error() {
        tracing::warn!(code = ?status.code(), message = status.message(), "Gateway call failed");
    }
    (http_status, status.message().to_string()).into_response()
}

/// HTTP status for a gRPC code, following the grpc-gateway mapping.
pub fn http_status_for(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Unknown | Code::Internal | Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
