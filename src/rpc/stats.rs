//! Per-call telemetry for the binary transport.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use tonic::Code;
use tower::{Layer, Service};

/// What a [`StatsHandler`] learns about one finished call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// `/package.Service/Method`.
    pub path: String,
    /// HTTP/2 status of the response head.
    pub http_status: http::StatusCode,
    /// gRPC status when it was sent in the response head (trailers-only
    /// responses, i.e. early errors). `None` means it travels in trailers.
    pub grpc_code: Option<Code>,
    /// Time until the response head was produced.
    pub elapsed: Duration,
}

/// Sink for [`CallRecord`]s. Called on the request path; keep it cheap.
pub trait StatsHandler: Send + Sync + 'static {
    fn handle(&self, record: &CallRecord);
}

/// Records calls through the `metrics` facade.
///
/// - `rpc_host_calls_total` (counter): by path and code
/// - `rpc_host_call_duration_seconds` (histogram): by path
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsStatsHandler;

impl StatsHandler for MetricsStatsHandler {
    fn handle(&self, record: &CallRecord) {
        let code = match record.grpc_code {
            Some(code) => code_label(code),
            None if record.http_status.is_success() => "ok",
            None => "transport_error",
        };
        metrics::counter!(
            "rpc_host_calls_total",
            "path" => record.path.clone(),
            "code" => code
        )
        .increment(1);
        metrics::histogram!("rpc_host_call_duration_seconds", "path" => record.path.clone())
            .record(record.elapsed.as_secs_f64());
    }
}

fn code_label(code: Code) -> &'static str {
    match code {
        Code::Ok => "ok",
        Code::Cancelled => "cancelled",
        Code::Unknown => "unknown",
        Code::InvalidArgument => "invalid_argument",
        Code::DeadlineExceeded => "deadline_exceeded",
        Code::NotFound => "not_found",
        Code::AlreadyExists => "already_exists",
        Code::PermissionDenied => "permission_denied",
        Code::ResourceExhausted => "resource_exhausted",
        Code::FailedPrecondition => "failed_precondition",
        Code::Aborted => "aborted",
        Code::OutOfRange => "out_of_range",
        Code::Unimplemented => "unimplemented",
        Code::Internal => "internal",
        Code::Unavailable => "unavailable",
        Code::DataLoss => "data_loss",
        Code::Unauthenticated => "unauthenticated",
    }
}

/// Tower layer feeding a [`StatsHandler`]. Pass-through when no handler is set.
#[derive(Clone, Default)]
pub struct CallStatsLayer {
    sink: Option<Arc<dyn StatsHandler>>,
}

impl CallStatsLayer {
    pub fn new(sink: Option<Arc<dyn StatsHandler>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for CallStatsLayer {
    type Service = CallStats<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CallStats {
            inner,
            sink: self.sink.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CallStats<S> {
    inner: S,
    sink: Option<Arc<dyn StatsHandler>>,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for CallStats<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        let Some(sink) = self.sink.clone() else {
            return Box::pin(self.inner.call(req));
        };

        let path = req.uri().path().to_string();
        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let res = fut.await;
            if let Ok(response) = &res {
                let grpc_code = response
                    .headers()
                    .get("grpc-status")
                    .map(|v| Code::from_bytes(v.as_bytes()));
                sink.handle(&CallRecord {
                    path,
                    http_status: response.status(),
                    grpc_code,
                    elapsed: start.elapsed(),
                });
            }
            res
        })
    }
}
