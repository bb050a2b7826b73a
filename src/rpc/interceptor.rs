//! Ordered call interceptor chain.
//!
//! Interceptors see request metadata and extensions only (never the
//! message). They may enrich the request or reject the call with a
//! [`Status`].

use std::fmt;
use std::sync::Arc;

use tonic::service::Interceptor;
use tonic::{Request, Status};

/// A single link in the chain.
pub trait CallInterceptor: Send + Sync + 'static {
    fn intercept(&self, request: Request<()>) -> Result<Request<()>, Status>;
}

impl<F> CallInterceptor for F
where
    F: Fn(Request<()>) -> Result<Request<()>, Status> + Send + Sync + 'static,
{
    fn intercept(&self, request: Request<()>) -> Result<Request<()>, Status> {
        self(request)
    }
}

/// Interceptors applied to every binary call, in insertion order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    links: Arc<Vec<Arc<dyn CallInterceptor>>>,
}

impl InterceptorChain {
    pub fn new(links: Vec<Arc<dyn CallInterceptor>>) -> Self {
        Self {
            links: Arc::new(links),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.links.len())
            .finish()
    }
}

impl Interceptor for InterceptorChain {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        self.links
            .iter()
            .try_fold(request, |request, link| link.intercept(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::metadata::MetadataValue;

    fn tag(value: &'static str) -> Arc<dyn CallInterceptor> {
        Arc::new(move |mut req: Request<()>| {
            req.metadata_mut()
                .append("x-seen", MetadataValue::from_static(value));
            Ok(req)
        })
    }

    #[test]
    fn runs_in_order() {
        let mut chain = InterceptorChain::new(vec![tag("a"), tag("b")]);
        let req = chain.call(Request::new(())).unwrap();
        let seen: Vec<_> = req
            .metadata()
            .get_all("x-seen")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn first_rejection_short_circuits() {
        let deny: Arc<dyn CallInterceptor> =
            Arc::new(|_req: Request<()>| Err(Status::permission_denied("nope")));
        let mut chain = InterceptorChain::new(vec![deny, tag("never")]);
        let err = chain.call(Request::new(())).unwrap_err();
        assert_eq!(err.code(), tonic::Code::PermissionDenied);
    }

    #[test]
    fn empty_chain_is_identity() {
        let mut chain = InterceptorChain::default();
        assert!(chain.is_empty());
        assert!(chain.call(Request::new(())).is_ok());
    }
}
