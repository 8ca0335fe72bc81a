//! Correlation-id assignment.

use crate::correlation::{CORRELATION_HEADER, CorrelationId};
use crate::handler::BoxFuture;
use crate::request::Request;

use super::{Middleware, Next};

/// Resolves the request's correlation id and binds it into the context.
///
/// A non-empty `X-Correlation-Id` header is trusted and reused verbatim;
/// otherwise a fresh id is generated and written onto the request headers so
/// later stages see the resolved value. The id is echoed on the response.
pub struct CorrelationTagger;

impl CorrelationTagger {
    /// Resolves the id and returns the request with it bound.
    pub fn tag(mut req: Request) -> (Request, CorrelationId) {
        let id = match CorrelationId::from_header(req.headers().get(CORRELATION_HEADER)) {
            Some(id) => id,
            None => {
                let id = CorrelationId::generate();
                if let Some(value) = id.to_header_value() {
                    req.set_header(CORRELATION_HEADER, value);
                }
                id
            }
        };
        let ctx = req.context().with_correlation_id(id.clone());
        (req.with_context(ctx), id)
    }
}

impl Middleware for CorrelationTagger {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let (req, id) = Self::tag(req);
        Box::pin(async move {
            let mut res = next.run(req).await;
            if let Some(value) = id.to_header_value() {
                res.set_header(CORRELATION_HEADER, value);
            }
            res
        })
    }
}
