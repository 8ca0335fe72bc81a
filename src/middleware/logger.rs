//! Contextual logger injection.

use crate::context::{Context, ContextError, wiring_defect};
use crate::handler::BoxFuture;
use crate::logging::Logger;
use crate::request::Request;

use super::{Middleware, Next};

/// Builds a [`Logger`] tagged with the request's correlation id and binds it
/// into the context.
///
/// Must run after [`CorrelationTagger`](super::CorrelationTagger). A request
/// without a correlation id means the chain is mis-ordered; the process exits
/// rather than log records with a blank id.
pub struct ContextLogger;

impl ContextLogger {
    /// Derives a context carrying the logger, or reports the missing id.
    pub fn bind(ctx: &Context) -> Result<Context, ContextError> {
        let id = ctx.correlation_id()?;
        Ok(ctx.with_logger(Logger::new(id.clone())))
    }
}

impl Middleware for ContextLogger {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let ctx = match Self::bind(req.context()) {
            Ok(ctx) => ctx,
            Err(err) => wiring_defect(&err),
        };
        next.run(req.with_context(ctx))
    }
}
