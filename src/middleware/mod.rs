//! Middleware layer.
//!
//! A middleware is one stage of an ordered chain. It receives the request and
//! a [`Next`] capability standing for the rest of the chain, and decides what
//! to do before and after delegating:
//!
//! ```text
//! Chain::new()
//!     .layer(CorrelationTagger)   // Start → CorrelationResolved
//!     .layer(ContextLogger)       //       → LoggerBound
//!     .layer(RequestTimer)        //       → HandlerExecuting → Completed
//!     .then(home)
//! ```
//!
//! Stages run in the order they were added; the first one added is the
//! outermost. Each stage only resumes after everything after it, including
//! the handler, has produced a response.

mod correlation;
mod logger;
mod timing;

use std::sync::Arc;

pub use correlation::CorrelationTagger;
pub use logger::ContextLogger;
pub use timing::RequestTimer;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::request::Request;

/// One stage of a request pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The remainder of the chain, handed to a [`Middleware`].
pub struct Next(BoxedHandler);

impl Next {
    /// Runs the rest of the chain to completion.
    pub fn run(self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

/// An ordered list of middleware waiting for its terminal handler.
#[derive(Default)]
pub struct Chain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. It wraps everything added after it.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Closes the chain over `handler`.
    pub fn then(self, handler: impl Handler) -> Pipeline {
        let terminal = handler.into_boxed_handler();
        let composed = self.stages.into_iter().rev().fold(terminal, |next, stage| {
            Arc::new(Stage { middleware: stage, next }) as BoxedHandler
        });
        Pipeline(composed)
    }
}

/// A middleware stage bound to the handler that follows it.
struct Stage {
    middleware: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl ErasedHandler for Stage {
    fn call(&self, req: Request) -> BoxFuture {
        self.middleware.call(req, Next(Arc::clone(&self.next)))
    }
}

/// A fully composed chain. Register it on a [`Router`](crate::Router) like any
/// other handler.
pub struct Pipeline(BoxedHandler);

impl Pipeline {
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

impl private::Sealed for Pipeline {}

impl Handler for Pipeline {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.0
    }
}

/// The service's standard chain: correlation id, contextual logger, timing.
pub fn request_logging() -> Chain {
    Chain::new()
        .layer(CorrelationTagger)
        .layer(ContextLogger)
        .layer(RequestTimer)
}
