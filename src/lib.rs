//! # greeter
//!
//! A tiny HTTP service that answers `GET /` with a randomised greeting, and
//! a worked example of request-scoped structured logging.
//!
//! ## The pipeline
//!
//! Every request passes through three middleware stages before it reaches the
//! handler:
//!
//! ```text
//! request ─▶ CorrelationTagger ─▶ ContextLogger ─▶ RequestTimer ─▶ home ─▶ response
//!            X-Correlation-Id     Logger bound      wall time
//!            resolved             into Context      logged after
//! ```
//!
//! Each stage derives a new [`Context`] from the one it received; nothing is
//! mutated in place and nothing lives in a global. Every record written through
//! the request's [`Logger`](logging::Logger) carries its `correlation_id`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use greeter::{Server, app, logging};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), greeter::Error> {
//!     logging::init()?;
//!     Server::bind(SocketAddr::from(([0, 0, 0, 0], 10000)))
//!         .serve(app::router())
//!         .await
//! }
//! ```

mod context;
mod correlation;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod greetings;
pub mod logging;
pub mod middleware;

pub use context::{Context, ContextError, CorrelationIdKey, Key, LoggerKey};
pub use correlation::{CORRELATION_HEADER, CorrelationId};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
