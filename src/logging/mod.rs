//! Structured logging.
//!
//! Two halves:
//!
//! - [`init`] installs the process-wide subscriber once, at startup: a
//!   [`JsonLines`] layer over a `tracing_subscriber` registry, filtered by
//!   `RUST_LOG` (default `info`). Nothing reconfigures it afterwards.
//! - [`Logger`] is the per-request handle. It is built by the
//!   [`ContextLogger`](crate::middleware::ContextLogger) middleware and
//!   carried in the request [`Context`](crate::Context). It is *not* stored in
//!   a global or a thread-local: code that wants to log for a request must be
//!   handed the context.

mod format;

#[doc(hidden)]
pub mod capture;

use std::fmt;

use tracing::Span;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use format::JsonLines;

use crate::correlation::CorrelationId;
use crate::error::Error;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global JSON-lines subscriber, writing to stdout.
///
/// Call once from `main` before serving. A second call returns
/// [`Error::Logging`] instead of replacing the first subscriber.
pub fn init() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(JsonLines::new(std::io::stdout))
        .try_init()?;
    Ok(())
}

/// A request-scoped logger.
///
/// Every event carries `correlation_id` as an event field, so a filter that
/// disables the `request` span cannot strip the id. Events also name that
/// span as their explicit parent; it is never entered on the current thread.
///
/// Cloning is cheap (an `Arc` and a span handle).
#[derive(Clone, Debug)]
pub struct Logger {
    correlation_id: CorrelationId,
    span: Span,
}

impl Logger {
    pub fn new(correlation_id: CorrelationId) -> Self {
        let span = tracing::error_span!("request", correlation_id = %correlation_id);
        Self { correlation_id, span }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// The request span. Events with extra fields use it as `parent:` and
    /// must still name the id themselves:
    ///
    /// ```rust,ignore
    /// tracing::info!(
    ///     parent: logger.span(),
    ///     correlation_id = %logger.correlation_id(),
    ///     uri = %uri,
    ///     "request completed"
    /// );
    /// ```
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        tracing::debug!(parent: &self.span, correlation_id = %self.correlation_id, "{msg}");
    }

    pub fn info(&self, msg: impl fmt::Display) {
        tracing::info!(parent: &self.span, correlation_id = %self.correlation_id, "{msg}");
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        tracing::warn!(parent: &self.span, correlation_id = %self.correlation_id, "{msg}");
    }

    pub fn error(&self, msg: impl fmt::Display) {
        tracing::error!(parent: &self.span, correlation_id = %self.correlation_id, "{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture::Captured;

    #[test]
    fn test_every_level_carries_correlation_id() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let logger = Logger::new(CorrelationId::from("req-1"));
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        let records = captured.records();
        let levels: Vec<_> = records.iter().map(|r| r["level"].as_str().unwrap()).collect();
        assert_eq!(levels, ["debug", "info", "warning", "error"]);
        assert!(records.iter().all(|r| r["correlation_id"] == "req-1"));
    }

    #[test]
    fn test_loggers_do_not_share_ids() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let a = Logger::new(CorrelationId::from("a"));
        let b = Logger::new(CorrelationId::from("b"));
        a.info("from a");
        b.info("from b");
        a.info("from a again");

        let records = captured.records();
        assert_eq!(records[0]["correlation_id"], "a");
        assert_eq!(records[1]["correlation_id"], "b");
        assert_eq!(records[2]["correlation_id"], "a");
    }

    #[test]
    fn test_span_parent_accepts_extra_fields() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let logger = Logger::new(CorrelationId::from("x"));
        tracing::info!(parent: logger.span(), method = "GET", "custom");

        let record = &captured.records()[0];
        assert_eq!(record["correlation_id"], "x");
        assert_eq!(record["method"], "GET");
        assert_eq!(record["msg"], "custom");
    }

    #[test]
    fn test_id_survives_when_spans_are_filtered_out() {
        let captured = Captured::default();
        let _guard = captured
            .set_default_with(tracing_subscriber::filter::filter_fn(|meta| meta.is_event()));

        let logger = Logger::new(CorrelationId::from("no-span"));
        logger.info("still tagged");
        logger.error("also tagged");

        let records = captured.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["correlation_id"] == "no-span"));
    }

    #[test]
    fn test_logger_exposes_its_id() {
        let logger = Logger::new(CorrelationId::from("id-7"));
        assert_eq!(logger.correlation_id().as_str(), "id-7");
    }
}
