//! Request timing.

use std::time::Instant;

use crate::context::wiring_defect;
use crate::handler::BoxFuture;
use crate::request::Request;

use super::{Middleware, Next};

/// Measures the wall time of everything after it and emits one
/// `request completed` record through the contextual logger.
///
/// The record is written after the downstream chain returns, whatever the
/// response says; the status and body are not inspected. If the request
/// future is dropped mid-flight no record is written.
pub struct RequestTimer;

impl Middleware for RequestTimer {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let logger = match req.context().logger() {
            Ok(logger) => logger.clone(),
            Err(err) => wiring_defect(&err),
        };
        let uri = req.request_uri().to_owned();
        let method = req.method().clone();

        Box::pin(async move {
            let start = Instant::now();
            let res = next.run(req).await;
            let duration = start.elapsed();

            tracing::info!(
                parent: logger.span(),
                correlation_id = %logger.correlation_id(),
                uri = %uri,
                method = %method,
                duration = ?duration,
                "request completed"
            );
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::{HeaderMap, Method, StatusCode};
    use tracing_subscriber::EnvFilter;

    use super::*;
    use crate::Response;
    use crate::logging::capture::Captured;
    use crate::middleware::request_logging;

    async fn echo_id(req: Request) -> Response {
        let logger = req.context().logger().unwrap();
        logger.info("filtered out by target");
        Response::text(logger.correlation_id().to_string())
    }

    async fn slow(req: Request) -> Response {
        tokio::time::sleep(Duration::from_millis(20)).await;
        req.context().logger().unwrap().info("handler done");
        Response::status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[tokio::test]
    async fn test_completion_record_follows_handler() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let pipeline = request_logging().then(slow);
        let req = Request::new(Method::POST, "/items?page=2".parse().unwrap(), HeaderMap::new());
        let res = pipeline.call(req).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let records = captured.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["msg"], "handler done");

        let done = &records[1];
        assert_eq!(done["msg"], "request completed");
        assert_eq!(done["level"], "info");
        assert_eq!(done["uri"], "/items?page=2");
        assert_eq!(done["method"], "POST");
        assert_eq!(done["correlation_id"], records[0]["correlation_id"]);

        let duration = done["duration"].as_str().unwrap();
        assert!(!duration.starts_with('-'));
        assert!(duration.ends_with('s'), "unexpected duration format {duration}");
    }

    // A filter scoped to the middleware drops the request span entirely.
    #[tokio::test]
    async fn test_completion_record_keeps_id_under_targeted_filter() {
        let captured = Captured::default();
        let _guard = captured.set_default_with(EnvFilter::new("greeter::middleware=info"));

        let req = Request::new(Method::GET, "/".parse().unwrap(), HeaderMap::new());
        let res = request_logging().then(echo_id).call(req).await;
        let id = String::from_utf8(res.body().to_vec()).unwrap();

        let records = captured.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["msg"], "request completed");
        assert_eq!(records[0]["correlation_id"], id.as_str());
    }

    #[tokio::test]
    async fn test_duration_covers_the_handler() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let res = request_logging()
            .then(slow)
            .call(Request::new(Method::GET, "/".parse().unwrap(), HeaderMap::new()))
            .await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let records = captured.records();
        let duration = records[1]["duration"].as_str().unwrap();
        let millis: f64 = duration.trim_end_matches("ms").parse().unwrap();
        assert!(millis >= 20.0, "duration {duration} shorter than the handler");
    }
}
