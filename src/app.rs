//! The greeting service: one route behind the request-logging chain.

use crate::context::wiring_defect;
use crate::greetings::{self, GreetError};
use crate::middleware::request_logging;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Name greeted when the request has no `name` query parameter.
pub const DEFAULT_NAME: &str = "Man";

/// Body written when the greeting fails.
///
/// The status stays `200 OK` on this path. Clients cannot tell a failure
/// from a greeting except by the body.
pub const ERROR_MARKER: &str = "ERRORE";

/// Builds the application router: `GET /` through the logging chain.
pub fn router() -> Router {
    Router::new().get("/", request_logging().then(home))
}

/// `GET /` — greets `?name=` (default [`DEFAULT_NAME`]).
pub async fn home(req: Request) -> Response {
    let ctx = req.context();
    let logger = match ctx.logger() {
        Ok(logger) => logger,
        Err(err) => wiring_defect(&err),
    };

    let name = req.query("name").unwrap_or_else(|| DEFAULT_NAME.to_owned());
    let res = match greetings::greet(ctx, &name) {
        Ok(message) => Response::text(message),
        Err(GreetError::Context(err)) => wiring_defect(&err),
        Err(err @ GreetError::EmptyName) => {
            logger.error(&err);
            Response::text(ERROR_MARKER)
        }
    };
    logger.info("Endpoint Hit: homePage");
    res
}
