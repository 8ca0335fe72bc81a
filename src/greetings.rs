//! Greeting text.

use rand::seq::SliceRandom;

use crate::context::{Context, ContextError};

/// Greeting templates; `{name}` is replaced by the caller's name.
pub const TEMPLATES: [&str; 3] = [
    "Hi, {name}. Welcome!",
    "Great to see you, {name}!",
    "Hail, {name}! Well met!",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GreetError {
    #[error("empty name")]
    EmptyName,

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Returns a randomly chosen greeting for `name` and logs it at info through
/// the request's contextual logger.
pub fn greet(ctx: &Context, name: &str) -> Result<String, GreetError> {
    let logger = ctx.logger()?;

    if name.is_empty() {
        return Err(GreetError::EmptyName);
    }
    let message = random_template().replace("{name}", name);
    logger.info(&message);
    Ok(message)
}

fn random_template() -> &'static str {
    TEMPLATES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TEMPLATES[0])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::correlation::CorrelationId;
    use crate::logging::Logger;
    use crate::logging::capture::Captured;

    fn context() -> Context {
        let id = CorrelationId::from("greet-test");
        Context::new()
            .with_correlation_id(id.clone())
            .with_logger(Logger::new(id))
    }

    fn expected(name: &str) -> Vec<String> {
        TEMPLATES.iter().map(|t| t.replace("{name}", name)).collect()
    }

    #[test]
    fn test_empty_name_is_an_error_and_logs_nothing() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        assert_eq!(greet(&context(), ""), Err(GreetError::EmptyName));
        assert!(captured.records().is_empty());
        assert_eq!(GreetError::EmptyName.to_string(), "empty name");
    }

    #[test]
    fn test_greeting_uses_a_known_template_and_is_logged() {
        let captured = Captured::default();
        let _guard = captured.set_default();

        let message = greet(&context(), "Man").unwrap();
        assert!(expected("Man").contains(&message), "unexpected greeting {message:?}");

        let records = captured.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "info");
        assert_eq!(records[0]["msg"], message.as_str());
        assert_eq!(records[0]["correlation_id"], "greet-test");
    }

    #[test]
    fn test_all_templates_are_reachable() {
        let seen: HashSet<_> = (0..500).map(|_| random_template()).collect();
        assert_eq!(seen.len(), TEMPLATES.len());
    }

    #[test]
    fn test_missing_logger_is_reported() {
        let ctx = Context::new().with_correlation_id(CorrelationId::from("x"));
        assert_eq!(
            greet(&ctx, "Man"),
            Err(GreetError::Context(ContextError::Missing("logger")))
        );
    }
}
